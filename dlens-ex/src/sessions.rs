//! Open thread views
//!
//! A session is one open thread view: the fetched thread, everything
//! derived from it, the cross-view registration table, and one event
//! channel per side for highlight/active/scroll/cluster notifications.
//! Sessions live in a shared registry keyed by UUID; closing a session
//! releases every registration and ends the side streams by dropping
//! their senders.
//!
//! All engine entry points run under the session's mutex, so highlight
//! propagation and selection transitions are atomic. Hooks only push
//! onto unbounded channels and never re-enter the engine.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::response::sse::Event;
use serde_json::json;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::{Mutex, RwLock};
use tokio::task;
use uuid::Uuid;

use dlens_common::types::ThreadData;
use dlens_common::Error;

use crate::thread::{
    compute_statistics, group_frames, ClusterOrder, GroupedFrames, SelectionAction,
    SelectionCandidates, SelectionKeys, SelectionState, Side, SideHooks, ThreadSession,
    ThreadStatistics,
};

struct SideChannel {
    sender: UnboundedSender<Event>,
    /// Taken by the first subscriber to `events/:side`
    receiver: Option<UnboundedReceiver<Event>>,
}

impl SideChannel {
    fn new() -> Self {
        let (sender, receiver) = unbounded_channel();
        Self {
            sender,
            receiver: Some(receiver),
        }
    }
}

/// One open thread view with all derived state
pub struct ThreadView {
    pub thread: ThreadData,
    pub stats: ThreadStatistics,
    pub grouped: GroupedFrames,
    pub candidates: SelectionCandidates,
    pub selection: SelectionState,
    session: ThreadSession,
    channels: BTreeMap<Side, SideChannel>,
}

impl ThreadView {
    /// Derive everything from a fetched thread. CPU-bound; run on a
    /// blocking thread via [`SessionRegistry::open`].
    pub fn new(thread: ThreadData, keys: &SelectionKeys) -> Result<Self, Error> {
        let stats = compute_statistics(&thread)?;

        // deep-linked cluster wins; otherwise the first clustered
        // element decides the default
        let keys = SelectionKeys {
            cluster: keys.cluster.or(stats.initial_cluster),
            ..keys.clone()
        };

        let frame_model = initial_frame_model(&thread, keys.frame_model.as_deref());
        let grouped = grouped_for(&thread, &stats, frame_model.as_deref());
        let candidates = candidates_for(&thread, &stats, &grouped);
        let selection = SelectionState::initial(&candidates, &keys);

        let label_ids: Vec<i64> = stats.points.iter().map(|p| p.label_id).collect();
        let mut session = ThreadSession::new(label_ids);

        let mut channels = BTreeMap::new();
        for side in [Side::Text, Side::Minimap, Side::Scatter, Side::Detail] {
            channels.insert(side, SideChannel::new());
        }

        // cluster switches triggered by clicks land on the detail
        // panel's stream
        let cluster_sender = channels[&Side::Detail].sender.clone();
        session.set_current_cluster_hook(Box::new(move |cluster| {
            let _ = cluster_sender.send(
                Event::default()
                    .event("cluster")
                    .data(json!({ "cluster": cluster }).to_string()),
            );
        }));

        Ok(Self {
            thread,
            stats,
            grouped,
            candidates,
            selection,
            session,
            channels,
        })
    }

    /// Register a side for an element, wiring its notifications onto
    /// the side's event channel.
    pub fn register(&mut self, element: usize, side: Side, can_activate: bool) {
        let sender = self.channels[&side].sender.clone();
        let highlight_sender = sender.clone();
        let active_sender = sender.clone();
        let hooks = SideHooks {
            can_activate,
            set_highlighted: Some(Box::new(move |on| {
                let _ = highlight_sender.send(
                    Event::default()
                        .event("highlight")
                        .data(json!({ "element": element, "on": on }).to_string()),
                );
            })),
            set_active: Some(Box::new(move |on| {
                let _ = active_sender.send(
                    Event::default()
                        .event("active")
                        .data(json!({ "element": element, "on": on }).to_string()),
                );
            })),
            scroll: Some(Box::new(move || {
                let _ = sender.send(
                    Event::default()
                        .event("scroll")
                        .data(json!({ "element": element }).to_string()),
                );
            })),
        };
        self.session.register(element, side, hooks);
    }

    pub fn unregister(&mut self, element: usize, side: Side) {
        self.session.unregister(element, side);
    }

    pub fn hover(&mut self, element: usize, on: bool) {
        self.session.set_highlighted(element, on);
    }

    pub fn click(&mut self, element: usize, side: Side) {
        self.session.scroll_to(element, side);
    }

    pub fn is_highlighted(&self, element: usize) -> bool {
        self.session.is_highlighted(element)
    }

    pub fn is_active(&self, element: usize) -> bool {
        self.session.is_active(element)
    }

    /// Apply one selection transition. A frame-model change regroups
    /// the cluster list, after which the cluster selection re-resolves
    /// by key against the new ordering.
    pub fn apply_selection(&mut self, action: &SelectionAction) -> SelectionState {
        let previous_frame_model = self.selection.frame_model.key.clone();
        self.selection = self.selection.apply(&self.candidates, action);

        if self.selection.frame_model.key != previous_frame_model {
            let frame_model = self.selection.frame_model.key.clone();
            self.grouped = grouped_for(&self.thread, &self.stats, frame_model.as_deref());
            self.candidates = candidates_for(&self.thread, &self.stats, &self.grouped);
            let keys = SelectionKeys {
                cluster: self.selection.cluster.key,
                label_model: self.selection.label_model.key.clone(),
                frame_model,
            };
            self.selection = SelectionState::initial(&self.candidates, &keys);
        }

        self.selection.clone()
    }

    /// Hand out the side's event stream receiver. Single subscriber
    /// per side.
    pub fn take_events(&mut self, side: Side) -> Result<UnboundedReceiver<Event>, Error> {
        self.channels
            .get_mut(&side)
            .and_then(|channel| channel.receiver.take())
            .ok_or_else(|| Error::InvalidInput(format!("event stream for {side:?} already taken")))
    }

    fn release(&mut self) {
        self.session.release();
        // dropping the senders ends any open SSE streams
        self.channels.clear();
    }
}

fn initial_frame_model(thread: &ThreadData, requested: Option<&str>) -> Option<String> {
    let frames = thread.frames.as_ref()?;
    let mut names: Vec<&String> = frames.keys().collect();
    names.sort();
    requested
        .filter(|name| frames.contains_key(*name))
        .map(str::to_string)
        .or_else(|| names.first().map(|n| (*n).to_string()))
}

fn grouped_for(
    thread: &ThreadData,
    stats: &ThreadStatistics,
    frame_model: Option<&str>,
) -> GroupedFrames {
    let frames = thread
        .frames
        .as_ref()
        .zip(frame_model)
        .and_then(|(frames, model)| frames.get(model));
    group_frames(frames, &stats.clusters)
}

fn candidates_for(
    thread: &ThreadData,
    stats: &ThreadStatistics,
    grouped: &GroupedFrames,
) -> SelectionCandidates {
    let sizes: HashMap<i64, usize> = stats.clusters.iter().map(|c| (c.id, c.size())).collect();
    let ordered_ids: Vec<i64> = match &grouped.order {
        ClusterOrder::Flat(ids) => ids.clone(),
        ClusterOrder::Grouped(groups) => groups.iter().flat_map(|(_, ids)| ids.clone()).collect(),
    };
    let cluster_order: Vec<(i64, usize)> = ordered_ids
        .into_iter()
        .map(|id| (id, sizes.get(&id).copied().unwrap_or(0)))
        .collect();
    SelectionCandidates::build(&cluster_order, &thread.labels, thread.frames.as_ref())
}

/// Shared registry of open thread views
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Mutex<ThreadView>>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a view from a fetched thread and register it. The
    /// derivation runs on a blocking thread; if the caller goes away
    /// before it finishes, the result is dropped without ever entering
    /// the registry.
    pub async fn open(&self, thread: ThreadData, keys: SelectionKeys) -> Result<Uuid, Error> {
        let view = task::spawn_blocking(move || ThreadView::new(thread, &keys))
            .await
            .map_err(|e| Error::Internal(format!("statistics task failed: {e}")))??;

        let id = Uuid::new_v4();
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(view)));
        tracing::info!(session = %id, "opened thread view");
        Ok(id)
    }

    pub async fn get(&self, id: Uuid) -> Result<Arc<Mutex<ThreadView>>, Error> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("no open thread view {id}")))
    }

    /// Close a view: release its registrations and drop it from the
    /// registry.
    pub async fn close(&self, id: Uuid) -> Result<(), Error> {
        let view = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| Error::NotFound(format!("no open thread view {id}")))?;
        view.lock().await.release();
        tracing::info!(session = %id, "closed thread view");
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::stats::tests::nested_thread;

    fn keys() -> SelectionKeys {
        SelectionKeys::default()
    }

    fn labeled_thread() -> ThreadData {
        let mut thread = nested_thread();
        for model in ["alpaca", "gpt-4"] {
            let mut per_cluster = HashMap::new();
            per_cluster.insert("0".to_string(), format!("{model}: zero"));
            per_cluster.insert("1".to_string(), format!("{model}: one"));
            thread.labels.insert(model.to_string(), per_cluster);
        }
        let mut frames = HashMap::new();
        let mut per_cluster = HashMap::new();
        per_cluster.insert("0".to_string(), vec!["econ".to_string()]);
        per_cluster.insert("1".to_string(), vec![]);
        frames.insert("gpt-4".to_string(), per_cluster);
        thread.frames = Some(frames);
        thread
    }

    #[test]
    fn test_view_defaults_to_initial_cluster() {
        let view = ThreadView::new(labeled_thread(), &keys()).unwrap();
        assert_eq!(view.selection.cluster.key, Some(0));
        assert_eq!(view.selection.label_model.key, Some("alpaca".to_string()));
        assert!(view.grouped.has_frames);
    }

    #[test]
    fn test_view_without_frames_orders_flat() {
        let view = ThreadView::new(nested_thread(), &keys()).unwrap();
        assert!(!view.grouped.has_frames);
        // cluster 0 has 3 elements, cluster 1 has 2
        assert_eq!(view.grouped.order, ClusterOrder::Flat(vec![0, 1]));
    }

    #[test]
    fn test_register_and_hover_feed_side_channel() {
        let mut view = ThreadView::new(labeled_thread(), &keys()).unwrap();
        let mut events = view.take_events(Side::Minimap).unwrap();
        view.register(2, Side::Minimap, false);
        view.hover(2, true);
        // registration sync + hover notification
        let first = events.try_recv();
        assert!(first.is_ok());
        assert!(events.try_recv().is_ok());
        assert!(view.is_highlighted(2));
    }

    #[test]
    fn test_events_stream_is_single_subscriber() {
        let mut view = ThreadView::new(labeled_thread(), &keys()).unwrap();
        assert!(view.take_events(Side::Text).is_ok());
        assert!(matches!(
            view.take_events(Side::Text),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_click_reports_cluster_on_detail_channel() {
        let mut view = ThreadView::new(labeled_thread(), &keys()).unwrap();
        let mut detail = view.take_events(Side::Detail).unwrap();
        view.register(0, Side::Text, false);
        view.click(0, Side::Text);
        let event = detail.try_recv();
        assert!(event.is_ok());
    }

    #[tokio::test]
    async fn test_registry_open_get_close() {
        let registry = SessionRegistry::new();
        let id = registry
            .open(labeled_thread(), keys())
            .await
            .expect("open failed");
        assert_eq!(registry.len().await, 1);
        assert!(registry.get(id).await.is_ok());
        registry.close(id).await.expect("close failed");
        assert_eq!(registry.len().await, 0);
        assert!(matches!(registry.get(id).await, Err(Error::NotFound(_))));
    }
}
