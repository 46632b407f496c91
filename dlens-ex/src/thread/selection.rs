//! Cluster / label-model / frame-model selection
//!
//! Three linked single-choice selections drive the summary panel: the
//! cluster under inspection, the label model whose summaries are
//! shown, and the frame model within that label model. Changing the
//! label model invalidates the frame choice, so both move in one
//! atomic transition; a view can never observe a frame model that does
//! not belong to the current label model.
//!
//! Resolution is by key first (deep links survive list reordering),
//! with a fallback to the first candidate, and an explicit empty state
//! of index -1 with no key and no value.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One resolved single-choice selection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection<K, V> {
    /// Position in the candidate list, -1 when empty
    pub index: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<K>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<V>,
}

impl<K, V> Selection<K, V> {
    pub fn empty() -> Self {
        Self {
            index: -1,
            key: None,
            value: None,
        }
    }
}

/// Resolve a selection against an ordered candidate list.
///
/// A supplied key takes over entirely: a stale key falls back to the
/// first candidate, ignoring any index sent alongside it. The index is
/// only consulted when no key was requested. Only an empty candidate
/// list yields the empty selection.
pub fn resolve_selection<K, V>(
    candidates: &[(K, V)],
    requested_key: Option<&K>,
    requested_index: Option<i64>,
) -> Selection<K, V>
where
    K: Clone + PartialEq,
    V: Clone,
{
    if candidates.is_empty() {
        return Selection::empty();
    }
    let index = match requested_key {
        Some(key) => candidates
            .iter()
            .position(|(k, _)| k == key)
            .unwrap_or(0),
        None => requested_index
            .and_then(|i| usize::try_from(i).ok())
            .filter(|i| *i < candidates.len())
            .unwrap_or(0),
    };
    let (key, value) = &candidates[index];
    Selection {
        index: index as i64,
        key: Some(key.clone()),
        value: Some(value.clone()),
    }
}

/// Per-model label summaries for one cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelModelEntry {
    pub label: String,
    /// Ranked frame labels of this cluster under each frame model
    pub frames: Vec<(String, Vec<String>)>,
}

/// Selection transitions accepted from the views
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum SelectionAction {
    #[serde(rename = "SET_CLUSTER_INDEX")]
    SetClusterIndex {
        #[serde(default)]
        index: Option<i64>,
        #[serde(default)]
        key: Option<i64>,
    },
    #[serde(rename = "SET_LABEL_MODEL")]
    SetLabelModel {
        #[serde(default)]
        index: Option<i64>,
        #[serde(default)]
        key: Option<String>,
    },
    #[serde(rename = "SET_FRAME_MODEL")]
    SetFrameModel {
        #[serde(default)]
        index: Option<i64>,
        #[serde(default)]
        key: Option<String>,
    },
}

/// Keys restoring a shared selection (the deep-link query parameters)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionKeys {
    pub cluster: Option<i64>,
    pub label_model: Option<String>,
    pub frame_model: Option<String>,
}

/// The combined selection of the summary panel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub cluster: Selection<i64, usize>,
    pub label_model: Selection<String, LabelModelEntry>,
    pub frame_model: Selection<String, Vec<String>>,
}

/// Candidate lists the selections resolve against. Built once per
/// thread from the labels and frames tables.
#[derive(Debug, Clone)]
pub struct SelectionCandidates {
    /// `(cluster id, cluster size)` in display order
    pub clusters: Vec<(i64, usize)>,
    /// `(label model name, entry)` sorted by model name
    pub label_models: HashMap<i64, Vec<(String, LabelModelEntry)>>,
}

impl SelectionCandidates {
    /// Assemble per-cluster label-model candidates.
    ///
    /// `labels` maps model -> cluster id (stringified) -> label text;
    /// `frames` maps model -> cluster id -> ranked frame labels. Model
    /// names sort lexicographically so that resolution order is stable
    /// across requests.
    pub fn build(
        cluster_order: &[(i64, usize)],
        labels: &HashMap<String, HashMap<String, String>>,
        frames: Option<&HashMap<String, HashMap<String, Vec<String>>>>,
    ) -> Self {
        let mut label_models: HashMap<i64, Vec<(String, LabelModelEntry)>> = HashMap::new();
        let mut model_names: Vec<&String> = labels.keys().collect();
        model_names.sort();

        for (cluster_id, _) in cluster_order {
            let key = cluster_id.to_string();
            let mut candidates = Vec::new();
            for model in &model_names {
                let Some(label) = labels[*model].get(&key) else {
                    continue;
                };
                let mut frame_candidates = Vec::new();
                if let Some(frames) = frames {
                    let mut frame_models: Vec<&String> = frames.keys().collect();
                    frame_models.sort();
                    for frame_model in frame_models {
                        if let Some(ranked) = frames[frame_model].get(&key) {
                            frame_candidates.push((frame_model.clone(), ranked.clone()));
                        }
                    }
                }
                candidates.push((
                    (*model).clone(),
                    LabelModelEntry {
                        label: label.clone(),
                        frames: frame_candidates,
                    },
                ));
            }
            label_models.insert(*cluster_id, candidates);
        }

        Self {
            clusters: cluster_order.to_vec(),
            label_models,
        }
    }

    fn label_candidates(&self, cluster_id: Option<i64>) -> &[(String, LabelModelEntry)] {
        cluster_id
            .and_then(|id| self.label_models.get(&id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl SelectionState {
    /// Resolve the initial state, honoring deep-link keys. Every level
    /// falls back to its first candidate when the key is absent or
    /// unknown.
    pub fn initial(candidates: &SelectionCandidates, keys: &SelectionKeys) -> Self {
        let cluster = resolve_selection(&candidates.clusters, keys.cluster.as_ref(), None);
        let label_model = resolve_selection(
            candidates.label_candidates(cluster.key),
            keys.label_model.as_ref(),
            None,
        );
        let frame_model = resolve_frame(&label_model, keys.frame_model.as_ref(), None);
        Self {
            cluster,
            label_model,
            frame_model,
        }
    }

    /// Apply one transition, returning the next state. The previous
    /// state is untouched so a failed downstream step can never leave
    /// a half-applied selection visible.
    pub fn apply(&self, candidates: &SelectionCandidates, action: &SelectionAction) -> Self {
        match action {
            SelectionAction::SetClusterIndex { index, key } => {
                let cluster = resolve_selection(&candidates.clusters, key.as_ref(), *index);
                // keep the model choices by key across the cluster switch
                let label_model = resolve_selection(
                    candidates.label_candidates(cluster.key),
                    self.label_model.key.as_ref(),
                    None,
                );
                let frame_model = resolve_frame(&label_model, self.frame_model.key.as_ref(), None);
                Self {
                    cluster,
                    label_model,
                    frame_model,
                }
            }
            SelectionAction::SetLabelModel { index, key } => {
                let label_model = resolve_selection(
                    candidates.label_candidates(self.cluster.key),
                    key.as_ref(),
                    *index,
                );
                // the frame list belongs to the label model, so the
                // frame selection resets in the same transition
                let frame_model = resolve_frame(&label_model, None, Some(0));
                Self {
                    cluster: self.cluster.clone(),
                    label_model,
                    frame_model,
                }
            }
            SelectionAction::SetFrameModel { index, key } => {
                let frame_model = resolve_frame(&self.label_model, key.as_ref(), *index);
                Self {
                    cluster: self.cluster.clone(),
                    label_model: self.label_model.clone(),
                    frame_model,
                }
            }
        }
    }
}

fn resolve_frame(
    label_model: &Selection<String, LabelModelEntry>,
    requested_key: Option<&String>,
    requested_index: Option<i64>,
) -> Selection<String, Vec<String>> {
    let Some(entry) = &label_model.value else {
        return Selection::empty();
    };
    resolve_selection(&entry.frames, requested_key, requested_index)
}
