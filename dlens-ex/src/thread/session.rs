//! Cross-view registration and highlight propagation
//!
//! Each element of a thread can be rendered by up to four views at
//! once (text panel, minimap, scatter chart, cluster-detail panel).
//! The session owns one state entry per element and a registry of
//! which sides currently render it; hover/active changes propagate to
//! every registered side, and clicking an element scrolls it into view
//! on all other sides and switches the detail panel to its cluster.
//!
//! The table is owned by the per-thread session (created once after
//! statistics finish, never resized) and passed explicitly to the
//! views; there is no process-wide registry, so two concurrently open
//! threads cannot leak state into each other.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One of the simultaneously rendered views of the same element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Primary text panel
    Text,
    /// Proportional strip
    Minimap,
    /// Scatter chart
    Scatter,
    /// Cluster-detail panel; the only side allowed to declare elements
    /// active
    Detail,
}

type BoolHook = Box<dyn Fn(bool) + Send + Sync>;
type UnitHook = Box<dyn Fn() + Send + Sync>;
type ClusterHook = Box<dyn Fn(i64) + Send + Sync>;

/// Callback bundle a side registers for one element.
///
/// All hooks are optional capabilities; a side only receives the
/// notifications it asked for.
#[derive(Default)]
pub struct SideHooks {
    /// Marks the authoritative side: registering forces the element
    /// active, unregistering forces it inactive
    pub can_activate: bool,
    pub set_highlighted: Option<BoolHook>,
    pub set_active: Option<BoolHook>,
    pub scroll: Option<UnitHook>,
}

struct ElementEntry {
    highlighted: bool,
    active: bool,
    /// Cluster id of this element, consulted on click
    label_id: i64,
    sides: BTreeMap<Side, SideHooks>,
}

/// Per-thread view session: the registration table plus the single
/// cluster-selection authority hook.
pub struct ThreadSession {
    elements: Vec<ElementEntry>,
    current_cluster: Option<ClusterHook>,
}

impl ThreadSession {
    /// Create the table, one entry per element, from the canonical
    /// per-element cluster ids (index = global element id).
    pub fn new(label_ids: Vec<i64>) -> Self {
        let elements = label_ids
            .into_iter()
            .map(|label_id| ElementEntry {
                highlighted: false,
                active: false,
                label_id,
                sides: BTreeMap::new(),
            })
            .collect();
        Self {
            elements,
            current_cluster: None,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Install the cluster-selection authority (the detail panel's
    /// "switch to cluster" callback). One per session.
    pub fn set_current_cluster_hook(&mut self, hook: ClusterHook) {
        self.current_cluster = Some(hook);
    }

    pub fn clear_current_cluster_hook(&mut self) {
        self.current_cluster = None;
    }

    /// Register a side for an element.
    ///
    /// An authoritative side (`can_activate`) immediately forces the
    /// element active, propagated everywhere. A passive side is
    /// instead synchronized to the element's current state right away,
    /// so a view mounting late (e.g. after a cluster switch) never
    /// shows a stale default.
    pub fn register(&mut self, element_id: usize, side: Side, hooks: SideHooks) {
        let Some(entry) = self.elements.get_mut(element_id) else {
            return;
        };
        let can_activate = hooks.can_activate;
        entry.sides.insert(side, hooks);
        if can_activate {
            self.set_active(element_id, true);
        } else {
            let entry = &self.elements[element_id];
            let hooks = &entry.sides[&side];
            if let Some(set_active) = &hooks.set_active {
                set_active(entry.active);
            }
        }
        let entry = &self.elements[element_id];
        if let Some(hooks) = entry.sides.get(&side) {
            if let Some(set_highlighted) = &hooks.set_highlighted {
                set_highlighted(entry.highlighted);
            }
        }
    }

    /// Remove a side's registration. Removing the authoritative side
    /// deactivates the element on all remaining sides.
    pub fn unregister(&mut self, element_id: usize, side: Side) {
        let Some(entry) = self.elements.get_mut(element_id) else {
            return;
        };
        let Some(removed) = entry.sides.remove(&side) else {
            return;
        };
        if removed.can_activate {
            self.set_active(element_id, false);
        }
    }

    pub fn hover(&mut self, element_id: usize) {
        self.set_highlighted(element_id, true);
    }

    pub fn un_hover(&mut self, element_id: usize) {
        self.set_highlighted(element_id, false);
    }

    pub fn is_highlighted(&self, element_id: usize) -> bool {
        self.elements
            .get(element_id)
            .map(|e| e.highlighted)
            .unwrap_or(false)
    }

    pub fn is_active(&self, element_id: usize) -> bool {
        self.elements
            .get(element_id)
            .map(|e| e.active)
            .unwrap_or(false)
    }

    /// Set the highlighted flag and notify every registered side
    pub fn set_highlighted(&mut self, element_id: usize, highlighted: bool) {
        let Some(entry) = self.elements.get_mut(element_id) else {
            return;
        };
        entry.highlighted = highlighted;
        // snapshot the side keys: a notified hook may trigger another
        // registration on this element within the same tick
        let sides = snapshot_sides(entry);
        let entry = &self.elements[element_id];
        for side in sides {
            if let Some(hooks) = entry.sides.get(&side) {
                if let Some(set_highlighted) = &hooks.set_highlighted {
                    set_highlighted(highlighted);
                }
            }
        }
    }

    /// Set the active flag and notify every registered side
    pub fn set_active(&mut self, element_id: usize, active: bool) {
        let Some(entry) = self.elements.get_mut(element_id) else {
            return;
        };
        entry.active = active;
        let sides = snapshot_sides(entry);
        let entry = &self.elements[element_id];
        for side in sides {
            if let Some(hooks) = entry.sides.get(&side) {
                if let Some(set_active) = &hooks.set_active {
                    set_active(active);
                }
            }
        }
    }

    /// Click behavior: switch the detail panel to the element's
    /// cluster (if an authority is installed) and scroll the element
    /// into view on every side except the one the click came from.
    pub fn scroll_to(&mut self, element_id: usize, origin: Side) {
        let Some(entry) = self.elements.get(element_id) else {
            return;
        };
        if let Some(current_cluster) = &self.current_cluster {
            current_cluster(entry.label_id);
        }
        let entry = &self.elements[element_id];
        let sides = snapshot_sides(entry);
        for side in sides {
            if side == origin {
                continue;
            }
            if let Some(hooks) = entry.sides.get(&side) {
                if let Some(scroll) = &hooks.scroll {
                    scroll();
                }
            }
        }
    }

    /// Drop every registration (view unmount / session teardown); no
    /// hook fires afterwards.
    pub fn release(&mut self) {
        self.current_cluster = None;
        for entry in &mut self.elements {
            entry.sides.clear();
        }
    }
}

fn snapshot_sides(entry: &ElementEntry) -> Vec<Side> {
    entry.sides.keys().copied().collect()
}
