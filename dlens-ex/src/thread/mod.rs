//! Thread annotation engine
//!
//! Everything derived client-independently from one clustered thread:
//! colors, ordered statistics, the minimap partition, frame grouping,
//! the linked selection state, and the cross-view registration table.

pub mod color;
pub mod frames;
pub mod minimap;
pub mod selection;
pub mod session;
pub mod stats;

pub use color::{cluster_color, cluster_rgb, foreground_for_hex, model_badge, ClusterColor, ModelBadge};
pub use frames::{group_frames, transpose, ClusterOrder, GroupedFrames, NO_FRAME};
pub use minimap::{build_minimap, split_bar, MinimapSegment, DEFAULT_ROW_SIZE};
pub use selection::{
    resolve_selection, Selection, SelectionAction, SelectionCandidates, SelectionKeys,
    SelectionState,
};
pub use session::{Side, SideHooks, ThreadSession};
pub use stats::{compute_statistics, document_order, Cluster, ElementMeta, ThreadStatistics};
