//! Derived thread statistics
//!
//! Walks the discussion in document order (root post first, then a
//! depth-first pre-order pass over the comments) and derives
//! everything the views consume: globally numbered elements, cluster
//! buckets, the minimap partition, and the initial cluster.
//!
//! The global element id sequence produced here is the canonical
//! ordering. The minimap and the scatter view index into it, so every
//! builder in this module traverses elements in exactly this order.

use std::collections::BTreeMap;

use serde::Serialize;

use dlens_common::types::{ClusterValue, Comment, ThreadData};
use dlens_common::Error;

use super::color::{cluster_color, cluster_rgb, ClusterColor};
use super::minimap::{build_minimap, MinimapSegment};

/// One sentence element with all derived fields attached
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementMeta {
    /// Global sequential id in document order
    pub id: usize,
    /// Name of the containing node
    pub node: String,
    pub text: Vec<String>,
    pub cluster: ClusterValue,
    /// Copy of `cluster.true_value`
    pub label_id: i64,
    pub color: ClusterColor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

/// A real (non-negative id) cluster with its members in document order
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: i64,
    pub elements: Vec<ElementMeta>,
    /// Solid fill color for the cluster list
    pub color: String,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.elements.len()
    }
}

/// Everything derived once per thread
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadStatistics {
    /// Real clusters, ascending by id
    pub clusters: Vec<Cluster>,
    /// All elements in document order; `points[i].id == i`
    pub points: Vec<ElementMeta>,
    pub minimap: Vec<MinimapSegment>,
    /// First clustered element's cluster id, used as the default
    /// cluster selection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_cluster: Option<i64>,
}

/// Node names in document order: root first, then comments in
/// depth-first pre-order (parent before children, siblings in given
/// order).
pub fn document_order(root: &Comment) -> Vec<String> {
    let mut ids = vec![root.name.clone()];
    collect_comment_names(&root.comments, &mut ids);
    ids
}

fn collect_comment_names(comments: &[Comment], ids: &mut Vec<String>) {
    for comment in comments {
        ids.push(comment.name.clone());
        collect_comment_names(&comment.comments, ids);
    }
}

/// Compute all derived statistics for a thread.
///
/// Fails with `Error::InvalidInput` when the clustering result is
/// missing a node that appears in the tree; the caller surfaces that
/// like any other fetch error instead of crashing the view.
pub fn compute_statistics(thread: &ThreadData) -> Result<ThreadStatistics, Error> {
    let ordered_ids = document_order(&thread.root);

    let mut points: Vec<ElementMeta> = Vec::new();
    let mut buckets: BTreeMap<i64, Vec<ElementMeta>> = BTreeMap::new();

    for node_name in &ordered_ids {
        let elements = thread.result.get(node_name).ok_or_else(|| {
            Error::InvalidInput(format!("clustering result is missing node {node_name}"))
        })?;
        for element in elements {
            let label_id = element.cluster.true_value;
            let meta = ElementMeta {
                id: points.len(),
                node: node_name.clone(),
                text: element.text.clone(),
                cluster: element.cluster,
                label_id,
                color: cluster_color(&element.cluster),
                x: element.x,
                y: element.y,
            };
            buckets.entry(label_id).or_default().push(meta.clone());
            points.push(meta);
        }
    }

    // Unclustered and noise buckets are rendered but are not clusters
    let clusters: Vec<Cluster> = buckets
        .into_iter()
        .filter(|(id, _)| *id >= 0)
        .map(|(id, elements)| Cluster {
            id,
            elements,
            color: cluster_rgb(id).css(),
        })
        .collect();

    let initial_cluster = points
        .iter()
        .find(|p| p.cluster.true_value >= 0)
        .map(|p| p.cluster.true_value);

    let minimap = build_minimap(&points);

    Ok(ThreadStatistics {
        clusters,
        points,
        minimap,
        initial_cluster,
    })
}
