//! Media-frame grouping
//!
//! Orders the cluster list for the summary panel. Without frame data,
//! clusters are ordered by descending size (ties broken by ascending
//! id). With frame data, clusters are grouped under their primary
//! (first-ranked) frame label; groups sort alphabetically with the
//! synthetic "no frame" group always last, and members inside each
//! group use the same size/id rule.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::stats::Cluster;

/// Label of the synthetic group holding clusters without any frame
pub const NO_FRAME: &str = "no frame";

/// Cluster ordering for the summary panel
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ClusterOrder {
    /// No frame data: a flat ordered list of cluster ids
    Flat(Vec<i64>),
    /// Frame data present: ordered `(group label, cluster ids)` pairs
    Grouped(Vec<(String, Vec<i64>)>),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupedFrames {
    pub order: ClusterOrder,
    pub has_frames: bool,
}

fn cluster_size(id: i64, sizes: &HashMap<i64, usize>) -> usize {
    sizes.get(&id).copied().unwrap_or(0)
}

/// Descending size, then ascending id
fn compare_clusters(a: i64, b: i64, sizes: &HashMap<i64, usize>) -> std::cmp::Ordering {
    cluster_size(b, sizes)
        .cmp(&cluster_size(a, sizes))
        .then(a.cmp(&b))
}

/// Group and order clusters for display.
///
/// `frames` maps a cluster id (stringified, as on the wire) to its
/// ranked frame labels; `None` means no frame model output exists and
/// the clusters are ordered flat.
pub fn group_frames(
    frames: Option<&HashMap<String, Vec<String>>>,
    clusters: &[Cluster],
) -> GroupedFrames {
    let sizes: HashMap<i64, usize> = clusters.iter().map(|c| (c.id, c.size())).collect();

    let Some(frames) = frames else {
        let mut order: Vec<i64> = clusters.iter().map(|c| c.id).collect();
        order.sort_by(|a, b| compare_clusters(*a, *b, &sizes));
        return GroupedFrames {
            order: ClusterOrder::Flat(order),
            has_frames: false,
        };
    };

    // BTreeMap keys iterate sorted, which is the group ordering;
    // the synthetic group is appended last regardless.
    let mut groups: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    let mut no_frame: Vec<i64> = Vec::new();
    let mut cluster_ids: Vec<i64> = frames
        .keys()
        .filter_map(|k| k.parse::<i64>().ok())
        .collect();
    cluster_ids.sort_unstable();
    for cluster_id in cluster_ids {
        let frame_labels = &frames[&cluster_id.to_string()];
        match frame_labels.first() {
            Some(primary) => groups.entry(primary.clone()).or_default().push(cluster_id),
            None => no_frame.push(cluster_id),
        }
    }

    let mut order: Vec<(String, Vec<i64>)> = groups.into_iter().collect();
    if !no_frame.is_empty() {
        order.push((NO_FRAME.to_string(), no_frame));
    }
    for (_, members) in &mut order {
        members.sort_by(|a, b| compare_clusters(*a, *b, &sizes));
    }

    GroupedFrames {
        order: ClusterOrder::Grouped(order),
        has_frames: true,
    }
}

/// Swap the outer two levels of a nested string-keyed mapping.
///
/// Used to attach per-model metadata (`meta.frames[model][key]` ->
/// `[key][model]`) without auto-vivifying map proxies.
pub fn transpose<V: Clone>(
    map: &HashMap<String, HashMap<String, V>>,
) -> HashMap<String, HashMap<String, V>> {
    let mut transposed: HashMap<String, HashMap<String, V>> = HashMap::new();
    for (key, inner) in map {
        for (sub_key, value) in inner {
            transposed
                .entry(sub_key.clone())
                .or_default()
                .insert(key.clone(), value.clone());
        }
    }
    transposed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::color::cluster_rgb;
    use crate::thread::stats::tests::element;
    use crate::thread::stats::ElementMeta;
    use dlens_common::types::SentenceElement;

    fn meta(id: usize, cluster: i64) -> ElementMeta {
        let SentenceElement { text, cluster, x, y } = element(cluster, &["w"]);
        ElementMeta {
            id,
            node: "t3_root".to_string(),
            text,
            label_id: cluster.true_value,
            color: crate::thread::color::cluster_color(&cluster),
            cluster,
            x,
            y,
        }
    }

    fn cluster(id: i64, size: usize) -> Cluster {
        Cluster {
            id,
            elements: (0..size).map(|i| meta(i, id)).collect(),
            color: cluster_rgb(id).css(),
        }
    }

    fn frame_map(entries: &[(i64, &[&str])]) -> HashMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(id, labels)| {
                (
                    id.to_string(),
                    labels.iter().map(|l| l.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_flat_order_by_descending_size_then_ascending_id() {
        let clusters = vec![cluster(0, 2), cluster(1, 5), cluster(2, 5), cluster(3, 7)];
        let grouped = group_frames(None, &clusters);
        assert!(!grouped.has_frames);
        assert_eq!(grouped.order, ClusterOrder::Flat(vec![3, 1, 2, 0]));
    }

    #[test]
    fn test_grouped_by_primary_frame() {
        let clusters = vec![cluster(0, 5), cluster(1, 2), cluster(2, 5)];
        let frames = frame_map(&[(0, &["econ"]), (1, &["econ"]), (2, &[])]);
        let grouped = group_frames(Some(&frames), &clusters);
        assert!(grouped.has_frames);
        assert_eq!(
            grouped.order,
            ClusterOrder::Grouped(vec![
                ("econ".to_string(), vec![0, 1]),
                (NO_FRAME.to_string(), vec![2]),
            ])
        );
    }

    #[test]
    fn test_groups_sort_alphabetically_no_frame_last() {
        let clusters = vec![cluster(0, 1), cluster(1, 9), cluster(2, 4), cluster(3, 4)];
        let frames = frame_map(&[
            (0, &["zeitgeist", "econ"]),
            (1, &["aesthetics"]),
            (2, &[]),
            (3, &["aesthetics", "zeitgeist"]),
        ]);
        let grouped = group_frames(Some(&frames), &clusters);
        // only the first (primary) frame label counts for grouping;
        // "no frame" trails even though "zeitgeist" sorts after it
        assert_eq!(
            grouped.order,
            ClusterOrder::Grouped(vec![
                ("aesthetics".to_string(), vec![1, 3]),
                ("zeitgeist".to_string(), vec![0]),
                (NO_FRAME.to_string(), vec![2]),
            ])
        );
    }

    #[test]
    fn test_group_members_sort_by_size_then_id() {
        let clusters = vec![cluster(0, 2), cluster(1, 8), cluster(2, 2), cluster(3, 8)];
        let frames = frame_map(&[(0, &["econ"]), (1, &["econ"]), (2, &["econ"]), (3, &["econ"])]);
        let grouped = group_frames(Some(&frames), &clusters);
        assert_eq!(
            grouped.order,
            ClusterOrder::Grouped(vec![("econ".to_string(), vec![1, 3, 0, 2])])
        );
    }

    #[test]
    fn test_empty_cluster_list_flat() {
        let grouped = group_frames(None, &[]);
        assert_eq!(grouped.order, ClusterOrder::Flat(vec![]));
    }

    #[test]
    fn test_transpose_swaps_outer_levels() {
        let mut map = HashMap::new();
        map.insert("GPT-4".to_string(), {
            let mut inner = HashMap::new();
            inner.insert("temperature".to_string(), 0.25);
            inner.insert("topP".to_string(), 1.0);
            inner
        });
        let transposed = transpose(&map);
        assert_eq!(transposed["temperature"]["GPT-4"], 0.25);
        assert_eq!(transposed["topP"]["GPT-4"], 1.0);
    }
}
