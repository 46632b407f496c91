//! Minimap segments
//!
//! The minimap draws the whole discussion as a wrapped proportional
//! strip: one segment per element, laid out over fixed-width rows.
//! Segments form a gapless running partition of the total token
//! count in document order.

use serde::Serialize;

use super::stats::ElementMeta;

/// Default row width of the wrapped strip, in token units
pub const DEFAULT_ROW_SIZE: usize = 100;

/// One minimap segment covering a single element
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimapSegment {
    /// Cumulative token count of all prior elements in document order
    pub offset: usize,
    /// Token count of this element
    pub length: usize,
    /// Global element id
    pub id: usize,
    pub label_id: i64,
    /// Neutral background variant of the element's cluster color
    pub color: String,
    /// Pre-noise-collapse cluster assignment
    pub cluster: i64,
}

/// Build the gapless segment list over the canonical element order
pub fn build_minimap(points: &[ElementMeta]) -> Vec<MinimapSegment> {
    let mut minimap = Vec::with_capacity(points.len());
    let mut offset = 0;
    for point in points {
        let length = point.text.len();
        minimap.push(MinimapSegment {
            offset,
            length,
            id: point.id,
            label_id: point.label_id,
            color: point.color.bg_neutral.clone(),
            cluster: point.cluster.value,
        });
        offset += length;
    }
    minimap
}

/// Split one segment across fixed-width rows.
///
/// Returns the ordered sub-lengths `[first, middle…, last]` where the
/// first chunk fills the current row up to its boundary, followed by
/// as many full rows as fit, followed by the remainder. The chunks
/// always sum to `length`; wrap boundaries must be exact because every
/// off-by-one is a visible rendering artifact.
pub fn split_bar(offset: usize, length: usize, row_size: usize) -> Vec<usize> {
    assert!(row_size > 0, "row_size must be positive");
    let mut splits = Vec::new();
    let mut remaining = length;
    if remaining == 0 {
        return splits;
    }
    let first = (row_size - offset % row_size).min(remaining);
    splits.push(first);
    remaining -= first;
    if remaining == 0 {
        return splits;
    }
    let num_middle = remaining / row_size;
    splits.extend(std::iter::repeat(row_size).take(num_middle));
    remaining -= num_middle * row_size;
    if remaining == 0 {
        return splits;
    }
    splits.push(remaining);
    splits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_bar_example() {
        assert_eq!(split_bar(95, 150, 100), vec![5, 100, 45]);
    }

    #[test]
    fn test_split_bar_fits_in_current_row() {
        assert_eq!(split_bar(10, 30, 100), vec![30]);
        assert_eq!(split_bar(0, 100, 100), vec![100]);
    }

    #[test]
    fn test_split_bar_boundary_cases() {
        // starting exactly on a row boundary
        assert_eq!(split_bar(100, 250, 100), vec![100, 100, 50]);
        // ending exactly on a row boundary
        assert_eq!(split_bar(95, 105, 100), vec![5, 100]);
        // zero length
        assert_eq!(split_bar(42, 0, 100), Vec::<usize>::new());
    }

    #[test]
    fn test_split_bar_sums_to_length() {
        for offset in 0..250 {
            for length in 0..300 {
                for row_size in [1, 7, 100] {
                    let splits = split_bar(offset, length, row_size);
                    assert_eq!(
                        splits.iter().sum::<usize>(),
                        length,
                        "offset={offset} length={length} row_size={row_size}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_split_bar_chunks_respect_row_size() {
        let splits = split_bar(33, 500, 100);
        assert_eq!(splits[0], 67);
        for chunk in &splits {
            assert!(*chunk <= 100);
        }
    }
}
