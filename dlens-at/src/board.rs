//! Ranking board list operations
//!
//! One board per example: the pool of not-yet-ranked phrase keys and
//! the ordered ranking. A drag moves exactly one key between (or
//! within) the two lists by splice: remove at the source index, insert
//! at the destination index against the already-shortened list.
//!
//! The consistency checks mirror the annotation backend exactly,
//! including its reason strings, so a move the board accepts is never
//! rejected remotely for a reason the client cannot display.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use dlens_common::types::UpdateRanking;
use dlens_common::Error;

/// Reason strings shared with the annotation backend (their spelling)
pub const DUPLICATE_KEYS: &str = "DUPLICATE KEYS";
pub const KEYS_MISMATCH: &str = "KEYS MISSMATCH";
pub const RANKING_MISMATCH: &str = "RANKING MISSMATCH";

/// The two droppable lists of a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Unranked,
    Ranking,
}

/// Source or destination of one drag
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DragPosition {
    pub id: Slot,
    pub index: usize,
}

/// Per-example ranking state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingBoard {
    pub unranked: Vec<String>,
    pub ranking: Vec<String>,
}

impl RankingBoard {
    /// Initial board for an example: every hypothesis key that is not
    /// already ranked goes into the pool. The pool is sorted for a
    /// stable wire shape; presentation order is the client's business.
    pub fn derive(keys: impl IntoIterator<Item = String>, ranking: &[String]) -> Self {
        let mut unranked: Vec<String> = keys
            .into_iter()
            .filter(|key| !ranking.contains(key))
            .collect();
        unranked.sort();
        Self {
            unranked,
            ranking: ranking.to_vec(),
        }
    }

    fn list(&self, slot: Slot) -> &Vec<String> {
        match slot {
            Slot::Unranked => &self.unranked,
            Slot::Ranking => &self.ranking,
        }
    }

    fn list_mut(&mut self, slot: Slot) -> &mut Vec<String> {
        match slot {
            Slot::Unranked => &mut self.unranked,
            Slot::Ranking => &mut self.ranking,
        }
    }

    /// Apply one drag and return the before/after payload for the
    /// backend. The board is only modified when the move is valid.
    pub fn move_item(
        &mut self,
        source: DragPosition,
        destination: DragPosition,
    ) -> Result<UpdateRanking, Error> {
        if source.index >= self.list(source.id).len() {
            return Err(Error::InvalidInput(format!(
                "source index {} out of bounds",
                source.index
            )));
        }
        let limit = if source.id == destination.id {
            // within one list the element is removed first, so the
            // last valid insertion point is the shortened length
            self.list(destination.id).len() - 1
        } else {
            self.list(destination.id).len()
        };
        if destination.index > limit {
            return Err(Error::InvalidInput(format!(
                "destination index {} out of bounds",
                destination.index
            )));
        }

        let previous_unranked = self.unranked.clone();
        let previous_ranking = self.ranking.clone();

        let element = self.list_mut(source.id).remove(source.index);
        self.list_mut(destination.id)
            .insert(destination.index, element);

        Ok(UpdateRanking {
            previous_unranked,
            previous_ranking,
            next_unranked: self.unranked.clone(),
            next_ranking: self.ranking.clone(),
        })
    }
}

fn is_duplicate_free(keys: &[&String]) -> bool {
    let set: BTreeSet<&String> = keys.iter().copied().collect();
    set.len() == keys.len()
}

/// Check one board state against the full key set, and optionally
/// against the ranking the server currently holds. Returns the
/// backend's reason string for the first violated rule.
pub fn state_inconsistency(
    unranked: &[String],
    ranking: &[String],
    all_keys: &BTreeSet<String>,
    current_ranking: Option<&[String]>,
) -> Option<&'static str> {
    let combined: Vec<&String> = unranked.iter().chain(ranking.iter()).collect();
    if !is_duplicate_free(&combined) {
        return Some(DUPLICATE_KEYS);
    }
    let combined_set: BTreeSet<String> = combined.into_iter().cloned().collect();
    if combined_set != *all_keys {
        return Some(KEYS_MISMATCH);
    }
    if let Some(current) = current_ranking {
        if current != ranking {
            return Some(RANKING_MISMATCH);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn board() -> RankingBoard {
        RankingBoard {
            unranked: keys(&["a", "b", "c"]),
            ranking: keys(&["d", "e"]),
        }
    }

    fn at(slot: Slot, index: usize) -> DragPosition {
        DragPosition { id: slot, index }
    }

    #[test]
    fn test_derive_excludes_ranked_keys() {
        let ranking = keys(&["c", "a"]);
        let board = RankingBoard::derive(keys(&["d", "b", "a", "c"]), &ranking);
        assert_eq!(board.unranked, keys(&["b", "d"]));
        assert_eq!(board.ranking, keys(&["c", "a"]));
    }

    #[test]
    fn test_move_across_lists() {
        let mut board = board();
        let update = board
            .move_item(at(Slot::Unranked, 1), at(Slot::Ranking, 0))
            .unwrap();
        assert_eq!(board.unranked, keys(&["a", "c"]));
        assert_eq!(board.ranking, keys(&["b", "d", "e"]));
        assert_eq!(update.previous_unranked, keys(&["a", "b", "c"]));
        assert_eq!(update.previous_ranking, keys(&["d", "e"]));
        assert_eq!(update.next_unranked, keys(&["a", "c"]));
        assert_eq!(update.next_ranking, keys(&["b", "d", "e"]));
    }

    #[test]
    fn test_move_within_list() {
        let mut board = board();
        board
            .move_item(at(Slot::Ranking, 1), at(Slot::Ranking, 0))
            .unwrap();
        assert_eq!(board.ranking, keys(&["e", "d"]));
        // appending to the end of the same list
        board
            .move_item(at(Slot::Ranking, 0), at(Slot::Ranking, 1))
            .unwrap();
        assert_eq!(board.ranking, keys(&["d", "e"]));
    }

    #[test]
    fn test_move_rejects_out_of_bounds() {
        let mut board = board();
        assert!(board
            .move_item(at(Slot::Unranked, 3), at(Slot::Ranking, 0))
            .is_err());
        assert!(board
            .move_item(at(Slot::Unranked, 0), at(Slot::Ranking, 3))
            .is_err());
        // within-list insertion point past the shortened length
        assert!(board
            .move_item(at(Slot::Ranking, 0), at(Slot::Ranking, 2))
            .is_err());
        // the board is untouched after a rejected move
        assert_eq!(board, self::board());
    }

    #[test]
    fn test_consistent_state_passes() {
        let all: BTreeSet<String> = keys(&["a", "b", "c", "d", "e"]).into_iter().collect();
        let b = board();
        assert_eq!(
            state_inconsistency(&b.unranked, &b.ranking, &all, Some(&b.ranking)),
            None
        );
    }

    #[test]
    fn test_duplicate_keys_detected() {
        let all: BTreeSet<String> = keys(&["a", "b"]).into_iter().collect();
        assert_eq!(
            state_inconsistency(&keys(&["a", "b"]), &keys(&["a"]), &all, None),
            Some(DUPLICATE_KEYS)
        );
    }

    #[test]
    fn test_key_set_mismatch_detected() {
        let all: BTreeSet<String> = keys(&["a", "b", "c"]).into_iter().collect();
        assert_eq!(
            state_inconsistency(&keys(&["a"]), &keys(&["b"]), &all, None),
            Some(KEYS_MISMATCH)
        );
    }

    #[test]
    fn test_stale_ranking_detected() {
        let all: BTreeSet<String> = keys(&["a", "b"]).into_iter().collect();
        let current = keys(&["b"]);
        assert_eq!(
            state_inconsistency(&keys(&["a"]), &keys(&["b"]), &all, Some(&current)),
            None
        );
        let stale = keys(&["a"]);
        assert_eq!(
            state_inconsistency(&keys(&["a"]), &keys(&["b"]), &all, Some(&stale)),
            Some(RANKING_MISMATCH)
        );
    }
}
