//! Matching the user's current position against AI-analyzed lines.
//!
//! The exact interactive-variation key wins when present. Otherwise we walk
//! backward through ancestor trunk points, closest first, and look for an AI
//! branch whose encoded sequence is a string-prefix match of the current
//! line. Walking backward matters when the trunk itself coincides with an AI
//! suggested sequence: the branch that predicted it hangs off an earlier
//! trunk move.

use baduk::{decode_moves, encode_move, encode_moves, Move, MoveTree, NodeId, Player};

use crate::types::{AiReview, MoveAnalysis, ReviewChartEntry};

/// Key into `analyzed_variations`: trunk move number, then the encoded move
/// suffix from that trunk point. Two lines reaching the same suffix from the
/// same trunk point share a key; that collision is the lookup working as
/// intended.
pub fn variation_key(tree: &MoveTree, cur: NodeId) -> String {
    let trunk = tree.branch_point(cur);
    let trunk_string = tree.move_string_to(trunk);
    let cur_string = tree.move_string_to(cur);
    format!(
        "{}-{}",
        tree.node(trunk).move_number,
        &cur_string[trunk_string.len()..]
    )
}

/// Interactive-review result for the exact current position, if any.
pub fn find_interactive<'a>(
    review: &'a AiReview,
    tree: &MoveTree,
    cur: NodeId,
) -> Option<&'a MoveAnalysis> {
    review.analyzed_variations.get(&variation_key(tree, cur))
}

/// The rest of an AI line from the current position, ready to draw as ghost
/// stones: numbered placements plus per-color encoded strings.
#[derive(Debug, Clone, PartialEq)]
pub struct GhostSequence {
    pub marks: Vec<GhostMark>,
    pub black: String,
    pub white: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostMark {
    /// Continuation number shown on the stone (variation length + 1 onward).
    pub label: u32,
    pub mv: Move,
}

impl GhostSequence {
    /// Cap the displayed continuation at `max_moves` plies. The cap splits as
    /// evenly as possible between the colors, with the side moving first
    /// taking the extra ply when the cap is odd. Caps of 10 and above mean
    /// "show everything".
    pub fn trimmed(mut self, max_moves: usize) -> Self {
        if max_moves >= 10 || self.marks.is_empty() {
            return self;
        }
        let shown = self.marks.len().min(max_moves);
        let black_first = self
            .marks
            .first()
            .map(|m| self.black.starts_with(&encode_move(m.mv)))
            .unwrap_or(false);

        let mut black_moves = shown / 2;
        let mut white_moves = shown / 2;
        if shown % 2 == 1 {
            if black_first {
                black_moves += 1;
            } else {
                white_moves += 1;
            }
        }

        self.marks.truncate(shown);
        self.black.truncate(2 * black_moves);
        self.white.truncate(2 * white_moves);
        self
    }
}

/// Find the AI line the current position is following, backtracking through
/// trunk points from the nearest. First match wins; branch order within one
/// trunk point is engine rank order.
pub fn backtrack_match(review: &AiReview, tree: &MoveTree, cur: NodeId) -> Option<GhostSequence> {
    let trunk = tree.branch_point(cur);
    let trunk_move_number = tree.node(trunk).move_number;
    let full_trunk_string = tree.move_string_to(trunk);
    let cur_string = tree.move_string_to(cur);

    for back in 0..=trunk_move_number {
        let Some(ai_move) = review.moves.get(&(trunk_move_number - back)) else {
            continue;
        };

        // Each step back drops one trunk move (two characters) off the end.
        let keep = full_trunk_string.len().saturating_sub(2 * back as usize);
        let trunk_string = &full_trunk_string[..keep];

        for branch in &ai_move.branches {
            let line = format!("{}{}", trunk_string, encode_moves(&branch.moves));
            if let Some(remaining) = line.strip_prefix(cur_string.as_str()) {
                return build_ghost(tree, cur, trunk, remaining);
            }
        }
    }

    None
}

fn build_ghost(
    tree: &MoveTree,
    cur: NodeId,
    trunk: NodeId,
    remaining: &str,
) -> Option<GhostSequence> {
    let decoded = match decode_moves(remaining) {
        Ok(moves) => moves,
        Err(e) => {
            tracing::error!(remaining, error = %e, "undecodable AI branch suffix");
            return None;
        }
    };
    if decoded.is_empty() {
        return None;
    }

    let offset = tree.distance(cur, trunk);
    let side_to_move = tree.next_player(cur);

    let mut marks = Vec::with_capacity(decoded.len());
    let mut black = String::new();
    let mut white = String::new();
    for (i, mv) in decoded.into_iter().enumerate() {
        marks.push(GhostMark {
            label: offset + i as u32 + 1,
            mv,
        });
        let mover = if i % 2 == 0 {
            side_to_move
        } else {
            side_to_move.opponent()
        };
        match mover {
            Player::Black => black.push_str(&encode_move(mv)),
            Player::White => white.push_str(&encode_move(mv)),
        }
    }

    Some(GhostSequence {
        marks,
        black,
        white,
    })
}

/// Chart datapoints for interactive results along the current line, ordered
/// root-ward first.
pub fn variation_chart_entries(
    review: &AiReview,
    tree: &MoveTree,
    cur: NodeId,
) -> Vec<ReviewChartEntry> {
    let trunk = tree.branch_point(cur);
    let trunk_string = tree.move_string_to(trunk);
    let trunk_move_number = tree.node(trunk).move_number;

    let mut entries = Vec::new();
    let mut node = cur;
    while node != trunk {
        let node_string = tree.move_string_to(node);
        let key = format!(
            "{}-{}",
            trunk_move_number,
            &node_string[trunk_string.len()..]
        );
        if let Some(analysis) = review.analyzed_variations.get(&key) {
            entries.push(ReviewChartEntry {
                move_number: analysis.move_number,
                win_rate: analysis.win_rate,
                score: analysis.score.unwrap_or(0.0),
                num_variations: analysis.branches.len(),
            });
        }
        match tree.node(node).parent {
            Some(parent) => node = parent,
            None => break,
        }
    }

    entries.reverse();
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_fixtures::bare_review;
    use crate::types::{Branch, ReviewKind};

    fn analysis_with_branches(move_number: u32, branches: Vec<Branch>) -> MoveAnalysis {
        MoveAnalysis {
            move_number,
            mv: Move::Pass,
            win_rate: 0.5,
            score: Some(0.0),
            branches,
        }
    }

    fn branch(moves: &[Move]) -> Branch {
        Branch {
            moves: moves.iter().copied().collect(),
            visits: 100,
            win_rate: 0.5,
            score: Some(0.0),
        }
    }

    /// Trunk pd dp, user variation qf qc off move 2.
    fn tree_with_variation() -> (MoveTree, NodeId) {
        let mut tree = MoveTree::new();
        let m1 = tree.play_trunk(tree.root(), Player::Black, Move::place(15, 3));
        let m2 = tree.play_trunk(m1, Player::White, Move::place(3, 15));
        let v1 = tree.play_variation(m2, Player::Black, Move::place(16, 5));
        let v2 = tree.play_variation(v1, Player::White, Move::place(16, 2));
        (tree, v2)
    }

    #[test]
    fn variation_key_is_trunk_number_plus_suffix() {
        let (tree, cur) = tree_with_variation();
        assert_eq!(variation_key(&tree, cur), "2-qfqc");
    }

    #[test]
    fn interactive_result_found_by_exact_key() {
        let (tree, cur) = tree_with_variation();
        let mut review = bare_review(ReviewKind::Full);
        review
            .analyzed_variations
            .insert("2-qfqc".to_string(), analysis_with_branches(4, vec![]));

        assert!(find_interactive(&review, &tree, cur).is_some());
        // A different suffix does not match.
        review.analyzed_variations.clear();
        review
            .analyzed_variations
            .insert("2-qfqd".to_string(), analysis_with_branches(4, vec![]));
        assert!(find_interactive(&review, &tree, cur).is_none());
    }

    #[test]
    fn prefix_match_at_nearest_trunk_point() {
        let (tree, cur) = tree_with_variation();
        let mut review = bare_review(ReviewKind::Full);
        // AI branch from move 2 continues qf qc pb; the user has played qf qc.
        review.moves.insert(
            2,
            analysis_with_branches(
                2,
                vec![branch(&[
                    Move::place(16, 5),
                    Move::place(16, 2),
                    Move::place(15, 1),
                ])],
            ),
        );

        let ghost = backtrack_match(&review, &tree, cur).unwrap();
        assert_eq!(ghost.marks.len(), 1);
        // Numbering continues after the two variation moves.
        assert_eq!(ghost.marks[0].label, 3);
        assert_eq!(ghost.marks[0].mv, Move::place(15, 1));
        // Black to move after the white qc.
        assert_eq!(ghost.black, "pb");
        assert_eq!(ghost.white, "");
    }

    #[test]
    fn backtracks_when_trunk_coincides_with_ai_line() {
        // Trunk pd dp qf; the AI predicted dp qf qc pb from move 1.
        let mut tree = MoveTree::new();
        let m1 = tree.play_trunk(tree.root(), Player::Black, Move::place(15, 3));
        let m2 = tree.play_trunk(m1, Player::White, Move::place(3, 15));
        let m3 = tree.play_trunk(m2, Player::Black, Move::place(16, 5));
        let cur = tree.play_variation(m3, Player::White, Move::place(16, 2));

        let mut review = bare_review(ReviewKind::Full);
        review.moves.insert(
            1,
            analysis_with_branches(
                1,
                vec![branch(&[
                    Move::place(3, 15),
                    Move::place(16, 5),
                    Move::place(16, 2),
                    Move::place(15, 1),
                ])],
            ),
        );

        let ghost = backtrack_match(&review, &tree, cur).unwrap();
        assert_eq!(ghost.marks.len(), 1);
        assert_eq!(ghost.marks[0].mv, Move::place(15, 1));
        assert_eq!(ghost.marks[0].label, 2);
    }

    #[test]
    fn closer_trunk_points_win() {
        let (tree, cur) = tree_with_variation();
        let mut review = bare_review(ReviewKind::Full);
        // Both move 2 and move 1 have matching branches; move 2 is closer.
        review.moves.insert(
            2,
            analysis_with_branches(
                2,
                vec![branch(&[
                    Move::place(16, 5),
                    Move::place(16, 2),
                    Move::place(9, 9),
                ])],
            ),
        );
        review.moves.insert(
            1,
            analysis_with_branches(
                1,
                vec![branch(&[
                    Move::place(3, 15),
                    Move::place(16, 5),
                    Move::place(16, 2),
                    Move::place(0, 0),
                ])],
            ),
        );

        let ghost = backtrack_match(&review, &tree, cur).unwrap();
        assert_eq!(ghost.marks[0].mv, Move::place(9, 9));
    }

    #[test]
    fn matching_is_deterministic() {
        let (tree, cur) = tree_with_variation();
        let mut review = bare_review(ReviewKind::Full);
        review.moves.insert(
            2,
            analysis_with_branches(
                2,
                vec![
                    branch(&[Move::place(16, 5), Move::place(16, 2), Move::place(9, 9)]),
                    branch(&[Move::place(16, 5), Move::place(16, 2), Move::place(8, 8)]),
                ],
            ),
        );

        let first = backtrack_match(&review, &tree, cur).unwrap();
        let second = backtrack_match(&review, &tree, cur).unwrap();
        assert_eq!(first, second);
        // List order reflects engine rank; the first matching branch wins.
        assert_eq!(first.marks[0].mv, Move::place(9, 9));
    }

    #[test]
    fn no_match_returns_none() {
        let (tree, cur) = tree_with_variation();
        let review = bare_review(ReviewKind::Full);
        assert!(backtrack_match(&review, &tree, cur).is_none());
    }

    #[test]
    fn ghost_trim_splits_evenly_with_extra_for_first_mover() {
        let marks: Vec<GhostMark> = [
            Move::place(0, 0),
            Move::place(1, 1),
            Move::place(2, 2),
            Move::place(3, 3),
            Move::place(4, 4),
        ]
        .iter()
        .enumerate()
        .map(|(i, mv)| GhostMark {
            label: i as u32 + 1,
            mv: *mv,
        })
        .collect();
        // Black moves first: aa cc ee, white: bb dd.
        let ghost = GhostSequence {
            marks,
            black: "aaccee".to_string(),
            white: "bbdd".to_string(),
        };

        let trimmed = ghost.trimmed(3);
        assert_eq!(trimmed.marks.len(), 3);
        // Odd cap: the first mover (black) gets the extra ply.
        assert_eq!(trimmed.black, "aacc");
        assert_eq!(trimmed.white, "bb");
    }

    #[test]
    fn ghost_trim_noop_at_ten_or_more() {
        let ghost = GhostSequence {
            marks: vec![GhostMark {
                label: 1,
                mv: Move::place(0, 0),
            }],
            black: "aa".to_string(),
            white: String::new(),
        };
        let trimmed = ghost.clone().trimmed(10);
        assert_eq!(trimmed, ghost);
    }

    #[test]
    fn chart_entries_follow_current_line_in_order() {
        let (tree, cur) = tree_with_variation();
        let mut review = bare_review(ReviewKind::Full);
        review
            .analyzed_variations
            .insert("2-qf".to_string(), analysis_with_branches(3, vec![]));
        review
            .analyzed_variations
            .insert("2-qfqc".to_string(), analysis_with_branches(4, vec![]));

        let entries = variation_chart_entries(&review, &tree, cur);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].move_number, 3);
        assert_eq!(entries[1].move_number, 4);
    }
}
