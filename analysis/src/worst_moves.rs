//! Ranking trunk moves by how many points (or percentage points of win rate)
//! the mover gave away, for the "key moves" list under the chart.

use baduk::{Move, MoveTree, Player};

use crate::types::AiReview;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorstMoveEntry {
    pub player: Player,
    pub move_number: u32,
    pub mv: Move,
    /// Loss from the mover's perspective: points when the review carries
    /// scores, win-rate percentage points otherwise.
    pub delta: f64,
}

/// Every trunk move ranked worst-first, capped at `max_count`.
pub fn worst_moves(tree: &MoveTree, review: &AiReview, max_count: usize) -> Vec<WorstMoveEntry> {
    let mut entries = Vec::new();
    let scores = review.scores.as_deref().filter(|s| !s.is_empty());

    let mut cur = tree.node(tree.root()).trunk_next;
    while let Some(id) = cur {
        let node = tree.node(id);
        cur = node.trunk_next;

        let (Some(player), Some(mv)) = (node.player, node.mv) else {
            continue;
        };
        let move_number = node.move_number;
        let before = move_number as usize - 1;
        let after = move_number as usize;

        // Positive for black when black's position improved.
        let swing = match scores {
            Some(scores) => {
                let (Some(b), Some(a)) = (scores.get(before), scores.get(after)) else {
                    continue;
                };
                a - b
            }
            None => {
                100.0 * (review.win_rate_at(move_number) - review.win_rate_at(move_number - 1))
            }
        };
        let delta = match player {
            Player::Black => -swing,
            Player::White => swing,
        };
        entries.push(WorstMoveEntry {
            player,
            move_number,
            mv,
            delta,
        });
    }

    entries.sort_by(|a, b| b.delta.total_cmp(&a.delta));
    entries.truncate(max_count);
    entries
}

/// The three worst moves per player, in game order.
pub fn key_moves(tree: &MoveTree, review: &AiReview) -> Vec<WorstMoveEntry> {
    let mut black = 0;
    let mut white = 0;
    let mut list: Vec<WorstMoveEntry> = worst_moves(tree, review, 100)
        .into_iter()
        .filter(|entry| match entry.player {
            Player::Black => {
                black += 1;
                black <= 3
            }
            Player::White => {
                white += 1;
                white <= 3
            }
        })
        .collect();
    list.sort_by_key(|entry| entry.move_number);
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_fixtures::bare_review;
    use crate::types::ReviewKind;

    fn tree_with_trunk(count: u32) -> MoveTree {
        let mut tree = MoveTree::new();
        let mut cur = tree.root();
        for i in 0..count {
            let player = if i % 2 == 0 {
                Player::Black
            } else {
                Player::White
            };
            cur = tree.play_trunk(cur, player, Move::place(i as u8, i as u8));
        }
        tree
    }

    #[test]
    fn ranks_by_score_loss_when_scores_present() {
        let tree = tree_with_trunk(4);
        let mut review = bare_review(ReviewKind::Full);
        // Black plays moves 1 and 3, white moves 2 and 4. Scores are
        // black-positive, so move 2 hands white a 4 point loss and move 3
        // costs black 3 points.
        review.scores = Some(vec![0.0, 1.0, 5.0, 2.0, 2.5]);

        let list = worst_moves(&tree, &review, 100);
        assert_eq!(list.len(), 4);
        assert_eq!(list[0].move_number, 2);
        assert_eq!(list[0].player, Player::White);
        assert_eq!(list[0].delta, 4.0);
        assert_eq!(list[1].move_number, 3);
        assert_eq!(list[1].player, Player::Black);
        assert_eq!(list[1].delta, 3.0);
        // Black's opening gained a point, so it sorts last with a
        // negative delta.
        assert_eq!(list[3].delta, -1.0);
    }

    #[test]
    fn falls_back_to_win_rates() {
        let tree = tree_with_trunk(2);
        let mut review = bare_review(ReviewKind::Fast);
        review.win_rates = vec![Some(0.5), Some(0.3), Some(0.6)];

        let list = worst_moves(&tree, &review, 100);
        // Move 2 (white): black's rate rose 0.3 -> 0.6, 30 points lost.
        assert_eq!(list[0].move_number, 2);
        assert!((list[0].delta - 30.0).abs() < 1e-9);
        // Move 1 (black): 0.5 -> 0.3, 20 points lost.
        assert_eq!(list[1].move_number, 1);
        assert!((list[1].delta - 20.0).abs() < 1e-9);
    }

    #[test]
    fn key_moves_keeps_three_per_player_in_game_order() {
        let tree = tree_with_trunk(10);
        let mut review = bare_review(ReviewKind::Full);
        // Alternating big losses so both players accumulate entries.
        review.scores = Some(vec![
            0.0, -1.0, 4.0, 1.0, 7.0, 2.0, 8.0, 5.0, 9.0, 6.0, 10.0,
        ]);

        let list = key_moves(&tree, &review);
        let blacks = list.iter().filter(|e| e.player == Player::Black).count();
        let whites = list.iter().filter(|e| e.player == Player::White).count();
        assert!(blacks <= 3);
        assert!(whites <= 3);
        assert!(list.windows(2).all(|w| w[0].move_number < w[1].move_number));
    }

    #[test]
    fn cap_limits_entries() {
        let tree = tree_with_trunk(10);
        let mut review = bare_review(ReviewKind::Fast);
        review.win_rates = (0..=10).map(|i| Some(0.5 + 0.01 * i as f64)).collect();
        assert_eq!(worst_moves(&tree, &review, 4).len(), 4);
    }
}
