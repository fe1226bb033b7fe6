//! Translating a matched AI line into visual primitives: heatmap cells,
//! subscript delta labels, colored circles, move marks and ghost stones.
//! The renderer consumes [`BoardAnnotations`] verbatim; everything here is a
//! pure projection of review data at the current position.

use baduk::{Board, Coord, Move, MoveTree, NodeId, Player};
use smallvec::smallvec;

use crate::matcher::{backtrack_match, variation_key, GhostSequence};
use crate::types::{AiReview, Branch};

/// How many top-ranked branches are shown on the board.
const SHOWN_BRANCHES: usize = 6;

/// Everything the board widget needs to draw the review overlay.
#[derive(Debug, Clone, Default)]
pub struct BoardAnnotations {
    /// Per-intersection intensity (visits / strength), row-major.
    pub heatmap: Option<Vec<Vec<f64>>>,
    /// Subscript delta labels for well-explored branches.
    pub labels: Vec<(Coord, String)>,
    pub marks: Vec<(Coord, MarkKind)>,
    pub circles: Vec<BranchCircle>,
    /// Remaining AI sequence to draw as ghost stones, already trimmed.
    pub ghost: Option<GhostSequence>,
    pub win_rate: f64,
    pub score: f64,
    /// Win-rate swing of the played move, positive favoring the side to move.
    pub next_move_delta_win_rate: Option<f64>,
    pub next_move_pretty: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkKind {
    /// The engine's preferred move.
    BlueMove,
    /// The move actually played.
    SubTriangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircleKind {
    /// Played move that is also the engine's top choice.
    PlayedTopChoice,
    /// Played move, ranked lower.
    Played,
    /// Unplayed top choice.
    TopChoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchCircle {
    pub coord: Coord,
    pub kind: CircleKind,
}

pub struct AnnotateContext<'a> {
    pub review: &'a AiReview,
    pub tree: &'a MoveTree,
    pub cur: NodeId,
    pub board: &'a Board,
    /// Show score deltas instead of win-rate deltas.
    pub use_score: bool,
    /// Ghost-sequence ply cap from user preferences.
    pub variation_move_count: usize,
}

pub struct AnnotateOutcome {
    pub annotations: BoardAnnotations,
    /// Set when the current position is an unanalyzed variation; the caller
    /// decides whether the user may request on-demand analysis.
    pub needs_variation_analysis: bool,
}

pub fn annotate(ctx: &AnnotateContext<'_>) -> AnnotateOutcome {
    let AnnotateContext {
        review, tree, cur, ..
    } = *ctx;

    let cur_node = tree.node(cur);
    let trunk = tree.branch_point(cur);
    let move_number = tree.node(trunk).move_number;

    let var_key = variation_key(tree, cur);
    let have_variation_results = review.analyzed_variations.contains_key(&var_key);

    let (ai_review_move, next_ai_review_move) = if have_variation_results {
        (review.analyzed_variations.get(&var_key), None)
    } else {
        (
            review.moves.get(&move_number),
            review.moves.get(&(move_number + 1)),
        )
    };

    let empty = Vec::new();
    let scores = review.scores.as_ref().unwrap_or(&empty);

    let (win_rate, score) = match ai_review_move {
        Some(analysis) => (analysis.win_rate, analysis.score.unwrap_or(0.0)),
        None => {
            let win_rate = review.win_rate_at(move_number);
            let mut score = scores.get(move_number as usize).copied();
            if score.is_none() {
                // Current move past the end of the score array: reuse the
                // last meaningful score instead of dropping to zero.
                let upto = scores.len().min(move_number as usize + 1);
                score = scores[..upto].iter().rev().copied().find(|s| *s != 0.0);
            }
            (win_rate, score.unwrap_or(0.0))
        }
    };

    let (next_win_rate, next_score) = match next_ai_review_move {
        Some(analysis) => (analysis.win_rate, analysis.score),
        None => (
            review
                .win_rates
                .get(move_number as usize + 1)
                .copied()
                .flatten()
                .unwrap_or(win_rate),
            scores
                .get(move_number as usize + 1)
                .copied()
                .or(Some(score)),
        ),
    };

    let mut annotations = BoardAnnotations {
        win_rate,
        score,
        ..Default::default()
    };
    let mut needs_variation_analysis = false;

    if let (true, Some(analysis)) = (cur_node.trunk || have_variation_results, ai_review_move) {
        annotate_branches(ctx, analysis, next_win_rate, next_score, &mut annotations);
    } else {
        // Not a reviewed trunk position: maybe the AI played this line out.
        needs_variation_analysis = !cur_node.trunk;
        annotations.ghost =
            backtrack_match(review, tree, cur).map(|g| g.trimmed(ctx.variation_move_count));
    }

    if next_win_rate >= 0.0 {
        let mut delta = next_win_rate - win_rate;
        if tree.next_player(cur) == Player::White {
            delta = -delta;
        }
        annotations.next_move_delta_win_rate = Some(delta);
    }

    if let Some(next_id) = cur_node.trunk_next {
        annotations.next_move_pretty = Some(match tree.node(next_id).mv {
            Some(Move::Place(coord)) => coord.pretty(ctx.board.height()),
            _ => "pass".to_string(),
        });
    }

    AnnotateOutcome {
        annotations,
        needs_variation_analysis,
    }
}

fn annotate_branches(
    ctx: &AnnotateContext<'_>,
    analysis: &crate::types::MoveAnalysis,
    next_win_rate: f64,
    next_score: Option<f64>,
    out: &mut BoardAnnotations,
) {
    let tree = ctx.tree;
    let board = ctx.board;
    let next_move = tree
        .node(ctx.cur)
        .trunk_next
        .and_then(|id| tree.node(id).mv);

    let mut branches: Vec<Branch> = analysis.branches.iter().take(SHOWN_BRANCHES).cloned().collect();

    // The played move is always shown, carrying the *next* position's
    // estimates so its numbers agree with the actual continuation.
    if let Some(played) = next_move {
        let mut found = false;
        for branch in branches.iter_mut() {
            match branch.moves.first() {
                Some(first) if *first == played => {
                    branch.win_rate = next_win_rate;
                    branch.score = next_score;
                    found = true;
                    break;
                }
                _ => continue,
            }
        }
        if !found {
            branches.push(Branch {
                moves: smallvec![played],
                win_rate: next_win_rate,
                score: next_score,
                visits: 0,
            });
        }
    }

    let strength = ctx.review.strength as f64;
    let mut heatmap = vec![vec![0.0; board.width() as usize]; board.height() as usize];

    let next_player = match tree.node(ctx.cur).trunk_next {
        // Handicap placement does not flip colors, so prefer the actual
        // next node's player when there is one.
        Some(id) => tree.node(id).player.unwrap_or(Player::Black),
        None => tree.next_player(ctx.cur),
    };

    for (rank, branch) in branches.iter().enumerate() {
        let Some(first) = branch.moves.first() else {
            continue;
        };
        let Some(coord) = first.coord() else {
            continue;
        };

        // Suggested coordinates come straight off the wire; never index with
        // them unchecked.
        if coord.x >= board.width() || coord.y >= board.height() {
            tracing::error!(
                uuid = %ctx.review.uuid,
                x = coord.x,
                y = coord.y,
                "AI suggested a move off the board, skipping branch"
            );
            continue;
        }

        if board.is_occupied(coord) {
            tracing::error!(
                uuid = %ctx.review.uuid,
                x = coord.x,
                y = coord.y,
                "AI suggested a move on an occupied intersection, likely a move indexing error"
            );
        }

        heatmap[coord.y as usize][coord.x as usize] = branch.visits as f64 / strength;

        let delta = if ctx.use_score && ctx.review.scores.is_some() {
            let own = analysis.score.unwrap_or(0.0);
            let theirs = branch.score.unwrap_or(0.0);
            match next_player {
                Player::White => own - theirs,
                Player::Black => theirs - own,
            }
        } else {
            100.0
                * match next_player {
                    Player::White => analysis.win_rate - branch.win_rate,
                    Player::Black => branch.win_rate - analysis.win_rate,
                }
        };

        let is_played = next_move.is_some_and(|played| *first == played);

        // Numbers only for well-explored branches, plus the AI choice and
        // the played move.
        let well_explored = f64::from(branch.visits) >= f64::min(50.0, 0.1 * strength);
        if rank == 0 || is_played || well_explored {
            out.labels.push((coord, format_delta(delta)));
        }

        if is_played {
            out.marks.push((coord, MarkKind::SubTriangle));
            out.marks.push((coord, MarkKind::BlueMove));
            out.circles.push(BranchCircle {
                coord,
                kind: if rank == 0 {
                    CircleKind::PlayedTopChoice
                } else {
                    CircleKind::Played
                },
            });
        } else if rank == 0 {
            out.marks.push((coord, MarkKind::BlueMove));
            out.circles.push(BranchCircle {
                coord,
                kind: CircleKind::TopChoice,
            });
        }
    }

    out.heatmap = Some(heatmap);
}

/// One-decimal delta label, with "0.0"/"-0.0" collapsed to "0" and values of
/// ten or more shortened to whole numbers.
fn format_delta(delta: f64) -> String {
    let key = format!("{:.1}", delta);
    if key == "0.0" || key == "-0.0" {
        return "0".to_string();
    }
    let value: f64 = key.parse().unwrap_or(delta);
    let short = if value.abs() >= 10.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    };
    if short.len() < key.len() {
        short
    } else {
        key
    }
}
