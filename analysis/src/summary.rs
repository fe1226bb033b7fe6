//! Per-player move-quality summary table.
//!
//! Fast reviews only carry the score trajectory plus the three worst moves,
//! so they bucket every move by score loss alone. Full reviews know the
//! engine's candidate branches at each position and add two more categories
//! for moves that matched or nearly matched the engine's choice. Score data
//! is only calibrated for katago runs; other engines get no table.

use baduk::{GameConfig, Move, Player};

use crate::types::AiReview;

/// Quality bucket for one move. The first two exist only in full reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveCategory {
    /// Played the engine's top choice.
    Excellent,
    /// Played a well-explored non-top branch.
    Great,
    Good,
    Inaccuracy,
    Mistake,
    Blunder,
}

impl MoveCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Great => "Great",
            Self::Good => "Good",
            Self::Inaccuracy => "Inaccuracy",
            Self::Mistake => "Mistake",
            Self::Blunder => "Blunder",
        }
    }

    /// Bucket a score loss (points, positive is bad for the mover).
    /// `None` for NaN input.
    pub fn from_score_loss(loss: f64) -> Option<Self> {
        if loss < 1.0 {
            Some(Self::Good)
        } else if loss < 2.0 {
            Some(Self::Inaccuracy)
        } else if loss < 5.0 {
            Some(Self::Mistake)
        } else if loss >= 5.0 {
            Some(Self::Blunder)
        } else {
            None
        }
    }
}

const FAST_CATEGORIES: [MoveCategory; 4] = [
    MoveCategory::Good,
    MoveCategory::Inaccuracy,
    MoveCategory::Mistake,
    MoveCategory::Blunder,
];

const FULL_CATEGORIES: [MoveCategory; 6] = [
    MoveCategory::Excellent,
    MoveCategory::Great,
    MoveCategory::Good,
    MoveCategory::Inaccuracy,
    MoveCategory::Mistake,
    MoveCategory::Blunder,
];

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub category: MoveCategory,
    pub black_count: u32,
    /// Share of black's counted moves, one decimal. `None` when black has no
    /// counted moves yet.
    pub black_percent: Option<f64>,
    pub white_count: u32,
    pub white_percent: Option<f64>,
}

/// Aggregated table plus the headline averages. An empty `rows` means the
/// table cannot be shown (wrong engine, missing scores, or data that fails
/// the consistency checks).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryTable {
    pub rows: Vec<SummaryRow>,
    /// Average score loss per move, black then white, one decimal.
    pub avg_score_loss: [f64; 2],
    /// Median score loss, black then white. -1 when a player has no moves.
    pub median_score_loss: [f64; 2],
    /// Full reviews stream in per-move results; this counts positions still
    /// missing from the table.
    pub moves_pending: u32,
    /// Total positions a complete full review would cover.
    pub max_entries: usize,
    pub consistent: bool,
}

pub struct SummaryInputs<'a> {
    pub review: &'a AiReview,
    pub config: &'a GameConfig,
    /// Who played each trunk move, move 1 first.
    pub move_players: &'a [Player],
    /// Number of moves in the game record.
    pub trunk_len: usize,
}

pub fn summarize(inputs: &SummaryInputs<'_>) -> SummaryTable {
    let review = inputs.review;

    if !review.is_katago() {
        return SummaryTable::default();
    }

    // A single free-placement stone is treated as no offset at all. Inherited
    // behavior; the intent behind the single-stone exception is not fully
    // understood, so it is preserved rather than reworked.
    let mut h_offset = inputs.config.handicap_offset() as usize;
    if h_offset == 1 {
        h_offset = 0;
    }
    // Uploaded handicap records drop one move segment from the count. Also
    // inherited as-is, not derived; revisit only with server data to compare
    // against.
    let b_player: usize = if h_offset > 0 || inputs.config.handicap > 1 {
        1
    } else {
        0
    };

    match review.kind {
        crate::types::ReviewKind::Fast => summarize_fast(inputs, h_offset, b_player),
        crate::types::ReviewKind::Full => summarize_full(inputs, h_offset, b_player),
    }
}

fn all_moves_segments(config: &GameConfig) -> Option<usize> {
    config.all_moves.as_ref().map(|s| s.split('!').count())
}

fn summarize_fast(inputs: &SummaryInputs<'_>, h_offset: usize, b_player: usize) -> SummaryTable {
    let review = inputs.review;
    let Some(base_scores) = review.scores.as_ref() else {
        return SummaryTable::default();
    };

    let is_uploaded = inputs.config.original_sgf;
    // One more score than moves in the game: the empty board is scored too.
    let check1 = !is_uploaded && inputs.trunk_len + 1 != base_scores.len();
    let check2 = is_uploaded
        && all_moves_segments(inputs.config)
            .map(|segments| segments - b_player != base_scores.len())
            .unwrap_or(true);
    // Short games do not always return three worst moves.
    let check3 = review.moves.len() != 3 && base_scores.len() > 4;
    if check1 || check2 || check3 {
        return SummaryTable::default();
    }

    // The trajectory scores are coarse; the worst-move entries carry refined
    // scores for their positions.
    let mut scores = base_scores.clone();
    for (move_number, analysis) in &review.moves {
        if let (idx, Some(score)) = (*move_number as usize, analysis.score) {
            if idx < scores.len() {
                scores[idx] = score;
            }
        }
    }

    let mut acc = Accumulator::new(FAST_CATEGORIES.len());
    for j in h_offset..scores.len().saturating_sub(1) {
        let is_black = matches!(inputs.move_players.get(j), Some(Player::Black));
        let loss = oriented_loss(scores[j], scores[j + 1], is_black);
        let category = MoveCategory::from_score_loss(loss)
            .and_then(|c| FAST_CATEGORIES.iter().position(|&fc| fc == c));
        acc.record(is_black, loss, category);
    }

    SummaryTable {
        rows: acc.rows(&FAST_CATEGORIES),
        avg_score_loss: acc.averages(),
        median_score_loss: acc.medians(),
        moves_pending: 0,
        max_entries: 0,
        consistent: true,
    }
}

fn summarize_full(inputs: &SummaryInputs<'_>, h_offset: usize, b_player: usize) -> SummaryTable {
    let review = inputs.review;

    let is_uploaded = inputs.config.original_sgf;
    let check1 = !is_uploaded && inputs.trunk_len + 1 != review.moves.len();
    let check2 = is_uploaded
        && all_moves_segments(inputs.config)
            .map(|segments| segments - b_player != review.moves.len())
            .unwrap_or(true);
    let consistent = !check1 && !check2;

    let Some(scores) = review.scores.as_ref() else {
        // Still streaming: an all-zero table rather than nothing.
        return SummaryTable {
            rows: Accumulator::new(FULL_CATEGORIES.len()).rows(&FULL_CATEGORIES),
            consistent: false,
            ..Default::default()
        };
    };

    let mut acc = Accumulator::new(FULL_CATEGORIES.len());
    let mut moves_pending = 0;

    for j in h_offset..scores.len().saturating_sub(1) {
        let (Some(current), Some(next)) = (
            review.moves.get(&(j as u32)),
            review.moves.get(&(j as u32 + 1)),
        ) else {
            moves_pending += 1;
            continue;
        };

        let is_black = matches!(inputs.move_players.get(j), Some(Player::Black));
        let loss = oriented_loss(
            current.score.unwrap_or(0.0),
            next.score.unwrap_or(0.0),
            is_black,
        );

        let branches = &current.branches[..current.branches.len().min(6)];
        let blue_move = branches.first().and_then(|b| b.moves.first().copied());
        let played = next.mv;

        let category = match (blue_move, played) {
            (None, _) | (_, Move::Pass) => None,
            (Some(blue), Move::Place(_)) if blue == played => Some(0),
            (Some(_), Move::Place(_)) => {
                let threshold = f64::min(50.0, 0.1 * review.strength as f64);
                let great = branches.iter().enumerate().any(|(rank, branch)| {
                    rank > 0
                        && branch.moves.first() == Some(&played)
                        && f64::from(branch.visits) >= threshold
                });
                if great {
                    Some(1)
                } else {
                    MoveCategory::from_score_loss(loss)
                        .and_then(|c| FULL_CATEGORIES.iter().position(|&fc| fc == c))
                }
            }
        };
        acc.record(is_black, loss, category);
    }

    SummaryTable {
        rows: acc.rows(&FULL_CATEGORIES),
        avg_score_loss: acc.averages(),
        median_score_loss: acc.medians(),
        moves_pending,
        max_entries: scores.len(),
        consistent,
    }
}

/// Score swing of one move, positive when the mover lost points.
fn oriented_loss(before: f64, after: f64, black_moved: bool) -> f64 {
    let diff = after - before;
    if black_moved {
        -diff
    } else {
        diff
    }
}

/// Shared counting machinery for both table shapes. Losses are recorded for
/// the averages and medians even when a move lands in no bucket.
struct Accumulator {
    counters: [Vec<u32>; 2],
    losses: [Vec<f64>; 2],
    loss_sum: [f64; 2],
}

impl Accumulator {
    fn new(num_rows: usize) -> Self {
        Self {
            counters: [vec![0; num_rows], vec![0; num_rows]],
            losses: [Vec::new(), Vec::new()],
            loss_sum: [0.0, 0.0],
        }
    }

    fn record(&mut self, is_black: bool, loss: f64, category: Option<usize>) {
        let side = usize::from(!is_black);
        self.loss_sum[side] += loss;
        self.losses[side].push(loss);
        if let Some(row) = category {
            self.counters[side][row] += 1;
        }
    }

    fn totals(&self) -> [u32; 2] {
        [
            self.counters[0].iter().sum(),
            self.counters[1].iter().sum(),
        ]
    }

    fn rows(&self, categories: &[MoveCategory]) -> Vec<SummaryRow> {
        let totals = self.totals();
        categories
            .iter()
            .enumerate()
            .map(|(row, &category)| SummaryRow {
                category,
                black_count: self.counters[0][row],
                black_percent: percent(self.counters[0][row], totals[0]),
                white_count: self.counters[1][row],
                white_percent: percent(self.counters[1][row], totals[1]),
            })
            .collect()
    }

    fn averages(&self) -> [f64; 2] {
        let totals = self.totals();
        let avg = |side: usize| {
            if totals[side] > 0 {
                round1(self.loss_sum[side] / f64::from(totals[side]))
            } else {
                0.0
            }
        };
        [avg(0), avg(1)]
    }

    fn medians(&self) -> [f64; 2] {
        let median = |side: usize| {
            let mut sorted = self.losses[side].clone();
            sorted.sort_by(|a, b| a.total_cmp(b));
            round1(median_list(&sorted))
        };
        [median(0), median(1)]
    }
}

fn percent(count: u32, total: u32) -> Option<f64> {
    if total > 0 {
        Some(round1(100.0 * f64::from(count) / f64::from(total)))
    } else {
        None
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Median of a sorted list, -1 for an empty one.
fn median_list(sorted: &[f64]) -> f64 {
    if sorted.is_empty() {
        return -1.0;
    }
    let mid = sorted.len() / 2;
    if sorted.len() % 2 != 0 {
        sorted[mid]
    } else {
        (sorted[mid] + sorted[mid - 1]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_fixtures::bare_review;
    use crate::types::{Branch, MoveAnalysis, ReviewKind};
    use smallvec::smallvec;

    fn analysis(move_number: u32, mv: Move, score: f64, branches: Vec<Branch>) -> MoveAnalysis {
        MoveAnalysis {
            move_number,
            mv,
            win_rate: 0.5,
            score: Some(score),
            branches,
        }
    }

    fn branch(mv: Move, visits: u32) -> Branch {
        Branch {
            moves: smallvec![mv],
            visits,
            win_rate: 0.5,
            score: Some(0.0),
        }
    }

    fn count(table: &SummaryTable, category: MoveCategory, black: bool) -> u32 {
        let row = table
            .rows
            .iter()
            .find(|r| r.category == category)
            .unwrap();
        if black {
            row.black_count
        } else {
            row.white_count
        }
    }

    #[test]
    fn median_of_lists() {
        assert_eq!(median_list(&[]), -1.0);
        assert_eq!(median_list(&[1.0, 3.0]), 2.0);
        assert_eq!(median_list(&[1.0, 2.0, 3.0]), 2.0);
    }

    #[test]
    fn non_katago_gets_no_table() {
        let mut review = bare_review(ReviewKind::Fast);
        review.engine = "leela_zero".to_string();
        review.scores = Some(vec![0.0, 1.0]);
        let config = GameConfig::new(19, 19);
        let table = summarize(&SummaryInputs {
            review: &review,
            config: &config,
            move_players: &[Player::Black],
            trunk_len: 1,
        });
        assert!(table.rows.is_empty());
        assert!(!table.consistent);
    }

    #[test]
    fn fast_buckets_by_score_loss_thresholds() {
        let mut review = bare_review(ReviewKind::Fast);
        // Black losses between successive scores: 0.5, 1.0, 2.0, 5.0
        // (black's score drops, so diffs are negated for black).
        review.scores = Some(vec![10.0, 9.5, 8.5, 6.5, 1.5]);
        // Worst moves carry refined scores; keep them identical so the
        // patch step is a no-op, but present so check3 passes.
        review.moves.insert(2, analysis(2, Move::place(0, 0), 8.5, vec![]));
        review.moves.insert(3, analysis(3, Move::place(1, 1), 6.5, vec![]));
        review.moves.insert(4, analysis(4, Move::place(2, 2), 1.5, vec![]));

        let config = GameConfig::new(19, 19);
        let players = [Player::Black; 4];
        let table = summarize(&SummaryInputs {
            review: &review,
            config: &config,
            move_players: &players,
            trunk_len: 4,
        });

        assert!(table.consistent);
        assert_eq!(table.rows.len(), 4);
        assert_eq!(count(&table, MoveCategory::Good, true), 1);
        assert_eq!(count(&table, MoveCategory::Inaccuracy, true), 1);
        assert_eq!(count(&table, MoveCategory::Mistake, true), 1);
        assert_eq!(count(&table, MoveCategory::Blunder, true), 1);
        // avg = (0.5 + 1 + 2 + 5) / 4 = 2.1 (rounded), median = (1+2)/2.
        assert_eq!(table.avg_score_loss[0], 2.1);
        assert_eq!(table.median_score_loss[0], 1.5);
        // White has no moves.
        assert_eq!(table.avg_score_loss[1], 0.0);
        assert_eq!(table.median_score_loss[1], -1.0);
    }

    #[test]
    fn fast_length_mismatch_yields_placeholder() {
        let mut review = bare_review(ReviewKind::Fast);
        review.scores = Some(vec![0.0, 1.0, 2.0]);
        let config = GameConfig::new(19, 19);
        let table = summarize(&SummaryInputs {
            review: &review,
            config: &config,
            move_players: &[Player::Black; 5],
            // Five game moves but only three scores.
            trunk_len: 5,
        });
        assert!(table.rows.is_empty());
        assert!(!table.consistent);
    }

    #[test]
    fn full_review_classifies_excellent_and_great() {
        let mut review = bare_review(ReviewKind::Full);
        review.strength = 1000;
        review.scores = Some(vec![0.0, 0.5, 0.3]);

        let pd = Move::place(15, 3);
        let dp = Move::place(3, 15);
        // Move 1 (pd) was the top choice at the empty board.
        review
            .moves
            .insert(0, analysis(0, Move::Pass, 0.0, vec![branch(pd, 900)]));
        // Move 2 (dp) was a well-visited second choice.
        review.moves.insert(
            1,
            analysis(
                1,
                pd,
                0.5,
                vec![branch(Move::place(16, 5), 600), branch(dp, 100)],
            ),
        );
        review.moves.insert(2, analysis(2, dp, 0.3, vec![]));

        let config = GameConfig::new(19, 19);
        let players = [Player::Black, Player::White];
        let table = summarize(&SummaryInputs {
            review: &review,
            config: &config,
            move_players: &players,
            trunk_len: 2,
        });

        assert!(table.consistent);
        assert_eq!(table.rows.len(), 6);
        assert_eq!(count(&table, MoveCategory::Excellent, true), 1);
        assert_eq!(count(&table, MoveCategory::Great, false), 1);
        assert_eq!(table.moves_pending, 0);
        assert_eq!(table.max_entries, 3);
    }

    #[test]
    fn full_review_counts_missing_positions_as_pending() {
        let mut review = bare_review(ReviewKind::Full);
        review.scores = Some(vec![0.0, 0.5, 0.3, 0.1]);
        // Only position 0 and 1 analyzed so far.
        review
            .moves
            .insert(0, analysis(0, Move::Pass, 0.0, vec![branch(Move::place(15, 3), 900)]));
        review
            .moves
            .insert(1, analysis(1, Move::place(15, 3), 0.5, vec![]));

        let config = GameConfig::new(19, 19);
        let players = [Player::Black, Player::White, Player::Black];
        let table = summarize(&SummaryInputs {
            review: &review,
            config: &config,
            move_players: &players,
            trunk_len: 3,
        });

        // Positions 1 and 2 lack a successor pair.
        assert_eq!(table.moves_pending, 2);
        assert!(!table.consistent, "move map shorter than the game");
    }

    #[test]
    fn underexplored_second_choice_is_not_great() {
        let mut review = bare_review(ReviewKind::Full);
        review.strength = 1000;
        review.scores = Some(vec![0.0, 0.5]);

        let pd = Move::place(15, 3);
        review.moves.insert(
            0,
            analysis(
                0,
                Move::Pass,
                0.0,
                // Played move is ranked second with only 10 visits,
                // below min(50, 100).
                vec![branch(Move::place(16, 5), 900), branch(pd, 10)],
            ),
        );
        review.moves.insert(1, analysis(1, pd, 0.3, vec![]));

        let config = GameConfig::new(19, 19);
        let table = summarize(&SummaryInputs {
            review: &review,
            config: &config,
            move_players: &[Player::Black],
            trunk_len: 1,
        });

        assert_eq!(count(&table, MoveCategory::Great, true), 0);
        // Black "lost" -0.3 points, i.e. gained; still a Good move.
        assert_eq!(count(&table, MoveCategory::Good, true), 1);
    }

    #[test]
    fn pass_moves_land_in_no_bucket_but_count_toward_loss() {
        let mut review = bare_review(ReviewKind::Full);
        review.scores = Some(vec![0.0, 2.0]);
        review
            .moves
            .insert(0, analysis(0, Move::Pass, 0.0, vec![branch(Move::place(15, 3), 900)]));
        review.moves.insert(1, analysis(1, Move::Pass, 2.0, vec![]));

        let config = GameConfig::new(19, 19);
        let table = summarize(&SummaryInputs {
            review: &review,
            config: &config,
            move_players: &[Player::White],
            trunk_len: 1,
        });

        let bucketed: u32 = table.rows.iter().map(|r| r.white_count).sum();
        assert_eq!(bucketed, 0);
        // The loss still feeds the median even though no row counted it.
        assert_eq!(table.median_score_loss[1], 2.0);
    }

    #[test]
    fn free_placement_handicap_skips_placement_scores() {
        let mut review = bare_review(ReviewKind::Fast);
        // Two placement scores skipped; the single remaining diff is 3.0
        // against white.
        review.scores = Some(vec![0.0, 0.0, 5.0, 8.0]);
        review
            .moves
            .insert(3, analysis(3, Move::place(0, 0), 8.0, vec![]));

        let mut config = GameConfig::new(19, 19);
        config.handicap = 2;
        config.free_handicap_placement = true;

        let players = [Player::Black, Player::Black, Player::White];
        let table = summarize(&SummaryInputs {
            review: &review,
            config: &config,
            move_players: &players,
            trunk_len: 3,
        });

        assert!(table.consistent);
        assert_eq!(count(&table, MoveCategory::Mistake, false), 1);
        assert_eq!(table.avg_score_loss[1], 3.0);
        assert_eq!(count(&table, MoveCategory::Good, true), 0);
    }
}
