//! Non-presentational core of the AI review panel: the merged review data
//! model, streamed-update batching, variation matching, board annotation
//! computation and the move-quality summary.

pub mod annotate;
pub mod matcher;
pub mod merge;
pub mod summary;
pub mod types;
pub mod worst_moves;

pub use annotate::{annotate, AnnotateContext, AnnotateOutcome, BoardAnnotations};
pub use matcher::{backtrack_match, variation_chart_entries, variation_key, GhostSequence};
pub use merge::{sync_review, ReviewUpdate, UpdateBatch};
pub use summary::{summarize, MoveCategory, SummaryInputs, SummaryRow, SummaryTable};
pub use types::{AiReview, Branch, MoveAnalysis, ReviewChartEntry, ReviewKind};
pub use worst_moves::{key_moves, worst_moves, WorstMoveEntry};
