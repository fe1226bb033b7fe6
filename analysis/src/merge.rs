//! Incremental merging of streamed review updates.
//!
//! Updates arrive one key at a time over the push channel. They are collected
//! into an [`UpdateBatch`] for a short window before being applied, so a burst
//! of per-move results triggers one recompute instead of dozens. Within a
//! batch, later updates for the same key replace earlier ones; `moves` and
//! `analyzed_variations` always merge key-by-key rather than wholesale.

use crate::types::{sanity_check, AiReview, MoveAnalysis};

/// One typed streamed update. The transport parses wire keys
/// (`metadata`, `error`, `move-<n>`, `variation-<n>-<token>`) into this enum
/// at the boundary; unrecognized keys never reach the merger.
#[derive(Debug, Clone)]
pub enum ReviewUpdate {
    Metadata(AiReview),
    Error(String),
    Move {
        move_number: u32,
        analysis: MoveAnalysis,
    },
    Variation {
        key: String,
        analysis: MoveAnalysis,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UpdateSlot {
    Metadata,
    Error,
    Move(u32),
    Variation(String),
}

impl ReviewUpdate {
    fn slot(&self) -> UpdateSlot {
        match self {
            Self::Metadata(_) => UpdateSlot::Metadata,
            Self::Error(_) => UpdateSlot::Error,
            Self::Move { move_number, .. } => UpdateSlot::Move(*move_number),
            Self::Variation { key, .. } => UpdateSlot::Variation(key.clone()),
        }
    }
}

/// Updates coalesced within one debounce window. Insertion order is kept;
/// a second update for the same key overwrites the first in place.
#[derive(Debug, Default)]
pub struct UpdateBatch {
    updates: Vec<ReviewUpdate>,
}

impl UpdateBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn insert(&mut self, update: ReviewUpdate) {
        let slot = update.slot();
        if let Some(existing) = self.updates.iter_mut().find(|u| u.slot() == slot) {
            *existing = update;
        } else {
            self.updates.push(update);
        }
    }

    /// Apply every update to the active review, then recompute derived
    /// fields. Move/variation/error updates that arrive before any metadata
    /// are logged and dropped.
    pub fn apply(self, review: &mut Option<AiReview>) {
        for update in self.updates {
            apply_update(review, update);
        }
        if let Some(review) = review.as_mut() {
            sanity_check(review);
            sync_review(review);
        }
    }
}

fn apply_update(review: &mut Option<AiReview>, update: ReviewUpdate) {
    match update {
        ReviewUpdate::Metadata(incoming) => merge_metadata(review, incoming),
        ReviewUpdate::Error(message) => match review {
            Some(review) => review.error = Some(message),
            None => tracing::error!(%message, "review missing, cannot record error"),
        },
        ReviewUpdate::Move {
            move_number,
            analysis,
        } => match review {
            Some(review) => {
                review.moves.insert(move_number, analysis);
            }
            None => tracing::warn!(move_number, "move update received before review metadata"),
        },
        ReviewUpdate::Variation { key, analysis } => match review {
            Some(review) => {
                review.analyzed_variations.insert(key, analysis);
            }
            None => tracing::warn!(%key, "variation update received before review metadata"),
        },
    }
}

/// Merge incoming metadata into the active review. A different uuid means a
/// different analysis run: the whole review is replaced and any partially
/// merged state is implicitly discarded. Same uuid: scalar fields are
/// last-write-wins, move and variation maps merge per key.
pub fn merge_metadata(review: &mut Option<AiReview>, incoming: AiReview) {
    let current = match review {
        Some(current) if current.uuid == incoming.uuid => current,
        _ => {
            *review = Some(incoming);
            return;
        }
    };

    let AiReview {
        id,
        uuid: _,
        engine,
        engine_version,
        network,
        network_size,
        strength,
        kind,
        date,
        win_rate,
        win_rates,
        scores,
        moves,
        analyzed_variations,
        error,
    } = incoming;

    current.id = id;
    current.engine = engine;
    current.engine_version = engine_version;
    current.network = network;
    current.network_size = network_size;
    current.strength = strength;
    current.kind = kind;
    current.date = date;
    current.win_rate = win_rate;
    if !win_rates.is_empty() {
        current.win_rates = win_rates;
    }
    if scores.is_some() {
        current.scores = scores;
    }
    if error.is_some() {
        current.error = error;
    }
    current.moves.extend(moves);
    current.analyzed_variations.extend(analyzed_variations);
}

/// Recompute derived sequences after a merge: project per-move win rates and
/// scores out of the `moves` map, then back-fill win-rate holes with the
/// nearest preceding value (0.5 before any known value).
pub fn sync_review(review: &mut AiReview) {
    for analysis in review.moves.values() {
        let idx = analysis.move_number as usize;
        if review.win_rates.len() <= idx {
            review.win_rates.resize(idx + 1, None);
        }
        review.win_rates[idx] = Some(analysis.win_rate);

        if let (Some(score), Some(scores)) = (analysis.score, review.scores.as_mut()) {
            if idx < scores.len() {
                scores[idx] = score;
            }
        }
    }

    let mut last = 0.5;
    for slot in review.win_rates.iter_mut() {
        match slot {
            Some(value) => last = *value,
            None => *slot = Some(last),
        }
    }
}
