//! Review payload types, shared by the transport and the review core.

use std::collections::{BTreeMap, HashMap};

use baduk::Move;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;

/// Depth of an analysis run. Fast reviews score only the game trajectory and
/// the three worst moves; full reviews analyze every position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewKind {
    Fast,
    Full,
}

/// One candidate line the engine explored from a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub moves: SmallVec<[Move; 8]>,
    pub visits: u32,
    pub win_rate: f64,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Engine output for one position: the move that was played there, the
/// position estimate, and the candidate branches in engine rank order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveAnalysis {
    pub move_number: u32,
    #[serde(rename = "move")]
    pub mv: Move,
    pub win_rate: f64,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub branches: Vec<Branch>,
}

/// One AI analysis run for a game. Mutated incrementally as streamed updates
/// arrive; replaced wholesale when a different run is selected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiReview {
    pub id: u64,
    pub uuid: Uuid,
    pub engine: String,
    #[serde(default)]
    pub engine_version: String,
    #[serde(default)]
    pub network: String,
    #[serde(default)]
    pub network_size: String,
    pub strength: u32,
    #[serde(rename = "type")]
    pub kind: ReviewKind,
    /// Creation time, epoch milliseconds.
    pub date: i64,
    /// Overall estimate for the game start.
    #[serde(default = "even_win_rate")]
    pub win_rate: f64,
    /// Per-move win rates, indexed by move number. Holes are back-filled by
    /// [`crate::merge::sync_review`].
    #[serde(default)]
    pub win_rates: Vec<Option<f64>>,
    /// Per-move score estimates, when the engine provides them.
    #[serde(default)]
    pub scores: Option<Vec<f64>>,
    #[serde(default)]
    pub moves: BTreeMap<u32, MoveAnalysis>,
    /// Interactive variation results, keyed by [`variation key`](crate::matcher::variation_key).
    #[serde(default)]
    pub analyzed_variations: HashMap<String, MoveAnalysis>,
    #[serde(default)]
    pub error: Option<String>,
}

fn even_win_rate() -> f64 {
    0.5
}

impl AiReview {
    /// Only katago runs carry calibrated score estimates; everything that
    /// consumes scores (summary table) is gated on this.
    pub fn is_katago(&self) -> bool {
        self.engine.contains("katago")
    }

    /// Win rate at a move number after sync, falling back to the overall rate.
    pub fn win_rate_at(&self, move_number: u32) -> f64 {
        self.win_rates
            .get(move_number as usize)
            .copied()
            .flatten()
            .unwrap_or(self.win_rate)
    }
}

/// Chart datapoint: one per trunk move, plus one per interactive variation
/// result along the current line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewChartEntry {
    pub move_number: u32,
    pub win_rate: f64,
    pub score: f64,
    pub num_variations: usize,
}

/// Best-effort payload validation. Problems are logged, never fatal.
pub fn sanity_check(review: &AiReview) {
    if let Some(first) = review.moves.get(&0) {
        if !first.mv.is_pass() {
            tracing::error!(
                uuid = %review.uuid,
                mv = ?first.mv,
                "review move 0 is not a pass move"
            );
        }
    }
}

/// Human-readable engine name. Unknown engines are logged and shown as "AI".
pub fn engine_display_name(engine: &str) -> &'static str {
    match engine {
        "leela_zero" => "Leela Zero",
        "katago" | "katago:fast" | "katago:meijin" => "KataGo",
        other => {
            tracing::warn!(engine = other, "unknown engine name");
            "AI"
        }
    }
}

/// Short identifier for a network: the hash part of "size-hash-suffix" names,
/// truncated to six characters.
pub fn short_network_version(network: &str) -> String {
    let part = match network.split_once('-') {
        Some((_, rest)) => rest.split('-').next().unwrap_or("xxxxxx"),
        None => network,
    };
    part.chars().take(6).collect()
}

/// Strength tier 0-4 for the review picker badge. Fast reviews have no tier.
pub fn strength_tier(review: &AiReview) -> Option<u8> {
    if review.kind == ReviewKind::Fast {
        return None;
    }
    let thresholds: [u32; 4] = if review.network_size == "20x256" {
        [300, 800, 1600, 10000]
    } else {
        [200, 500, 1500, 6000]
    };
    let tier = thresholds.iter().filter(|&&t| review.strength >= t).count() as u8;
    Some(tier)
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use super::*;

    pub(crate) fn bare_review(kind: ReviewKind) -> AiReview {
        AiReview {
            id: 1,
            uuid: Uuid::nil(),
            engine: "katago".to_string(),
            engine_version: "1.15".to_string(),
            network: "kata1-b18c384nbt-s123".to_string(),
            network_size: "18x384".to_string(),
            strength: 1000,
            kind,
            date: 1_700_000_000_000,
            win_rate: 0.5,
            win_rates: Vec::new(),
            scores: None,
            moves: BTreeMap::new(),
            analyzed_variations: HashMap::new(),
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_fixtures::bare_review;
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn review_deserializes_with_defaults() {
        let json = r#"{
            "id": 7,
            "uuid": "c0f12f8a-9f4e-4c15-8c09-9f5e3a8b0001",
            "engine": "katago",
            "strength": 1600,
            "type": "full",
            "date": 1700000000000
        }"#;
        let review: AiReview = serde_json::from_str(json).unwrap();
        assert_eq!(review.kind, ReviewKind::Full);
        assert_eq!(review.win_rate, 0.5);
        assert!(review.moves.is_empty());
        assert!(review.scores.is_none());
    }

    #[test]
    fn move_analysis_pass_round_trips_as_null() {
        let analysis = MoveAnalysis {
            move_number: 0,
            mv: Move::Pass,
            win_rate: 0.5,
            score: Some(0.0),
            branches: vec![Branch {
                moves: smallvec![Move::place(15, 3)],
                visits: 120,
                win_rate: 0.52,
                score: Some(0.7),
            }],
        };
        let json = serde_json::to_string(&analysis).unwrap();
        assert!(json.contains("\"move\":null"));
        let back: MoveAnalysis = serde_json::from_str(&json).unwrap();
        assert_eq!(back, analysis);
    }

    #[test]
    fn engine_names() {
        assert_eq!(engine_display_name("katago"), "KataGo");
        assert_eq!(engine_display_name("katago:fast"), "KataGo");
        assert_eq!(engine_display_name("leela_zero"), "Leela Zero");
        assert_eq!(engine_display_name("mystery"), "AI");
    }

    #[test]
    fn network_version_shortens_to_hash() {
        assert_eq!(short_network_version("kata1-b18c384nbt-s9732"), "b18c38");
        assert_eq!(short_network_version("abcdef123"), "abcdef");
    }

    #[test]
    fn strength_tiers() {
        let mut review = bare_review(ReviewKind::Full);
        review.strength = 100;
        assert_eq!(strength_tier(&review), Some(0));
        review.strength = 500;
        assert_eq!(strength_tier(&review), Some(2));
        review.strength = 6000;
        assert_eq!(strength_tier(&review), Some(4));

        review.network_size = "20x256".to_string();
        review.strength = 6000;
        assert_eq!(strength_tier(&review), Some(3));

        review.kind = ReviewKind::Fast;
        assert_eq!(strength_tier(&review), None);
    }
}
