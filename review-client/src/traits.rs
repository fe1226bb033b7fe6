//! ReviewBackend trait abstraction for client implementations

use crate::error::ClientResult;
use crate::stream::StreamEvent;
use analysis::types::AiReview;
use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Analysis depth to request. `Auto` lets the server pick based on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedKind {
    Auto,
    Fast,
    Full,
}

impl RequestedKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Fast => "fast",
            Self::Full => "full",
        }
    }
}

/// Streamed updates for one subscribed review.
pub type ReviewEvents = mpsc::Receiver<StreamEvent>;

/// Review service interface
/// Implemented by both the real RestBackend and MockReviewBackend
#[async_trait]
pub trait ReviewBackend: Send + Sync {
    /// List the reviews that exist for a game
    async fn list_reviews(&self, game_id: u64) -> ClientResult<Vec<AiReview>>;

    /// Ask the server to start a new review
    async fn create_review(
        &self,
        game_id: u64,
        engine: &str,
        kind: RequestedKind,
    ) -> ClientResult<AiReview>;

    /// Request on-demand analysis of one variation
    async fn request_variation_analysis(
        &self,
        game_id: u64,
        review_id: u64,
        review_uuid: Uuid,
        variation_key: &str,
    ) -> ClientResult<()>;

    /// Subscribe to streamed updates for one review
    async fn subscribe(&self, game_id: u64, review_uuid: Uuid) -> ClientResult<ReviewEvents>;
}
