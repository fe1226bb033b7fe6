//! Review panel controller: owns the review list, the selected review and
//! its streamed-update subscription, and the debounce window that batches
//! updates before they are merged.
//!
//! Single writer, event-driven. The app loop forwards stream events and
//! flushes the pending batch when the debounce deadline passes; everything
//! here is synchronous except the backend calls.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use analysis::types::sanity_check;
use analysis::{sync_review, AiReview, ReviewKind, UpdateBatch};
use baduk::{GameConfig, MoveTree, NodeId};
use review_client::{
    ClientResult, RequestedKind, ReviewBackend, ReviewEvents, StreamEvent, UserContext,
};
use tokio::time::Instant;

/// Streamed updates are coalesced for this long before one merge pass.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(100);

const CREATE_REVIEW_ATTEMPTS: u32 = 3;
const CREATE_RETRY_DELAY: Duration = Duration::from_millis(500);

/// What the app loop should do after feeding an event to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    None,
    /// The review list changed server-side; call [`ReviewController::refresh`].
    RefetchList,
}

pub struct ReviewController {
    backend: Arc<dyn ReviewBackend>,
    game_id: u64,
    pub user: UserContext,
    pub config: GameConfig,

    /// Available reviews, best first (see [`selection_order`]).
    pub reviews: Vec<AiReview>,
    pub selected: Option<usize>,
    /// The merged state of the selected review.
    pub active: Option<AiReview>,
    events: Option<ReviewEvents>,

    batch: UpdateBatch,
    deadline: Option<Instant>,
    /// Bumped whenever consumers should redraw.
    pub update_count: u64,
    /// A new review was requested and is queued server-side.
    pub reviewing: bool,
    /// Variation keys already sent for on-demand analysis.
    requested_variations: HashSet<String>,
}

/// Review list order: full reviews before fast, then stronger first, then
/// newer first.
pub fn selection_order(a: &AiReview, b: &AiReview) -> std::cmp::Ordering {
    let rank = |r: &AiReview| match r.kind {
        ReviewKind::Full => 0,
        ReviewKind::Fast => 1,
    };
    rank(a)
        .cmp(&rank(b))
        .then(b.strength.cmp(&a.strength))
        .then(b.date.cmp(&a.date))
}

impl ReviewController {
    pub fn new(
        backend: Arc<dyn ReviewBackend>,
        game_id: u64,
        user: UserContext,
        config: GameConfig,
    ) -> Self {
        Self {
            backend,
            game_id,
            user,
            config,
            reviews: Vec::new(),
            selected: None,
            active: None,
            events: None,
            batch: UpdateBatch::new(),
            deadline: None,
            update_count: 0,
            reviewing: false,
            requested_variations: HashSet::new(),
        }
    }

    /// Fetch the review list. Selects the best review when any exist;
    /// otherwise asks the server to start one.
    pub async fn refresh(&mut self) -> ClientResult<()> {
        let mut reviews = self.backend.list_reviews(self.game_id).await?;
        reviews.sort_by(selection_order);
        self.reviews = reviews;

        if self.reviews.is_empty() {
            self.start_review().await;
        } else {
            self.select(0).await?;
        }
        Ok(())
    }

    /// Ask the server to start an automatic review, retrying a few times
    /// before giving up.
    async fn start_review(&mut self) {
        for attempt in 0..CREATE_REVIEW_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(CREATE_RETRY_DELAY).await;
            }
            match self
                .backend
                .create_review(self.game_id, "katago", RequestedKind::Auto)
                .await
            {
                Ok(review) => {
                    sanity_check(&review);
                    if review.id != 0 {
                        self.reviewing = true;
                    }
                    return;
                }
                Err(e) => {
                    tracing::warn!(error = %e, attempt, "failed to start review");
                }
            }
        }
        tracing::error!("giving up trying to start review");
    }

    /// Select a review by list index and subscribe to its update stream.
    /// Any half-merged state from the previous selection is discarded.
    pub async fn select(&mut self, index: usize) -> ClientResult<()> {
        let Some(review) = self.reviews.get(index) else {
            return Ok(());
        };

        let mut active = review.clone();
        sanity_check(&active);
        sync_review(&mut active);

        self.events = Some(self.backend.subscribe(self.game_id, active.uuid).await?);
        self.selected = Some(index);
        self.active = Some(active);
        self.batch = UpdateBatch::new();
        self.deadline = None;
        self.requested_variations.clear();
        self.update_count += 1;
        Ok(())
    }

    /// Whether a review stream is currently subscribed.
    pub fn subscribed(&self) -> bool {
        self.events.is_some()
    }

    /// Receive the next stream event, if subscribed. `None` when the stream
    /// has ended or there is no subscription; a finished subscription is
    /// dropped so callers can stop polling.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        let event = match self.events.as_mut() {
            Some(events) => events.recv().await,
            None => None,
        };
        if event.is_none() {
            self.events = None;
        }
        event
    }

    /// Feed one stream event. Updates are batched, not applied immediately;
    /// [`flush_deadline`](Self::flush_deadline) says when to call
    /// [`flush`](Self::flush).
    pub fn handle_event(&mut self, event: StreamEvent) -> Followup {
        match event {
            StreamEvent::Update(update) => {
                self.batch.insert(update);
                if self.deadline.is_none() {
                    self.deadline = Some(Instant::now() + DEBOUNCE_WINDOW);
                }
                Followup::None
            }
            StreamEvent::Refresh => Followup::RefetchList,
        }
    }

    /// When the pending batch should be applied, if one is pending.
    pub fn flush_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Apply the pending batch to the active review.
    pub fn flush(&mut self) {
        self.deadline = None;
        let batch = std::mem::take(&mut self.batch);
        if batch.is_empty() {
            return;
        }
        batch.apply(&mut self.active);
        self.update_count += 1;
    }

    /// Explicitly request a new fast or full review. Returns whether the
    /// request was sent; refused locally for users without the privilege.
    pub async fn request_review(&mut self, kind: RequestedKind) -> ClientResult<bool> {
        if !self.user.can_start_review() {
            return Ok(false);
        }
        let review = self
            .backend
            .create_review(self.game_id, "katago", kind)
            .await?;
        sanity_check(&review);
        self.reviewing = true;
        Ok(true)
    }

    /// Request on-demand analysis of the variation at `cur`, when permitted
    /// and not already requested. Returns whether a request was sent.
    pub async fn request_variation(&mut self, tree: &MoveTree, cur: NodeId) -> ClientResult<bool> {
        if !self.user.can_request_variation_analysis(&self.config) {
            return Ok(false);
        }
        let Some(active) = self.active.as_ref() else {
            tracing::warn!("no active review, not requesting variation analysis");
            return Ok(false);
        };

        let key = analysis::variation_key(tree, cur);
        if !self.requested_variations.insert(key.clone()) {
            return Ok(false);
        }

        self.backend
            .request_variation_analysis(self.game_id, active.id, active.uuid, &key)
            .await?;
        Ok(true)
    }
}
