//! Mock ReviewBackend implementation for testing

use crate::error::{ClientError, ClientResult};
use crate::stream::StreamEvent;
use crate::traits::{RequestedKind, ReviewBackend, ReviewEvents};
use analysis::types::AiReview;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use uuid::Uuid;

type Responder<T> = Box<dyn Fn() -> ClientResult<T> + Send>;

#[derive(Default)]
struct MockResponses {
    list_reviews: Option<Responder<Vec<AiReview>>>,
    create_review: Option<Responder<AiReview>>,
    request_variation_analysis: Option<Responder<()>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    ListReviews {
        game_id: u64,
    },
    CreateReview {
        game_id: u64,
        engine: String,
        kind: RequestedKind,
    },
    RequestVariationAnalysis {
        game_id: u64,
        review_id: u64,
        variation_key: String,
    },
    Subscribe {
        game_id: u64,
        review_uuid: Uuid,
    },
}

/// Scriptable backend: configure responses up front, inspect the call log
/// afterwards, push stream events at will.
#[derive(Default)]
pub struct MockReviewBackend {
    responses: Arc<Mutex<MockResponses>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
    event_tx: Arc<Mutex<Option<mpsc::Sender<StreamEvent>>>>,
}

impl MockReviewBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list_reviews<F>(self, f: F) -> Self
    where
        F: Fn() -> ClientResult<Vec<AiReview>> + Send + 'static,
    {
        self.responses.lock().unwrap().list_reviews = Some(Box::new(f));
        self
    }

    pub fn with_create_review<F>(self, f: F) -> Self
    where
        F: Fn() -> ClientResult<AiReview> + Send + 'static,
    {
        self.responses.lock().unwrap().create_review = Some(Box::new(f));
        self
    }

    pub fn with_variation_analysis<F>(self, f: F) -> Self
    where
        F: Fn() -> ClientResult<()> + Send + 'static,
    {
        self.responses.lock().unwrap().request_variation_analysis = Some(Box::new(f));
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Push an event to the active subscriber, if any.
    pub async fn push_event(&self, event: StreamEvent) {
        let tx = self.event_tx.lock().unwrap().clone();
        if let Some(tx) = tx {
            let _ = tx.send(event).await;
        }
    }

    fn log(&self, call: MockCall) {
        self.call_log.lock().unwrap().push(call);
    }

    fn respond<T>(&self, pick: impl FnOnce(&MockResponses) -> Option<ClientResult<T>>, name: &str) -> ClientResult<T> {
        pick(&self.responses.lock().unwrap())
            .unwrap_or_else(|| Err(ClientError::NotConfigured(name.to_string())))
    }
}

#[async_trait]
impl ReviewBackend for MockReviewBackend {
    async fn list_reviews(&self, game_id: u64) -> ClientResult<Vec<AiReview>> {
        self.log(MockCall::ListReviews { game_id });
        self.respond(|r| r.list_reviews.as_ref().map(|f| f()), "list_reviews")
    }

    async fn create_review(
        &self,
        game_id: u64,
        engine: &str,
        kind: RequestedKind,
    ) -> ClientResult<AiReview> {
        self.log(MockCall::CreateReview {
            game_id,
            engine: engine.to_string(),
            kind,
        });
        self.respond(|r| r.create_review.as_ref().map(|f| f()), "create_review")
    }

    async fn request_variation_analysis(
        &self,
        game_id: u64,
        review_id: u64,
        _review_uuid: Uuid,
        variation_key: &str,
    ) -> ClientResult<()> {
        self.log(MockCall::RequestVariationAnalysis {
            game_id,
            review_id,
            variation_key: variation_key.to_string(),
        });
        self.respond(
            |r| r.request_variation_analysis.as_ref().map(|f| f()),
            "request_variation_analysis",
        )
    }

    async fn subscribe(&self, game_id: u64, review_uuid: Uuid) -> ClientResult<ReviewEvents> {
        self.log(MockCall::Subscribe {
            game_id,
            review_uuid,
        });
        let (tx, rx) = mpsc::channel(64);
        *self.event_tx.lock().unwrap() = Some(tx);
        Ok(rx)
    }
}
