//! REST review backend implementation

use crate::error::{ClientError, ClientResult};
use crate::stream::{parse_update, RawUpdate, StreamEvent};
use crate::traits::{RequestedKind, ReviewBackend, ReviewEvents};
use analysis::types::AiReview;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use uuid::Uuid;

/// Capacity of the per-subscription event channel. A full review streams one
/// record per analyzed position, so bursts are expected.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Network client for the game server's review endpoints
pub struct RestBackend {
    http: reqwest::Client,
    base_url: String,
}

impl RestBackend {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        reqwest::Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn reviews_url(&self, game_id: u64) -> String {
        format!("{}/games/{}/ai_reviews", self.base_url, game_id)
    }

    async fn checked(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(ClientError::Status { status, message })
        }
    }
}

#[async_trait]
impl ReviewBackend for RestBackend {
    async fn list_reviews(&self, game_id: u64) -> ClientResult<Vec<AiReview>> {
        let response = self.http.get(self.reviews_url(game_id)).send().await?;
        Ok(Self::checked(response).await?.json().await?)
    }

    async fn create_review(
        &self,
        game_id: u64,
        engine: &str,
        kind: RequestedKind,
    ) -> ClientResult<AiReview> {
        let body = serde_json::json!({
            "engine": engine,
            "type": kind.as_str(),
        });
        let response = self
            .http
            .post(self.reviews_url(game_id))
            .json(&body)
            .send()
            .await?;
        Ok(Self::checked(response).await?.json().await?)
    }

    async fn request_variation_analysis(
        &self,
        game_id: u64,
        review_id: u64,
        review_uuid: Uuid,
        variation_key: &str,
    ) -> ClientResult<()> {
        let url = format!(
            "{}/games/{}/ai_reviews/{}/analyze_variation",
            self.base_url, game_id, review_id
        );
        let body = serde_json::json!({
            "uuid": review_uuid,
            "variation": variation_key,
        });
        let response = self.http.post(url).json(&body).send().await?;
        Self::checked(response).await?;
        Ok(())
    }

    async fn subscribe(&self, game_id: u64, review_uuid: Uuid) -> ClientResult<ReviewEvents> {
        let url = format!(
            "{}/games/{}/ai_reviews/{}/stream",
            self.base_url, game_id, review_uuid
        );
        let response = Self::checked(self.http.get(url).send().await?).await?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        tokio::spawn(pump_stream(response, tx));
        Ok(rx)
    }
}

/// Read newline-delimited JSON records off the response body and forward the
/// parseable ones. Ends when the server closes the stream or the subscriber
/// is dropped.
async fn pump_stream(response: reqwest::Response, tx: mpsc::Sender<StreamEvent>) {
    let mut body = response.bytes_stream();
    let mut buf: Vec<u8> = Vec::new();

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::warn!(error = %e, "review update stream closed");
                break;
            }
        };
        buf.extend_from_slice(&chunk);

        while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = buf.drain(..=pos).collect();
            let line = &line[..line.len() - 1];
            if line.is_empty() {
                continue;
            }
            match serde_json::from_slice::<RawUpdate>(line) {
                Ok(raw) => {
                    if let Some(event) = parse_update(raw) {
                        if tx.send(event).await.is_err() {
                            return;
                        }
                    }
                }
                Err(e) => tracing::warn!(error = %e, "undecodable review stream line"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_base_url() {
        assert!(matches!(
            RestBackend::new("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let backend = RestBackend::new("https://example.net/").unwrap();
        assert_eq!(
            backend.reviews_url(42),
            "https://example.net/games/42/ai_reviews"
        );
    }
}
