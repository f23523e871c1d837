use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use super::domain::RecipientId;
use super::message::MessagePayload;

/// Lookup from customer name to push-messaging identity. Kept separate from the pending
/// store because the mapping lives outside the candidate rows and is maintained by hand.
pub trait RecipientDirectory: Send + Sync {
    fn resolve(&self, customer: &str) -> Result<Option<RecipientId>, DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("recipient directory unavailable: {0}")]
    Unavailable(String),
}

/// Fire-and-forget delivery seam. The workflow never retries; a failed push surfaces as
/// a [`DispatchError`] and the row keeps its pending status.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn push(
        &self,
        recipient: &RecipientId,
        message: &MessagePayload,
    ) -> Result<(), DispatchError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("push endpoint rejected the message: status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("push transport unreachable: {0}")]
    Transport(String),
}

/// HTTP push transport: POSTs `{"to": ..., "messages": [...]}` with a bearer token.
pub struct HttpPushTransport {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl HttpPushTransport {
    pub fn new(endpoint: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            token: token.to_string(),
        }
    }
}

#[async_trait]
impl MessageTransport for HttpPushTransport {
    async fn push(
        &self,
        recipient: &RecipientId,
        message: &MessagePayload,
    ) -> Result<(), DispatchError> {
        let body = json!({
            "to": recipient.0,
            "messages": [message],
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|err| DispatchError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            body.truncate(300);
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Throttle between consecutive dispatches in a batch. Policy lives here, not in the
/// state machine.
#[async_trait]
pub trait DispatchPacer: Send + Sync {
    async fn pause(&self);
}

/// Waits a fixed interval, the transport's documented safe call rate.
pub struct FixedDelayPacer {
    delay: Duration,
}

impl FixedDelayPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }
}

#[async_trait]
impl DispatchPacer for FixedDelayPacer {
    async fn pause(&self) {
        tokio::time::sleep(self.delay).await;
    }
}

/// No throttling; tests and the demo use this.
pub struct NoopPacer;

#[async_trait]
impl DispatchPacer for NoopPacer {
    async fn pause(&self) {}
}
