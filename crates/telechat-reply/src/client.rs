//! HTTP reply client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use telechat_core::config::ReplyConfig;

use crate::error::ReplyError;
use crate::types::{ChatReply, ChatRequest};

/// Produces the agent's answer to one user message.
#[async_trait]
pub trait ReplyService: Send + Sync {
    /// Send `text` on behalf of `user_id` and return the reply text.
    async fn send_message(&self, text: &str, user_id: &str) -> Result<String, ReplyError>;
}

/// [`ReplyService`] talking JSON over HTTP.
///
/// One request per call, no batching. Each attempt is bounded by the
/// configured timeout; transport failures and timeouts are retried up to
/// `retries` times, error statuses never are.
#[derive(Debug, Clone)]
pub struct HttpReplyClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
    retries: u32,
}

impl HttpReplyClient {
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        retries: u32,
    ) -> Result<Self, ReplyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReplyError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
            retries,
        })
    }

    pub fn from_config(config: &ReplyConfig) -> Result<Self, ReplyError> {
        Self::new(
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_secs),
            config.retries,
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn attempt(&self, body: &ChatRequest) -> Result<String, ReplyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReplyError::Status(status.as_u16()));
        }

        let reply: ChatReply = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ReplyError::Timeout(self.timeout.as_secs())
            } else {
                ReplyError::Malformed(e.to_string())
            }
        })?;
        Ok(reply.reply)
    }

    fn classify(&self, err: reqwest::Error) -> ReplyError {
        if err.is_timeout() {
            ReplyError::Timeout(self.timeout.as_secs())
        } else {
            ReplyError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl ReplyService for HttpReplyClient {
    async fn send_message(&self, text: &str, user_id: &str) -> Result<String, ReplyError> {
        let body = ChatRequest {
            text: text.to_string(),
            user_id: user_id.to_string(),
        };

        let mut attempt = 0;
        loop {
            match self.attempt(&body).await {
                Ok(reply) => {
                    tracing::debug!(attempt, reply_len = reply.len(), "Reply received");
                    return Ok(reply);
                }
                Err(e) if e.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    tracing::warn!(
                        error = %e,
                        attempt,
                        endpoint = %self.endpoint,
                        "Reply request failed, retrying"
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, endpoint = %self.endpoint, "Reply request failed");
                    return Err(e);
                }
            }
        }
    }
}
