//! Error types for the reply client.

use telechat_core::error::TelechatError;

/// Errors from a reply request.
#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("server error: HTTP {0}")]
    Status(u16),
    #[error("malformed reply: {0}")]
    Malformed(String),
}

impl ReplyError {
    /// Whether a fresh attempt could plausibly succeed.
    ///
    /// Only connection-level failures qualify; the server answering with an
    /// error status or a bad body is final.
    pub fn is_transient(&self) -> bool {
        matches!(self, ReplyError::Transport(_) | ReplyError::Timeout(_))
    }
}

impl From<ReplyError> for TelechatError {
    fn from(err: ReplyError) -> Self {
        TelechatError::Reply(err.to_string())
    }
}
