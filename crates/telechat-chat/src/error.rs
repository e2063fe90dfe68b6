//! Error types for the conversation view-state.

/// Errors from conversation operations.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("a reply is still pending")]
    ReplyPending,
    #[error("session not found: {0}")]
    SessionNotFound(String),
}
