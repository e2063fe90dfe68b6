//! Telechat reply crate - the remote call that produces the agent's answer.
//!
//! [`ReplyService`] is the seam the conversation depends on; [`HttpReplyClient`]
//! is the production implementation posting `{text, user_id}` and reading
//! `{reply}` back.

pub mod client;
pub mod error;
pub mod types;

pub use client::{HttpReplyClient, ReplyService};
pub use error::ReplyError;
pub use types::{ChatReply, ChatRequest};
