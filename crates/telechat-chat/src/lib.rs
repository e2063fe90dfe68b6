//! Conversation view-state for the Telechat client.
//!
//! Holds the active session's messages, the session list and the view
//! flags, and composes the reply client with the speech synthesis adapter.

pub mod conversation;
pub mod error;
pub mod store;

pub use conversation::{
    Conversation, ConversationSettings, OutgoingMessage, Phase, SendOutcome, ViewFlags,
    CONNECTION_ERROR_MESSAGE, SPOKEN_ERROR_NOTICE,
};
pub use error::ChatError;
pub use store::SessionStore;
