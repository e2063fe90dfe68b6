use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Who authored a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing or speaking into the client.
    User,
    /// The remote support assistant.
    Agent,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Agent => write!(f, "agent"),
        }
    }
}

// =============================================================================
// Message
// =============================================================================

/// One turn of a conversation.
///
/// Messages are immutable once built and have no identity beyond their
/// position in the session transcript.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

impl Message {
    /// Create a message stamped with the current local time.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Local::now(),
        }
    }

    /// A message typed or dictated by the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// A message produced by the assistant (or a local fallback).
    pub fn agent(content: impl Into<String>) -> Self {
        Self::new(Role::Agent, content)
    }

    pub fn is_agent(&self) -> bool {
        self.role == Role::Agent
    }
}

// =============================================================================
// Session
// =============================================================================

/// A named, dated conversation thread.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub title: String,
    /// RFC 3339 creation time.
    pub date: String,
}

impl Session {
    /// Create a session whose title is derived from the first message.
    ///
    /// The title is the first `max_chars` characters of `text` followed by
    /// `"..."`. Truncation is done on `char` boundaries.
    pub fn titled_from(text: &str, max_chars: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: truncate_title(text, max_chars),
            date: Local::now().to_rfc3339(),
        }
    }
}

/// Build a session title from a message prefix.
pub fn truncate_title(text: &str, max_chars: usize) -> String {
    let prefix: String = text.chars().take(max_chars).collect();
    format!("{}...", prefix)
}

// =============================================================================
// Tests
// =============================================================================
