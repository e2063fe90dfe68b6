//! Process-local session store.
//!
//! Keeps the session list newest first together with each session's
//! append-only transcript. Nothing is persisted; the store lives as long as
//! the client.

use std::collections::HashMap;

use telechat_core::types::{Message, Session};

#[derive(Debug, Default, Clone)]
pub struct SessionStore {
    sessions: Vec<Session>,
    transcripts: HashMap<String, Vec<Message>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session at the front of the list with an empty transcript.
    pub fn insert_front(&mut self, session: Session) {
        self.transcripts.entry(session.id.clone()).or_default();
        self.sessions.insert(0, session);
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Sessions, newest first.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Append a message to a session's transcript.
    ///
    /// Returns `false` if the session is unknown.
    pub fn append(&mut self, id: &str, message: Message) -> bool {
        match self.transcripts.get_mut(id) {
            Some(transcript) => {
                transcript.push(message);
                true
            }
            None => false,
        }
    }

    /// A session's messages in arrival order; empty for unknown ids.
    pub fn transcript(&self, id: &str) -> &[Message] {
        self.transcripts.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}
