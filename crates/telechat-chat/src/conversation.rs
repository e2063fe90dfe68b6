//! Conversation view-state.
//!
//! A conversation is either Idle or AwaitingReply:
//! - Idle -> AwaitingReply when non-blank text is submitted (user message appended)
//! - AwaitingReply -> Idle when the reply arrives (agent message appended, spoken after a delay)
//! - AwaitingReply -> Idle when the reply fails (fixed apology appended and spoken)
//!
//! Only one request is ever in flight. Submitting, starting a new chat or
//! switching sessions while a reply is pending is rejected with
//! [`ChatError::ReplyPending`].

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use telechat_core::config::TelechatConfig;
use telechat_core::types::{Message, Session};
use telechat_reply::{ReplyError, ReplyService};
use telechat_voice::SpeechSynthesisAdapter;

use crate::error::ChatError;
use crate::store::SessionStore;

/// Shown in place of a reply when the reply service fails.
pub const CONNECTION_ERROR_MESSAGE: &str = "Sorry, I encountered a connection error.";

/// Spoken when the reply service fails.
pub const SPOKEN_ERROR_NOTICE: &str = "Sorry, something went wrong.";

/// Request lifecycle of the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingReply,
}

/// What a submission ended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The text was blank; nothing happened.
    Ignored,
    /// The agent replied.
    Replied,
    /// The reply failed and the apology was shown instead.
    Failed,
}

/// Local, ephemeral view flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewFlags {
    pub sidebar_open: bool,
    pub dark_theme: bool,
    pub tts_enabled: bool,
}

/// Knobs for a conversation.
#[derive(Debug, Clone)]
pub struct ConversationSettings {
    pub user_id: String,
    pub title_max_chars: usize,
    pub reply_delay: Duration,
    pub dark_theme: bool,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self::from(&TelechatConfig::default())
    }
}

impl From<&TelechatConfig> for ConversationSettings {
    fn from(config: &TelechatConfig) -> Self {
        Self {
            user_id: config.general.user_id.clone(),
            title_max_chars: config.conversation.title_max_chars,
            reply_delay: Duration::from_millis(config.speech.reply_delay_ms),
            dark_theme: config.general.dark_theme(),
        }
    }
}

/// A submission that has been recorded locally and awaits its reply.
///
/// Only [`Conversation::begin_send`] creates these, and
/// [`Conversation::finish_send`] consumes them.
#[derive(Debug)]
pub struct OutgoingMessage {
    pub text: String,
    pub user_id: String,
    session_id: String,
}

impl OutgoingMessage {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// The client's view-state.
pub struct Conversation {
    reply: Arc<dyn ReplyService>,
    speech: Arc<SpeechSynthesisAdapter>,
    settings: ConversationSettings,
    store: SessionStore,
    messages: Vec<Message>,
    current_session: Option<String>,
    phase: Phase,
    flags: ViewFlags,
    pending_speech: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for Conversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversation")
            .field("settings", &self.settings)
            .field("sessions", &self.store.len())
            .field("messages", &self.messages.len())
            .field("current_session", &self.current_session)
            .field("phase", &self.phase)
            .field("flags", &self.flags)
            .finish()
    }
}

impl Conversation {
    pub fn new(
        reply: Arc<dyn ReplyService>,
        speech: Arc<SpeechSynthesisAdapter>,
        settings: ConversationSettings,
    ) -> Self {
        let flags = ViewFlags {
            sidebar_open: false,
            dark_theme: settings.dark_theme,
            tts_enabled: speech.enabled(),
        };
        Self {
            reply,
            speech,
            settings,
            store: SessionStore::new(),
            messages: Vec::new(),
            current_session: None,
            phase: Phase::Idle,
            flags,
            pending_speech: None,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Messages of the active session, in arrival order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// All sessions, newest first.
    pub fn sessions(&self) -> &[Session] {
        self.store.sessions()
    }

    pub fn current_session_id(&self) -> Option<&str> {
        self.current_session.as_deref()
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.current_session
            .as_deref()
            .and_then(|id| self.store.get(id))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether a reply is pending.
    pub fn loading(&self) -> bool {
        self.phase == Phase::AwaitingReply
    }

    pub fn flags(&self) -> ViewFlags {
        self.flags
    }

    pub fn settings(&self) -> &ConversationSettings {
        &self.settings
    }

    pub fn speech(&self) -> &Arc<SpeechSynthesisAdapter> {
        &self.speech
    }

    // -------------------------------------------------------------------------
    // Sending
    // -------------------------------------------------------------------------

    /// Submit `text` and wait for the reply.
    ///
    /// Blank text is ignored. Every accepted submission ends with exactly one
    /// agent message, either the reply or the connection apology.
    pub async fn submit(&mut self, text: &str) -> Result<SendOutcome, ChatError> {
        let Some(outgoing) = self.begin_send(text)? else {
            return Ok(SendOutcome::Ignored);
        };
        let reply = Arc::clone(&self.reply);
        let result = reply.send_message(&outgoing.text, &outgoing.user_id).await;
        Ok(self.finish_send(outgoing, result))
    }

    /// Record a submission locally and move to AwaitingReply.
    ///
    /// Returns `Ok(None)` for blank text. The first message without a current
    /// session creates one, titled from the text, at the front of the list.
    pub fn begin_send(&mut self, text: &str) -> Result<Option<OutgoingMessage>, ChatError> {
        if text.trim().is_empty() {
            tracing::debug!("Ignoring blank submission");
            return Ok(None);
        }
        if self.loading() {
            return Err(ChatError::ReplyPending);
        }

        let session_id = match self.current_session.clone() {
            Some(id) => id,
            None => {
                let session = Session::titled_from(text, self.settings.title_max_chars);
                tracing::info!(session_id = %session.id, title = %session.title, "Session created");
                let id = session.id.clone();
                self.store.insert_front(session);
                self.current_session = Some(id.clone());
                id
            }
        };

        self.record(&session_id, Message::user(text));
        self.phase = Phase::AwaitingReply;
        tracing::debug!(session_id = %session_id, "Awaiting reply");

        Ok(Some(OutgoingMessage {
            text: text.to_string(),
            user_id: self.settings.user_id.clone(),
            session_id,
        }))
    }

    /// Apply the reply service's result and return to Idle.
    pub fn finish_send(
        &mut self,
        outgoing: OutgoingMessage,
        result: Result<String, ReplyError>,
    ) -> SendOutcome {
        let outcome = match result {
            Ok(reply) => {
                self.record(&outgoing.session_id, Message::agent(reply.clone()));
                self.schedule_speech(reply);
                SendOutcome::Replied
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    session_id = %outgoing.session_id,
                    "Reply failed, showing fallback"
                );
                self.record(&outgoing.session_id, Message::agent(CONNECTION_ERROR_MESSAGE));
                self.cancel_pending_speech();
                self.speak_now(SPOKEN_ERROR_NOTICE);
                SendOutcome::Failed
            }
        };
        self.phase = Phase::Idle;
        outcome
    }

    fn record(&mut self, session_id: &str, message: Message) {
        self.store.append(session_id, message.clone());
        if self.current_session.as_deref() == Some(session_id) {
            self.messages.push(message);
        }
    }

    // -------------------------------------------------------------------------
    // Speech
    // -------------------------------------------------------------------------

    fn schedule_speech(&mut self, text: String) {
        self.cancel_pending_speech();
        if !self.speech.enabled() {
            return;
        }

        let delay = self.settings.reply_delay;
        if delay.is_zero() {
            self.speak_now(&text);
            return;
        }

        let speech = Arc::clone(&self.speech);
        let ticket = speech.reserve();
        self.pending_speech = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // An abort can land after the sleep; the ticket drops a superseded reply.
            if let Err(e) = speech.speak_reserved(ticket, &text) {
                tracing::warn!(error = %e, "Failed to speak reply");
            }
        }));
    }

    fn speak_now(&self, text: &str) {
        if let Err(e) = self.speech.speak(text) {
            tracing::warn!(error = %e, "Failed to speak");
        }
    }

    fn cancel_pending_speech(&mut self) {
        if let Some(handle) = self.pending_speech.take() {
            handle.abort();
        }
    }

    /// Wait for a delayed reply utterance to be handed to the speaker.
    pub async fn flush_speech(&mut self) {
        if let Some(handle) = self.pending_speech.take() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    tracing::warn!(error = %e, "Delayed speech task failed");
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Sessions
    // -------------------------------------------------------------------------

    /// Start a fresh chat: clear the messages and the current session.
    ///
    /// The session list is left untouched.
    pub fn new_chat(&mut self) -> Result<(), ChatError> {
        if self.loading() {
            return Err(ChatError::ReplyPending);
        }
        self.messages.clear();
        self.current_session = None;
        self.flags.sidebar_open = false;
        tracing::info!("New chat started");
        Ok(())
    }

    /// Make `id` the current session and show its transcript.
    ///
    /// Selecting the already-current session leaves the state unchanged.
    pub fn select_session(&mut self, id: &str) -> Result<(), ChatError> {
        if self.loading() {
            return Err(ChatError::ReplyPending);
        }
        if !self.store.contains(id) {
            return Err(ChatError::SessionNotFound(id.to_string()));
        }
        self.current_session = Some(id.to_string());
        self.messages = self.store.transcript(id).to_vec();
        self.flags.sidebar_open = false;
        tracing::info!(session_id = %id, messages = self.messages.len(), "Session selected");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // View flags
    // -------------------------------------------------------------------------

    pub fn set_tts_enabled(&mut self, enabled: bool) {
        self.flags.tts_enabled = enabled;
        self.speech.set_enabled(enabled);
    }

    /// Flip text-to-speech and return the new setting.
    pub fn toggle_tts(&mut self) -> bool {
        let enabled = !self.flags.tts_enabled;
        self.set_tts_enabled(enabled);
        enabled
    }

    /// Flip the theme and return whether it is now dark.
    pub fn toggle_theme(&mut self) -> bool {
        self.flags.dark_theme = !self.flags.dark_theme;
        self.flags.dark_theme
    }

    pub fn open_sidebar(&mut self) {
        self.flags.sidebar_open = true;
    }

    pub fn close_sidebar(&mut self) {
        self.flags.sidebar_open = false;
    }
}

impl Drop for Conversation {
    fn drop(&mut self) {
        self.cancel_pending_speech();
    }
}
