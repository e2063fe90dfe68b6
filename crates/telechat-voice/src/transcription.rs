//! Speech-to-text adapter.
//!
//! The [`TranscriptionAdapter`] drives a [`Transcriber`] capability through
//! the Idle/Listening lifecycle. Recognition runs in single-utterance mode:
//! the first final result is handed to the caller's callback and the session
//! ends. Errors and end-of-input events always return the adapter to Idle so
//! the UI never shows a stuck "listening" state.

use std::sync::{Arc, Mutex};

use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};

use crate::error::VoiceError;
use crate::state::{ListenState, StateMachine};

/// Events emitted by a recognition backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// The backend began capturing audio.
    Started,
    /// A recognition result. Interim results have `is_final == false`.
    Result { transcript: String, is_final: bool },
    /// The backend failed; the session is over.
    Error(String),
    /// The backend stopped capturing.
    End,
}

/// Stream of events for one recognition session.
pub type RecognitionEvents = mpsc::UnboundedReceiver<RecognitionEvent>;

/// How a recognition session is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionSettings {
    /// Recognition locale (BCP 47).
    pub locale: String,
    pub interim_results: bool,
    pub continuous: bool,
}

impl RecognitionSettings {
    /// Single-utterance, final-results-only settings for `locale`.
    pub fn single_utterance(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            interim_results: false,
            continuous: false,
        }
    }
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self::single_utterance("en-IN")
    }
}

/// A platform speech recognition facility.
pub trait Transcriber: Send + Sync {
    /// Whether recognition is available at all on this platform.
    fn is_supported(&self) -> bool;

    /// Begin a recognition session and return its event stream.
    fn start(&self, settings: &RecognitionSettings) -> Result<RecognitionEvents, VoiceError>;

    /// Abort the active session, if any.
    fn stop(&self);
}

/// Callback receiving the final transcript of a session.
pub type TranscriptCallback = Box<dyn Fn(String) + Send + Sync>;

/// Result of asking the adapter to start listening.
#[derive(Debug)]
pub enum ListenOutcome {
    /// A new session started; pump its events into [`TranscriptionAdapter::handle_event`].
    Started(RecognitionEvents),
    /// A session was already active; nothing changed.
    AlreadyListening,
}

/// Wraps a [`Transcriber`] with a one-session-at-a-time lifecycle.
pub struct TranscriptionAdapter {
    transcriber: Arc<dyn Transcriber>,
    settings: RecognitionSettings,
    state: StateMachine<ListenState>,
    on_result: TranscriptCallback,
}

impl std::fmt::Debug for TranscriptionAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptionAdapter")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .finish()
    }
}

impl TranscriptionAdapter {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        settings: RecognitionSettings,
        on_result: TranscriptCallback,
    ) -> Self {
        Self {
            transcriber,
            settings,
            state: StateMachine::new(),
            on_result,
        }
    }

    /// Whether a recognition session is active.
    pub fn listening(&self) -> bool {
        self.state.current() == ListenState::Listening
    }

    pub fn state(&self) -> ListenState {
        self.state.current()
    }

    /// Start listening.
    ///
    /// Returns `VoiceError::Unsupported` without touching any state when the
    /// platform has no recognition facility; the caller surfaces this as a
    /// notice. Starting while already listening is a no-op.
    pub fn start(&self) -> Result<ListenOutcome, VoiceError> {
        if !self.transcriber.is_supported() {
            tracing::warn!("Speech recognition requested but not supported on this platform");
            return Err(VoiceError::Unsupported("Speech recognition"));
        }
        if self.listening() {
            tracing::debug!("Speech recognition already active, ignoring start");
            return Ok(ListenOutcome::AlreadyListening);
        }

        let events = self.transcriber.start(&self.settings)?;
        self.state.transition(ListenState::Listening)?;
        tracing::info!(locale = %self.settings.locale, "Speech recognition started");
        Ok(ListenOutcome::Started(events))
    }

    /// Cancel the active session. No-op when idle.
    pub fn stop(&self) {
        if self
            .state
            .transition_from(ListenState::Listening, ListenState::Idle)
        {
            self.transcriber.stop();
            tracing::info!("Speech recognition stopped");
        }
    }

    /// Apply one backend event and return the resulting state.
    ///
    /// Events arriving while idle belong to a session that was already
    /// stopped and are dropped.
    pub fn handle_event(&self, event: RecognitionEvent) -> ListenState {
        if !self.listening() {
            tracing::debug!(event = ?event, "Dropping recognition event for inactive session");
            return self.state.current();
        }

        match event {
            RecognitionEvent::Started => {
                tracing::debug!("Recognition backend started capturing");
            }
            RecognitionEvent::Result {
                transcript,
                is_final: true,
            } => {
                self.transcriber.stop();
                self.state.reset();
                tracing::info!(text_len = transcript.len(), "Speech recognized");
                (self.on_result)(transcript);
            }
            RecognitionEvent::Result { is_final: false, .. } => {
                tracing::trace!("Ignoring interim recognition result");
            }
            RecognitionEvent::Error(message) => {
                tracing::warn!(error = %message, "Speech recognition failed");
                self.state.reset();
            }
            RecognitionEvent::End => {
                tracing::debug!("Speech recognition ended");
                self.state.reset();
            }
        }
        self.state.current()
    }
}

// =============================================================================
// Implementations
// =============================================================================

/// Transcriber for platforms without any recognition facility.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedTranscriber;

impl Transcriber for UnsupportedTranscriber {
    fn is_supported(&self) -> bool {
        false
    }

    fn start(&self, _settings: &RecognitionSettings) -> Result<RecognitionEvents, VoiceError> {
        Err(VoiceError::Unsupported("Speech recognition"))
    }

    fn stop(&self) {}
}

/// Transcriber backed by an external recognition program.
///
/// The program is run once per session with `TELECHAT_LOCALE` set; its
/// trimmed stdout is delivered as the single final result. `stop` kills it.
pub struct CommandTranscriber {
    program: String,
    args: Vec<String>,
    cancel: Mutex<Option<oneshot::Sender<()>>>,
}

impl std::fmt::Debug for CommandTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTranscriber")
            .field("program", &self.program)
            .field("args", &self.args)
            .finish()
    }
}

impl CommandTranscriber {
    /// Parse a whitespace-separated command line such as `"whisper-listen --model base"`.
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            cancel: Mutex::new(None),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Transcriber for CommandTranscriber {
    fn is_supported(&self) -> bool {
        true
    }

    fn start(&self, settings: &RecognitionSettings) -> Result<RecognitionEvents, VoiceError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .env("TELECHAT_LOCALE", &settings.locale)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| VoiceError::Backend(format!("failed to run {}: {}", self.program, e)))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        *self
            .cancel
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(cancel_tx);

        let program = self.program.clone();
        tokio::spawn(async move {
            let _ = tx.send(RecognitionEvent::Started);
            tokio::select! {
                output = child.wait_with_output() => match output {
                    Ok(output) if output.status.success() => {
                        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
                        if !transcript.is_empty() {
                            let _ = tx.send(RecognitionEvent::Result {
                                transcript,
                                is_final: true,
                            });
                        }
                    }
                    Ok(output) => {
                        let _ = tx.send(RecognitionEvent::Error(format!(
                            "{} exited with {}",
                            program, output.status
                        )));
                    }
                    Err(e) => {
                        let _ = tx.send(RecognitionEvent::Error(e.to_string()));
                    }
                },
                _ = cancel_rx => {
                    tracing::debug!(program = %program, "Recognition program cancelled");
                }
            }
            let _ = tx.send(RecognitionEvent::End);
        });

        Ok(rx)
    }

    fn stop(&self) {
        let cancel = self
            .cancel
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(cancel) = cancel {
            let _ = cancel.send(());
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
