//! Text-to-speech adapter.
//!
//! [`SpeechSynthesisAdapter`] keeps at most one utterance alive: every
//! `speak` cancels whatever is queued or playing before handing the new text
//! to the [`Speaker`]. Dropping the adapter cancels the current utterance.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::process::{Child, Command};

use telechat_core::config::SpeechConfig;

use crate::error::VoiceError;
use crate::state::{SpeakState, StateMachine};

/// Fixed voice parameters applied to every utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    pub locale: String,
    pub rate: f32,
    pub pitch: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            locale: "en-IN".to_string(),
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

impl From<&SpeechConfig> for VoiceSettings {
    fn from(config: &SpeechConfig) -> Self {
        Self {
            locale: config.locale.clone(),
            rate: config.rate,
            pitch: config.pitch,
        }
    }
}

/// A single piece of text to synthesize.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub locale: String,
    pub rate: f32,
    pub pitch: f32,
}

impl Utterance {
    pub fn new(text: impl Into<String>, voice: &VoiceSettings) -> Self {
        Self {
            text: text.into(),
            locale: voice.locale.clone(),
            rate: voice.rate,
            pitch: voice.pitch,
        }
    }
}

/// A platform speech synthesis facility.
pub trait Speaker: Send + Sync {
    /// Start playing `utterance`. Returns once playback has been queued.
    fn speak(&self, utterance: &Utterance) -> Result<(), VoiceError>;

    /// Cancel anything queued or playing.
    fn cancel(&self);

    /// Whether an utterance is still playing.
    fn is_busy(&self) -> bool;
}

/// A claim on the next utterance, taken before a delayed `speak`.
///
/// Any later [`SpeechSynthesisAdapter::speak`], [`SpeechSynthesisAdapter::reserve`]
/// or [`SpeechSynthesisAdapter::cancel`] supersedes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeechTicket(u64);

/// Enforces the single-utterance policy on top of a [`Speaker`].
pub struct SpeechSynthesisAdapter {
    speaker: Arc<dyn Speaker>,
    voice: VoiceSettings,
    enabled: AtomicBool,
    state: StateMachine<SpeakState>,
    /// Utterance generation. Held across cancel-then-speak.
    generation: Mutex<u64>,
}

impl std::fmt::Debug for SpeechSynthesisAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechSynthesisAdapter")
            .field("voice", &self.voice)
            .field("enabled", &self.enabled())
            .field("state", &self.state)
            .finish()
    }
}

impl SpeechSynthesisAdapter {
    pub fn new(speaker: Arc<dyn Speaker>, voice: VoiceSettings, enabled: bool) -> Self {
        Self {
            speaker,
            voice,
            enabled: AtomicBool::new(enabled),
            state: StateMachine::new(),
            generation: Mutex::new(0),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Turn synthesis on or off. Turning it off does not interrupt the
    /// current utterance.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        tracing::debug!(enabled, "Speech synthesis toggled");
    }

    pub fn voice(&self) -> &VoiceSettings {
        &self.voice
    }

    /// Current lifecycle state, folding in playback that ended on its own.
    pub fn state(&self) -> SpeakState {
        if self.state.current() == SpeakState::Speaking && !self.speaker.is_busy() {
            self.finished();
        }
        self.state.current()
    }

    pub fn speaking(&self) -> bool {
        self.state() == SpeakState::Speaking
    }

    /// Speak `text`, replacing any utterance in progress.
    ///
    /// Returns `Ok(false)` without touching the speaker when synthesis is
    /// disabled.
    pub fn speak(&self, text: &str) -> Result<bool, VoiceError> {
        let mut generation = self.lock_generation();
        *generation += 1;
        self.speak_locked(text)
    }

    /// Claim the next utterance for a later [`speak_reserved`](Self::speak_reserved).
    pub fn reserve(&self) -> SpeechTicket {
        let mut generation = self.lock_generation();
        *generation += 1;
        SpeechTicket(*generation)
    }

    /// Speak `text` unless `ticket` has been superseded.
    ///
    /// Returns `Ok(false)` when superseded or disabled.
    pub fn speak_reserved(&self, ticket: SpeechTicket, text: &str) -> Result<bool, VoiceError> {
        let generation = self.lock_generation();
        if *generation != ticket.0 {
            tracing::debug!("Reserved utterance superseded, skipping");
            return Ok(false);
        }
        self.speak_locked(text)
    }

    fn speak_locked(&self, text: &str) -> Result<bool, VoiceError> {
        if !self.enabled() {
            tracing::debug!("Speech synthesis disabled, skipping utterance");
            return Ok(false);
        }

        self.speaker.cancel();
        self.state.reset();

        let utterance = Utterance::new(text, &self.voice);
        self.speaker.speak(&utterance)?;
        self.state.transition(SpeakState::Speaking)?;
        tracing::debug!(text_len = text.len(), locale = %self.voice.locale, "Utterance queued");
        Ok(true)
    }

    /// Cancel the current utterance, if any, and supersede any reservation.
    pub fn cancel(&self) {
        let mut generation = self.lock_generation();
        *generation += 1;
        self.speaker.cancel();
        self.state.reset();
    }

    /// Mark the current utterance as finished.
    pub fn finished(&self) {
        self.state.transition_from(SpeakState::Speaking, SpeakState::Idle);
    }

    fn lock_generation(&self) -> std::sync::MutexGuard<'_, u64> {
        self.generation.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for SpeechSynthesisAdapter {
    fn drop(&mut self) {
        self.cancel();
    }
}

// =============================================================================
// Implementations
// =============================================================================

/// Speaker that discards every utterance.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSpeaker;

impl Speaker for NullSpeaker {
    fn speak(&self, utterance: &Utterance) -> Result<(), VoiceError> {
        tracing::debug!(text_len = utterance.text.len(), "No synthesis backend, utterance dropped");
        Ok(())
    }

    fn cancel(&self) {}

    fn is_busy(&self) -> bool {
        false
    }
}

/// Speaker backed by an external synthesis program.
///
/// The text is appended as the last argument; the voice parameters are
/// exported as `TELECHAT_LOCALE`, `TELECHAT_RATE` and `TELECHAT_PITCH`.
/// Must be used from within a Tokio runtime.
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
    child: Mutex<Option<Child>>,
}

impl std::fmt::Debug for CommandSpeaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSpeaker")
            .field("program", &self.program)
            .field("args", &self.args)
            .finish()
    }
}

impl CommandSpeaker {
    /// Parse a whitespace-separated command line such as `"espeak-ng -v en-in"`.
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            child: Mutex::new(None),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn child(&self) -> std::sync::MutexGuard<'_, Option<Child>> {
        self.child.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&self, utterance: &Utterance) -> Result<(), VoiceError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(&utterance.text)
            .env("TELECHAT_LOCALE", &utterance.locale)
            .env("TELECHAT_RATE", utterance.rate.to_string())
            .env("TELECHAT_PITCH", utterance.pitch.to_string())
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| VoiceError::Backend(format!("failed to run {}: {}", self.program, e)))?;

        if let Some(mut previous) = self.child().replace(child) {
            let _ = previous.start_kill();
        }
        Ok(())
    }

    fn cancel(&self) {
        if let Some(mut child) = self.child().take() {
            if let Err(e) = child.start_kill() {
                tracing::debug!(error = %e, "Synthesis program already exited");
            }
        }
    }

    fn is_busy(&self) -> bool {
        let mut guard = self.child();
        match guard.as_mut().map(|child| child.try_wait()) {
            Some(Ok(None)) => true,
            Some(_) => {
                *guard = None;
                false
            }
            None => false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
