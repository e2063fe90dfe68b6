//! Voice state machines with thread-safe transitions.
//!
//! Recognition and synthesis each have a two-state lifecycle:
//! - Idle -> Listening (recognition started), Listening -> Idle (result, error, end, stop)
//! - Idle -> Speaking (utterance queued), Speaking -> Idle (finished or cancelled)
//!
//! Self-transitions are rejected, which is what keeps "only one active
//! session" and "only one active utterance" enforceable.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::VoiceError;

/// A lifecycle state with a fixed set of permitted transitions.
pub trait Lifecycle: Copy + Eq + fmt::Display + Send + 'static {
    /// The state a fresh machine starts in.
    const INITIAL: Self;

    /// Returns whether a transition from `self` to `target` is valid.
    fn can_transition_to(&self, target: &Self) -> bool;
}

/// Lifecycle of a speech recognition session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenState {
    Idle,
    Listening,
}

impl fmt::Display for ListenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenState::Idle => write!(f, "Idle"),
            ListenState::Listening => write!(f, "Listening"),
        }
    }
}

impl Lifecycle for ListenState {
    const INITIAL: Self = ListenState::Idle;

    fn can_transition_to(&self, target: &Self) -> bool {
        matches!(
            (self, target),
            (ListenState::Idle, ListenState::Listening)
                | (ListenState::Listening, ListenState::Idle)
        )
    }
}

/// Lifecycle of the single synthesis utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeakState {
    Idle,
    Speaking,
}

impl fmt::Display for SpeakState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeakState::Idle => write!(f, "Idle"),
            SpeakState::Speaking => write!(f, "Speaking"),
        }
    }
}

impl Lifecycle for SpeakState {
    const INITIAL: Self = SpeakState::Idle;

    fn can_transition_to(&self, target: &Self) -> bool {
        matches!(
            (self, target),
            (SpeakState::Idle, SpeakState::Speaking) | (SpeakState::Speaking, SpeakState::Idle)
        )
    }
}

/// Thread-safe state machine.
///
/// Clones share the same underlying state. All transitions are validated
/// before being applied.
#[derive(Debug, Clone)]
pub struct StateMachine<S: Lifecycle> {
    state: Arc<Mutex<S>>,
}

impl<S: Lifecycle> Default for StateMachine<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Lifecycle> StateMachine<S> {
    /// Create a new state machine in the lifecycle's initial state.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(S::INITIAL)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, S> {
        // The guarded value is a plain Copy enum, so a poisoned lock still holds a valid state.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the current state.
    pub fn current(&self) -> S {
        *self.lock()
    }

    /// Attempt to transition to the target state.
    pub fn transition(&self, target: S) -> Result<(), VoiceError> {
        let mut state = self.lock();
        if state.can_transition_to(&target) {
            tracing::debug!("Voice state: {} -> {}", *state, target);
            *state = target;
            Ok(())
        } else {
            Err(VoiceError::InvalidTransition {
                from: state.to_string(),
                to: target.to_string(),
            })
        }
    }

    /// Move to `target` only if the machine is currently in `from`.
    ///
    /// Returns whether the transition happened.
    pub fn transition_from(&self, from: S, target: S) -> bool {
        let mut state = self.lock();
        if *state == from && state.can_transition_to(&target) {
            tracing::debug!("Voice state: {} -> {}", *state, target);
            *state = target;
            true
        } else {
            false
        }
    }

    /// Force the machine back to its initial state.
    pub fn reset(&self) {
        let mut state = self.lock();
        if *state != S::INITIAL {
            tracing::debug!("Voice state reset to {} from {}", S::INITIAL, *state);
        }
        *state = S::INITIAL;
    }
}

// =============================================================================
// Tests
// =============================================================================
