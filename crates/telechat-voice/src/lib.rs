//! Telechat voice crate - speech recognition and speech synthesis adapters.
//!
//! Platform speech facilities are reached through two injectable
//! capabilities, [`Transcriber`] and [`Speaker`]. The adapters on top of them
//! enforce that at most one recognition session and at most one utterance are
//! active at a time, using the small state machines in [`state`].

pub mod error;
pub mod state;
pub mod synthesis;
pub mod transcription;

pub use error::VoiceError;
pub use state::{ListenState, SpeakState, StateMachine};
pub use synthesis::{
    CommandSpeaker, NullSpeaker, Speaker, SpeechSynthesisAdapter, SpeechTicket, Utterance,
    VoiceSettings,
};
pub use transcription::{
    CommandTranscriber, ListenOutcome, RecognitionEvent, RecognitionEvents, RecognitionSettings,
    TranscriptCallback, Transcriber, TranscriptionAdapter, UnsupportedTranscriber,
};
