//! Error types for the voice adapters.

/// Errors from speech recognition and synthesis.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("{0} not supported")]
    Unsupported(&'static str),
    #[error("invalid voice state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
    #[error("speech backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_error_display() {
        let err = VoiceError::Unsupported("Speech recognition");
        assert_eq!(err.to_string(), "Speech recognition not supported");

        let err = VoiceError::InvalidTransition {
            from: "Idle".to_string(),
            to: "Idle".to_string(),
        };
        assert_eq!(err.to_string(), "invalid voice state transition: Idle -> Idle");

        let err = VoiceError::Backend("espeak-ng exited with 1".to_string());
        assert_eq!(err.to_string(), "speech backend error: espeak-ng exited with 1");
    }
}
