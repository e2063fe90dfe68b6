//! Copy-to-clipboard confirmation.

use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

/// How long the "copied" marker stays visible.
pub const COPY_CONFIRMATION: Duration = Duration::from_secs(2);

/// Remembers which message was copied last and when.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyConfirmation {
    copied: Option<(usize, Instant)>,
}

impl CopyConfirmation {
    pub fn mark(&mut self, index: usize, now: Instant) {
        self.copied = Some((index, now));
    }

    /// The copied message index, if the confirmation is still showing.
    pub fn visible(&self, now: Instant) -> Option<usize> {
        match self.copied {
            Some((index, at)) if now.saturating_duration_since(at) < COPY_CONFIRMATION => {
                Some(index)
            }
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.copied = None;
    }
}

/// OSC 52 escape sequence asking the terminal to put `text` on the clipboard.
pub fn osc52_copy_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", BASE64_STANDARD.encode(text))
}
