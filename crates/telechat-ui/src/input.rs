//! Input bar: text entry, microphone toggle and send affordance.

pub const PLACEHOLDER_TYPING: &str = "Type your message...";
pub const PLACEHOLDER_LISTENING: &str = "Listening...";

/// Ephemeral state of the input bar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBar {
    text: String,
    listening: bool,
}

impl InputBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn listening(&self) -> bool {
        self.listening
    }

    /// Mirror the transcription adapter's listening flag.
    pub fn set_listening(&mut self, listening: bool) {
        self.listening = listening;
    }

    pub fn placeholder(&self) -> &'static str {
        if self.listening {
            PLACEHOLDER_LISTENING
        } else {
            PLACEHOLDER_TYPING
        }
    }

    /// The send affordance is disabled for blank text or a pending reply.
    pub fn can_send(&self, loading: bool) -> bool {
        !loading && !self.text.trim().is_empty()
    }

    /// Take the text for sending, clearing the bar.
    ///
    /// Returns `None` (and keeps the text) when sending is disabled.
    pub fn take(&mut self, loading: bool) -> Option<String> {
        if !self.can_send(loading) {
            return None;
        }
        Some(std::mem::take(&mut self.text))
    }

    /// Render the bar as a single prompt line.
    pub fn render(&self, loading: bool) -> String {
        let mic = if self.listening { "[stop]" } else { "[mic]" };
        let body = if self.text.is_empty() {
            self.placeholder()
        } else {
            self.text.as_str()
        };
        let send = if self.can_send(loading) {
            "[send]"
        } else {
            "(send disabled)"
        };
        format!("{} > {}  {}", mic, body, send)
    }
}
