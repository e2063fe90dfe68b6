//! Conversation thread rendering.

use telechat_core::types::{Message, Role};

pub const EMPTY_STATE_TITLE: &str = "How can I help you today?";
pub const EMPTY_STATE_HINT: &str =
    "Ask me about your internet bill, data usage, or connectivity issues.";
pub const TYPING_INDICATOR: &str = "Assistant is typing . . .";
pub const FOOTER_DISCLAIMER: &str =
    "AI can make mistakes. Please verify important billing details.";

fn label(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Agent => "Assistant",
    }
}

/// Render one bubble: a `label  HH:MM` line followed by the content,
/// one indented line per content line.
///
/// `copied` adds the copy confirmation to agent bubbles.
pub fn render_message(message: &Message, copied: bool) -> Vec<String> {
    let mut heading = format!("{}  {}", label(message.role), message.timestamp.format("%H:%M"));
    if copied && message.is_agent() {
        heading.push_str("  (copied)");
    }

    let gutter = match message.role {
        Role::User => "  > ",
        Role::Agent => "  | ",
    };

    let mut lines = vec![heading];
    if message.content.is_empty() {
        lines.push(gutter.trim_end().to_string());
    } else {
        lines.extend(message.content.lines().map(|line| format!("{}{}", gutter, line)));
    }
    lines
}

/// Render the thread of the active session.
///
/// Shows the greeting when there are no messages and the typing indicator
/// while a reply is pending.
pub fn render_conversation(messages: &[Message], loading: bool) -> Vec<String> {
    render_conversation_with_copy(messages, loading, None)
}

/// Like [`render_conversation`], marking the message at `copied_index` as copied.
pub fn render_conversation_with_copy(
    messages: &[Message],
    loading: bool,
    copied_index: Option<usize>,
) -> Vec<String> {
    let mut lines = Vec::new();

    if messages.is_empty() {
        lines.push(EMPTY_STATE_TITLE.to_string());
        lines.push(EMPTY_STATE_HINT.to_string());
    }

    for (i, message) in messages.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.extend(render_message(message, copied_index == Some(i)));
    }

    if loading {
        if !messages.is_empty() {
            lines.push(String::new());
        }
        lines.push(TYPING_INDICATOR.to_string());
    }

    lines.push(String::new());
    lines.push(FOOTER_DISCLAIMER.to_string());
    lines
}
