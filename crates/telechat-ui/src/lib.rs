//! Telechat UI crate - terminal presentation of the conversation view-state.
//!
//! Every renderer is a pure function of its inputs and returns plain text
//! lines; the binary decides where they are written.
//!
//! # Modules
//!
//! - [`header`]: title bar with status, speech and theme indicators
//! - [`thread`]: message bubbles, empty state and typing indicator
//! - [`input`]: input bar state (text, mic toggle, send affordance)
//! - [`sidebar`]: session list with the "New Chat" affordance
//! - [`copy`]: copy-to-clipboard confirmation

pub mod copy;
pub mod header;
pub mod input;
pub mod sidebar;
pub mod thread;

pub use copy::{osc52_copy_sequence, CopyConfirmation};
pub use header::render_header;
pub use input::InputBar;
pub use sidebar::{render_session_list, resolve_selection};
pub use thread::{
    render_conversation, render_conversation_with_copy, render_message, FOOTER_DISCLAIMER,
};

use telechat_chat::Conversation;

/// Render the whole screen: header, thread and input prompt.
///
/// `copied` is the index of the message showing the copy confirmation.
pub fn render_screen(
    conversation: &Conversation,
    input: &InputBar,
    copied: Option<usize>,
) -> Vec<String> {
    let mut lines = render_header(conversation.flags());
    lines.push(String::new());
    lines.extend(render_conversation_with_copy(
        conversation.messages(),
        conversation.loading(),
        copied,
    ));
    lines.push(String::new());
    lines.push(input.render(conversation.loading()));
    lines
}
