//! Session list.

use telechat_core::types::Session;

pub const NEW_CHAT_LABEL: &str = "[+] New Chat";
pub const RECENT_HEADING: &str = "RECENT CHATS";

/// Render the session list, newest first, numbered from 1.
///
/// The current session is marked with `>`.
pub fn render_session_list(sessions: &[Session], current: Option<&str>) -> Vec<String> {
    let mut lines = vec![NEW_CHAT_LABEL.to_string(), RECENT_HEADING.to_string()];
    if sessions.is_empty() {
        lines.push("  (no chats yet)".to_string());
    }
    for (i, session) in sessions.iter().enumerate() {
        let marker = if current == Some(session.id.as_str()) { '>' } else { ' ' };
        lines.push(format!("{} {}. {}", marker, i + 1, session.title));
    }
    lines
}

/// Resolve a 1-based list position or a literal session id.
pub fn resolve_selection<'a>(sessions: &'a [Session], selector: &str) -> Option<&'a Session> {
    if let Ok(position) = selector.parse::<usize>() {
        if position >= 1 {
            return sessions.get(position - 1);
        }
        return None;
    }
    sessions.iter().find(|s| s.id == selector)
}
