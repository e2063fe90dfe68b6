//! Title bar.

use telechat_chat::ViewFlags;

pub const TITLE: &str = "Telecom Assistant";

/// Render the title and the status line.
pub fn render_header(flags: ViewFlags) -> Vec<String> {
    let speech = if flags.tts_enabled { "speech on" } else { "speech off" };
    let theme = if flags.dark_theme { "dark theme" } else { "light theme" };
    vec![
        TITLE.to_string(),
        format!("* Online | {} | {}", speech, theme),
    ]
}
