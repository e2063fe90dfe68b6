//! Parsing of input lines into client commands.

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text to send to the assistant.
    Send(String),
    NewChat,
    Sessions,
    Select(String),
    Mic,
    StopMic,
    ToggleTts,
    ToggleTheme,
    Copy,
    Help,
    Quit,
    Unknown(String),
}

pub const HELP: &str = "\
Commands:
  /new           start a new chat
  /sessions      list recent chats
  /select <n|id> open a chat from the list
  /mic           speak a message
  /stop          stop listening
  /tts           toggle spoken replies
  /theme         toggle light/dark theme
  /copy          copy the last assistant reply
  /help          show this help
  /quit          exit";

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Command::Send(line.to_string());
        };

        let mut parts = rest.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).unwrap_or_default();

        match name {
            "new" => Command::NewChat,
            "sessions" => Command::Sessions,
            "select" if !arg.is_empty() => Command::Select(arg.to_string()),
            "mic" => Command::Mic,
            "stop" => Command::StopMic,
            "tts" => Command::ToggleTts,
            "theme" => Command::ToggleTheme,
            "copy" => Command::Copy,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => Command::Unknown(trimmed.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_sent_verbatim() {
        assert_eq!(
            Command::parse("My bill is wrong "),
            Command::Send("My bill is wrong ".to_string())
        );
        assert_eq!(Command::parse("   "), Command::Send("   ".to_string()));
    }

    #[test]
    fn test_commands() {
        assert_eq!(Command::parse("/new"), Command::NewChat);
        assert_eq!(Command::parse(" /sessions "), Command::Sessions);
        assert_eq!(Command::parse("/mic"), Command::Mic);
        assert_eq!(Command::parse("/stop"), Command::StopMic);
        assert_eq!(Command::parse("/tts"), Command::ToggleTts);
        assert_eq!(Command::parse("/theme"), Command::ToggleTheme);
        assert_eq!(Command::parse("/copy"), Command::Copy);
        assert_eq!(Command::parse("/help"), Command::Help);
        assert_eq!(Command::parse("/quit"), Command::Quit);
        assert_eq!(Command::parse("/exit"), Command::Quit);
    }

    #[test]
    fn test_select_argument() {
        assert_eq!(Command::parse("/select 2"), Command::Select("2".to_string()));
        assert_eq!(
            Command::parse("/select   abc-123 "),
            Command::Select("abc-123".to_string())
        );
        assert_eq!(Command::parse("/select"), Command::Unknown("/select".to_string()));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(Command::parse("/dance"), Command::Unknown("/dance".to_string()));
    }
}
