use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Default endpoint of the reply service.
pub const DEFAULT_REPLY_ENDPOINT: &str = "http://localhost:8000/local/chat";

/// Top-level configuration for the Telechat client.
///
/// Loaded from `~/.telechat/config.toml` by default. Every section falls
/// back to its defaults when missing from the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelechatConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub reply: ReplyConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub transcription: TranscriptionConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
}

impl TelechatConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TelechatConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}

/// General client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// User identifier sent with every message.
    pub user_id: String,
    /// Initial theme: "light" or "dark".
    pub theme: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            user_id: "local_tester".to_string(),
            theme: "light".to_string(),
        }
    }
}

impl GeneralConfig {
    pub fn dark_theme(&self) -> bool {
        self.theme.eq_ignore_ascii_case("dark")
    }
}

/// Reply service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyConfig {
    /// Full URL the chat message is POSTed to.
    pub endpoint: String,
    /// Per-attempt request timeout in seconds.
    pub timeout_secs: u64,
    /// Extra attempts after a transport failure or timeout.
    pub retries: u32,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_REPLY_ENDPOINT.to_string(),
            timeout_secs: 30,
            retries: 1,
        }
    }
}

/// Text-to-speech settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Whether replies are spoken aloud at startup.
    pub enabled: bool,
    /// Synthesis locale (BCP 47).
    pub locale: String,
    pub rate: f32,
    pub pitch: f32,
    /// Delay between a reply arriving and it being spoken.
    pub reply_delay_ms: u64,
    /// Synthesis program, e.g. "espeak-ng". Speech is silent when unset.
    pub command: Option<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            locale: "en-IN".to_string(),
            rate: 1.0,
            pitch: 1.0,
            reply_delay_ms: 500,
            command: None,
        }
    }
}

/// Speech-to-text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Recognition locale (BCP 47).
    pub locale: String,
    /// Recognition program that prints one utterance on stdout.
    /// Voice input is reported as unsupported when unset.
    pub command: Option<String>,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            locale: "en-IN".to_string(),
            command: None,
        }
    }
}

/// Conversation behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Characters of the first message used as a new session's title.
    pub title_max_chars: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self { title_max_chars: 30 }
    }
}
