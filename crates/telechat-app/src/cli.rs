//! CLI argument definitions for the Telechat client.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Telechat - a terminal chat client for the telecom support assistant.
#[derive(Parser, Debug)]
#[command(name = "telechat", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Reply service endpoint URL.
    #[arg(long = "api-url")]
    pub api_url: Option<String>,

    /// User identifier sent with every message.
    #[arg(long = "user-id")]
    pub user_id: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Start with text-to-speech switched off.
    #[arg(long = "no-tts")]
    pub no_tts: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > TELECHAT_CONFIG env var > ~/.telechat/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        pick_config_path(
            self.config.clone(),
            std::env::var("TELECHAT_CONFIG").ok(),
            std::env::var("HOME").ok(),
        )
    }

    /// Resolve the reply endpoint.
    ///
    /// Priority: --api-url flag > TELECHAT_API_URL env var > config file value.
    pub fn resolve_endpoint(&self, config_endpoint: &str) -> String {
        pick_endpoint(
            self.api_url.clone(),
            std::env::var("TELECHAT_API_URL").ok(),
            config_endpoint,
        )
    }
}

fn pick_config_path(flag: Option<PathBuf>, env: Option<String>, home: Option<String>) -> PathBuf {
    if let Some(p) = flag {
        return p;
    }
    if let Some(p) = env.filter(|p| !p.is_empty()) {
        return PathBuf::from(p);
    }
    match home {
        Some(home) => PathBuf::from(home).join(".telechat").join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}

fn pick_endpoint(flag: Option<String>, env: Option<String>, config_endpoint: &str) -> String {
    flag.or_else(|| env.filter(|e| !e.trim().is_empty()))
        .unwrap_or_else(|| config_endpoint.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::parse_from([
            "telechat",
            "-c",
            "/tmp/t.toml",
            "--api-url",
            "http://10.0.0.5:8000/local/chat",
            "--user-id",
            "alice",
            "-l",
            "debug",
            "--no-tts",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/t.toml")));
        assert_eq!(args.api_url.as_deref(), Some("http://10.0.0.5:8000/local/chat"));
        assert_eq!(args.user_id.as_deref(), Some("alice"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.no_tts);
    }

    #[test]
    fn test_defaults() {
        let args = CliArgs::parse_from(["telechat"]);
        assert!(args.config.is_none());
        assert!(args.api_url.is_none());
        assert!(!args.no_tts);
    }

    #[test]
    fn test_config_path_priority() {
        let flag = Some(PathBuf::from("/a.toml"));
        assert_eq!(
            pick_config_path(flag, Some("/b.toml".into()), Some("/home/u".into())),
            PathBuf::from("/a.toml")
        );
        assert_eq!(
            pick_config_path(None, Some("/b.toml".into()), Some("/home/u".into())),
            PathBuf::from("/b.toml")
        );
        assert_eq!(
            pick_config_path(None, None, Some("/home/u".into())),
            PathBuf::from("/home/u/.telechat/config.toml")
        );
        assert_eq!(pick_config_path(None, None, None), PathBuf::from("config.toml"));
    }

    #[test]
    fn test_endpoint_priority() {
        let config = "http://127.0.0.1:8000/local/chat";
        assert_eq!(
            pick_endpoint(Some("http://flag".into()), Some("http://env".into()), config),
            "http://flag"
        );
        assert_eq!(pick_endpoint(None, Some("http://env".into()), config), "http://env");
        assert_eq!(pick_endpoint(None, Some("  ".into()), config), config);
        assert_eq!(pick_endpoint(None, None, config), config);
    }
}
