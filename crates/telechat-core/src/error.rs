use thiserror::Error;

/// Top-level error type for the Telechat client.
///
/// Failures the binary cannot recover from: a bad config file, I/O on the
/// terminal, or a reply client that cannot be built.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TelechatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Reply service error: {0}")]
    Reply(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for TelechatError {
    fn from(err: toml::de::Error) -> Self {
        TelechatError::Config(err.to_string())
    }
}

/// A specialized `Result` type for Telechat operations.
pub type Result<T> = std::result::Result<T, TelechatError>;
