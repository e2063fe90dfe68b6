//! Shared building blocks for the Telechat assistant client.
//!
//! Holds the conversation data model, the TOML configuration layer and the
//! top-level error type that the other crates convert into.

pub mod config;
pub mod error;
pub mod types;

pub use config::TelechatConfig;
pub use error::{Result, TelechatError};
pub use types::*;
