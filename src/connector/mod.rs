//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Completion (OpenAI HTTP client, offline mock)
//! - Credential loading (environment, TOML secrets file)

pub mod adapter;

pub use adapter::*;
