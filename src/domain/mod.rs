//! # Domain Layer
//!
//! Conversation state, completion wire models, and reply extraction.
//! This layer is independent of external frameworks and infrastructure.

mod error;
pub mod models;

pub use error::*;
pub use models::*;
