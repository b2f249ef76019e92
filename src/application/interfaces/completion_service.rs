use async_trait::async_trait;

use crate::domain::{CompletionRequest, CompletionResponse, DomainError};

/// The boundary to a hosted chat-completion model.
///
/// Implementors own transport, authentication and vendor wire details, and
/// classify failures into [`DomainError`] variants. One call is one request:
/// no retries, no streaming.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, DomainError>;

    /// Name of the backend, for logging.
    fn backend_name(&self) -> &str;
}
