use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::application::CompletionService;
use crate::connector::adapter::ApiCredential;
use crate::domain::{CompletionRequest, CompletionResponse, DomainError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Error envelope returned by OpenAI-compatible servers.
#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// HTTP client for the OpenAI Chat Completions API (and compatible servers).
///
/// Implements [`CompletionService`]. Sends exactly one `POST` per call with
/// bearer authentication and maps failures onto [`DomainError`]:
///
/// | Condition                    | Error               |
/// |------------------------------|---------------------|
/// | transport failure            | `Network`           |
/// | `401` / `403`                | `Authentication`    |
/// | `429`                        | `RateLimited`       |
/// | any other non-2xx            | `Api`               |
/// | 2xx body that does not parse | `MalformedResponse` |
///
/// **Base URL**: defaults to `https://api.openai.com`. Override with
/// `OPENAI_BASE_URL` to target a compatible gateway or a local test server.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    /// Full endpoint URL (base + COMPLETIONS_PATH).
    url: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base: String = base_url.into();
        let url = format!("{}{}", base.trim_end_matches('/'), COMPLETIONS_PATH);
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            url,
        }
    }

    /// Builds a client for `credential`, reading `OPENAI_BASE_URL` from the
    /// environment and falling back to [`DEFAULT_BASE_URL`].
    pub fn from_credential(credential: &ApiCredential) -> Self {
        Self::new(credential.expose(), Self::configured_base_url())
    }

    /// Return the configured base URL (for logging purposes).
    pub fn configured_base_url() -> String {
        std::env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn classify_status(status: StatusCode, body: &str) -> DomainError {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .map(|parsed| parsed.error.message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            });

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DomainError::authentication(message),
            StatusCode::TOO_MANY_REQUESTS => DomainError::rate_limited(message),
            _ => DomainError::api(status.as_u16(), message),
        }
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, DomainError> {
        debug!("OpenAiClient: POST {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| DomainError::network(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("OpenAiClient: API returned {status}: {body}");
            return Err(Self::classify_status(status, &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DomainError::network(format!("failed to read response body: {e}")))?;

        serde_json::from_str::<CompletionResponse>(&body).map_err(|e| {
            warn!("OpenAiClient: failed to parse response: {e}");
            DomainError::malformed_response(format!("failed to parse response: {e}"))
        })
    }

    fn backend_name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_joins_base_and_path() {
        let client = OpenAiClient::new("sk-test", "http://localhost:8080/");
        assert_eq!(client.url(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn classify_status_prefers_server_message() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        let err = OpenAiClient::classify_status(StatusCode::UNAUTHORIZED, body);
        assert!(matches!(err, DomainError::Authentication(ref m) if m == "Incorrect API key provided"));
    }

    #[test]
    fn classify_status_falls_back_to_reason_phrase() {
        let err = OpenAiClient::classify_status(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert!(matches!(err, DomainError::Api { status: 502, ref message } if message == "Bad Gateway"));

        let err = OpenAiClient::classify_status(StatusCode::TOO_MANY_REQUESTS, "");
        assert!(matches!(err, DomainError::RateLimited(_)));
    }
}
