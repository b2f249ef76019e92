use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DomainError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    pub fn api(status: u16, msg: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: msg.into(),
        }
    }

    pub fn malformed_response(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// True for every failure of the remote call itself, as opposed to
    /// local configuration or input problems.
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            Self::Network(_)
                | Self::Authentication(_)
                | Self::RateLimited(_)
                | Self::Api { .. }
                | Self::MalformedResponse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_failures_are_classified() {
        assert!(DomainError::network("refused").is_request_failure());
        assert!(DomainError::authentication("bad key").is_request_failure());
        assert!(DomainError::rate_limited("slow down").is_request_failure());
        assert!(DomainError::api(500, "boom").is_request_failure());
        assert!(DomainError::malformed_response("eof").is_request_failure());

        assert!(!DomainError::configuration("missing").is_request_failure());
        assert!(!DomainError::invalid_input("empty").is_request_failure());
    }

    #[test]
    fn api_error_displays_status_and_message() {
        let err = DomainError::api(503, "Service Unavailable");
        assert_eq!(err.to_string(), "API returned 503: Service Unavailable");
    }
}
