use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

use crate::domain::DomainError;

/// Key under which the API credential is looked up.
pub const API_KEY_NAME: &str = "OPENAI_API_KEY";

/// Shown when no credential can be found; startup stops here.
pub const MISSING_KEY_MESSAGE: &str = "OpenAI API 키가 설정되어 있지 않습니다. \
환경 변수 또는 secrets.toml에 OPENAI_API_KEY를 추가하세요.";

/// API key for the completion service. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredential(String);

impl ApiCredential {
    /// Looks up [`API_KEY_NAME`] in the process environment, then in the
    /// TOML `secrets_file` when one is given. Empty values count as absent.
    pub fn load(secrets_file: Option<&Path>) -> Result<Self, DomainError> {
        Self::resolve(std::env::var(API_KEY_NAME).ok(), secrets_file)
    }

    fn resolve(env_value: Option<String>, secrets_file: Option<&Path>) -> Result<Self, DomainError> {
        if let Some(key) = non_empty(env_value) {
            debug!("Using {} from environment", API_KEY_NAME);
            return Ok(Self(key));
        }

        if let Some(path) = secrets_file {
            if let Some(key) = non_empty(read_secrets_file(path)) {
                debug!("Using {} from {}", API_KEY_NAME, path.display());
                return Ok(Self(key));
            }
        }

        Err(DomainError::configuration(MISSING_KEY_MESSAGE))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(***)")
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn read_secrets_file(path: &Path) -> Option<String> {
    if !path.exists() {
        debug!("No secrets file at {}", path.display());
        return None;
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read secrets file {}: {}", path.display(), e);
            return None;
        }
    };

    let table: toml::Table = match toml::from_str(&content) {
        Ok(table) => table,
        Err(e) => {
            warn!("Failed to parse secrets file {}: {}", path.display(), e);
            return None;
        }
    };

    table
        .get(API_KEY_NAME)
        .and_then(toml::Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn secrets_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn environment_value_wins() {
        let file = secrets_file(r#"OPENAI_API_KEY = "from-file""#);
        let credential =
            ApiCredential::resolve(Some("from-env".to_string()), Some(file.path())).unwrap();
        assert_eq!(credential.expose(), "from-env");
    }

    #[test]
    fn secrets_file_is_used_when_environment_is_empty() {
        let file = secrets_file("OPENAI_API_KEY = \"sk-file\"\nOTHER = 1\n");
        let credential = ApiCredential::resolve(Some("  ".to_string()), Some(file.path())).unwrap();
        assert_eq!(credential.expose(), "sk-file");
    }

    #[test]
    fn missing_everywhere_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("secrets.toml");

        let err = ApiCredential::resolve(None, Some(absent.as_path())).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains(MISSING_KEY_MESSAGE));

        assert!(ApiCredential::resolve(None, None).is_err());
    }

    #[test]
    fn malformed_or_mistyped_file_counts_as_absent() {
        let broken = secrets_file("OPENAI_API_KEY = ");
        assert!(ApiCredential::resolve(None, Some(broken.path())).is_err());

        let wrong_type = secrets_file("OPENAI_API_KEY = 12345");
        assert!(ApiCredential::resolve(None, Some(wrong_type.path())).is_err());
    }

    #[test]
    fn debug_redacts_the_key() {
        let credential = ApiCredential("sk-secret".to_string());
        assert_eq!(format!("{:?}", credential), "ApiCredential(***)");
    }
}
