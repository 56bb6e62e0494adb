use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text::secret_prefix;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResource {
    pub key: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectCreation {
    Created,
    AlreadyExisted,
}

impl ProjectCreation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::AlreadyExisted => "already_existed",
        }
    }
}

/// Token issued by the service. The secret is only returned at generation
/// time and cannot be read back later.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub name: String,
    secret: String,
    pub created_at: DateTime<Utc>,
}

impl AuthToken {
    #[must_use]
    pub fn new(name: impl Into<String>, secret: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            secret: secret.into(),
            created_at,
        }
    }

    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    #[must_use]
    pub fn summary(&self) -> AuthTokenSummary {
        AuthTokenSummary {
            name: self.name.clone(),
            secret_prefix: secret_prefix(&self.secret, 8),
            created_at: self.created_at.to_rfc3339(),
        }
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokenSummary {
    pub name: String,
    pub secret_prefix: String,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secret() {
        let token = AuthToken::new("local-scan-token", "squ_0123456789abcdef", Utc::now());
        let rendered = format!("{token:?}");
        assert!(rendered.contains("local-scan-token"));
        assert!(!rendered.contains("squ_0123456789abcdef"));
        assert_eq!(token.summary().secret_prefix, "squ_0123...");
    }
}
