//! Token signing configuration.

use serde::{Deserialize, Serialize};

/// Default token lifetime: one day.
const fn default_token_ttl_secs() -> u64 {
    86_400
}

fn default_issuer() -> String {
    "dindinho".to_string()
}

/// Shortest secret accepted for HS256 signing.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// HMAC secret for access tokens. Empty means auth routes cannot be served.
    #[serde(default)]
    pub jwt_secret: String,

    /// Access token lifetime in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,

    /// `iss` claim written to and required on tokens.
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: default_token_ttl_secs(),
            issuer: default_issuer(),
        }
    }
}

impl AuthConfig {
    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
    }

    pub fn has_strong_secret(&self) -> bool {
        self.jwt_secret.len() >= MIN_SECRET_LEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = AuthConfig::default();
        assert!(!config.is_configured());
        assert!(!config.has_strong_secret());
        assert_eq!(config.token_ttl_secs, 86_400);
        assert_eq!(config.issuer, "dindinho");
    }

    #[test]
    fn short_secret_is_configured_but_weak() {
        let config = AuthConfig {
            jwt_secret: "short".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
        assert!(!config.has_strong_secret());
    }
}
