//! General application configuration.

use serde::{Deserialize, Serialize};

fn default_name() -> String {
    "dindinho-api".to_string()
}

/// Longest invite lifetime, matching the `expiresInDays` payload limit.
pub const MAX_INVITE_TTL_DAYS: u32 = 30;

/// Default invite lifetime in days.
const fn default_invite_ttl_days() -> u32 {
    7
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Name reported by `GET /health`.
    #[serde(default = "default_name")]
    pub name: String,

    /// Invite lifetime used when a request omits `expiresInDays`.
    #[serde(default = "default_invite_ttl_days")]
    pub default_invite_ttl_days: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            default_invite_ttl_days: default_invite_ttl_days(),
        }
    }
}
