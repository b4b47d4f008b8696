//! libSQL database configuration.

use serde::{Deserialize, Serialize};

fn default_url() -> String {
    "dindinho.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Local database path, or `:memory:` for an ephemeral database.
    #[serde(default = "default_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: default_url() }
    }
}

impl DatabaseConfig {
    /// Whether the database lives only for the lifetime of the process.
    pub fn is_in_memory(&self) -> bool {
        self.url == ":memory:"
    }
}
