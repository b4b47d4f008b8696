//! # dindinho-config
//!
//! Layered configuration loading for Dindinho using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`DINDINHO_*` prefix, `__` as separator)
//! 2. An explicit config file passed by the caller (`--config`)
//! 3. Project-level `./dindinho.toml`
//! 4. User-level `~/.config/dindinho/config.toml`
//! 5. Built-in defaults
//!
//! The config is built once at process start and handed to every component
//! that needs it. Nothing else in the workspace reads the environment.
//!
//! # Environment Variable Mapping
//!
//! Figment maps `DINDINHO_DATABASE__URL` -> `database.url`,
//! `DINDINHO_AUTH__JWT_SECRET` -> `auth.jwt_secret`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use dindinho_config::DindinhoConfig;
//!
//! let config = DindinhoConfig::load_with_dotenv(None).expect("config");
//! config.validate_for_server().expect("server config");
//! println!("listening on {}", config.server.bind_address());
//! ```

mod app;
mod auth;
mod database;
mod error;
mod server;

pub use app::{AppConfig, MAX_INVITE_TTL_DAYS};
pub use auth::{AuthConfig, MIN_SECRET_LEN};
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use server::ServerConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project-local config file name.
pub const LOCAL_CONFIG_FILE: &str = "dindinho.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DindinhoConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub app: AppConfig,
}

impl DindinhoConfig {
    /// Load configuration from defaults, TOML files and environment variables.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment(None).extract().map_err(ConfigError::from)
    }

    /// Load with an extra TOML file layered above the standard locations.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::figment(Some(path))
            .extract()
            .map_err(ConfigError::from)
    }

    /// Load `.env` from the current directory, then build the config with
    /// `explicit` layered as in [`Self::load_from`].
    ///
    /// A missing `.env` is fine; one that exists but does not parse is not.
    pub fn load_with_dotenv(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(ConfigError::Dotenv(e.to_string())),
        }
        match explicit {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can extract from it under a `figment::Jail`.
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed("DINDINHO_").split("__"))
    }

    /// Check the fields the HTTP server cannot run without.
    ///
    /// # Errors
    ///
    /// `NotConfigured` when the JWT secret is missing, `InvalidValue` when it is
    /// too short or the invite lifetime is outside `1..=MAX_INVITE_TTL_DAYS`.
    pub fn validate_for_server(&self) -> Result<(), ConfigError> {
        if !self.auth.is_configured() {
            return Err(ConfigError::not_configured("auth"));
        }
        if !self.auth.has_strong_secret() {
            return Err(ConfigError::invalid(
                "auth.jwt_secret",
                format!("must be at least {MIN_SECRET_LEN} characters"),
            ));
        }
        if !(1..=MAX_INVITE_TTL_DAYS).contains(&self.app.default_invite_ttl_days) {
            return Err(ConfigError::invalid(
                "app.default_invite_ttl_days",
                format!("must be between 1 and {MAX_INVITE_TTL_DAYS}"),
            ));
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dindinho").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_loads() {
        let config = DindinhoConfig::default();
        assert!(!config.auth.is_configured());
        assert_eq!(config.database.url, "dindinho.db");
        assert_eq!(config.server.port, 3333);
        assert_eq!(config.app.name, "dindinho-api");
    }

    #[test]
    fn validate_rejects_missing_secret() {
        let config = DindinhoConfig::default();
        assert!(matches!(
            config.validate_for_server(),
            Err(ConfigError::NotConfigured { section }) if section == "auth"
        ));
    }

    #[test]
    fn validate_rejects_weak_secret() {
        let mut config = DindinhoConfig::default();
        config.auth.jwt_secret = "too-short".into();
        assert!(matches!(
            config.validate_for_server(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "auth.jwt_secret"
        ));
    }

    #[test]
    fn validate_bounds_invite_ttl() {
        let mut config = DindinhoConfig::default();
        config.auth.jwt_secret = "x".repeat(MIN_SECRET_LEN);
        for days in [0, MAX_INVITE_TTL_DAYS + 1, u32::MAX] {
            config.app.default_invite_ttl_days = days;
            assert!(matches!(
                config.validate_for_server(),
                Err(ConfigError::InvalidValue { field, .. }) if field == "app.default_invite_ttl_days"
            ));
        }
        config.app.default_invite_ttl_days = MAX_INVITE_TTL_DAYS;
        assert!(config.validate_for_server().is_ok());
    }

    #[test]
    fn validate_accepts_strong_secret() {
        let mut config = DindinhoConfig::default();
        config.auth.jwt_secret = "x".repeat(MIN_SECRET_LEN);
        assert!(config.validate_for_server().is_ok());
    }
}
