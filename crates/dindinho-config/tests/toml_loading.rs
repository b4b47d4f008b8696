//! Integration tests for TOML and environment configuration loading.
//!
//! Uses figment::Jail for sandboxed env vars and working directory.

use dindinho_config::{ConfigError, DindinhoConfig};
use figment::Jail;
use pretty_assertions::assert_eq;

#[test]
fn loads_sections_from_local_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "dindinho.toml",
            r#"
[database]
url = "./data/app.db"

[auth]
jwt_secret = "a-very-long-secret-value-for-tests-0001"
token_ttl_secs = 3600

[server]
host = "0.0.0.0"
port = 8080

[app]
name = "dindinho-staging"
default_invite_ttl_days = 14
"#,
        )?;

        let config = DindinhoConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config.database.url, "./data/app.db");
        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert!(config.auth.has_strong_secret());
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.app.name, "dindinho-staging");
        assert_eq!(config.app.default_invite_ttl_days, 14);
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "dindinho.toml",
            r#"
[server]
port = 8080
"#,
        )?;
        jail.set_env("DINDINHO_SERVER__PORT", "9090");
        jail.set_env("DINDINHO_DATABASE__URL", ":memory:");

        let config = DindinhoConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config.server.port, 9090);
        assert!(config.database.is_in_memory());
        Ok(())
    });
}

#[test]
fn explicit_file_beats_local_file() {
    Jail::expect_with(|jail| {
        jail.create_file("dindinho.toml", "[app]\nname = \"local\"\n")?;
        jail.create_file("override.toml", "[app]\nname = \"explicit\"\n")?;

        let config = DindinhoConfig::load_from(std::path::Path::new("override.toml"))
            .map_err(|e| e.to_string())?;
        assert_eq!(config.app.name, "explicit");
        Ok(())
    });
}

#[test]
fn partial_sections_keep_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file("dindinho.toml", "[auth]\nissuer = \"dindinho-test\"\n")?;

        let config = DindinhoConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config.auth.issuer, "dindinho-test");
        assert_eq!(config.auth.token_ttl_secs, 86_400);
        assert_eq!(config.server.port, 3333);
        Ok(())
    });
}

#[test]
fn dotenv_is_loaded_before_layers() {
    Jail::expect_with(|jail| {
        jail.create_file(".env", "DINDINHO_CONFIG_TEST_DOTENV_MARKER=loaded\n")?;
        jail.create_file("override.toml", "[app]\nname = \"explicit\"\n")?;

        let config = DindinhoConfig::load_with_dotenv(Some(std::path::Path::new("override.toml")))
            .map_err(|e| e.to_string())?;
        assert_eq!(config.app.name, "explicit");
        assert_eq!(
            std::env::var("DINDINHO_CONFIG_TEST_DOTENV_MARKER").as_deref(),
            Ok("loaded")
        );
        Ok(())
    });
}

#[test]
fn malformed_dotenv_is_an_error() {
    Jail::expect_with(|jail| {
        jail.create_file(".env", "this is not a dotenv line\n")?;

        let err = DindinhoConfig::load_with_dotenv(None).unwrap_err();
        assert!(matches!(err, ConfigError::Dotenv(_)), "{err}");
        Ok(())
    });
}
