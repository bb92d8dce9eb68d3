//! Handles settings for the application. Configuration is written in
//! `settings.toml` and can be overridden with `MILKMONITOR_`-prefixed
//! environment variables (`MILKMONITOR_SERVER__PORT=4000`).
//!
//! See `settings.toml` for the configuration.
use chrono::TimeDelta;
use config::{Config, ConfigError, Environment, File};
use engine::MAX_SESSION_TTL_SECS;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// Where records and sessions are persisted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    /// Session lifetime in seconds.
    pub session_ttl_secs: Option<i64>,
}

impl Server {
    /// The configured session lifetime, if any.
    ///
    /// Values outside `1..=MAX_SESSION_TTL_SECS` are a configuration error.
    pub fn session_ttl(&self) -> Result<Option<TimeDelta>, ConfigError> {
        match self.session_ttl_secs {
            None => Ok(None),
            Some(secs) if (1..=MAX_SESSION_TTL_SECS).contains(&secs) => {
                Ok(TimeDelta::try_seconds(secs))
            }
            Some(secs) => Err(ConfigError::Message(format!(
                "server.session_ttl_secs must be between 1 and {MAX_SESSION_TTL_SECS}, got {secs}"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(
            Config::builder()
                .add_source(File::with_name("settings").required(false))
                .add_source(
                    Environment::with_prefix("MILKMONITOR")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    fn from_config(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Settings {
        Settings::from_config(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
            .unwrap()
    }

    #[test]
    fn sqlite_server() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            port = 3000
            database = { sqlite = "./milkmonitor.db" }
            session_ttl_secs = 600
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        let server = settings.server.unwrap();
        assert_eq!(server.port, 3000);
        assert!(matches!(server.database, Database::Sqlite(ref p) if p == "./milkmonitor.db"));
        assert_eq!(server.session_ttl_secs, Some(600));
        assert_eq!(server.session_ttl().unwrap(), Some(TimeDelta::minutes(10)));
    }

    #[test]
    fn session_ttl_out_of_range_is_rejected() {
        for ttl in ["0", "-60", "31536001", "9223372036854775807"] {
            let settings = parse(&format!(
                r#"
                [server]
                port = 3000
                database = "memory"
                session_ttl_secs = {ttl}
                "#
            ));
            assert!(settings.server.unwrap().session_ttl().is_err(), "{ttl}");
        }
    }

    #[test]
    fn defaults() {
        let settings = parse(
            r#"
            [server]
            port = 3000
            database = "memory"
            "#,
        );
        assert_eq!(settings.app.level, "info");
        let server = settings.server.unwrap();
        assert!(server.bind.is_none());
        assert!(matches!(server.database, Database::Memory));
        assert_eq!(server.session_ttl().unwrap(), None);
    }
}
