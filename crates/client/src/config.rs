use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    local_state,
};

pub const DEFAULT_CONFIG_PATH: &str = "config/cli.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    /// IANA zone deciding what "today" is for trailing windows.
    pub timezone: String,
    pub state_path: String,
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            timezone: "America/Sao_Paulo".to_string(),
            state_path: local_state::default_state_path().to_string(),
            level: "warn".to_string(),
        }
    }
}

/// Values given on the command line; they win over file and environment.
#[derive(Debug, Default, Clone, clap::Args)]
pub struct Overrides {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:3000).
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// Override timezone (IANA name).
    #[arg(long, global = true)]
    pub timezone: Option<String>,
    /// Override the local state file.
    #[arg(long, global = true)]
    pub state_path: Option<String>,
    /// Override the log level.
    #[arg(long, global = true)]
    pub level: Option<String>,
}

impl AppConfig {
    pub fn load(overrides: Overrides) -> Result<Self> {
        let config_path = overrides.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let mut builder = config::Config::builder();
        builder = builder.add_source(config::File::with_name(config_path).required(false));
        builder = builder.add_source(config::Environment::with_prefix("MILKMONITOR_CLI"));
        let mut settings: AppConfig = builder.build()?.try_deserialize()?;
        settings.apply(overrides);
        Ok(settings)
    }

    fn apply(&mut self, overrides: Overrides) {
        if let Some(base_url) = overrides.base_url {
            self.base_url = base_url;
        }
        if let Some(timezone) = overrides.timezone {
            self.timezone = timezone;
        }
        if let Some(state_path) = overrides.state_path {
            self.state_path = state_path;
        }
        if let Some(level) = overrides.level {
            self.level = level;
        }
    }

    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|err| AppError::Terminal(format!("invalid timezone {}: {err}", self.timezone)))
    }

    /// Today's calendar date in the configured zone.
    pub fn today(&self) -> Result<NaiveDate> {
        Ok(chrono::Utc::now().with_timezone(&self.tz()?).date_naive())
    }
}
