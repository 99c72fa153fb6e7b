//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and from `FINLYTICS__*` environment variables
//! (e.g. `FINLYTICS__SERVER__PORT=8080`).
//!
//! See `settings.toml` for the configuration.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_SEED_COUNT: usize = 100;

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

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
}

/// Where the transactions come from.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    /// Generated transactions; a fixed `seed` makes the dataset reproducible.
    Seed { count: usize, seed: Option<u64> },
    /// JSON array of transactions.
    Json(String),
}

impl Default for Dataset {
    fn default() -> Self {
        Dataset::Seed {
            count: DEFAULT_SEED_COUNT,
            seed: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Query {
    #[serde(default = "default_window_days")]
    pub default_window_days: u32,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            default_window_days: default_window_days(),
        }
    }
}

fn default_window_days() -> u32 {
    engine::DEFAULT_WINDOW_DAYS
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub dataset: Dataset,
    #[serde(default)]
    pub query: Query,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("FINLYTICS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
