//! # configs
//!
//! Layered runtime settings. Later sources win:
//!
//! 1. built-in defaults
//! 2. `config/default.toml`, then `config/local.toml` (both optional)
//! 3. environment variables such as `PB__SERVER__PORT=9000`
//!    (a `.env` file in the working directory is loaded first)

use chrono::Duration;
use config::{Config, Environment, File};
use pb_core::policy::{CatalogPolicy, CurationPolicy, LifecyclePolicy};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub log: LogSettings,
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Comma separated; `*` allows any origin
    pub allowed_origins: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            allowed_origins: "*".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    /// Keeps everything in process memory; for demos and tests
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub backend: StoreBackend,
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            url: "sqlite:proposal_board.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `EnvFilter` directives, used when `RUST_LOG` is unset
    pub filter: String,
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub candidate_pool_size: usize,
    pub vote_window_hours: u32,
    pub listing_window_hours: u32,
    pub best_response_pool: usize,
    pub neck_and_neck_margin: u8,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            candidate_pool_size: 50,
            vote_window_hours: 24,
            listing_window_hours: 24 * 7,
            best_response_pool: 5,
            neck_and_neck_margin: 10,
        }
    }
}

impl CatalogSettings {
    pub fn policy(&self) -> CatalogPolicy {
        CatalogPolicy {
            lifecycle: LifecyclePolicy {
                vote_window: Duration::hours(i64::from(self.vote_window_hours)),
                listing_window: Duration::hours(i64::from(self.listing_window_hours)),
            },
            curation: CurationPolicy {
                candidate_pool_size: self.candidate_pool_size,
                best_response_pool: self.best_response_pool,
                neck_and_neck_margin: self.neck_and_neck_margin,
            },
        }
    }
}

impl Settings {
    /// Loads `.env`, the optional config files and `PB__*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_env(Environment::with_prefix("PB"))
    }

    fn from_env(env: Environment) -> Result<Self, ConfigError> {
        let raw = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(env.prefix_separator("__").separator("__").try_parsing(true))
            .build()?;

        let settings: Settings = raw.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let catalog = &self.catalog;
        if catalog.candidate_pool_size == 0 {
            return Err(invalid("catalog.candidate_pool_size", "must be at least 1"));
        }
        if catalog.best_response_pool == 0 {
            return Err(invalid("catalog.best_response_pool", "must be at least 1"));
        }
        if catalog.vote_window_hours == 0 || catalog.listing_window_hours == 0 {
            return Err(invalid("catalog.*_window_hours", "windows must be positive"));
        }
        if catalog.neck_and_neck_margin > 100 {
            return Err(invalid("catalog.neck_and_neck_margin", "is a percentage, at most 100"));
        }
        if catalog.vote_window_hours > catalog.listing_window_hours {
            // Trusted as configured, but almost certainly a typo.
            tracing::warn!(
                vote = catalog.vote_window_hours,
                listing = catalog.listing_window_hours,
                "vote window outlasts listing window"
            );
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}

fn invalid(key: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.to_string(),
    }
}
