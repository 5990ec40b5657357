//! Store configuration.
//!
//! ## Load order (later overrides earlier)
//! 1. Default values
//! 2. TOML config file
//! 3. Environment variables (`NUTRI_SEED_DEMO`, `NUTRI_MIN_PASSWORD_LENGTH`,
//!    `NUTRI_SEARCH_LIMIT`)
//!
//! ## File format
//! ```toml
//! [store]
//! seed_demo_data = true
//!
//! [auth]
//! min_password_length = 8
//! hash_memory_kib = 19456
//! hash_iterations = 2
//! hash_parallelism = 1
//!
//! [search]
//! limit = 20
//! min_score = 0.7
//!
//! [theme]
//! app_bg = "#020617"
//! card_bg = "#0f172a"
//! text_color = "#f1f5f9"
//! primary_color = "#2563eb"
//! font_family = "'Inter', sans-serif"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::ThemeConfig;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Roster settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreSettings {
    /// Load the demo roster on startup
    #[serde(default = "default_true")]
    pub seed_demo_data: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            seed_demo_data: true,
        }
    }
}

/// Password policy and Argon2 cost.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSettings {
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,

    /// Argon2 memory cost in KiB
    #[serde(default = "default_hash_memory")]
    pub hash_memory_kib: u32,

    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,

    #[serde(default = "default_hash_parallelism")]
    pub hash_parallelism: u32,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            min_password_length: default_min_password_length(),
            hash_memory_kib: default_hash_memory(),
            hash_iterations: default_hash_iterations(),
            hash_parallelism: default_hash_parallelism(),
        }
    }
}

impl AuthSettings {
    /// Low-cost hashing for tests and demo seeding.
    pub fn fast() -> Self {
        Self {
            hash_memory_kib: 1024,
            hash_iterations: 1,
            ..Self::default()
        }
    }
}

/// Roster search tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchSettings {
    #[serde(default = "default_search_limit")]
    pub limit: usize,

    /// Minimum fuzzy score (0.0 - 1.0) for a hit
    #[serde(default = "default_min_score")]
    pub min_score: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            limit: default_search_limit(),
            min_score: default_min_score(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_min_password_length() -> usize {
    8
}
fn default_hash_memory() -> u32 {
    19 * 1024
}
fn default_hash_iterations() -> u32 {
    2
}
fn default_hash_parallelism() -> u32 {
    1
}
fn default_search_limit() -> usize {
    20
}
fn default_min_score() -> f64 {
    0.7
}

/// Complete configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NutriConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub search: SearchSettings,

    /// Theme restored by a reset
    #[serde(default)]
    pub theme: ThemeConfig,
}

impl NutriConfig {
    /// Load from an optional file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(path)?;
                toml::from_str(&contents)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse from a TOML string (no environment overrides).
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.auth.min_password_length == 0 {
            return Err(ConfigError::Invalid(
                "min_password_length must be greater than 0".into(),
            ));
        }
        if self.auth.hash_iterations == 0 || self.auth.hash_parallelism == 0 {
            return Err(ConfigError::Invalid(
                "hash_iterations and hash_parallelism must be greater than 0".into(),
            ));
        }
        if self.auth.hash_memory_kib < 8 * self.auth.hash_parallelism {
            return Err(ConfigError::Invalid(
                "hash_memory_kib must be at least 8 * hash_parallelism".into(),
            ));
        }
        if self.search.limit == 0 {
            return Err(ConfigError::Invalid("search limit must be greater than 0".into()));
        }
        if !(0.0..=1.0).contains(&self.search.min_score) {
            return Err(ConfigError::Invalid(format!(
                "search min_score must be within 0.0..=1.0, got {}",
                self.search.min_score
            )));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("NUTRI_SEED_DEMO") {
            debug!(%value, "Overriding seed_demo_data from environment");
            self.store.seed_demo_data = matches!(value.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        if let Some(len) = env_parse::<usize>("NUTRI_MIN_PASSWORD_LENGTH") {
            debug!(len, "Overriding min_password_length from environment");
            self.auth.min_password_length = len;
        }

        if let Some(limit) = env_parse::<usize>("NUTRI_SEARCH_LIMIT") {
            debug!(limit, "Overriding search limit from environment");
            self.search.limit = limit;
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.parse().ok()
}
