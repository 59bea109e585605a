//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `warren.toml` in the working directory unless another path is
//! given. Every field has a default so the file is optional. Environment
//! variables take precedence over file values.

use std::path::Path;

use serde::Deserialize;
use warren_domain::id::FarmId;

/// Farm used when none is configured.
pub const DEFAULT_FARM_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database settings.
    pub database: DatabaseConfig,
    /// Which farm the commands act on.
    pub farm: FarmConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Farm scoping.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FarmConfig {
    /// Farm UUID. Every row, hutch and rabbit belongs to exactly one farm.
    pub id: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `path` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration does not validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("WARREN_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("WARREN_FARM_ID") {
            self.farm.id = val;
        }
        if let Ok(val) = std::env::var("WARREN_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database url must not be empty".to_string(),
            ));
        }
        self.farm_id()?;
        Ok(())
    }

    /// Return the configured farm.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when the id is not a UUID.
    pub fn farm_id(&self) -> Result<FarmId, ConfigError> {
        self.farm.id.trim().parse().map_err(|_| {
            ConfigError::Validation(format!("farm id {:?} is not a UUID", self.farm.id))
        })
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:warren.db".to_string(),
        }
    }
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_FARM_ID.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warren=info,warren_app=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.database_url(), "sqlite:warren.db");
        assert_eq!(config.farm.id, DEFAULT_FARM_ID);
        assert_eq!(config.logging.filter, "warren=info,warren_app=info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.database.url, "sqlite:warren.db");
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [database]
            url = 'sqlite:barn.db'

            [farm]
            id = '6f1c1f9e-2f4b-4c55-9d0a-1d3b8f0c2a11'

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.database.url, "sqlite:barn.db");
        assert_eq!(
            config.farm_id().unwrap().to_string(),
            "6f1c1f9e-2f4b-4c55-9d0a-1d3b8f0c2a11"
        );
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [farm]
            id = '6f1c1f9e-2f4b-4c55-9d0a-1d3b8f0c2a11'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.database.url, "sqlite:warren.db");
        assert_eq!(config.logging.filter, "warren=info,warren_app=info");
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file(Path::new("nonexistent.toml")).unwrap();
        assert_eq!(config.farm.id, DEFAULT_FARM_ID);
    }

    #[test]
    fn should_reject_farm_id_that_is_not_uuid() {
        let mut config = Config::default();
        config.farm.id = "north-field".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_empty_database_url() {
        let mut config = Config::default();
        config.database.url = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
