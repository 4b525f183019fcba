use anyhow::Result;
use chrono_tz::Tz;
use config::Config;
use serde::Deserialize;

use crate::constants::PRODUCT_ID;
use crate::error::{CoreError, CoreResult};


#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub calendar: CalendarConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    /// IANA name of the zone stored wall-clock times are expressed in.
    pub timezone: String,
    pub product_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Identity of the backing database, also the listing cache key.
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl CalendarConfig {
    /// ## Summary
    /// Resolves the configured local timezone.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` if the name is not a known IANA zone.
    pub fn local_timezone(&self) -> CoreResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| CoreError::ConfigError(format!("calendar.timezone: {e}")))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            calendar: CalendarConfig {
                timezone: "UTC".to_string(),
                product_id: PRODUCT_ID.to_string(),
            },
            database: DatabaseConfig {
                name: "kunai".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Settings {
    /// ## Summary
    /// Resolves the configured local timezone.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` if the name is not a known IANA zone.
    pub fn local_timezone(&self) -> CoreResult<Tz> {
        self.calendar.local_timezone()
    }

    /// ## Summary
    /// Loads configuration from defaults, an optional `config.toml` and
    /// `KUNAI__*` environment variables into a `Settings`.
    /// Environment variables take precedence over file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Self::builder()?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // Environment
            .add_source(
                config::Environment::with_prefix("KUNAI")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?)
    }

    fn builder() -> CoreResult<config::ConfigBuilder<config::builder::DefaultState>> {
        let defaults = Self::default();
        Ok(Config::builder()
            .set_default("calendar.timezone", defaults.calendar.timezone)?
            .set_default("calendar.product_id", defaults.calendar.product_id)?
            .set_default("database.name", defaults.database.name)?
            .set_default("logging.level", defaults.logging.level)?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    tracing::debug!(
        timezone = %settings.calendar.timezone,
        database = %settings.database.name,
        "Configuration loaded"
    );
    Ok(settings)
}
