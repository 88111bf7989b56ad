use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{DatabaseSettings, LoggingSettings, ServerSettings, Settings};

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
pub const ENV_PREFIX: &str = "CLINIC";

/// Loads the application settings.
///
/// Sources, lowest to highest precedence: built-in defaults, the TOML file at
/// `path` (optional, missing is fine), `CLINIC__SECTION__KEY` environment
/// variables, and finally `DATABASE_URL`. A `.env` file in the working
/// directory is read first so its entries take part as environment variables.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    if let Ok(env_file) = dotenvy::dotenv() {
        tracing::debug!(path = %env_file.display(), "Loaded .env file.");
    }
    let database_url = std::env::var("DATABASE_URL").ok();
    build_settings(path, database_url)
}

fn build_settings(path: &Path, database_url: Option<String>) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8000)?
        .set_default("database.url", "sqlite://clinic.sqlite")?
        .set_default("database.max_connections", 10)?
        .set_default("database.acquire_timeout_secs", 5)?
        .set_default("logging.level", "info")?
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("database.url", database_url)?
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    Ok(settings)
}
