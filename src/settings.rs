use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

/// Process settings, read once at startup. Every key can be overridden by
/// the upper-cased environment variable of the same name (`PORT`,
/// `MONGO_DETAILS`, `BCRYPT_COST`, ...).
#[derive(Debug, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub mongo_details: String,
    pub mongo_database: String,
    pub bcrypt_cost: u32,
    // Comma separated; empty allows no cross-origin callers
    cors_origins: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default())
    }

    fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8000)?
            .set_default("mongo_details", "mongodb://localhost:27017")?
            .set_default("mongo_database", "user_db")?
            .set_default("bcrypt_cost", bcrypt::DEFAULT_COST as i64)?
            .set_default("cors_origins", "")?
            .add_source(
                File::with_name("settings.toml")
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(environment)
            .build()?;

        let settings: Settings = config.try_deserialize()?;

        // bcrypt accepts costs 4..=31
        if !(4..=31).contains(&settings.bcrypt_cost) {
            return Err(ConfigError::Message(format!(
                "bcrypt_cost must be between 4 and 31, got {}",
                settings.bcrypt_cost
            )));
        }

        Ok(settings)
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
