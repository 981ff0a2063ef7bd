use std::fmt::{Debug, Display};
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Service configuration, read once at startup and handed to the parts that
/// need it.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expires_days: i64,
    pub bcrypt_cost: u32,
    pub translate_url: String,
    pub translate_retry_backoff: Duration,
    pub geo_query_timeout: Duration,
    pub rate_limit_per_minute: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[cfg(test)]
    pub fn from_map(vars: &std::collections::HashMap<&str, &str>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        Ok(Self {
            host: env.parse("HOST", "0.0.0.0".to_string())?,
            port: env.parse("PORT", 5501)?,
            database_url: env.required("DATABASE_URL")?,
            db_max_connections: env.parse("DB_MAX_CONNECTIONS", 5)?,
            jwt_secret: env.required("JWT_SECRET")?,
            jwt_expires_days: env.bounded("JWT_EXPIRES_DAYS", 7, 1..=3650)?,
            bcrypt_cost: env.bounded("BCRYPT_COST", 10, 4..=31)?,
            translate_url: env.parse("TRANSLATE_URL", "http://localhost:5000".to_string())?,
            translate_retry_backoff: Duration::from_millis(
                env.parse("TRANSLATE_RETRY_BACKOFF_MS", 2000)?,
            ),
            geo_query_timeout: Duration::from_millis(env.parse("GEO_QUERY_TIMEOUT_MS", 2000)?),
            rate_limit_per_minute: env.bounded("RATE_LIMIT_PER_MINUTE", 10, 1..=100_000)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

struct Env<L> {
    lookup: L,
}

impl<L> Env<L>
where
    L: Fn(&str) -> Option<String>,
{
    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        (self.lookup)(key)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(key))
    }

    fn parse<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr + Display,
        T::Err: Display,
    {
        match (self.lookup)(key) {
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                message: e.to_string(),
            }),
            None => {
                info!("{} not set, using default: {}", key, default);
                Ok(default)
            }
        }
    }

    fn bounded<T>(&self, key: &'static str, default: T, range: RangeInclusive<T>) -> Result<T, ConfigError>
    where
        T: FromStr + Display + Debug + PartialOrd,
        T::Err: Display,
    {
        let value = self.parse(key, default)?;
        if !range.contains(&value) {
            return Err(ConfigError::Invalid {
                key,
                message: format!("{} is outside {:?}", value, range),
            });
        }
        Ok(value)
    }
}
