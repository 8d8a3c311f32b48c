//! Runtime configuration for the vitals server.
//!
//! Settings are read from the process environment. `main` loads a `.env` file
//! through `dotenv` first, so local development can keep them in a file.

use std::{env, time::Duration};

use thiserror::Error;

/// Default number of pooled Postgres connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
/// Default upper bound on a single readiness probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{0} must be set")]
    Missing(&'static str),
    /// A variable is set but cannot be parsed.
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// All settings needed to boot the server.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Postgres connection string (`DATABASE_URL`).
    pub database_url: String,
    /// Pool size (`DATABASE_MAX_CONNECTIONS`).
    pub max_connections: u32,
    /// Bind address (`APP_HOST`).
    pub host: String,
    /// Bind port (`APP_PORT`).
    pub port: u16,
    /// Bound on each readiness probe (`HEALTH_PROBE_TIMEOUT`, humantime syntax).
    pub probe_timeout: Duration,
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if `DATABASE_URL` is missing or any optional
    /// variable holds an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through an arbitrary lookup function.
    ///
    /// Tests use this to avoid mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => parse_number::<u32>("DATABASE_MAX_CONNECTIONS", raw)?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DATABASE_MAX_CONNECTIONS",
                value: "0".into(),
                reason: "pool needs at least one connection".into(),
            });
        }

        let host = lookup("APP_HOST").unwrap_or_else(|| "127.0.0.1".into());
        let port = match lookup("APP_PORT") {
            Some(raw) => parse_number::<u16>("APP_PORT", raw)?,
            None => 8080,
        };

        let probe_timeout = match lookup("HEALTH_PROBE_TIMEOUT") {
            Some(raw) => parse_timeout(raw)?,
            None => DEFAULT_PROBE_TIMEOUT,
        };

        Ok(Self {
            database_url,
            max_connections,
            host,
            port,
            probe_timeout,
        })
    }

    /// `host:port` string suitable for binding a listener.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T>(var: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        var,
        reason: e.to_string(),
        value: raw,
    })
}

fn parse_timeout(raw: String) -> Result<Duration, ConfigError> {
    let timeout = humantime::parse_duration(raw.trim()).map_err(|e| ConfigError::Invalid {
        var: "HEALTH_PROBE_TIMEOUT",
        reason: e.to_string(),
        value: raw.clone(),
    })?;
    if timeout.is_zero() {
        return Err(ConfigError::Invalid {
            var: "HEALTH_PROBE_TIMEOUT",
            value: raw,
            reason: "timeout must be greater than zero".into(),
        });
    }
    Ok(timeout)
}
