use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Configuration - Environment driven, with defaults
// ============================================================================
//
// Values come from the process environment (a `.env` file is loaded first by
// `main`). Absent variables fall back to defaults; malformed values are
// errors. Without `DATABASE_URL` the service runs on the in-memory store.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub server: ServerConfig,
    pub database: Option<DatabaseConfig>,
    pub log: LogConfig,
    /// Deployment environment name, attached to every request span
    pub environment: String,
    /// Host name attached to every request span
    pub machine_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Worker count; actix-web picks one per core when unset
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// `EnvFilter` directives
    pub filter: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("unknown log format: {other}"),
        }
    }
}

pub const DEFAULT_LOG_FILTER: &str = "info,orders_service=debug,sqlx=warn";

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = match lookup("DATABASE_URL").filter(|url| !url.is_empty()) {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
                connect_timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "DATABASE_CONNECT_TIMEOUT",
                    30,
                )?),
            }),
            None => None,
        };

        Ok(Self {
            server: ServerConfig {
                host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&lookup, "APP_PORT", 8080)?,
                workers: parse_optional(&lookup, "APP_WORKERS")?,
            },
            database,
            log: LogConfig {
                filter: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
                format: parse_or(&lookup, "LOG_FORMAT", LogFormat::Text)?,
            },
            environment: lookup("APP_ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            machine_name: lookup("HOSTNAME")
                .or_else(|| lookup("COMPUTERNAME"))
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "localhost".to_string()),
        })
    }
}

fn parse_optional<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(None),
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_optional(lookup, key)?.unwrap_or(default))
}
