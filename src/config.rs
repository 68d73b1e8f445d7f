//! Process configuration, read once at startup.
//!
//! `Config` is built from the environment by `Config::from_env`, which delegates to
//! `Config::from_lookup` so the parsing rules can be exercised without touching the
//! process environment.

use sentry::types::Dsn;
use std::env;
use std::fmt;
use std::str::FromStr;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_TRACES_SAMPLE_RATE: f32 = 1.0;
/// Same default body limit as a typical Express `json()` parser: 100kb.
const DEFAULT_BODY_LIMIT: usize = 100 * 1024;

/// Errors raised while assembling the startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    Missing(&'static str),
    /// A variable is set but cannot be parsed.
    Invalid { key: &'static str, value: String },
    /// A route table entry is malformed or duplicated.
    InvalidMount(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => write!(f, "{} has an invalid value: {:?}", key, value),
            ConfigError::InvalidMount(msg) => write!(f, "invalid route mount: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    /// `None` disables error tracking.
    pub sentry_dsn: Option<Dsn>,
    pub traces_sample_rate: f32,
    /// Maximum accepted size of JSON and URL-encoded bodies, in bytes.
    pub body_limit: usize,
    /// Number of HTTP workers; `None` lets actix pick one per CPU.
    pub workers: Option<usize>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let server_port = parse_or(get("PORT"), "PORT", DEFAULT_PORT)?;
        let server_host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let sentry_dsn = match get("SENTRY_DSN") {
            Some(raw) => Some(Dsn::from_str(raw.trim()).map_err(|_| ConfigError::Invalid {
                key: "SENTRY_DSN",
                value: raw,
            })?),
            None => None,
        };

        let traces_sample_rate = parse_or(
            get("SENTRY_TRACES_SAMPLE_RATE"),
            "SENTRY_TRACES_SAMPLE_RATE",
            DEFAULT_TRACES_SAMPLE_RATE,
        )?;
        if !(0.0..=1.0).contains(&traces_sample_rate) {
            return Err(ConfigError::Invalid {
                key: "SENTRY_TRACES_SAMPLE_RATE",
                value: traces_sample_rate.to_string(),
            });
        }

        let body_limit = parse_or(get("BODY_LIMIT"), "BODY_LIMIT", DEFAULT_BODY_LIMIT)?;
        let workers = match get("WORKERS") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => Some(n),
                _ => return Err(ConfigError::Invalid { key: "WORKERS", value: raw }),
            },
            None => None,
        };

        Ok(Self {
            server_host,
            server_port,
            database_url,
            jwt_secret,
            sentry_dsn,
            traces_sample_rate,
            body_limit,
            workers,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://localhost:{}", self.server_port)
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
