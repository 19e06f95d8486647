use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;
use thiserror::Error;

use profetas_api::state::{DEFAULT_ACCOUNT, DEFAULT_BANK};
use profetas_core::loader::DEFAULT_MATCH_LIMIT;
use profetas_core::lock::LOCK_POLL_INTERVAL;
use profetas_core::submission::OrphanPolicy;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var} is required for the {backend} backend")]
    Missing { var: &'static str, backend: &'static str },

    #[error("{var}={value:?} is not valid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKind {
    Supabase { url: String, key: String },
    Sqlite { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backend: BackendKind,
    pub match_limit: u32,
    pub lock_poll: Duration,
    pub orphan_policy: OrphanPolicy,
    pub bank: String,
    pub account: String,
    pub timezone: Tz,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str, default: &str| lookup(var).unwrap_or_else(|| default.to_string());

        let backend = match get("PROFETAS_BACKEND", "supabase").to_ascii_lowercase().as_str() {
            "supabase" => BackendKind::Supabase {
                url: lookup("SUPABASE_URL").ok_or(ConfigError::Missing {
                    var: "SUPABASE_URL",
                    backend: "supabase",
                })?,
                key: lookup("SUPABASE_KEY").ok_or(ConfigError::Missing {
                    var: "SUPABASE_KEY",
                    backend: "supabase",
                })?,
            },
            "sqlite" => BackendKind::Sqlite {
                path: PathBuf::from(get("PROFETAS_DB_PATH", "profetas.db")),
            },
            other => {
                return Err(ConfigError::Invalid {
                    var: "PROFETAS_BACKEND",
                    value: other.to_string(),
                    reason: "expected supabase or sqlite".into(),
                });
            }
        };

        let lock_poll_secs: u64 = parse(
            "PROFETAS_LOCK_POLL_SECS",
            get("PROFETAS_LOCK_POLL_SECS", &LOCK_POLL_INTERVAL.as_secs().to_string()),
        )?;
        if lock_poll_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "PROFETAS_LOCK_POLL_SECS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            host: get("PROFETAS_HOST", "0.0.0.0"),
            port: parse("PROFETAS_PORT", get("PROFETAS_PORT", "3000"))?,
            backend,
            match_limit: parse(
                "PROFETAS_MATCH_LIMIT",
                get("PROFETAS_MATCH_LIMIT", &DEFAULT_MATCH_LIMIT.to_string()),
            )?,
            lock_poll: Duration::from_secs(lock_poll_secs),
            orphan_policy: parse("PROFETAS_ORPHAN_POLICY", get("PROFETAS_ORPHAN_POLICY", "keep"))?,
            bank: get("PROFETAS_BANK", DEFAULT_BANK),
            account: get("PROFETAS_ACCOUNT", DEFAULT_ACCOUNT),
            timezone: parse("PROFETAS_TIMEZONE", get("PROFETAS_TIMEZONE", "America/Mexico_City"))?,
        })
    }
}

fn parse<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::Invalid {
        var,
        reason: e.to_string(),
        value,
    })
}
