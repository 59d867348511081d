//! Runtime configuration read from the environment.
//!
//! A `.env` file in the working directory is loaded first (if present), then every
//! setting is read from a `FRANCHISE_*` variable with a default. A value that is set
//! but cannot be parsed stops startup instead of silently falling back.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Shortest generated customer password accepted from the environment.
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}")]
    Invalid { key: String, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub db_busy_timeout: Duration,
    pub json_limit: usize,
    pub mail: MailConfig,
    pub outbox: OutboxConfig,
    pub workflow: WorkflowSettings,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    /// HTTP relay endpoint. Without one, mails are only logged.
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct OutboxConfig {
    pub interval: Duration,
    pub max_attempts: u32,
    pub batch: usize,
}

/// Knobs of the workflow engine that end up in generated credentials and mail text.
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub customer_id_prefix: String,
    pub customer_id_attempts: u32,
    pub password_length: usize,
    pub portal_url: String,
    pub approval_fee: u64,
    pub agreement_fee: u64,
    pub one_time_fee: u64,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        WorkflowSettings {
            customer_id_prefix: "VOL_".to_string(),
            customer_id_attempts: 8,
            password_length: 12,
            portal_url: "http://127.0.0.1:8080".to_string(),
            approval_fee: 25_000,
            agreement_fee: 50_000,
            one_time_fee: 100_000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = WorkflowSettings::default();
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            host: text("FRANCHISE_HOST", "127.0.0.1"),
            port: parse(&lookup, "FRANCHISE_PORT", 8080)?,
            database_path: text("FRANCHISE_DB_PATH", "franchise.sqlite"),
            db_busy_timeout: Duration::from_millis(parse(
                &lookup,
                "FRANCHISE_DB_BUSY_TIMEOUT_MS",
                5_000,
            )?),
            json_limit: parse(&lookup, "FRANCHISE_JSON_LIMIT_BYTES", 10 * 1024 * 1024)?,
            mail: MailConfig {
                endpoint: lookup("FRANCHISE_MAIL_ENDPOINT").filter(|v| !v.trim().is_empty()),
                api_key: lookup("FRANCHISE_MAIL_API_KEY").filter(|v| !v.trim().is_empty()),
                from: text("FRANCHISE_MAIL_FROM", "no-reply@franchise.local"),
                timeout: Duration::from_millis(at_least(
                    "FRANCHISE_MAIL_TIMEOUT_MS",
                    parse(&lookup, "FRANCHISE_MAIL_TIMEOUT_MS", 10_000)?,
                    1,
                )?),
            },
            outbox: OutboxConfig {
                interval: Duration::from_secs(at_least(
                    "FRANCHISE_OUTBOX_INTERVAL_SECS",
                    parse(&lookup, "FRANCHISE_OUTBOX_INTERVAL_SECS", 60)?,
                    1,
                )?),
                max_attempts: parse(&lookup, "FRANCHISE_OUTBOX_MAX_ATTEMPTS", 5)?,
                batch: at_least(
                    "FRANCHISE_OUTBOX_BATCH",
                    parse(&lookup, "FRANCHISE_OUTBOX_BATCH", 25)?,
                    1,
                )?,
            },
            workflow: WorkflowSettings {
                customer_id_prefix: text(
                    "FRANCHISE_CUSTOMER_ID_PREFIX",
                    &defaults.customer_id_prefix,
                ),
                customer_id_attempts: parse(
                    &lookup,
                    "FRANCHISE_CUSTOMER_ID_ATTEMPTS",
                    defaults.customer_id_attempts,
                )?,
                password_length: at_least(
                    "FRANCHISE_PASSWORD_LENGTH",
                    parse(&lookup, "FRANCHISE_PASSWORD_LENGTH", defaults.password_length)?,
                    MIN_PASSWORD_LENGTH,
                )?,
                portal_url: text("FRANCHISE_PORTAL_URL", &defaults.portal_url),
                approval_fee: parse(&lookup, "FRANCHISE_APPROVAL_FEE", defaults.approval_fee)?,
                agreement_fee: parse(&lookup, "FRANCHISE_AGREEMENT_FEE", defaults.agreement_fee)?,
                one_time_fee: parse(&lookup, "FRANCHISE_ONE_TIME_FEE", defaults.one_time_fee)?,
            },
        })
    }
}

/// Rejects values below `min`, reporting them like unparseable ones.
fn at_least<T>(key: &str, value: T, min: T) -> Result<T, ConfigError>
where
    T: PartialOrd + Display,
{
    if value < min {
        return Err(ConfigError::Invalid {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn parse<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value: raw,
        }),
    }
}
