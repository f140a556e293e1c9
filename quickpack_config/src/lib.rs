use std::{net::IpAddr, path::Path};

use anyhow::Context;
use config::{File, FileFormat};
pub use duration::Duration;
use quickpack_models::email_address::EmailAddress;
use serde::Deserialize;

mod duration;

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

pub const CONFIG_PATH_ENV: &str = "QUICKPACK_CONFIG";

/// Environment variables that override individual config keys.
pub const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("NODE_ENV", "environment"),
    ("PORT", "http.port"),
    ("EMAIL_USER", "email.user"),
    ("EMAIL_PASS", "email.pass"),
    ("EMAIL_FROM", "email.from"),
    ("SENDGRID_API_KEY", "email.sendgrid_api_key"),
    ("EMAIL_USE_SSL", "email.use_ssl"),
    ("EMAIL_MAX_RETRIES", "email.max_retries"),
];

/// Load the config files listed in `QUICKPACK_CONFIG` (colon separated,
/// defaults to the bundled `config.toml`) and apply the environment overrides.
pub fn load() -> anyhow::Result<Config> {
    let paths = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let paths = paths.split(':').filter(|p| !p.is_empty()).collect::<Vec<_>>();

    load_with(&paths, |name| std::env::var(name).ok())
}

pub fn load_with(
    paths: &[impl AsRef<Path>],
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Config> {
    let builder = paths
        .iter()
        .try_fold(config::Config::builder(), |builder, path| {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file at {}", path.display()))?;
            let source = File::from_str(&content, FileFormat::Toml);
            anyhow::Ok(builder.add_source(source))
        })?;

    ENV_OVERRIDES
        .iter()
        .try_fold(builder, |builder, &(name, key)| {
            let value = env(name).filter(|value| !value.is_empty());
            builder
                .set_override_option(key, value)
                .with_context(|| format!("Failed to apply {name}"))
        })?
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub environment: Environment,
    pub http: HttpConfig,
    pub email: EmailConfig,
    pub contact: ContactConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
    /// Any other value of `NODE_ENV`, treated like production.
    Other,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

impl<'de> Deserialize<'de> for Environment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(match String::deserialize(deserializer)?.to_lowercase().as_str() {
            "development" => Self::Development,
            "production" => Self::Production,
            "test" => Self::Test,
            _ => Self::Other,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Sender address, defaults to `user`.
    pub from: Option<EmailAddress>,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub sendgrid_api_key: Option<String>,
    /// Only `false` (or the string `"false"`) disables implicit TLS.
    #[serde(default = "default_use_ssl", deserialize_with = "deserialize_use_ssl")]
    pub use_ssl: bool,
    pub max_retries: Option<u32>,
    pub retry_delay: Duration,
}

fn default_use_ssl() -> bool {
    true
}

fn deserialize_use_ssl<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Text(value) => value != "false",
    })
}

#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    /// The address all form submissions are relayed to.
    pub recipient: EmailAddress,
}
