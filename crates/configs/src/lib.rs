//! # configs
//!
//! Layered runtime configuration for rusty-feed.
//!
//! Precedence, lowest first:
//! 1. built-in defaults
//! 2. `config/default.toml`, then `config/{RUSTY_FEED_ENV}.toml` (both optional)
//! 3. `RUSTY_FEED__SECTION__KEY` environment variables
//! 4. a bare `PORT` variable, which overrides `server.port`
//!
//! `DATABASE_URL` is used when `store.database_url` is not set anywhere else.
//! A `.env` file is loaded into the process environment first.

use config::{Config, Environment, File, Map};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

pub const ENV_PREFIX: &str = "RUSTY_FEED";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub interactions: InteractionSettings,
    pub notifications: NotificationSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub database_url: Option<SecretString>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionSettings {
    /// Upper bound on compare-and-swap attempts per toggle
    pub max_toggle_retries: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationSettings {
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    pub format: LogFormat,
    /// `EnvFilter` directives; `RUST_LOG` takes precedence when set
    pub filter: String,
}

impl Settings {
    /// Loads `.env`, then every configuration layer from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                tracing::warn!(error = %err, "ignoring unreadable .env file");
            }
        }
        Self::from_env(None)
    }

    /// Builds settings from `vars` instead of the process environment when given.
    pub fn from_env(vars: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        let lookup = |key: &str| match &vars {
            Some(map) => map.get(key).cloned(),
            None => std::env::var(key).ok(),
        };
        let profile = lookup("RUSTY_FEED_ENV").unwrap_or_else(|| "local".to_string());

        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("store.backend", "memory")?
            .set_default("store.max_connections", 5)?
            .set_default("store.acquire_timeout_secs", 5)?
            .set_default("interactions.max_toggle_retries", 16)?
            .set_default("notifications.keywords", vec!["cricket", "science"])?
            .set_default("log.format", "pretty")?
            .set_default("log.filter", "info")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{profile}")).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("notifications.keywords")
                    .try_parsing(true)
                    .source(vars.clone()),
            );

        if let Some(url) = lookup("DATABASE_URL") {
            builder = builder.set_default("store.database_url", url)?;
        }
        if let Some(port) = lookup("PORT") {
            builder = builder.set_override("server.port", port)?;
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.interactions.max_toggle_retries == 0 {
            return Err(ConfigError::Invalid("interactions.max_toggle_retries must be at least 1".into()));
        }
        if self.store.backend == StoreBackend::Postgres {
            if !cfg!(feature = "db-postgres") {
                return Err(ConfigError::Invalid(
                    "store.backend = postgres but this build lacks the db-postgres feature".into(),
                ));
            }
            if self.store.database_url.is_none() {
                return Err(ConfigError::Invalid(
                    "store.database_url (or DATABASE_URL) is required for the postgres backend".into(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    #[test]
    fn defaults_apply_without_any_source() {
        let s = Settings::from_env(vars(&[])).unwrap();
        assert_eq!(s.server.port, 5000);
        assert_eq!(s.server.bind_addr(), "0.0.0.0:5000");
        assert_eq!(s.store.backend, StoreBackend::Memory);
        assert!(s.store.database_url.is_none());
        assert_eq!(s.interactions.max_toggle_retries, 16);
        assert_eq!(s.notifications.keywords, ["cricket", "science"]);
        assert_eq!(s.log.format, LogFormat::Pretty);
    }

    #[test]
    fn prefixed_variables_override_defaults() {
        let s = Settings::from_env(vars(&[
            ("RUSTY_FEED__SERVER__PORT", "8080"),
            ("RUSTY_FEED__NOTIFICATIONS__KEYWORDS", "rust,tokio"),
            ("RUSTY_FEED__LOG__FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(s.server.port, 8080);
        assert_eq!(s.notifications.keywords, ["rust", "tokio"]);
        assert_eq!(s.log.format, LogFormat::Json);
    }

    #[test]
    fn bare_port_wins() {
        let s = Settings::from_env(vars(&[("RUSTY_FEED__SERVER__PORT", "8080"), ("PORT", "7000")])).unwrap();
        assert_eq!(s.server.port, 7000);
    }

    #[test]
    fn zero_retries_is_rejected() {
        let err = Settings::from_env(vars(&[("RUSTY_FEED__INTERACTIONS__MAX_TOGGLE_RETRIES", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn postgres_requires_a_url() {
        let err = Settings::from_env(vars(&[("RUSTY_FEED__STORE__BACKEND", "postgres")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
