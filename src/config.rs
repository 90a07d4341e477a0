use std::{env, path::PathBuf, time::Duration};

use anyhow::Context;

use crate::models::DEFAULT_USER_ID;

/// Service-side settings, read by the `wellness-api` binary.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Every route is mounted under `/<service_prefix>/`.
    pub service_prefix: String,
    /// Postgres URL. Without it the service keeps data in memory.
    pub database_url: Option<String>,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            service_prefix: "wellness".into(),
            database_url: None,
            cors_origins: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            service_prefix: env::var("SERVICE_PREFIX").unwrap_or(defaults.service_prefix),
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|list| {
                    list.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Settings for the data-access layer.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base address including the service prefix, e.g. `http://localhost:8080/wellness`.
    pub api_base_url: String,
    pub api_key: String,
    pub user_id: String,
    /// Directory for the on-device store. `None` keeps local data in memory.
    pub data_dir: Option<PathBuf>,
    pub health_check_interval: Duration,
    pub probe_timeout: Duration,
    pub request_timeout: Duration,
    pub diagnostics_timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            api_key: api_key.into(),
            user_id: DEFAULT_USER_ID.into(),
            data_dir: None,
            health_check_interval: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            diagnostics_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::new(
            env::var("WELLNESS_API_URL").unwrap_or_else(|_| "http://localhost:8080/wellness".into()),
            env::var("WELLNESS_API_KEY").unwrap_or_default(),
        );
        if let Ok(user_id) = env::var("WELLNESS_USER_ID") {
            config.user_id = user_id;
        }
        config.data_dir = env::var("WELLNESS_DATA_DIR").ok().map(PathBuf::from);
        config.health_check_interval = Duration::from_millis(parse_var(
            "WELLNESS_HEALTH_INTERVAL_MS",
            30_000u64,
        )?);
        config.probe_timeout = Duration::from_millis(parse_var("WELLNESS_PROBE_TIMEOUT_MS", 5_000u64)?);
        config.request_timeout =
            Duration::from_millis(parse_var("WELLNESS_REQUEST_TIMEOUT_MS", 10_000u64)?);
        config.diagnostics_timeout =
            Duration::from_millis(parse_var("WELLNESS_DIAGNOSTICS_TIMEOUT_MS", 10_000u64)?);
        Ok(config)
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{name} must be a number, got {raw:?}")),
        Err(_) => Ok(default),
    }
}
