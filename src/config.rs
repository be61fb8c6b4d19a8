//! Runtime settings.
//!
//! Layering, lowest to highest: built-in defaults, `nusa.toml` (or the file
//! given with `--config`), `NUSA_*` environment variables, then the bare
//! `PONDER_API_URL` variable the frontend deployment already sets.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_PONDER_API_URL: &str = "http://localhost:42069";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub ponder_api_url: String,
    pub bind_addr: String,
    pub request_timeout_secs: u64,
    pub default_limit: usize,
    pub max_limit: usize,
    pub cors_allow_origin: String,
    pub cache_capacity: usize,
    pub log_filter: String,
    pub metrics_addr: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ponder_api_url: DEFAULT_PONDER_API_URL.to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
            request_timeout_secs: 10,
            default_limit: 100,
            max_limit: 1000,
            cors_allow_origin: "*".to_string(),
            cache_capacity: 4096,
            log_filter: "info".to_string(),
            metrics_addr: "0.0.0.0:9000".to_string(),
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let d = Settings::default();
        let mut builder = config::Config::builder()
            .set_default("ponder_api_url", d.ponder_api_url)?
            .set_default("bind_addr", d.bind_addr)?
            .set_default("request_timeout_secs", d.request_timeout_secs as i64)?
            .set_default("default_limit", d.default_limit as i64)?
            .set_default("max_limit", d.max_limit as i64)?
            .set_default("cors_allow_origin", d.cors_allow_origin)?
            .set_default("cache_capacity", d.cache_capacity as i64)?
            .set_default("log_filter", d.log_filter)?
            .set_default("metrics_addr", d.metrics_addr)?;

        builder = match path {
            Some(p) => builder.add_source(config::File::from(p)),
            None => builder.add_source(config::File::with_name("nusa").required(false)),
        };

        let settings: Settings = builder
            .add_source(config::Environment::with_prefix("NUSA").try_parsing(true))
            .set_override_option("ponder_api_url", std::env::var("PONDER_API_URL").ok())?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.ponder_api_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "ponder_api_url must be an http(s) URL, got {:?}",
                self.ponder_api_url
            )));
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(ConfigError::Invalid(format!(
                "default_limit must be in 1..={}, got {}",
                self.max_limit, self.default_limit
            )));
        }
        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("bind_addr {:?}: {}", self.bind_addr, e)))
    }

    pub fn graphql_url(&self) -> String {
        format!("{}/graphql", self.ponder_api_url.trim().trim_end_matches('/'))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
