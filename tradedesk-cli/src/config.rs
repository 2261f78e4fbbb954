//! Configuration file and environment overrides.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use serde::Deserialize;
use tradedesk_lib::rate_limit::RetryConfig;

pub const ENV_URL: &str = "TRADEDESK_URL";
pub const ENV_TOKEN: &str = "TRADEDESK_TOKEN";
pub const ENV_PARTITION_KEY: &str = "TRADEDESK_PARTITION_KEY";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub session: Session,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Api {
    /// Base URL of the backend, e.g. `https://crm.example.com/api/v1`.
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub partition_key: Option<String>,
}

/// Settings after defaults, file and environment were merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub url: String,
    pub token: String,
    pub partition_key: String,
    pub timeout: Duration,
    pub max_retries: Option<u32>,
}

impl Resolved {
    pub fn retry_config(&self) -> RetryConfig {
        match self.max_retries {
            Some(n) => RetryConfig::default().max_retries(n),
            None => RetryConfig::default(),
        }
    }
}

impl Config {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no config file at {}", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parse TOML config {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Applies environment overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_URL) {
            self.api.url = Some(url);
        }
        if let Some(token) = lookup(ENV_TOKEN) {
            self.session.token = Some(token);
        }
        if let Some(partition_key) = lookup(ENV_PARTITION_KEY) {
            self.session.partition_key = Some(partition_key);
        }
    }

    pub fn resolve(self) -> Result<Resolved> {
        let url = non_empty(self.api.url)
            .ok_or_else(|| anyhow!("no backend URL; set [api] url or {}", ENV_URL))?;
        let token = non_empty(self.session.token)
            .ok_or_else(|| anyhow!("no access token; set [session] token or {}", ENV_TOKEN))?;
        let partition_key = non_empty(self.session.partition_key).ok_or_else(|| {
            anyhow!(
                "no partition key; set [session] partition_key or {}",
                ENV_PARTITION_KEY
            )
        })?;

        Ok(Resolved {
            url,
            token,
            partition_key,
            timeout: Duration::from_secs(self.api.timeout_secs.unwrap_or(30)),
            max_retries: self.api.max_retries,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
