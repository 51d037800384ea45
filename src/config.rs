//! Server configuration.
//!
//! Loaded from an optional YAML file named by `WIREHTTP_CONFIG`, then
//! overridden by the `LISTEN` and `UPSTREAM` environment variables.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;
use url::Url;

pub const CONFIG_PATH_VAR: &str = "WIREHTTP_CONFIG";
pub const LISTEN_VAR: &str = "LISTEN";
pub const UPSTREAM_VAR: &str = "UPSTREAM";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the server binds, e.g. `127.0.0.1:42069`.
    pub listen_addr: String,
    /// Base URL the `/httpbin` route relays to. Plain `http` only.
    pub upstream_url: String,
    /// Connect timeout for the upstream, in seconds.
    pub upstream_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:42069".to_string(),
            upstream_url: "http://httpbin.org".to_string(),
            upstream_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Loads configuration, resolving variables through `lookup`.
    pub fn load_with<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match lookup(CONFIG_PATH_VAR) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(listen_addr) = lookup(LISTEN_VAR) {
            cfg.listen_addr = listen_addr;
        }
        if let Some(upstream_url) = lookup(UPSTREAM_VAR) {
            cfg.upstream_url = upstream_url;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.listen_addr.trim().is_empty() {
            bail!("listen_addr must not be empty");
        }
        self.upstream()?;
        Ok(())
    }

    /// The parsed upstream base URL.
    pub fn upstream(&self) -> anyhow::Result<Url> {
        let url = Url::parse(&self.upstream_url)
            .with_context(|| format!("invalid upstream_url {:?}", self.upstream_url))?;
        if url.scheme() != "http" {
            bail!("upstream_url must use the http scheme, got {:?}", url.scheme());
        }
        if url.host_str().is_none() {
            bail!("upstream_url is missing a host");
        }
        Ok(url)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}
