//! calcsrv configuration
//!
//! Defaults, then `config/calcsrv.yaml` (or `--config`), then `CALCSRV_*`
//! variables, e.g. `CALCSRV_SERVICE__PORT=7000`.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{bail, Context};
use calc_history::SERVER_HISTORY_CAP;
use common::LogConfig;
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "CALCSRV_";
pub const DEFAULT_CONFIG_PATH: &str = "config/calcsrv.yaml";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 6010;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSection {
    pub host: String,
    pub port: u16,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySection {
    /// Records kept by the bulk log; the oldest are dropped beyond this
    pub capacity: usize,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            capacity: SERVER_HISTORY_CAP,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceSection,
    pub history: HistorySection,
    pub log: LogConfig,
}

impl Config {
    pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
        let file = file.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));
        let config: Self =
            common::load_config(Some(file), ENV_PREFIX).context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.service.port == 0 {
            bail!("service.port must be greater than 0");
        }
        if self.history.capacity == 0 {
            bail!("history.capacity must be greater than 0");
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.service.host, self.service.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid listen address {}:{}",
                    self.service.host, self.service.port
                )
            })
    }
}
