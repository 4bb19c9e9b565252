//! Client configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use calc_engine::Mode;
use calc_history::SESSION_HISTORY_CAP;
use common::LogConfig;
use serde::{Deserialize, Serialize};

/// Environment prefix, e.g. `CALC_REMOTE_URL`, `CALC_LOG__LEVEL`
pub const ENV_PREFIX: &str = "CALC_";

/// Configuration of a calculator client (CLI or embedded session)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// calcsrv base URL; local-only when unset
    pub remote_url: Option<String>,
    /// Bound on every remote call
    pub remote_timeout_ms: u64,
    /// Mirror history to the remote log
    pub sync_enabled: bool,
    /// Directory of the local history snapshot
    pub history_dir: PathBuf,
    pub history_cap: usize,
    pub mode: Mode,
    pub log: LogConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            remote_url: None,
            remote_timeout_ms: 3000,
            sync_enabled: true,
            history_dir: PathBuf::from("data/history"),
            history_cap: SESSION_HISTORY_CAP,
            mode: Mode::Basic,
            // front ends report warnings themselves
            log: LogConfig {
                level: "error".to_string(),
                ..Default::default()
            },
        }
    }
}

impl ClientConfig {
    /// Load from defaults, an optional YAML file and `CALC_*` variables
    pub fn load(file: Option<&Path>) -> common::Result<Self> {
        let config: Self = common::load_config(file, ENV_PREFIX)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> common::Result<()> {
        if self.remote_timeout_ms == 0 {
            return Err(common::Error::config("remote_timeout_ms must be greater than 0"));
        }
        if self.history_cap == 0 {
            return Err(common::Error::config("history_cap must be greater than 0"));
        }
        if let Some(url) = &self.remote_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(common::Error::config(format!(
                    "remote_url must be an http(s) URL, got '{}'",
                    url
                )));
            }
        }
        Ok(())
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.remote_url, None);
        assert_eq!(config.remote_timeout(), Duration::from_secs(3));
        assert!(config.sync_enabled);
        assert_eq!(config.history_cap, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "remote_url: http://localhost:6010\nremote_timeout_ms: 500\nmode: scientific\nsync_enabled: false"
        )
        .unwrap();

        let config = ClientConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.remote_url.as_deref(), Some("http://localhost:6010"));
        assert_eq!(config.remote_timeout_ms, 500);
        assert_eq!(config.mode, Mode::Scientific);
        assert!(!config.sync_enabled);
        assert_eq!(config.history_cap, 100);
    }

    #[test]
    fn test_validation_rejects_zero_values() {
        let config = ClientConfig {
            remote_timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ClientConfig {
            history_cap: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_non_http_remote() {
        let config = ClientConfig {
            remote_url: Some("localhost:6010".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
