use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use std::{fs, path::PathBuf};

use common::resolver::{DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT};
use common::transport::{KnownIdentities, TransportError, DEFAULT_SHARED_INSTANCE_PORT};
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "rnid";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const KNOWN_IDENTITIES_FILE_NAME: &str = "known_identities.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Loopback port of the local shared instance
    #[serde(default = "default_shared_instance_port")]
    pub shared_instance_port: u16,
    /// Seconds to wait for a requested identity
    #[serde(default = "default_request_timeout")]
    pub request_timeout: f64,
    /// How often the cache is checked while waiting, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_shared_instance_port() -> u16 {
    DEFAULT_SHARED_INSTANCE_PORT
}

fn default_request_timeout() -> f64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs_f64()
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            shared_instance_port: default_shared_instance_port(),
            request_timeout: default_request_timeout(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Result<Duration, StateError> {
        Duration::try_from_secs_f64(self.request_timeout)
            .map_err(|_| StateError::InvalidTimeout(self.request_timeout))
    }

    /// Never zero, so polling always makes progress
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn shared_instance_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, self.shared_instance_port))
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the rnid directory (~/.rnid)
    pub rnid_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Path to the known identity cache
    pub known_identities_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the rnid directory path (custom or default ~/.rnid)
    pub fn rnid_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Load state from the rnid directory
    ///
    /// Nothing has to exist yet: a missing directory or config file means
    /// default settings, and nothing is created here.
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let rnid_dir = Self::rnid_dir(custom_path)?;
        let config_path = rnid_dir.join(CONFIG_FILE_NAME);
        let known_identities_path = rnid_dir.join(KNOWN_IDENTITIES_FILE_NAME);

        let config = if config_path.exists() {
            let config_toml = fs::read_to_string(&config_path)?;
            toml::from_str(&config_toml)?
        } else {
            tracing::debug!("no config at {}, using defaults", config_path.display());
            AppConfig::default()
        };

        Ok(Self {
            rnid_dir,
            config_path,
            known_identities_path,
            config,
        })
    }

    /// Open the known identity cache; its file is written on first remember
    pub fn known_identities(&self) -> Result<KnownIdentities, StateError> {
        Ok(KnownIdentities::load(&self.known_identities_path)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("invalid request timeout {0} in config")]
    InvalidTimeout(f64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("known identities unavailable: {0}")]
    KnownIdentities(#[from] TransportError),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_missing_dir_gives_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("not-created");

        let state = AppState::load(Some(dir.clone())).unwrap();
        assert_eq!(state.config, AppConfig::default());
        assert_eq!(state.config.request_timeout().unwrap(), DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(state.config.poll_interval(), DEFAULT_POLL_INTERVAL);
        assert!(!dir.exists());
    }

    #[test]
    fn test_partial_config() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "request_timeout = 2.5\npoll_interval_ms = 0\n",
        )
        .unwrap();

        let state = AppState::load(Some(temp.path().to_path_buf())).unwrap();
        assert_eq!(state.config.shared_instance_port, DEFAULT_SHARED_INSTANCE_PORT);
        assert_eq!(
            state.config.request_timeout().unwrap(),
            Duration::from_millis(2500)
        );
        assert_eq!(state.config.poll_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_invalid_config() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "request_timeout = \"soon\"").unwrap();
        assert!(matches!(
            AppState::load(Some(temp.path().to_path_buf())),
            Err(StateError::TomlDe(_))
        ));

        let config = AppConfig {
            request_timeout: -1.0,
            ..AppConfig::default()
        };
        assert!(matches!(
            config.request_timeout(),
            Err(StateError::InvalidTimeout(_))
        ));
    }
}
