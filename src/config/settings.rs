use super::store::{SessionStoreConfig, DEFAULT_MAX_SESSIONS};
use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub session_dir: Option<PathBuf>,
    pub max_sessions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// Layered load: built-in defaults, `config/<CONFIG_ENV>`, then `CONVO__*` env vars
    pub fn new() -> Result<Self, ConfigError> {
        let config_env = env::var("CONFIG_ENV").unwrap_or_else(|_| "default".to_string());
        Self::load(&format!("config/{}", config_env))
    }

    /// Same layering as [`Settings::new`] with an explicit config file base name
    pub fn load(file: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("storage.max_sessions", DEFAULT_MAX_SESSIONS as i64)?
            .set_default("logging.level", "info")?
            .add_source(File::with_name(file).required(false))
            .add_source(Environment::with_prefix("CONVO").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Configured directory, or the per-user data directory
    pub fn session_dir(&self) -> PathBuf {
        self.storage
            .session_dir
            .clone()
            .unwrap_or_else(default_session_dir)
    }

    pub fn store_config(&self) -> SessionStoreConfig {
        SessionStoreConfig::new(self.session_dir()).max_sessions(self.storage.max_sessions)
    }
}

fn default_session_dir() -> PathBuf {
    ProjectDirs::from("com", "convo-store", "convo")
        .map(|dirs| dirs.data_dir().join("sessions"))
        .unwrap_or_else(|| PathBuf::from("./sessions"))
}
