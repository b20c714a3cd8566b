use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::change_log::DEFAULT_HISTORY_CAPACITY;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] figment::Error),
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Number of changes kept for incremental diffs.
    pub history_capacity: usize,
    pub update_channel_size: usize,
    /// Long-poll timeout used by the local mirror.
    pub mirror_poll_timeout_secs: u64,
    /// Mappings registered at startup.
    #[serde(default)]
    pub initial_mappings: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            update_channel_size: 128,
            mirror_poll_timeout_secs: 30,
            initial_mappings: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default()))
                .merge(Toml::file("mapsync.toml"))
                .merge(Json::file("mapsync.json"))
                .merge(Env::prefixed("MAPSYNC_")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::Zero("history_capacity"));
        }
        if self.update_channel_size == 0 {
            return Err(ConfigError::Zero("update_channel_size"));
        }
        if self.mirror_poll_timeout_secs == 0 {
            return Err(ConfigError::Zero("mirror_poll_timeout_secs"));
        }
        Ok(())
    }

    pub fn mirror_poll_timeout(&self) -> Duration {
        Duration::from_secs(self.mirror_poll_timeout_secs)
    }
}
