//! Layer configuration.
//!
//! Sources, lowest priority first: built-in defaults, the JSON file named by
//! `EYEGAZE_CONFIG`, then individual `EYEGAZE_*` environment variables.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::helpers::parse_bool;
use crate::{Error, Result};

pub const CONFIG_PATH_ENV: &str = "EYEGAZE_CONFIG";
pub const SIMULATE_TRACKER_ENV: &str = "EYEGAZE_SIMULATE_TRACKER";
pub const STEAM_LINK_PORT_ENV: &str = "EYEGAZE_STEAM_LINK_PORT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Operator override; `Some(true)` forces the pointer-driven tracker.
    pub simulate_tracker: Option<bool>,
    pub steam_link_port: u16,
    pub network_stale_after_ms: u64,
    pub confidence_threshold: f32,
    pub face_state_name: String,
    pub body_state_name: String,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            simulate_tracker: None,
            steam_link_port: 9015,
            network_stale_after_ms: 1000,
            confidence_threshold: 0.5,
            face_state_name: "VirtualDesktop.FaceState".to_string(),
            body_state_name: "VirtualDesktop.BodyState".to_string(),
        }
    }
}

impl LayerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the effective configuration. Never fails: a broken file is
    /// reported and ignored.
    pub fn load() -> Self {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => match Self::from_file(&path) {
                Ok(config) => {
                    debug!("loaded configuration from {}", path);
                    config
                }
                Err(err) => {
                    warn!("ignoring configuration file {}: {}", path, err);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        config
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup(SIMULATE_TRACKER_ENV) {
            match parse_bool(&raw) {
                Some(value) => self.simulate_tracker = Some(value),
                None => warn!("{} is not a boolean: {:?}", SIMULATE_TRACKER_ENV, raw),
            }
        }
        if let Some(raw) = lookup(STEAM_LINK_PORT_ENV) {
            match raw.trim().parse::<u16>() {
                Ok(port) => self.steam_link_port = port,
                Err(_) => warn!("{} is not a port: {:?}", STEAM_LINK_PORT_ENV, raw),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::config(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.network_stale_after_ms == 0 {
            return Err(Error::config("network_stale_after_ms must be non-zero"));
        }
        if self.face_state_name.is_empty() || self.body_state_name.is_empty() {
            return Err(Error::config("shared memory names must not be empty"));
        }
        Ok(())
    }

    pub fn network_stale_after(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.network_stale_after_ms)
    }
}
