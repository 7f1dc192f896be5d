// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardwatch

//! Configuration module

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::streaming::StreamingConfig;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data directory
    pub data_dir: PathBuf,

    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,

    /// Processing loop configuration
    pub monitor: MonitorConfig,

    /// Transport configuration
    pub streaming: StreamingConfig,

    /// History store configuration
    pub database: DatabaseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            log_level: "info".to_string(),
            monitor: MonitorConfig::default(),
            streaming: StreamingConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        self.monitor.validate()?;
        if self.streaming.topic_prefix.trim_matches('/').is_empty() {
            bail!("streaming.topic_prefix must not be empty");
        }
        if self.database.history_limit == 0 {
            bail!("database.history_limit must be at least 1");
        }
        Ok(())
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("wardwatch"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

/// Processing loop timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Tick cadence in milliseconds
    pub tick_interval_ms: u64,

    /// Silence after which a bed is shown offline
    pub liveness_timeout_ms: u64,

    /// Silence after which a bed is removed
    pub eviction_timeout_ms: u64,

    /// Upper bound on payloads processed per tick
    pub max_drain_per_tick: usize,

    /// Expected number of beds on the ward
    pub ward_capacity: usize,

    /// Event bus buffer per subscriber
    pub event_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 500,
            liveness_timeout_ms: 3_000,
            eviction_timeout_ms: 10_000,
            max_drain_per_tick: 5_000,
            ward_capacity: 50,
            event_capacity: 256,
        }
    }
}

impl MonitorConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn liveness_timeout(&self) -> Duration {
        Duration::from_millis(self.liveness_timeout_ms)
    }

    pub fn eviction_timeout(&self) -> Duration {
        Duration::from_millis(self.eviction_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            bail!("monitor.tick_interval_ms must be greater than zero");
        }
        if self.max_drain_per_tick == 0 {
            bail!("monitor.max_drain_per_tick must be greater than zero");
        }
        if self.liveness_timeout_ms >= self.eviction_timeout_ms {
            bail!(
                "monitor.liveness_timeout_ms ({}) must be shorter than monitor.eviction_timeout_ms ({})",
                self.liveness_timeout_ms,
                self.eviction_timeout_ms
            );
        }
        Ok(())
    }
}

/// History store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Enable the SQLite history store
    pub enabled: bool,

    /// Database path
    pub path: PathBuf,

    /// Retention period in days
    pub retention_days: u32,

    /// Records kept per bed when history is held in memory
    pub history_limit: usize,

    /// Pending writes held before new ones are dropped
    pub queue_capacity: usize,

    /// Interval between retention sweeps in seconds
    pub cleanup_interval_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("./data/wardwatch.db"),
            retention_days: 30,
            history_limit: 50,
            queue_capacity: 4_096,
            cleanup_interval_secs: 3_600,
        }
    }
}
