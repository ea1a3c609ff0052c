// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML configuration for the InfluxDB sink.

use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Top-level sink configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    /// Per-event-type sink configurations.
    pub sinks: Vec<TopicSinkConfig>,
    /// InfluxDB connection settings.
    pub influxdb: InfluxDbConfig,
}

/// Configuration for a single event-type sink.
#[derive(Debug, Clone, Deserialize)]
pub struct TopicSinkConfig {
    /// Event type name to record (e.g. "PeerConnect", "CallGrant").
    pub topic: String,
    /// InfluxDB measurement name.
    pub measurement: String,
    /// Fields from the event payload to use as InfluxDB tags.
    pub tags: Vec<String>,
    /// Fields from the event payload to use as InfluxDB fields.
    pub fields: Vec<String>,
    /// Maximum samples per second (downsample). None = no limit.
    pub sample_rate: Option<u32>,
    /// Number of lines to batch before flush. None = default (1000).
    pub batch_size: Option<usize>,
    /// Flush interval in milliseconds. None = default (1000).
    pub flush_interval_ms: Option<u64>,
}

/// InfluxDB v2 connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct InfluxDbConfig {
    /// InfluxDB URL (e.g., "http://localhost:8086").
    pub url: String,
    /// InfluxDB organization.
    pub org: String,
    /// InfluxDB bucket.
    pub bucket: String,
    /// Authentication token.
    pub token: String,
}

/// Configuration parsing errors.
#[derive(Debug)]
pub enum ConfigError {
    /// YAML parsing failed.
    Yaml(serde_yaml::Error),
    /// File I/O failed.
    Io(std::io::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Yaml(e) => write!(f, "YAML parse error: {}", e),
            ConfigError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Yaml(e) => Some(e),
            ConfigError::Io(e) => Some(e),
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Yaml(e)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl SinkConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: SinkConfig = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Parse configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}
