//! Configuration management for zsurface
//!
//! Loads, validates and saves client settings from TOML files: where to
//! connect, how many round-trips to spend waiting for globals, logging, and
//! the plane used by the default hit tester.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main configuration struct containing all client settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ClientConfig {
    /// Display connection settings
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Default hit tester settings
    #[serde(default)]
    pub hit_test: HitTestConfig,
}

/// Display connection configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Socket name or absolute path (None = WAYLAND_DISPLAY)
    pub socket: Option<String>,

    /// Round-trips to spend waiting for all required globals
    pub global_retry_budget: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// env_logger style filter, e.g. "info" or "zsurface=debug"
    pub filter: String,

    /// Prefix log lines with timestamps
    pub timestamps: bool,
}

/// Hit test configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HitTestConfig {
    /// z coordinate of the plane toplevels are laid out on
    pub plane_z: f32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            socket: None,
            global_retry_budget: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            timestamps: true,
        }
    }
}

impl Default for HitTestConfig {
    fn default() -> Self {
        Self { plane_z: 0.0 }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Expand ~ to home directory
        let expanded_path = if path.to_string_lossy().starts_with('~') {
            let home = std::env::var("HOME").context("Failed to get HOME environment variable")?;
            let rest = path.strip_prefix("~").unwrap_or(path);
            Path::new(&home).join(rest)
        } else {
            path.to_path_buf()
        };

        let contents = fs::read_to_string(&expanded_path)
            .with_context(|| format!("Failed to read config file: {}", expanded_path.display()))?;

        let config: ClientConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", expanded_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.connection.global_retry_budget == 0 {
            anyhow::bail!("Invalid global_retry_budget: must be at least 1");
        }

        if let Some(socket) = &self.connection.socket {
            if socket.trim().is_empty() {
                anyhow::bail!("Invalid socket: must not be empty");
            }
        }

        if self.logging.filter.trim().is_empty() {
            anyhow::bail!("Invalid logging filter: must not be empty");
        }

        if !self.hit_test.plane_z.is_finite() {
            anyhow::bail!("Invalid plane_z: must be finite");
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, contents).context("Failed to write configuration file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests;
