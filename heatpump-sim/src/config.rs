//! Simulator configuration
//!
//! Loads a TOML file, falling back to the configuration embedded in the
//! binary when no file is given.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use heatpump_core::climate::Mode;
use heatpump_core::config::ControllerConfig;
use log::info;
use serde::Deserialize;

/// Configuration compiled into the binary
const DEFAULT_CONFIG: &str = include_str!("../heatpump.toml");

/// Thermal model of the simulated room
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Room temperature at start (°C)
    pub initial_c: f32,
    /// Outdoor temperature (°C)
    pub outdoor_c: f32,
    /// Fraction of the indoor/outdoor difference lost per minute
    pub loss_per_min: f32,
    /// Unit output per degree of setpoint error (°C/min)
    pub capacity_per_min: f32,
    /// Unit output ceiling (°C/min)
    pub max_rate_per_min: f32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            initial_c: 18.0,
            outdoor_c: 5.0,
            loss_per_min: 0.01,
            capacity_per_min: 0.5,
            max_rate_per_min: 0.4,
        }
    }
}

/// Simulated indoor unit
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct UnitConfig {
    pub initial_power: bool,
    pub initial_setpoint_c: f32,
    /// Reject every n-th commit
    pub fail_commit_every: Option<u32>,
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            initial_power: false,
            initial_setpoint_c: 20.0,
            fail_commit_every: None,
        }
    }
}

/// What the simulated user asks for
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub mode: Mode,
    pub target_c: f32,
    pub minutes: u32,
    /// Feed the room temperature through the remote sensor path
    pub remote_sensor: bool,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Heat,
            target_c: 21.0,
            minutes: 120,
            remote_sensor: false,
        }
    }
}

/// Complete simulator configuration
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub controller: ControllerConfig,
    pub room: RoomConfig,
    pub unit: UnitConfig,
    pub scenario: ScenarioConfig,
}

impl SimConfig {
    /// Parse and validate a TOML document
    pub fn parse(text: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(text).context("invalid TOML configuration")?;
        config
            .controller
            .validate()
            .map_err(|e| anyhow!("invalid controller configuration: {}", e))?;
        Ok(config)
    }

    /// Load from a file, or the embedded defaults when `path` is `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                info!("Loaded configuration from {}", path.display());
                Self::parse(&text)
            }
            None => {
                info!("Using embedded configuration");
                Self::parse(DEFAULT_CONFIG)
            }
        }
    }
}
