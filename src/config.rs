//! Simulation configuration and scenario files.

use crate::agent::AgentAttributes;
use crate::conflict::SeparationMinima;
use crate::error::{Error, Result};
use crate::kinematics::StateLimits;
use crate::search::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What happens to queued maneuvers that were not applied by the end of a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueuePolicy {
    /// Drop all queues at the start of every tick and scan every pair afresh.
    #[default]
    Rescan,
    /// Keep unapplied maneuvers; agents with pending maneuvers are not rescanned.
    Retain,
}

/// The configuration of a [Coordinator](crate::Coordinator).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// The simulated time per tick, in seconds.
    pub tick_seconds: f64,
    /// How far ahead conflicts are predicted, in minutes.
    pub lookahead_minutes: f64,
    pub minima: SeparationMinima,
    pub limits: StateLimits,
    pub search: SearchConfig,
    pub queue_policy: QueuePolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 5.0,
            lookahead_minutes: 5.0,
            minima: SeparationMinima::default(),
            limits: StateLimits::default(),
            search: SearchConfig::default(),
            queue_policy: QueuePolicy::default(),
        }
    }
}

impl SimConfig {
    /// The tick duration in hours.
    pub fn tick_hours(&self) -> f64 {
        self.tick_seconds / 3600.0
    }

    /// The lookahead horizon in hours.
    pub fn lookahead_hours(&self) -> f64 {
        self.lookahead_minutes / 60.0
    }

    /// Checks every parameter is usable.
    pub fn validate(&self) -> Result<()> {
        let quant = &self.search.quantization;
        let positive = [
            ("tick_seconds", self.tick_seconds),
            ("lookahead_minutes", self.lookahead_minutes),
            ("minima.horizontal", self.minima.horizontal),
            ("minima.vertical", self.minima.vertical),
            ("quantization.position", quant.position),
            ("quantization.altitude", quant.altitude),
            ("quantization.speed", quant.speed),
            ("quantization.heading", quant.heading),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if self.search.node_budget == 0 {
            return Err(Error::InvalidConfig("node_budget must be at least 1".into()));
        }
        let limits = [self.limits.min_altitude, self.limits.min_speed];
        if limits.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidConfig("state limits must be finite".into()));
        }
        Ok(())
    }
}

/// A configuration together with the initial roster of agents.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: SimConfig,
    #[serde(default)]
    pub roster: Vec<AgentAttributes>,
}

impl Scenario {
    /// Parses a scenario from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.config.validate()?;
        Ok(scenario)
    }

    /// Reads a scenario from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
