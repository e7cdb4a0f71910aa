//! Planner configuration.

use crate::error::PlanError;
use serde::{Deserialize, Serialize};
use std::env;

/// Thresholds and lookahead used by the D* planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Costmap value of a lethal obstacle
    pub lethal_cost: u8,
    /// Scale applied to `lethal_cost`; cells above the product are impassable
    pub factor: f64,
    /// Number of path steps checked ahead of the robot when replanning
    pub sim_distance: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            lethal_cost: 253,
            factor: 0.5,
            sim_distance: 15,
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            lethal_cost: env::var("DSTAR_LETHAL_COST")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.lethal_cost),
            factor: env::var("DSTAR_FACTOR")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.factor),
            sim_distance: env::var("DSTAR_SIM_DISTANCE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.sim_distance),
        }
    }

    /// Cost above which a cell counts as an obstacle.
    pub fn lethal_threshold(&self) -> f64 {
        f64::from(self.lethal_cost) * self.factor
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if !self.factor.is_finite() || self.factor <= 0.0 {
            return Err(PlanError::InvalidConfig(format!(
                "factor must be positive and finite, got {}",
                self.factor
            )));
        }
        if self.sim_distance == 0 {
            return Err(PlanError::InvalidConfig(
                "sim_distance must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
