//! Results returned by a planning call.

use crate::grid::GridCoord;
use serde::Serialize;

/// How a planning call used the search graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanMode {
    /// Goal changed: graph discarded and searched from the goal outward
    FullSearch,
    /// Goal unchanged: cached graph repaired along the lookahead window
    Replan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanStats {
    pub mode: PlanMode,
    /// `process_state` calls made during this call
    pub states_processed: usize,
    /// Blocked path edges repaired during this call
    pub repairs: usize,
    /// Length of the returned path, in cells
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_cost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanOutcome {
    Found {
        path: Vec<GridCoord>,
        expanded: Vec<GridCoord>,
        stats: PlanStats,
    },
    NotFound {
        expanded: Vec<GridCoord>,
        stats: PlanStats,
    },
}

impl PlanOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, PlanOutcome::Found { .. })
    }

    /// Start-to-goal cells, empty when no path exists.
    pub fn path(&self) -> &[GridCoord] {
        match self {
            PlanOutcome::Found { path, .. } => path,
            PlanOutcome::NotFound { .. } => &[],
        }
    }

    /// CLOSED cells after the call.
    pub fn expanded(&self) -> &[GridCoord] {
        match self {
            PlanOutcome::Found { expanded, .. } | PlanOutcome::NotFound { expanded, .. } => expanded,
        }
    }

    pub fn stats(&self) -> &PlanStats {
        match self {
            PlanOutcome::Found { stats, .. } | PlanOutcome::NotFound { stats, .. } => stats,
        }
    }
}
