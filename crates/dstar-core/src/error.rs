//! Contract violations rejected before any planning work starts.

use crate::grid::GridCoord;

/// Errors returned by [`crate::DStarPlanner`].
///
/// A goal that cannot be reached is not an error; it is reported as
/// [`crate::PlanOutcome::NotFound`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("grid has no cells")]
    EmptyGrid,

    #[error("{role} {coord:?} is outside the {width}x{height} grid")]
    OutOfBounds {
        role: &'static str,
        coord: GridCoord,
        width: usize,
        height: usize,
    },

    #[error("cost grid has {actual} cells, expected {expected}")]
    GridSizeMismatch { expected: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
