//! Incremental D* path planning on 2-D occupancy grids.
//!
//! [`DStarPlanner`] runs a full backward search when it sees a new goal and
//! afterwards repairs only the stretch of path ahead of the robot when new
//! obstacles show up in the costmap.

pub mod config;
pub mod cost;
pub mod engine;
pub mod error;
pub mod grid;
pub mod node;
pub mod open_list;
pub mod outcome;
pub mod path;
pub mod planner;

pub use config::PlannerConfig;
pub use engine::DStarSearch;
pub use error::PlanError;
pub use grid::{GridCoord, GridGeometry};
pub use node::{DNode, Tag};
pub use outcome::{PlanMode, PlanOutcome, PlanStats};
pub use path::{extract_expand, extract_path, path_length, PathError};
pub use planner::DStarPlanner;
