//! D* CLI - scenario runner for the incremental grid planner.
//!
//! Provides:
//! - built-in and JSON scenarios with staged obstacle updates
//! - ASCII rendering of a planned path
//! - the `dstar_plan` binary

pub mod render;
pub mod scenario;

pub use render::render_ascii;
pub use scenario::{Scenario, ScenarioRunner, ScenarioUpdate, StepReport, LETHAL_COST};
