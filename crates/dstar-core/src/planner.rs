//! Top-level planning calls: full backward search on a new goal, local repair
//! along the cached path when the goal is unchanged.

use crate::config::PlannerConfig;
use crate::engine::DStarSearch;
use crate::error::PlanError;
use crate::grid::{GridCoord, GridGeometry};
use crate::node::Tag;
use crate::outcome::{PlanMode, PlanOutcome, PlanStats};
use crate::path::{extract_expand, extract_path, path_length};

/// Repair walk budget, per grid cell, once the lookahead window is spent.
const REPAIR_STEPS_PER_CELL: usize = 4;

/// Incremental D* planner for one grid size.
///
/// Keeps its search graph between calls. Calling [`DStarPlanner::plan`] again
/// with the same goal only repairs the part of the graph the robot is about to
/// drive through.
#[derive(Debug)]
pub struct DStarPlanner {
    config: PlannerConfig,
    search: DStarSearch,
    goal: Option<GridCoord>,
    path: Vec<GridCoord>,
}

impl DStarPlanner {
    pub fn new(geometry: GridGeometry, config: PlannerConfig) -> Result<Self, PlanError> {
        if geometry.cell_count() == 0 {
            return Err(PlanError::EmptyGrid);
        }
        config.validate()?;
        Ok(Self {
            search: DStarSearch::new(geometry, config.lethal_threshold()),
            config,
            goal: None,
            path: Vec::new(),
        })
    }

    pub fn geometry(&self) -> &GridGeometry {
        self.search.geometry()
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Goal of the last planning call.
    pub fn goal(&self) -> Option<GridCoord> {
        self.goal
    }

    /// Path returned by the last successful call.
    pub fn last_path(&self) -> &[GridCoord] {
        &self.path
    }

    pub fn search(&self) -> &DStarSearch {
        &self.search
    }

    /// Plans from `start` to `goal` over `costs`, one byte per cell.
    ///
    /// `costs` is copied, so the caller may reuse its buffer right away.
    pub fn plan(
        &mut self,
        costs: &[u8],
        start: GridCoord,
        goal: GridCoord,
    ) -> Result<PlanOutcome, PlanError> {
        self.check_inputs(costs, start, goal)?;
        self.search.update_costs(costs);

        if self.goal != Some(goal) || self.path.is_empty() {
            Ok(self.full_search(start, goal))
        } else {
            Ok(self.replan(start, goal))
        }
    }

    fn check_inputs(&self, costs: &[u8], start: GridCoord, goal: GridCoord) -> Result<(), PlanError> {
        let geometry = self.search.geometry();
        if costs.len() != geometry.cell_count() {
            return Err(PlanError::GridSizeMismatch {
                expected: geometry.cell_count(),
                actual: costs.len(),
            });
        }
        for (role, coord) in [("start", start), ("goal", goal)] {
            if !geometry.contains(coord) {
                return Err(PlanError::OutOfBounds {
                    role,
                    coord,
                    width: geometry.nx,
                    height: geometry.ny,
                });
            }
        }
        Ok(())
    }

    fn full_search(&mut self, start: GridCoord, goal: GridCoord) -> PlanOutcome {
        tracing::info!("Full D* search from {:?} to {:?}", start, goal);
        let processed_before = self.search.states_processed();

        self.search.reset();
        self.goal = Some(goal);
        self.path.clear();

        let start_id = self.search.geometry().index(start);
        let goal_id = self.search.geometry().index(goal);
        self.search.insert(goal_id, 0.0);

        while self.search.node(start_id).tag != Tag::Closed {
            if self.search.process_state().is_none()
                && self.search.node(start_id).tag != Tag::Closed
            {
                let stats = PlanStats {
                    mode: PlanMode::FullSearch,
                    states_processed: self.search.states_processed() - processed_before,
                    repairs: 0,
                    path_cost: None,
                };
                tracing::warn!(
                    "Open list exhausted after {} states, {:?} unreachable from {:?}",
                    stats.states_processed,
                    goal,
                    start
                );
                return PlanOutcome::NotFound {
                    expanded: extract_expand(&self.search),
                    stats,
                };
            }
        }

        let stats = PlanStats {
            mode: PlanMode::FullSearch,
            states_processed: self.search.states_processed() - processed_before,
            repairs: 0,
            path_cost: None,
        };
        self.finish(start, goal, stats)
    }

    fn replan(&mut self, start: GridCoord, goal: GridCoord) -> PlanOutcome {
        let processed_before = self.search.states_processed();
        let repairs_before = self.search.repairs();

        let state = self.nearest_path_point(start);
        tracing::debug!("Robot at {:?} re-localized to path point {:?}", start, state);

        let geometry = *self.search.geometry();
        let state_id = geometry.index(state);
        let goal_id = geometry.index(goal);
        self.repair_ahead(state_id, self.config.sim_distance);

        if !self.chain_is_clear(state_id, goal_id) {
            tracing::debug!("Blocked edges beyond the lookahead window, extending repair");
            self.repair_ahead(state_id, REPAIR_STEPS_PER_CELL * geometry.cell_count());
        }

        // Upstream nodes may still carry raised cost estimates here; only the
        // parent chain decides whether the goal is reachable.
        if !self.chain_is_clear(state_id, goal_id) {
            tracing::warn!(
                "Repair left {:?} without a clear chain to {:?}, searching again",
                state,
                goal
            );
            return self.full_search(start, goal);
        }

        let stats = PlanStats {
            mode: PlanMode::Replan,
            states_processed: self.search.states_processed() - processed_before,
            repairs: self.search.repairs() - repairs_before,
            path_cost: None,
        };
        self.finish(state, goal, stats)
    }

    /// Walks up to `steps` parent links from `from`, repairing every blocked
    /// edge on the way. A repair consumes a step and re-checks the same node.
    fn repair_ahead(&mut self, from: usize, steps: usize) {
        let mut x = from;
        for _ in 0..steps {
            let Some(y) = self.search.node(x).parent else {
                break;
            };
            if self.search.is_collision(x, y) {
                let geometry = self.search.geometry();
                tracing::debug!(
                    "Path edge {:?} -> {:?} blocked, repairing",
                    geometry.coord(x),
                    geometry.coord(y)
                );
                self.search.modify(x, y);
                continue;
            }
            x = y;
        }
    }

    /// True when the parent chain from `from` reaches `goal` over free edges only.
    fn chain_is_clear(&self, from: usize, goal: usize) -> bool {
        let limit = self.search.geometry().cell_count();
        let mut current = from;
        let mut steps = 0;
        while let Some(parent) = self.search.node(current).parent {
            if steps > limit || self.search.is_collision(current, parent) {
                return false;
            }
            current = parent;
            steps += 1;
        }
        current == goal
    }

    fn finish(&mut self, from: GridCoord, goal: GridCoord, mut stats: PlanStats) -> PlanOutcome {
        let expanded = extract_expand(&self.search);
        match extract_path(&self.search, from, goal) {
            Ok(path) => {
                stats.path_cost = Some(path_length(&self.search, &path));
                tracing::info!(
                    "Path found: {} cells, {} states processed, {} repairs",
                    path.len(),
                    stats.states_processed,
                    stats.repairs
                );
                self.path = path.clone();
                PlanOutcome::Found {
                    path,
                    expanded,
                    stats,
                }
            }
            Err(err) => {
                tracing::warn!("Path extraction failed: {}", err);
                self.path.clear();
                stats.path_cost = None;
                PlanOutcome::NotFound { expanded, stats }
            }
        }
    }

    /// Cached path point closest to `current`; the earliest one wins ties.
    fn nearest_path_point(&self, current: GridCoord) -> GridCoord {
        let geometry = self.search.geometry();
        let mut best = self.path[0];
        let mut best_dist = geometry.distance(best, current);
        for point in &self.path[1..] {
            let dist = geometry.distance(*point, current);
            if dist < best_dist {
                best_dist = dist;
                best = *point;
            }
        }
        best
    }
}
