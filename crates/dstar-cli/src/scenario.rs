//! Planning scenarios: an initial costmap plus staged obstacle updates.

use anyhow::{bail, Context, Result};
use dstar_core::{DStarPlanner, GridCoord, GridGeometry, PlanOutcome, PlannerConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Costmap value written for obstacles.
pub const LETHAL_COST: u8 = 254;

fn default_resolution() -> f64 {
    1.0
}

/// Newly sensed map changes, applied before the next same-goal replan.
///
/// The robot position is taken from `robot`, else from the world `pose`,
/// else it stays where the previous step left it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioUpdate {
    #[serde(default)]
    pub robot: Option<GridCoord>,
    /// Robot position in map coordinates (meters)
    #[serde(default)]
    pub pose: Option<[f64; 2]>,
    #[serde(default)]
    pub obstacles: Vec<GridCoord>,
    #[serde(default)]
    pub cleared: Vec<GridCoord>,
}

/// A map, a goal and the sensor updates seen on the way there.
///
/// Without a `config` block the planner settings come from the `DSTAR_*`
/// environment variables, as for the built-in scenarios.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub width: usize,
    pub height: usize,
    #[serde(default = "default_resolution")]
    pub resolution: f64,
    #[serde(default)]
    pub origin_x: f64,
    #[serde(default)]
    pub origin_y: f64,
    #[serde(default = "PlannerConfig::from_env")]
    pub config: PlannerConfig,
    pub start: GridCoord,
    pub goal: GridCoord,
    #[serde(default)]
    pub obstacles: Vec<GridCoord>,
    #[serde(default)]
    pub updates: Vec<ScenarioUpdate>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(json).context("invalid scenario JSON")?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn geometry(&self) -> GridGeometry {
        GridGeometry::new(self.width, self.height, self.resolution)
            .with_origin(self.origin_x, self.origin_y)
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!("scenario {} has an empty grid", self.name);
        }
        let geometry = self.geometry();
        let cells = [&self.start, &self.goal]
            .into_iter()
            .chain(&self.obstacles)
            .chain(self.updates.iter().flat_map(|u| u.obstacles.iter().chain(&u.cleared)))
            .chain(self.updates.iter().filter_map(|u| u.robot.as_ref()));
        for cell in cells {
            if !geometry.contains(*cell) {
                bail!(
                    "cell {:?} lies outside the {}x{} grid",
                    cell,
                    self.width,
                    self.height
                );
            }
        }
        for pose in self.updates.iter().filter_map(|u| u.pose) {
            if geometry.world_to_grid(pose[0], pose[1]).is_none() {
                bail!("pose {:?} lies outside the map", pose);
            }
        }
        Ok(())
    }

    /// Looks up a built-in scenario by name.
    pub fn builtin(name: &str, width: usize, height: usize, obstacles: usize, seed: u64) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        match name {
            "open" => Some(create_open_scenario(width, height)),
            "detour" => Some(create_detour_scenario(width, height)),
            "wall" => Some(create_wall_scenario(width, height)),
            "random" => Some(create_random_scenario(width, height, obstacles, seed)),
            _ => None,
        }
    }
}

fn corner_to_corner(name: &str, width: usize, height: usize) -> Scenario {
    Scenario {
        name: name.to_string(),
        width,
        height,
        resolution: default_resolution(),
        origin_x: 0.0,
        origin_y: 0.0,
        config: PlannerConfig::from_env(),
        start: GridCoord::new(0, 0),
        goal: GridCoord::new(width - 1, height - 1),
        obstacles: Vec::new(),
        updates: Vec::new(),
    }
}

/// Empty grid, replanned once without changes.
pub fn create_open_scenario(width: usize, height: usize) -> Scenario {
    let mut scenario = corner_to_corner("open", width, height);
    scenario.updates.push(ScenarioUpdate {
        robot: Some(scenario.start),
        pose: None,
        obstacles: Vec::new(),
        cleared: Vec::new(),
    });
    scenario
}

/// Empty grid, then an obstacle appears on the diagonal.
pub fn create_detour_scenario(width: usize, height: usize) -> Scenario {
    let mut scenario = corner_to_corner("detour", width, height);
    let mid = width.min(height) / 2;
    let blocked = GridCoord::new(mid, mid);
    if blocked != scenario.start && blocked != scenario.goal {
        scenario.updates.push(ScenarioUpdate {
            robot: Some(scenario.start),
            pose: None,
            obstacles: vec![blocked],
            cleared: Vec::new(),
        });
    }
    scenario
}

/// A wall across the full width separates start and goal.
pub fn create_wall_scenario(width: usize, height: usize) -> Scenario {
    let mut scenario = corner_to_corner("wall", width, height);
    let row = height / 2;
    scenario.obstacles = (0..width).map(|x| GridCoord::new(x, row)).collect();
    scenario
}

/// Seeded random obstacles, with a quarter as many appearing on replan.
pub fn create_random_scenario(width: usize, height: usize, count: usize, seed: u64) -> Scenario {
    let mut scenario = corner_to_corner("random", width, height);
    let mut rng = StdRng::seed_from_u64(seed);
    let (start, goal) = (scenario.start, scenario.goal);
    let mut sample = |n: usize| -> Vec<GridCoord> {
        (0..n)
            .map(|_| GridCoord::new(rng.random_range(0..width), rng.random_range(0..height)))
            .filter(|cell| *cell != start && *cell != goal)
            .collect()
    };

    scenario.obstacles = sample(count);
    let late = sample(count / 4);
    scenario.updates.push(ScenarioUpdate {
        robot: Some(start),
        pose: None,
        obstacles: late,
        cleared: Vec::new(),
    });
    scenario
}

/// Outcome of one planning call in a scenario.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub robot: GridCoord,
    pub outcome: PlanOutcome,
}

/// Drives a planner through a scenario, one planning call per step.
pub struct ScenarioRunner<'a> {
    scenario: &'a Scenario,
    planner: DStarPlanner,
    costs: Vec<u8>,
    robot: GridCoord,
    next_step: usize,
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(scenario: &'a Scenario) -> Result<Self> {
        let geometry = scenario.geometry();
        let planner = DStarPlanner::new(geometry, scenario.config.clone())
            .with_context(|| format!("cannot build planner for {}", scenario.name))?;
        let mut costs = vec![0u8; geometry.cell_count()];
        for cell in &scenario.obstacles {
            costs[geometry.index(*cell)] = LETHAL_COST;
        }
        Ok(Self {
            scenario,
            planner,
            costs,
            robot: scenario.start,
            next_step: 0,
        })
    }

    /// Costmap used by the most recent step.
    pub fn costs(&self) -> &[u8] {
        &self.costs
    }

    pub fn planner(&self) -> &DStarPlanner {
        &self.planner
    }

    /// Runs the next planning call, or returns `None` once every update is used.
    pub fn step(&mut self) -> Result<Option<StepReport>> {
        let step = self.next_step;
        let robot = if step == 0 {
            self.scenario.start
        } else {
            let Some(update) = self.scenario.updates.get(step - 1) else {
                return Ok(None);
            };
            let geometry = self.scenario.geometry();
            for cell in &update.obstacles {
                self.costs[geometry.index(*cell)] = LETHAL_COST;
            }
            for cell in &update.cleared {
                self.costs[geometry.index(*cell)] = 0;
            }
            match (update.robot, update.pose) {
                (Some(cell), _) => cell,
                (None, Some([wx, wy])) => geometry
                    .world_to_grid(wx, wy)
                    .with_context(|| format!("pose ({wx}, {wy}) is off the map"))?,
                (None, None) => self.robot,
            }
        };
        self.robot = robot;
        self.next_step += 1;

        let outcome = self.planner.plan(&self.costs, robot, self.scenario.goal)?;
        Ok(Some(StepReport {
            step,
            robot,
            outcome,
        }))
    }

    pub fn run_all(mut self) -> Result<Vec<StepReport>> {
        let mut reports = Vec::new();
        while let Some(report) = self.step()? {
            reports.push(report);
        }
        Ok(reports)
    }
}
