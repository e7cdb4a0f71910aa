//! Traversal cost and collision checks against the planner's costmap copy.

use crate::grid::GridGeometry;

/// Planner-owned copy of the caller's costmap.
#[derive(Debug, Clone)]
pub struct CostModel {
    costs: Vec<u8>,
    lethal_threshold: f64,
}

impl CostModel {
    pub fn new(cell_count: usize, lethal_threshold: f64) -> Self {
        Self {
            costs: vec![0; cell_count],
            lethal_threshold,
        }
    }

    /// Copies `costs` over the stored grid. Lengths must already match.
    pub fn update(&mut self, costs: &[u8]) {
        self.costs.copy_from_slice(costs);
    }

    pub fn is_lethal(&self, id: usize) -> bool {
        f64::from(self.costs[id]) > self.lethal_threshold
    }

    /// True when either endpoint of the edge is lethal.
    pub fn is_collision(&self, a: usize, b: usize) -> bool {
        self.is_lethal(a) || self.is_lethal(b)
    }

    /// Euclidean length of the edge, or `inf` when it is blocked.
    pub fn edge_cost(&self, geometry: &GridGeometry, a: usize, b: usize, inf: f64) -> f64 {
        if self.is_collision(a, b) {
            return inf;
        }
        geometry.distance(geometry.coord(a), geometry.coord(b))
    }
}
