//! D* state propagation and local repair.
//!
//! Costs flow outward from the goal: a node's `parent` points one step closer
//! to the goal and its `cost` estimates the remaining distance. Popping a node
//! whose key equals its cost (LOWER) finalizes it and pushes the cost to its
//! neighbours. Popping a node whose key is below its cost (RAISE) first tries
//! to find a cheaper parent, then pushes the increase to the nodes that depend
//! on it.

use crate::cost::CostModel;
use crate::grid::GridGeometry;
use crate::node::{DNode, NodeGrid, Tag};
use crate::open_list::OpenList;

/// Search graph, open list and costmap copy for one grid.
#[derive(Debug)]
pub struct DStarSearch {
    geometry: GridGeometry,
    nodes: NodeGrid,
    open: OpenList,
    costmap: CostModel,
    inf: f64,
    neighbours: Vec<usize>,
    states_processed: usize,
    repairs: usize,
}

impl DStarSearch {
    pub fn new(geometry: GridGeometry, lethal_threshold: f64) -> Self {
        let inf = geometry.unreachable_cost();
        let cell_count = geometry.cell_count();
        Self {
            geometry,
            nodes: NodeGrid::new(cell_count, inf),
            open: OpenList::new(),
            costmap: CostModel::new(cell_count, lethal_threshold),
            inf,
            neighbours: Vec::with_capacity(8),
            states_processed: 0,
            repairs: 0,
        }
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn costmap(&self) -> &CostModel {
        &self.costmap
    }

    pub fn node(&self, id: usize) -> &DNode {
        self.nodes.get(id)
    }

    pub fn min_key(&self) -> Option<f64> {
        self.open.min_key()
    }

    /// Total `process_state` calls since construction.
    pub fn states_processed(&self) -> usize {
        self.states_processed
    }

    /// Total `modify` calls since construction.
    pub fn repairs(&self) -> usize {
        self.repairs
    }

    pub fn update_costs(&mut self, costs: &[u8]) {
        self.costmap.update(costs);
    }

    /// Discards every node and queue entry.
    pub fn reset(&mut self) {
        self.open.clear();
        self.nodes.reset();
    }

    pub fn is_collision(&self, a: usize, b: usize) -> bool {
        self.costmap.is_collision(a, b)
    }

    pub fn edge_cost(&self, a: usize, b: usize) -> f64 {
        self.costmap.edge_cost(&self.geometry, a, b, self.inf)
    }

    /// Queues node `id` with path cost `new_cost`.
    pub fn insert(&mut self, id: usize, new_cost: f64) {
        self.open.insert(self.nodes.get_mut(id), id, new_cost);
    }

    fn collect_neighbours(&self, id: usize, out: &mut Vec<usize>) {
        out.clear();
        let coord = self.geometry.coord(id);
        for neighbour in self.geometry.neighbours(coord) {
            let neighbour_id = self.geometry.index(neighbour);
            if self.costmap.is_collision(id, neighbour_id) {
                continue;
            }
            out.push(neighbour_id);
        }
    }

    /// Pops the minimum-key node and propagates its cost.
    ///
    /// Returns the smallest key left in the open list, or `None` when the list
    /// is empty (either before or after this step).
    pub fn process_state(&mut self) -> Option<f64> {
        let (k_old, x) = self.open.pop_min()?;
        self.nodes.get_mut(x).tag = Tag::Closed;
        self.states_processed += 1;

        let mut neighbours = std::mem::take(&mut self.neighbours);
        self.collect_neighbours(x, &mut neighbours);

        // RAISE: look for a neighbour that already offers a cheaper route
        if k_old < self.nodes.get(x).cost {
            for &y in &neighbours {
                let y_cost = self.nodes.get(y).cost;
                let via_y = y_cost + self.edge_cost(y, x);
                if y_cost <= k_old && self.nodes.get(x).cost > via_y {
                    let node = self.nodes.get_mut(x);
                    node.parent = Some(y);
                    node.cost = via_y;
                }
            }
        }

        if k_old == self.nodes.get(x).cost {
            // LOWER
            for &y in &neighbours {
                let x_cost = self.nodes.get(x).cost;
                let through_x = x_cost + self.edge_cost(x, y);
                let ny = *self.nodes.get(y);
                let child = ny.parent == Some(x);
                if ny.tag == Tag::New
                    || (child && ny.cost != through_x)
                    || (!child && ny.cost > through_x)
                {
                    self.nodes.get_mut(y).parent = Some(x);
                    self.insert(y, through_x);
                }
            }
        } else {
            for &y in &neighbours {
                let x_cost = self.nodes.get(x).cost;
                let through_x = x_cost + self.edge_cost(x, y);
                let ny = *self.nodes.get(y);
                let child = ny.parent == Some(x);
                if ny.tag == Tag::New || (child && ny.cost != through_x) {
                    self.nodes.get_mut(y).parent = Some(x);
                    self.insert(y, through_x);
                } else if !child && ny.cost > through_x {
                    self.insert(x, x_cost);
                } else if !child
                    && x_cost > ny.cost + self.edge_cost(x, y)
                    && ny.tag == Tag::Closed
                    && ny.cost > k_old
                {
                    self.insert(y, ny.cost);
                }
            }
        }

        self.neighbours = neighbours;
        self.open.min_key()
    }

    /// Repairs the graph after the edge from `x` to its parent `y` became blocked.
    ///
    /// Runs `process_state` until the open list's minimum key catches up with
    /// `x`'s cost, or the list runs dry.
    pub fn modify(&mut self, x: usize, y: usize) {
        self.repairs += 1;
        if self.nodes.get(x).tag == Tag::Closed {
            let raised = self.nodes.get(y).cost + self.edge_cost(x, y);
            self.insert(x, raised);
        }

        while let Some(k_min) = self.process_state() {
            if k_min >= self.nodes.get(x).cost {
                break;
            }
        }
    }
}
