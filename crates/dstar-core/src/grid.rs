//! Grid geometry: dimensions, index conversion and world mapping.

use serde::{Deserialize, Serialize};

/// Integer cell coordinate on the planning grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: usize,
    pub y: usize,
}

impl GridCoord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl From<(usize, usize)> for GridCoord {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

/// Offsets of the 8-connected neighbourhood, x-major like the costmap scan.
const NEIGHBOUR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Shape of the costmap the planner works on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub nx: usize,
    pub ny: usize,
    /// Meters per cell
    pub resolution: f64,
    pub origin_x: f64,
    pub origin_y: f64,
}

impl GridGeometry {
    pub fn new(nx: usize, ny: usize, resolution: f64) -> Self {
        Self {
            nx,
            ny,
            resolution,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }

    pub fn with_origin(mut self, origin_x: f64, origin_y: f64) -> Self {
        self.origin_x = origin_x;
        self.origin_y = origin_y;
        self
    }

    pub fn cell_count(&self) -> usize {
        self.nx * self.ny
    }

    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.x < self.nx && coord.y < self.ny
    }

    /// Linear index of `coord`. The coordinate must be inside the grid.
    pub fn index(&self, coord: GridCoord) -> usize {
        debug_assert!(self.contains(coord), "{coord:?} outside {}x{}", self.nx, self.ny);
        coord.x + coord.y * self.nx
    }

    pub fn coord(&self, index: usize) -> GridCoord {
        GridCoord {
            x: index % self.nx,
            y: index / self.nx,
        }
    }

    /// In-bounds 8-connected neighbours of `coord`.
    pub fn neighbours(&self, coord: GridCoord) -> impl Iterator<Item = GridCoord> + '_ {
        NEIGHBOUR_OFFSETS.iter().filter_map(move |(dx, dy)| {
            let x = coord.x as i64 + dx;
            let y = coord.y as i64 + dy;
            if x < 0 || y < 0 || x >= self.nx as i64 || y >= self.ny as i64 {
                return None;
            }
            Some(GridCoord::new(x as usize, y as usize))
        })
    }

    /// Euclidean distance between two cells, in cells.
    pub fn distance(&self, a: GridCoord, b: GridCoord) -> f64 {
        let dx = a.x as f64 - b.x as f64;
        let dy = a.y as f64 - b.y as f64;
        dx.hypot(dy)
    }

    /// Finite stand-in for infinity. Larger than the cost of any simple path on the grid.
    pub fn unreachable_cost(&self) -> f64 {
        (2.0 * (self.cell_count() as f64 + 1.0)).max(10_000.0)
    }

    /// World position of the cell centre.
    pub fn grid_to_world(&self, coord: GridCoord) -> (f64, f64) {
        (
            self.origin_x + (coord.x as f64 + 0.5) * self.resolution,
            self.origin_y + (coord.y as f64 + 0.5) * self.resolution,
        )
    }

    pub fn world_to_grid(&self, wx: f64, wy: f64) -> Option<GridCoord> {
        if self.resolution <= 0.0 {
            return None;
        }
        let gx = ((wx - self.origin_x) / self.resolution).floor();
        let gy = ((wy - self.origin_y) / self.resolution).floor();
        if !gx.is_finite() || !gy.is_finite() || gx < 0.0 || gy < 0.0 {
            return None;
        }
        let coord = GridCoord::new(gx as usize, gy as usize);
        self.contains(coord).then_some(coord)
    }
}
