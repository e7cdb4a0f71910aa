//! Text rendering of a costmap with a planned path on top.

use dstar_core::{GridCoord, GridGeometry};
use std::collections::HashSet;

/// Draws the grid with row `ny - 1` on top.
///
/// `#` marks cells above `threshold`, `*` path cells, `S` and `G` the endpoints.
pub fn render_ascii(
    geometry: &GridGeometry,
    costs: &[u8],
    threshold: f64,
    path: &[GridCoord],
    start: GridCoord,
    goal: GridCoord,
) -> String {
    let on_path: HashSet<GridCoord> = path.iter().copied().collect();
    let mut out = String::with_capacity((geometry.nx + 1) * geometry.ny);

    for y in (0..geometry.ny).rev() {
        for x in 0..geometry.nx {
            let cell = GridCoord::new(x, y);
            let glyph = if cell == start {
                'S'
            } else if cell == goal {
                'G'
            } else if f64::from(costs[geometry.index(cell)]) > threshold {
                '#'
            } else if on_path.contains(&cell) {
                '*'
            } else {
                '.'
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}
