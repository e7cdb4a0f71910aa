//! Path and expansion-set extraction from the search graph.

use crate::engine::DStarSearch;
use crate::grid::GridCoord;
use crate::node::Tag;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("{0:?} has no parent before reaching the goal")]
    BrokenLink(GridCoord),

    #[error("parent chain from {0:?} does not reach the goal")]
    Cycle(GridCoord),
}

/// Follows parent links from `from` until `to`, both ends included.
///
/// A chain longer than the grid has cells means the graph has a cycle, which
/// only happens when propagation was not run to convergence.
pub fn extract_path(
    search: &DStarSearch,
    from: GridCoord,
    to: GridCoord,
) -> Result<Vec<GridCoord>, PathError> {
    let geometry = search.geometry();
    let target = geometry.index(to);
    let mut current = geometry.index(from);
    let mut path = vec![from];

    while current != target {
        if path.len() > geometry.cell_count() {
            return Err(PathError::Cycle(from));
        }
        let Some(parent) = search.node(current).parent else {
            return Err(PathError::BrokenLink(geometry.coord(current)));
        };
        current = parent;
        path.push(geometry.coord(current));
    }

    Ok(path)
}

/// Every CLOSED cell, scanned column by column (x outer, y inner).
pub fn extract_expand(search: &DStarSearch) -> Vec<GridCoord> {
    let geometry = search.geometry();
    let mut expanded = Vec::new();
    for x in 0..geometry.nx {
        for y in 0..geometry.ny {
            let cell = GridCoord::new(x, y);
            if search.node(geometry.index(cell)).tag == Tag::Closed {
                expanded.push(cell);
            }
        }
    }
    expanded
}

/// Sum of edge lengths along `path`, in cells.
pub fn path_length(search: &DStarSearch, path: &[GridCoord]) -> f64 {
    let geometry = search.geometry();
    path.windows(2)
        .map(|pair| geometry.distance(pair[0], pair[1]))
        .sum()
}
