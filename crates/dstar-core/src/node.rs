//! Per-cell search state owned by a single arena.

use serde::{Deserialize, Serialize};

/// Queue membership of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    /// Never queued
    New,
    /// Currently in the open list
    Open,
    /// Popped and processed
    Closed,
}

/// Search state of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DNode {
    /// Path cost estimate from this cell to the goal
    pub cost: f64,
    /// Priority the node was last queued with
    pub key: f64,
    /// Linear index of the next cell towards the goal
    pub parent: Option<usize>,
    pub tag: Tag,
}

impl DNode {
    fn fresh(inf: f64) -> Self {
        Self {
            cost: inf,
            key: inf,
            parent: None,
            tag: Tag::New,
        }
    }
}

/// Dense arena of nodes indexed by linear cell index.
#[derive(Debug, Clone)]
pub struct NodeGrid {
    nodes: Vec<DNode>,
    inf: f64,
}

impl NodeGrid {
    pub fn new(cell_count: usize, inf: f64) -> Self {
        Self {
            nodes: vec![DNode::fresh(inf); cell_count],
            inf,
        }
    }

    /// Drops all search state and rebuilds every node in its default state.
    pub fn reset(&mut self) {
        let cell_count = self.nodes.len();
        self.nodes = vec![DNode::fresh(self.inf); cell_count];
    }

    pub fn get(&self, id: usize) -> &DNode {
        &self.nodes[id]
    }

    pub fn get_mut(&mut self, id: usize) -> &mut DNode {
        &mut self.nodes[id]
    }
}
