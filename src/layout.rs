//! Layout handoff. Coordinates come from an external layout engine; this
//! module only describes what is sent and what comes back.

use crate::edge::ElementEdge;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Size hint for one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    pub id: String,
    pub width: f64,
    pub height: f64,
}

/// Pre-layout graph: nodes with size hints plus `source -> target` edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutRequest {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<ElementEdge>,
}

/// Where the engine put one node. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodePlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Node id -> placement.
pub type LayoutResponse = IndexMap<String, NodePlacement>;

pub type LayoutFailure = Box<dyn std::error::Error + Send + Sync>;

pub trait LayoutEngine {
    fn layout(&self, request: &LayoutRequest) -> Result<LayoutResponse, LayoutFailure>;
}

impl<F> LayoutEngine for F
where
    F: Fn(&LayoutRequest) -> Result<LayoutResponse, LayoutFailure>,
{
    fn layout(&self, request: &LayoutRequest) -> Result<LayoutResponse, LayoutFailure> {
        self(request)
    }
}

impl LayoutRequest {
    pub fn node_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.nodes.iter().map(|n| n.id.as_str())
    }
}
