use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ir::NodeKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Side of a node a connector attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlePosition {
    Top,
    Bottom,
}

impl HandlePosition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

/// Role of an edge in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeClass {
    /// Kept in the cut forest.
    Tree,
    /// Points into a merge node; reattached by stitching.
    Convergence,
    /// Closes a cycle onto a node on the active walk; ignored by the layout.
    Back,
}

#[derive(Debug, Clone)]
pub struct NodeLayout {
    pub id: String,
    pub kind: NodeKind,
    /// Top-left corner.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub is_merge_node: bool,
    pub loop_depth: Option<usize>,
    /// Column of the line routing around the loop body (loop nodes only).
    pub bypass_x: Option<f32>,
    pub source_position: HandlePosition,
    pub target_position: HandlePosition,
    pub data: Map<String, Value>,
}

impl NodeLayout {
    pub fn position(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

#[derive(Debug, Clone)]
pub struct EdgeLayout {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_handle: Option<String>,
    pub class: EdgeClass,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// Laid-out nodes in input order.
    pub nodes: IndexMap<String, NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub topo_order: Vec<String>,
    /// Raw merge nodes (more than one incoming edge) in topological order, loop heads included.
    pub merge_nodes: Vec<String>,
    pub primary_root: Option<String>,
    pub bounds: Bounds,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.nodes.get(id)
    }

    pub fn position(&self, id: &str) -> Option<Point> {
        self.nodes.get(id).map(NodeLayout::position)
    }

    pub fn bypass_x(&self, id: &str) -> Option<f32> {
        self.nodes.get(id).and_then(|node| node.bypass_x)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
