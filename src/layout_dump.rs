use crate::error::{Error, Result};
use crate::ir::{Edge, Workflow};
use crate::layout::{Bounds, Layout, Point};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// The workflow as handed back to the editor: every input node with its computed geometry,
/// and the edges untouched.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<Edge>,
    pub bounds: BoundsDump,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<String>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
    pub position: Point,
    pub is_merge_node: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bypass_x: Option<f32>,
    pub source_position: &'static str,
    pub target_position: &'static str,
}

#[derive(Debug, Serialize)]
pub struct BoundsDump {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl From<Bounds> for BoundsDump {
    fn from(bounds: Bounds) -> Self {
        Self {
            x: bounds.min_x,
            y: bounds.min_y,
            width: bounds.width(),
            height: bounds.height(),
        }
    }
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, workflow: &Workflow) -> Self {
        let nodes = workflow
            .nodes
            .iter()
            .filter_map(|node| {
                let placed = layout.node(&node.id)?;
                Some(NodeDump {
                    id: node.id.clone(),
                    node_type: node.node_type.clone(),
                    branches: node.branches.clone(),
                    data: placed.data.clone(),
                    position: placed.position(),
                    is_merge_node: placed.is_merge_node,
                    bypass_x: placed.bypass_x,
                    source_position: placed.source_position.as_str(),
                    target_position: placed.target_position.as_str(),
                })
            })
            .collect();

        LayoutDump {
            nodes,
            edges: workflow.edges.clone(),
            bounds: layout.bounds.into(),
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.map_err(Error::Output)
    }
}

/// Writes the dump to `path`, or to stdout when no path is given.
pub fn write_layout_dump(path: Option<&Path>, dump: &LayoutDump, pretty: bool) -> Result<()> {
    let sink: Box<dyn Write> = match path {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = BufWriter::new(sink);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, dump).map_err(Error::Output)?;
    } else {
        serde_json::to_writer(&mut writer, dump).map_err(Error::Output)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
