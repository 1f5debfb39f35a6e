mod analysis;
mod bypass;
mod forest;
mod loops;
mod merge;
mod position;
pub(crate) mod types;
mod width;

pub use types::*;

use crate::config::LayoutConfig;
use crate::ir::Workflow;
use indexmap::IndexMap;

use analysis::{FlowGraph, analyze};
use bypass::solve_bypass_offsets;
use forest::build_forest;
use loops::loop_nest_depths;
use merge::stitch_merge_nodes;
use position::assign_positions;
use width::subtree_footprints;

/// Runs the whole auto-layout pipeline. Positions are always recomputed from the graph
/// structure; any `position` already present on the input is ignored.
pub fn compute_layout(workflow: &Workflow, config: &LayoutConfig) -> Layout {
    if workflow.is_empty() {
        return Layout::default();
    }

    let graph = FlowGraph::new(workflow);
    let analysis = analyze(&graph);
    let forest = build_forest(&graph, &analysis, config.root.as_deref());
    let depths = loop_nest_depths(&graph, &forest);
    let footprints = subtree_footprints(&graph, &forest, &depths, config);
    let mut placement = assign_positions(&graph, &forest, &footprints, &depths, config);
    stitch_merge_nodes(&graph, &analysis, &forest, &mut placement, config);
    let bypass = solve_bypass_offsets(&graph, &analysis, &forest, &placement.positions, config);

    let mut nodes = IndexMap::with_capacity(graph.len());
    for (idx, node) in graph.nodes.iter().enumerate() {
        let kind = node.kind();
        let position = placement.positions[idx];
        nodes.insert(
            node.id.clone(),
            NodeLayout {
                id: node.id.clone(),
                kind,
                x: position.x,
                y: position.y,
                width: config.node_width,
                height: config.node_height,
                is_merge_node: analysis.is_merge[idx],
                loop_depth: kind.is_loop().then(|| loops::gutter_depth(&depths, idx)),
                bypass_x: bypass[idx],
                source_position: HandlePosition::Bottom,
                target_position: HandlePosition::Top,
                data: node.display_data(),
            },
        );
    }

    let edges = graph
        .edges
        .iter()
        .zip(&analysis.edge_class)
        .map(|(resolved, class)| EdgeLayout {
            id: resolved.edge.id.clone(),
            source: resolved.edge.source.clone(),
            target: resolved.edge.target.clone(),
            source_handle: resolved.edge.source_handle.clone(),
            class: *class,
        })
        .collect();

    let bounds = compute_bounds(&nodes, &bypass);
    log::debug!(
        "laid out {} nodes in {:.1} x {:.1}",
        nodes.len(),
        bounds.width(),
        bounds.height()
    );

    Layout {
        nodes,
        edges,
        topo_order: ids(&graph, &analysis.topo_order),
        merge_nodes: ids(&graph, &analysis.sorted_merges),
        primary_root: forest.primary.map(|node| graph.id(node).to_string()),
        bounds,
    }
}

fn ids(graph: &FlowGraph, nodes: &[usize]) -> Vec<String> {
    nodes.iter().map(|node| graph.id(*node).to_string()).collect()
}

/// Box around every node and every bypass line.
fn compute_bounds(nodes: &IndexMap<String, NodeLayout>, bypass: &[Option<f32>]) -> Bounds {
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for node in nodes.values() {
        min_x = min_x.min(node.x);
        min_y = min_y.min(node.y);
        max_x = max_x.max(node.x + node.width);
        max_y = max_y.max(node.y + node.height);
    }
    for x in bypass.iter().flatten() {
        min_x = min_x.min(*x);
    }
    if nodes.is_empty() {
        return Bounds::default();
    }
    Bounds {
        min_x,
        min_y,
        max_x,
        max_y,
    }
}
