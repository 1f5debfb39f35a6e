use crate::config::LayoutConfig;

use super::analysis::{FlowGraph, GraphAnalysis};
use super::forest::Forest;
use super::position::Placement;

/// Moves every merge subtree under the parents it converges from. Merges are visited in
/// topological order so a merge fed by another merge sees its parent's final position.
pub(super) fn stitch_merge_nodes(
    graph: &FlowGraph,
    analysis: &GraphAnalysis,
    forest: &Forest,
    placement: &mut Placement,
    config: &LayoutConfig,
) {
    for &merge in &analysis.sorted_merges {
        if !analysis.is_convergence[merge] {
            continue;
        }
        let parents = merge_parents(graph, analysis, merge);
        if parents.is_empty() {
            continue;
        }

        let sum_x: f32 = parents.iter().map(|p| placement.positions[*p].x).sum();
        let target_x = (sum_x / parents.len() as f32).round();
        let target_y = parents
            .iter()
            .map(|p| placement.positions[*p].y)
            .fold(f32::MIN, f32::max)
            + config.row_height();

        let current = placement.positions[merge];
        let (dx, dy) = (target_x - current.x, target_y - current.y);
        log::trace!(
            "stitching `{}` under {} parents by ({dx:.1}, {dy:.1})",
            graph.id(merge),
            parents.len()
        );
        placement.shift_subtree(forest, merge, dx, dy);
    }
}

/// Distinct sources of the edges converging on `merge`, in edge order.
fn merge_parents(graph: &FlowGraph, analysis: &GraphAnalysis, merge: usize) -> Vec<usize> {
    let mut parents = Vec::new();
    for &edge in &graph.incoming[merge] {
        if analysis.is_back(edge) {
            continue;
        }
        let source = graph.edges[edge].source;
        if !parents.contains(&source) {
            parents.push(source);
        }
    }
    parents
}
