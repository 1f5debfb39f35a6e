use crate::config::LayoutConfig;

use super::analysis::FlowGraph;
use super::forest::Forest;
use super::loops::gutter_depth;

/// Horizontal room each subtree of the cut forest needs so that siblings never overlap.
pub(super) fn subtree_footprints(
    graph: &FlowGraph,
    forest: &Forest,
    depths: &[usize],
    config: &LayoutConfig,
) -> Vec<f32> {
    let mut footprints = vec![0.0f32; graph.len()];
    for &root in &forest.roots {
        for node in forest.preorder(root).into_iter().rev() {
            let mut width = if forest.is_leaf(node) {
                config.node_width + config.horizontal_gap
            } else {
                forest.children[node]
                    .iter()
                    .map(|child| footprints[*child])
                    .sum()
            };
            if graph.kind(node).is_loop() {
                width += config.loop_padding(gutter_depth(depths, node));
            }
            footprints[node] = width;
        }
    }
    footprints
}
