use crate::config::LayoutConfig;

use super::analysis::FlowGraph;
use super::forest::Forest;
use super::loops::gutter_depth;
use super::types::Point;

/// Horizontal range handed to a subtree by its parent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(super) struct Span {
    pub start: f32,
    pub width: f32,
}

pub(super) struct Placement {
    pub positions: Vec<Point>,
    pub spans: Vec<Span>,
}

impl Placement {
    /// Moves `root` and everything below it in the cut forest by the same delta.
    pub fn shift_subtree(&mut self, forest: &Forest, root: usize, dx: f32, dy: f32) {
        for node in forest.preorder(root) {
            self.positions[node].x += dx;
            self.positions[node].y += dy;
            self.spans[node].start += dx;
        }
    }
}

/// Lays out every tree of the cut forest row by row. The primary tree goes first and is moved
/// so its root sits on `anchor_x`; the remaining trees follow to its right.
pub(super) fn assign_positions(
    graph: &FlowGraph,
    forest: &Forest,
    footprints: &[f32],
    depths: &[usize],
    config: &LayoutConfig,
) -> Placement {
    let mut placement = Placement {
        positions: vec![Point::default(); graph.len()],
        spans: vec![Span::default(); graph.len()],
    };

    let mut order: Vec<usize> = forest.primary.into_iter().collect();
    order.extend(
        forest
            .roots
            .iter()
            .copied()
            .filter(|root| Some(*root) != forest.primary),
    );

    let mut cursor = 0.0f32;
    for root in order {
        place_tree(graph, forest, footprints, depths, config, root, cursor, &mut placement);
        if Some(root) == forest.primary {
            let dx = config.anchor_x - placement.positions[root].x;
            placement.shift_subtree(forest, root, dx, 0.0);
            cursor += dx;
        }
        cursor += footprints[root] + config.horizontal_gap;
    }

    log::debug!("placed {} trees, extent {cursor:.1}", forest.roots.len());
    placement
}

#[allow(clippy::too_many_arguments)]
fn place_tree(
    graph: &FlowGraph,
    forest: &Forest,
    footprints: &[f32],
    depths: &[usize],
    config: &LayoutConfig,
    root: usize,
    start: f32,
    placement: &mut Placement,
) {
    placement.spans[root] = Span {
        start,
        width: footprints[root],
    };

    let mut order = Vec::new();
    let mut stack = vec![(root, 0usize)];
    while let Some((node, level)) = stack.pop() {
        order.push(node);
        placement.positions[node].y = level as f32 * config.row_height();

        let mut cursor = placement.spans[node].start;
        if graph.kind(node).is_loop() && !forest.is_leaf(node) {
            cursor += config.loop_padding(gutter_depth(depths, node)) / 2.0;
        }
        for &child in &forest.children[node] {
            placement.spans[child] = Span {
                start: cursor,
                width: footprints[child],
            };
            cursor += footprints[child];
        }
        stack.extend(
            forest.children[node]
                .iter()
                .rev()
                .map(|child| (*child, level + 1)),
        );
    }

    for node in order.into_iter().rev() {
        let children = &forest.children[node];
        placement.positions[node].x = match (children.first(), children.last()) {
            (Some(first), Some(last)) => {
                (placement.positions[*first].x + placement.positions[*last].x) / 2.0
            }
            _ => {
                let span = placement.spans[node];
                span.start + span.width / 2.0 - config.node_width / 2.0
            }
        };
    }
}
