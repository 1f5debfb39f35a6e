use super::analysis::FlowGraph;
use super::forest::Forest;

/// Nesting depth per node. A loop counts itself plus the deepest loop below it in the cut
/// forest; other nodes carry the deepest loop below them unchanged.
pub(super) fn loop_nest_depths(graph: &FlowGraph, forest: &Forest) -> Vec<usize> {
    let mut depths = vec![0usize; graph.len()];
    for &root in &forest.roots {
        for node in forest.preorder(root).into_iter().rev() {
            let deepest = forest.children[node]
                .iter()
                .map(|child| depths[*child])
                .max()
                .unwrap_or(0);
            depths[node] = if graph.kind(node).is_loop() {
                deepest + 1
            } else {
                deepest
            };
        }
    }
    depths
}

/// Depth used to size a loop's gutter; unset entries count as one level.
pub(super) fn gutter_depth(depths: &[usize], node: usize) -> usize {
    match depths.get(node) {
        Some(depth) if *depth > 0 => *depth,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{NodeKind, Workflow};
    use crate::layout::analysis::analyze;
    use crate::layout::forest::build_forest;

    #[test]
    fn nested_loops_count_outward() {
        let mut workflow = Workflow::new();
        workflow
            .node("start", NodeKind::Trigger)
            .node("outer", NodeKind::Loop)
            .node("inner", NodeKind::Loop)
            .node("work", NodeKind::Step)
            .node("side", NodeKind::Step)
            .connect("start", "outer")
            .connect_via("outer", "loop-body", "inner")
            .connect_via("inner", "loop-body", "work")
            .connect_via("outer", "loop-bypass", "side");
        let graph = FlowGraph::new(&workflow);
        let analysis = analyze(&graph);
        let forest = build_forest(&graph, &analysis, None);
        let depths = loop_nest_depths(&graph, &forest);

        assert_eq!(depths, vec![2, 2, 1, 0, 0]);
        assert_eq!(gutter_depth(&depths, 3), 1);
        assert_eq!(gutter_depth(&depths, 1), 2);
    }
}
