use crate::ir::{HandleRank, NodeKind};

use super::analysis::{FlowGraph, GraphAnalysis};
use super::types::EdgeClass;

/// Tree-shaped view of the workflow: every convergence edge and every back-edge is cut, so each
/// node keeps at most one parent.
pub(super) struct Forest {
    pub children: Vec<Vec<usize>>,
    pub roots: Vec<usize>,
    pub primary: Option<usize>,
}

impl Forest {
    pub fn is_leaf(&self, node: usize) -> bool {
        self.children[node].is_empty()
    }

    /// Nodes of the subtree rooted at `root`, parents before children. Runs in the size of the
    /// subtree: every node has at most one parent and tree edges never close a cycle.
    pub fn preorder(&self, root: usize) -> Vec<usize> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(self.children[node].iter().rev().copied());
        }
        order
    }
}

pub(super) fn build_forest(
    graph: &FlowGraph,
    analysis: &GraphAnalysis,
    primary_hint: Option<&str>,
) -> Forest {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); graph.len()];
    let mut parent: Vec<Option<usize>> = vec![None; graph.len()];
    let mut child_edge: Vec<Option<usize>> = vec![None; graph.len()];

    for (idx, edge) in graph.edges.iter().enumerate() {
        if analysis.edge_class[idx] != EdgeClass::Tree {
            continue;
        }
        // Only reachable through duplicate edges from the same source.
        if parent[edge.target].is_some() {
            continue;
        }
        parent[edge.target] = Some(edge.source);
        child_edge[edge.target] = Some(idx);
        children[edge.source].push(edge.target);
    }

    for (node, list) in children.iter_mut().enumerate() {
        let source = graph.nodes[node];
        list.sort_by_key(|child| {
            let edge = child_edge[*child].map(|idx| graph.edges[idx].edge);
            let rank = edge.map(|edge| edge.handle_rank()).unwrap_or(HandleRank::Neutral);
            let branch = edge
                .and_then(|edge| edge.label())
                .and_then(|label| source.branch_index(label))
                .unwrap_or(usize::MAX);
            (rank, branch, *child)
        });
    }

    let mut roots: Vec<usize> = (0..graph.len())
        .filter(|node| parent[*node].is_none() && !analysis.is_convergence[*node])
        .collect();
    let mut merge_root = vec![false; graph.len()];
    for &node in &analysis.sorted_merges {
        if analysis.is_convergence[node] {
            merge_root[node] = true;
            roots.push(node);
        }
    }
    for node in 0..graph.len() {
        if analysis.is_convergence[node] && !merge_root[node] {
            roots.push(node);
        }
    }

    let primary = pick_primary(graph, analysis, &roots, primary_hint);
    log::debug!(
        "cut forest has {} roots, primary {:?}",
        roots.len(),
        primary.map(|node| graph.id(node))
    );

    Forest {
        children,
        roots,
        primary,
    }
}

/// Convergence nodes are re-centred under their parents after placement, so they cannot hold
/// the anchor column.
fn pick_primary(
    graph: &FlowGraph,
    analysis: &GraphAnalysis,
    roots: &[usize],
    hint: Option<&str>,
) -> Option<usize> {
    if let Some(id) = hint {
        match graph.index.get(id) {
            Some(node) if roots.contains(node) && !analysis.is_convergence[*node] => {
                return Some(*node);
            }
            _ => log::warn!("configured root `{id}` is not a forest root; falling back"),
        }
    }
    roots
        .iter()
        .copied()
        .find(|node| graph.kind(*node) == NodeKind::Trigger)
        .or_else(|| roots.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Workflow;
    use crate::layout::analysis::analyze;

    fn forest_of(workflow: &Workflow, hint: Option<&str>) -> (Vec<String>, Forest) {
        let graph = FlowGraph::new(workflow);
        let analysis = analyze(&graph);
        let forest = build_forest(&graph, &analysis, hint);
        let ids = graph.nodes.iter().map(|node| node.id.clone()).collect();
        (ids, forest)
    }

    fn names(ids: &[String], nodes: &[usize]) -> Vec<String> {
        nodes.iter().map(|node| ids[*node].clone()).collect()
    }

    #[test]
    fn merge_nodes_become_roots() {
        let mut workflow = Workflow::new();
        workflow
            .node("a", NodeKind::Trigger)
            .node("b", NodeKind::Condition)
            .node("c", NodeKind::Step)
            .node("d", NodeKind::Step)
            .node("e", NodeKind::End)
            .connect("a", "b")
            .connect_via("b", "accepted", "c")
            .connect_via("b", "rejected", "d")
            .connect("c", "e")
            .connect("d", "e");
        let (ids, forest) = forest_of(&workflow, None);

        assert_eq!(names(&ids, &forest.roots), vec!["a", "e"]);
        assert!(forest.roots.contains(&4));
        assert!(forest.is_leaf(2));
        assert_eq!(names(&ids, &forest.preorder(0)), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn children_follow_handles_then_branches_then_input_order() {
        let mut workflow = Workflow::new();
        workflow
            .node("cond", NodeKind::Condition)
            .node("no", NodeKind::Step)
            .node("yes", NodeKind::Step)
            .node("plain", NodeKind::Step)
            .connect_via("cond", "rejected", "no")
            .connect("cond", "plain")
            .connect_via("cond", "accepted", "yes");
        let (ids, forest) = forest_of(&workflow, None);
        assert_eq!(names(&ids, &forest.children[0]), vec!["yes", "plain", "no"]);

        let mut workflow = Workflow::new();
        workflow
            .branched_node("fan", NodeKind::Parallel, &["email", "sms", "push"])
            .node("p", NodeKind::Step)
            .node("s", NodeKind::Step)
            .node("x", NodeKind::Step)
            .node("e", NodeKind::Step)
            .connect_labeled("fan", "push", "p")
            .connect_labeled("fan", "sms", "s")
            .connect_labeled("fan", "unknown", "x")
            .connect_labeled("fan", "email", "e");
        let (ids, forest) = forest_of(&workflow, None);
        assert_eq!(names(&ids, &forest.children[0]), vec!["e", "s", "p", "x"]);
    }

    #[test]
    fn primary_root_prefers_hint_then_trigger() {
        let mut workflow = Workflow::new();
        workflow
            .node("orphan", NodeKind::Step)
            .node("start", NodeKind::Trigger)
            .node("next", NodeKind::Step)
            .connect("start", "next");

        let (ids, forest) = forest_of(&workflow, None);
        assert_eq!(forest.primary.map(|node| ids[node].as_str()), Some("start"));

        let (ids, forest) = forest_of(&workflow, Some("orphan"));
        assert_eq!(forest.primary.map(|node| ids[node].as_str()), Some("orphan"));

        let (ids, forest) = forest_of(&workflow, Some("next"));
        assert_eq!(forest.primary.map(|node| ids[node].as_str()), Some("start"));
    }

    #[test]
    fn convergence_node_is_never_the_primary_root() {
        let mut workflow = Workflow::new();
        workflow
            .node("a", NodeKind::Trigger)
            .node("b", NodeKind::Step)
            .node("c", NodeKind::Step)
            .node("join", NodeKind::Step)
            .connect("a", "b")
            .connect("a", "c")
            .connect("b", "join")
            .connect("c", "join");
        let (ids, forest) = forest_of(&workflow, Some("join"));
        assert!(forest.roots.contains(&3));
        assert_eq!(forest.primary.map(|node| ids[node].as_str()), Some("a"));
    }

    #[test]
    fn trees_partition_the_nodes() {
        let mut workflow = Workflow::new();
        workflow.node("t", NodeKind::Trigger);
        let mut previous = "t".to_string();
        for rung in 0..6 {
            let (cond, yes, no, join) = (
                format!("cond{rung}"),
                format!("yes{rung}"),
                format!("no{rung}"),
                format!("join{rung}"),
            );
            workflow
                .node(&cond, NodeKind::Condition)
                .node(&yes, NodeKind::Step)
                .node(&no, NodeKind::Step)
                .node(&join, NodeKind::Step)
                .connect(&previous, &cond)
                .connect_via(&cond, "accepted", &yes)
                .connect_via(&cond, "rejected", &no)
                .connect(&yes, &join)
                .connect(&no, &join);
            previous = join;
        }
        let (ids, forest) = forest_of(&workflow, None);

        let mut seen: Vec<usize> = forest
            .roots
            .iter()
            .flat_map(|root| forest.preorder(*root))
            .collect();
        assert_eq!(seen.len(), ids.len());
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), ids.len());
    }

    #[test]
    fn back_edge_into_plain_node_leaves_it_as_root() {
        let mut workflow = Workflow::new();
        workflow
            .node("x", NodeKind::Step)
            .node("y", NodeKind::Step)
            .connect("x", "y")
            .connect("y", "x");
        let (ids, forest) = forest_of(&workflow, None);
        assert_eq!(names(&ids, &forest.roots), vec!["x"]);
        assert_eq!(names(&ids, &forest.preorder(0)), vec!["x", "y"]);
    }
}
