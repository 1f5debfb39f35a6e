use std::collections::VecDeque;

use crate::config::LayoutConfig;

use super::analysis::{FlowGraph, GraphAnalysis};
use super::forest::Forest;
use super::types::Point;

/// Computes the column of the line that carries a loop's exit around its body.
pub(super) struct BypassSolver<'a> {
    graph: &'a FlowGraph<'a>,
    analysis: &'a GraphAnalysis,
    forest: &'a Forest,
    positions: &'a [Point],
    margin: f32,
    memo: Vec<Option<f32>>,
    active: Vec<bool>,
}

impl<'a> BypassSolver<'a> {
    pub fn new(
        graph: &'a FlowGraph<'a>,
        analysis: &'a GraphAnalysis,
        forest: &'a Forest,
        positions: &'a [Point],
        config: &LayoutConfig,
    ) -> Self {
        Self {
            graph,
            analysis,
            forest,
            positions,
            margin: config.bypass_margin,
            memo: vec![None; graph.len()],
            active: vec![false; graph.len()],
        }
    }

    /// Returns `None` when `node` is already being solved further up the stack.
    pub fn solve(&mut self, node: usize) -> Option<f32> {
        if let Some(offset) = self.memo[node] {
            return Some(offset);
        }
        if self.active[node] {
            log::debug!("loop `{}` re-entered while solving", self.graph.id(node));
            return None;
        }
        self.active[node] = true;

        let exit = self.exit_target(node);
        let mut min_x = self.positions[node].x;
        let mut visited = vec![false; self.graph.len()];
        let mut queue = VecDeque::from([node]);
        visited[node] = true;
        while let Some(current) = queue.pop_front() {
            min_x = min_x.min(self.positions[current].x);
            if current != node
                && self.graph.kind(current).is_loop()
                && let Some(inner) = self.solve(current)
            {
                min_x = min_x.min(inner);
            }
            for next in self.body_successors(current, exit.is_some()) {
                if Some(next) == exit || std::mem::replace(&mut visited[next], true) {
                    continue;
                }
                queue.push_back(next);
            }
        }

        self.active[node] = false;
        let offset = min_x - self.margin;
        self.memo[node] = Some(offset);
        Some(offset)
    }

    /// Where the loop's exit connector lands: its bypass/exit handle, else the first convergence
    /// node it feeds directly outside the body. Loop heads count as raw merges through their own
    /// back-edge, so only convergence nodes qualify.
    fn exit_target(&self, node: usize) -> Option<usize> {
        let edges = &self.graph.edges;
        self.forward_edges(node)
            .find(|edge| edges[*edge].edge.is_loop_exit())
            .or_else(|| {
                self.forward_edges(node).find(|edge| {
                    !edges[*edge].edge.is_loop_body()
                        && self.analysis.is_convergence[edges[*edge].target]
                })
            })
            .map(|edge| edges[edge].target)
    }

    fn forward_edges(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.graph.outgoing[node]
            .iter()
            .copied()
            .filter(move |edge| !self.analysis.is_back(*edge))
    }

    fn body_successors(&self, node: usize, bounded: bool) -> Vec<usize> {
        if !bounded {
            return self.forest.children[node].clone();
        }
        self.forward_edges(node)
            .map(|edge| self.graph.edges[edge].target)
            .collect()
    }
}

/// Bypass column per node; `Some` only for loop nodes.
pub(super) fn solve_bypass_offsets(
    graph: &FlowGraph,
    analysis: &GraphAnalysis,
    forest: &Forest,
    positions: &[Point],
    config: &LayoutConfig,
) -> Vec<Option<f32>> {
    let mut solver = BypassSolver::new(graph, analysis, forest, positions, config);
    (0..graph.len())
        .map(|node| {
            if graph.kind(node).is_loop() {
                solver.solve(node)
            } else {
                None
            }
        })
        .collect()
}
