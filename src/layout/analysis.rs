use std::collections::{HashMap, VecDeque};

use crate::ir::{Edge, Node, NodeKind, Workflow};

use super::types::EdgeClass;

pub(super) struct ResolvedEdge<'a> {
    pub source: usize,
    pub target: usize,
    pub edge: &'a Edge,
}

/// Index-addressed view of a workflow. Node indices follow input order.
pub(super) struct FlowGraph<'a> {
    pub nodes: Vec<&'a Node>,
    pub index: HashMap<&'a str, usize>,
    pub edges: Vec<ResolvedEdge<'a>>,
    pub outgoing: Vec<Vec<usize>>,
    pub incoming: Vec<Vec<usize>>,
}

impl<'a> FlowGraph<'a> {
    pub fn new(workflow: &'a Workflow) -> Self {
        let mut nodes: Vec<&'a Node> = Vec::with_capacity(workflow.nodes.len());
        let mut index: HashMap<&'a str, usize> = HashMap::with_capacity(workflow.nodes.len());
        for node in &workflow.nodes {
            if index.contains_key(node.id.as_str()) {
                log::warn!("duplicate node id `{}`; keeping the first occurrence", node.id);
                continue;
            }
            index.insert(node.id.as_str(), nodes.len());
            nodes.push(node);
        }

        let mut edges = Vec::with_capacity(workflow.edges.len());
        let mut outgoing = vec![Vec::new(); nodes.len()];
        let mut incoming = vec![Vec::new(); nodes.len()];
        for edge in &workflow.edges {
            let (Some(&source), Some(&target)) = (
                index.get(edge.source.as_str()),
                index.get(edge.target.as_str()),
            ) else {
                log::debug!(
                    "edge `{}` ({} -> {}) references a missing node; ignored",
                    edge.id,
                    edge.source,
                    edge.target
                );
                continue;
            };
            outgoing[source].push(edges.len());
            incoming[target].push(edges.len());
            edges.push(ResolvedEdge {
                source,
                target,
                edge,
            });
        }

        Self {
            nodes,
            index,
            edges,
            outgoing,
            incoming,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn id(&self, node: usize) -> &'a str {
        self.nodes[node].id.as_str()
    }

    pub fn kind(&self, node: usize) -> NodeKind {
        self.nodes[node].kind()
    }
}

pub(super) struct GraphAnalysis {
    /// Raw in-degree above one, back-edges included.
    pub is_merge: Vec<bool>,
    /// More than one forward (non-back) incoming edge. Only these are cut and stitched.
    pub is_convergence: Vec<bool>,
    pub edge_class: Vec<EdgeClass>,
    pub topo_order: Vec<usize>,
    /// Merge nodes in topological order, so upstream merges come first.
    pub sorted_merges: Vec<usize>,
}

impl GraphAnalysis {
    pub fn is_back(&self, edge: usize) -> bool {
        self.edge_class[edge] == EdgeClass::Back
    }
}

pub(super) fn analyze(graph: &FlowGraph) -> GraphAnalysis {
    let incoming_count: Vec<usize> = graph.incoming.iter().map(Vec::len).collect();
    let is_merge: Vec<bool> = incoming_count.iter().map(|count| *count > 1).collect();

    let back = find_back_edges(graph, &incoming_count);
    let mut forward_count = vec![0usize; graph.len()];
    for (edge, is_back) in graph.edges.iter().zip(&back) {
        if !is_back {
            forward_count[edge.target] += 1;
        }
    }
    let is_convergence: Vec<bool> = forward_count.iter().map(|count| *count > 1).collect();

    let edge_class = graph
        .edges
        .iter()
        .zip(&back)
        .map(|(edge, is_back)| {
            if *is_back {
                EdgeClass::Back
            } else if is_convergence[edge.target] {
                EdgeClass::Convergence
            } else {
                EdgeClass::Tree
            }
        })
        .collect();

    let topo_order = topological_order(graph, &back);
    let sorted_merges: Vec<usize> = topo_order
        .iter()
        .copied()
        .filter(|node| is_merge[*node])
        .collect();

    log::debug!(
        "analyzed {} nodes, {} edges ({} back), {} merge nodes",
        graph.len(),
        graph.edges.len(),
        back.iter().filter(|is_back| **is_back).count(),
        sorted_merges.len()
    );

    GraphAnalysis {
        is_merge,
        is_convergence,
        edge_class,
        topo_order,
        sorted_merges,
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    OnPath,
    Done,
}

/// Marks every edge whose target is on the active depth-first path.
/// Walks start at true sources, then at any node still unvisited, both in input order.
fn find_back_edges(graph: &FlowGraph, incoming_count: &[usize]) -> Vec<bool> {
    let mut state = vec![Visit::New; graph.len()];
    let mut back = vec![false; graph.edges.len()];
    let sources = (0..graph.len()).filter(|node| incoming_count[*node] == 0);

    for start in sources.chain(0..graph.len()) {
        if state[start] != Visit::New {
            continue;
        }
        state[start] = Visit::OnPath;
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let Some(&edge) = graph.outgoing[node].get(frame.1) else {
                state[node] = Visit::Done;
                stack.pop();
                continue;
            };
            frame.1 += 1;
            let target = graph.edges[edge].target;
            match state[target] {
                Visit::OnPath => {
                    log::debug!(
                        "edge `{}` closes a cycle onto `{}`",
                        graph.edges[edge].edge.id,
                        graph.id(target)
                    );
                    back[edge] = true;
                }
                Visit::New => {
                    state[target] = Visit::OnPath;
                    stack.push((target, 0));
                }
                Visit::Done => {}
            }
        }
    }
    back
}

/// Kahn's algorithm over the non-back edges.
fn topological_order(graph: &FlowGraph, back: &[bool]) -> Vec<usize> {
    let mut in_degree = vec![0usize; graph.len()];
    for (idx, edge) in graph.edges.iter().enumerate() {
        if !back[idx] {
            in_degree[edge.target] += 1;
        }
    }

    let mut queue: VecDeque<usize> = (0..graph.len())
        .filter(|node| in_degree[*node] == 0)
        .collect();
    let mut order = Vec::with_capacity(graph.len());
    while let Some(node) = queue.pop_front() {
        order.push(node);
        for &edge in &graph.outgoing[node] {
            if back[edge] {
                continue;
            }
            let target = graph.edges[edge].target;
            in_degree[target] -= 1;
            if in_degree[target] == 0 {
                queue.push_back(target);
            }
        }
    }

    if order.len() < graph.len() {
        log::warn!(
            "{} nodes are not in topological order; their merges keep forest positions",
            graph.len() - order.len()
        );
    }
    order
}
