use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Source handles that sort to the left of their siblings.
pub const PRIMARY_HANDLES: [&str; 3] = ["accepted", "true", "loop-body"];
/// Source handles that sort to the right of their siblings.
pub const SECONDARY_HANDLES: [&str; 3] = ["rejected", "false", "loop-bypass"];
/// Source handles that mark the edge leaving a loop.
pub const LOOP_EXIT_HANDLES: [&str; 2] = ["loop-bypass", "loop-exit"];
/// Source handle of the edge entering a loop body.
pub const LOOP_BODY_HANDLE: &str = "loop-body";

/// Node keys computed by the layout. They are ignored on input and replaced on output.
pub const LAYOUT_KEYS: [&str; 5] = [
    "position",
    "isMergeNode",
    "bypassX",
    "sourcePosition",
    "targetPosition",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeKind {
    Trigger,
    #[default]
    Step,
    Condition,
    Parallel,
    Loop,
    End,
}

impl NodeKind {
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "trigger" | "start" => Self::Trigger,
            "condition" | "if" => Self::Condition,
            "parallel" => Self::Parallel,
            "loop" => Self::Loop,
            "end" => Self::End,
            _ => Self::Step,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trigger => "trigger",
            Self::Step => "step",
            Self::Condition => "condition",
            Self::Parallel => "parallel",
            Self::Loop => "loop",
            Self::End => "end",
        }
    }

    pub fn is_loop(self) -> bool {
        self == Self::Loop
    }

    /// Kinds whose `branches` list orders their children.
    pub fn has_branch_order(self) -> bool {
        matches!(self, Self::Parallel | Self::Loop)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    /// Raw editor type. Unknown types lay out as regular steps.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<String>,
    /// Display data the layout does not interpret, echoed back on output.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            node_type: Some(kind.as_str().to_string()),
            branches: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.node_type
            .as_deref()
            .map(NodeKind::from_token)
            .unwrap_or_default()
    }

    /// Position of `label` in the authored branch list, if this kind carries one.
    pub fn branch_index(&self, label: &str) -> Option<usize> {
        if !self.kind().has_branch_order() {
            return None;
        }
        self.branches.iter().position(|branch| branch == label)
    }

    /// Display data with the layout-computed keys removed.
    pub fn display_data(&self) -> Map<String, Value> {
        self.extra
            .iter()
            .filter(|(key, _)| !LAYOUT_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    #[serde(default)]
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EdgeData>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Left-to-right precedence of an edge among its siblings, derived from its source handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HandleRank {
    Primary,
    Neutral,
    Secondary,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            ..Default::default()
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.data.as_ref().and_then(|data| data.label.as_deref())
    }

    pub fn handle_rank(&self) -> HandleRank {
        match self.source_handle.as_deref() {
            Some(handle) if PRIMARY_HANDLES.contains(&handle) => HandleRank::Primary,
            Some(handle) if SECONDARY_HANDLES.contains(&handle) => HandleRank::Secondary,
            _ => HandleRank::Neutral,
        }
    }

    pub fn is_loop_exit(&self) -> bool {
        self.source_handle
            .as_deref()
            .is_some_and(|handle| LOOP_EXIT_HANDLES.contains(&handle))
    }

    pub fn is_loop_body(&self) -> bool {
        self.source_handle.as_deref() == Some(LOOP_BODY_HANDLE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(input: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&mut self, id: &str, kind: NodeKind) -> &mut Self {
        self.nodes.push(Node::new(id, kind));
        self
    }

    pub fn branched_node(&mut self, id: &str, kind: NodeKind, branches: &[&str]) -> &mut Self {
        let mut node = Node::new(id, kind);
        node.branches = branches.iter().map(|branch| branch.to_string()).collect();
        self.nodes.push(node);
        self
    }

    pub fn connect(&mut self, source: &str, target: &str) -> &mut Self {
        self.push_edge(source, target, None, None)
    }

    pub fn connect_via(&mut self, source: &str, handle: &str, target: &str) -> &mut Self {
        self.push_edge(source, target, Some(handle), None)
    }

    pub fn connect_labeled(&mut self, source: &str, label: &str, target: &str) -> &mut Self {
        self.push_edge(source, target, None, Some(label))
    }

    fn push_edge(
        &mut self,
        source: &str,
        target: &str,
        handle: Option<&str>,
        label: Option<&str>,
    ) -> &mut Self {
        let mut edge = Edge::new(format!("e{}", self.edges.len()), source, target);
        edge.source_handle = handle.map(str::to_string);
        edge.data = label.map(|label| EdgeData {
            label: Some(label.to_string()),
            extra: Map::new(),
        });
        self.edges.push(edge);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_editor_json_and_keeps_display_data() {
        let input = r#"{
            "nodes": [
                {"id": "a", "type": "trigger", "data": {"title": "On webhook"}, "position": {"x": 9, "y": 9}},
                {"id": "b", "type": "Parallel", "branches": ["left", "right"]},
                {"id": "c", "type": "sendEmail"},
                {"id": "d"}
            ],
            "edges": [
                {"id": "e1", "source": "a", "target": "b", "animated": true},
                {"id": "e2", "source": "b", "target": "c", "data": {"label": "right"}}
            ]
        }"#;
        let workflow = Workflow::from_json(input).unwrap();
        assert_eq!(workflow.nodes[0].kind(), NodeKind::Trigger);
        assert_eq!(workflow.nodes[1].kind(), NodeKind::Parallel);
        assert_eq!(workflow.nodes[2].kind(), NodeKind::Step);
        assert_eq!(workflow.nodes[2].node_type.as_deref(), Some("sendEmail"));
        assert_eq!(workflow.nodes[3].kind(), NodeKind::Step);
        assert_eq!(workflow.nodes[1].branch_index("right"), Some(1));

        let display = workflow.nodes[0].display_data();
        assert!(display.contains_key("data"));
        assert!(!display.contains_key("position"));

        assert_eq!(workflow.edges[1].label(), Some("right"));
        assert_eq!(workflow.edges[0].extra.get("animated"), Some(&Value::Bool(true)));
    }

    #[test]
    fn branch_index_ignores_kinds_without_branch_order() {
        let mut node = Node::new("c", NodeKind::Condition);
        node.branches = vec!["x".to_string()];
        assert_eq!(node.branch_index("x"), None);
    }

    #[test]
    fn handle_rank_orders_accepted_before_rejected() {
        let mut accepted = Edge::new("1", "b", "c");
        accepted.source_handle = Some("accepted".to_string());
        let mut rejected = Edge::new("2", "b", "d");
        rejected.source_handle = Some("rejected".to_string());
        let plain = Edge::new("3", "b", "e");
        assert!(accepted.handle_rank() < plain.handle_rank());
        assert!(plain.handle_rank() < rejected.handle_rank());
    }

    #[test]
    fn builder_assigns_unique_edge_ids() {
        let mut workflow = Workflow::new();
        workflow
            .node("a", NodeKind::Trigger)
            .node("b", NodeKind::Loop)
            .node("c", NodeKind::Step)
            .connect("a", "b")
            .connect_via("b", "loop-body", "c");
        assert_eq!(workflow.edges[0].id, "e0");
        assert_eq!(workflow.edges[1].id, "e1");
        assert!(!workflow.edges[1].is_loop_exit());
        assert!(workflow.edges[1].is_loop_body());
        assert!(!workflow.edges[0].is_loop_body());
    }
}
