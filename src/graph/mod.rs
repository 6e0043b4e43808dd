//! The property-graph value types shared by every converter in the crate.
//!
//! A [`FlowGraph`] is the pivot format between the markup grammar and the
//! relational rule table: the markup parser and the rule compiler both
//! produce one, and the serializer consumes one. All types here are plain
//! immutable values; every conversion returns a new graph and never mutates
//! the one it was given.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of control elements the markup grammar knows about.
///
/// `Unknown` is used for tags the parser does not recognize. Such nodes are
/// kept in the graph so no information is silently dropped, but they cannot
/// be represented in markup and are skipped on serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    If,
    ElseIf,
    Else,
    ForEach,
    Invoke,
    Exception,
    Unknown,
}

impl ElementKind {
    /// Classifies a markup tag name. Tag names are case-sensitive.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "if" => ElementKind::If,
            "elseif" => ElementKind::ElseIf,
            "else" => ElementKind::Else,
            "foreach" => ElementKind::ForEach,
            "invoke" => ElementKind::Invoke,
            "exception" => ElementKind::Exception,
            _ => ElementKind::Unknown,
        }
    }

    /// The markup tag this kind serializes to, or `None` for `Unknown`.
    pub fn tag_name(&self) -> Option<&'static str> {
        match self {
            ElementKind::If => Some("if"),
            ElementKind::ElseIf => Some("elseif"),
            ElementKind::Else => Some("else"),
            ElementKind::ForEach => Some("foreach"),
            ElementKind::Invoke => Some("invoke"),
            ElementKind::Exception => Some("exception"),
            ElementKind::Unknown => None,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag_name() {
            Some(tag) => write!(f, "{}", tag),
            None => write!(f, "unknown"),
        }
    }
}

/// Canvas placement of a node. Caller-owned metadata: the core assigns
/// deterministic hints on creation but attaches no meaning to the values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Typed attributes of an `invoke` step. Empty strings mean "absent" and are
/// not written back to markup.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvokeDetail {
    pub step_id: String,
    pub step_description: String,
    pub flow_status: String,
    pub success_flow_status: String,
    pub fail_flow_status: String,
    pub interaction: String,
}

/// One exception handler attached to an `invoke` node. The description is
/// the element's text content; everything is free text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExceptionRecord {
    pub id_condition: String,
    pub step_id: String,
    pub flow_status: String,
    pub description: String,
}

/// Whether a transition edge was taken from the success or the failure
/// routing column of the rule table. Containment edges carry no kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionKind {
    Success,
    Failure,
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionKind::Success => write!(f, "Success"),
            ConnectionKind::Failure => write!(f, "Failure"),
        }
    }
}

/// A positioned node of the flow graph.
///
/// Known fields (`condition`, `invoke`, `exceptions`) are typed; everything
/// else an element carried rides along in the ordered `attributes` bag. On
/// serialization the typed fields always win over same-named bag entries, so
/// the two never produce duplicate output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Unique id, assigned once at parse or compile time and never reused.
    pub id: String,
    pub kind: ElementKind,
    /// Human-readable label for the visual editor.
    pub label: String,
    pub position: Position,
    /// Condition expression for `If`/`ElseIf` nodes, opaque to the core.
    pub condition: Option<String>,
    /// Step attributes, populated for `Invoke` nodes.
    pub invoke: Option<InvokeDetail>,
    /// Exception handlers, meaningful only on `Invoke` nodes. Order preserved.
    pub exceptions: Vec<ExceptionRecord>,
    /// Passthrough attributes in document order.
    pub attributes: IndexMap<String, String>,
}

impl GraphNode {
    /// A bare node of the given kind with no attributes.
    pub fn new(id: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            kind,
            label: String::new(),
            position: Position::default(),
            condition: None,
            invoke: None,
            exceptions: Vec::new(),
            attributes: IndexMap::new(),
        }
    }
}

/// A directed edge. For markup-origin graphs an edge means parent→child
/// containment; for table-origin graphs it means a success/failure
/// transition and carries the synthesized condition. Pure graph operations
/// (root detection, id generation) assume neither interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: Option<ConnectionKind>,
    pub condition: Option<String>,
}

impl GraphEdge {
    /// A containment edge with the conventional `edge-{source}-{target}` id.
    pub fn containment(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("edge-{}-{}", source, target),
            source,
            target,
            kind: None,
            condition: None,
        }
    }
}

/// Document-level metadata carried through every conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowMetadata {
    pub process_name: String,
    pub version: String,
    pub order_type_id: Option<i64>,
}

impl Default for FlowMetadata {
    fn default() -> Self {
        Self {
            process_name: "Unnamed Process".to_string(),
            version: "1.0".to_string(),
            order_type_id: None,
        }
    }
}

/// The pivot representation: nodes, edges and document metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub metadata: FlowMetadata,
}

impl FlowGraph {
    /// Looks up a node by id.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Ids of all nodes with no incoming edge, in node-list order.
    pub fn root_ids(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| !self.edges.iter().any(|e| e.target == n.id))
            .map(|n| n.id.as_str())
            .collect()
    }

    /// Outgoing edges of a node, in edge-list order.
    pub fn outgoing(&self, id: &str) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.source == id)
    }
}
