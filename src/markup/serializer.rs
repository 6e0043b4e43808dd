use crate::error::StructuralError;
use crate::graph::{ElementKind, ExceptionRecord, FlowGraph, GraphNode};
use ahash::{AHashMap, AHashSet};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Serializes a [`FlowGraph`] back to markup text.
///
/// Roots are the nodes with no incoming edge; each is emitted depth-first
/// under `<process><logic>`, with children discovered by following outgoing
/// edges in edge-list order. A node already on the current branch is not
/// descended into again, so graphs containing containment cycles still
/// produce finite output. [`ElementKind::Unknown`] nodes have no markup
/// representation and are skipped together with their subtrees; this is
/// intentional information loss, mirrored by the unknown-tag handling of the
/// parser. Every edge endpoint must reference an existing node, whether the
/// traversal reaches it or not; a dangling id fails with
/// [`StructuralError::MissingNode`].
pub fn serialize(graph: &FlowGraph) -> Result<String, StructuralError> {
    let mut writer = Writer::new(Vec::new());

    let mut process = BytesStart::new("process");
    process.push_attribute(("name", graph.metadata.process_name.as_str()));
    process.push_attribute(("version", graph.metadata.version.as_str()));
    if let Some(order_type_id) = graph.metadata.order_type_id {
        process.push_attribute(("orderTypeId", order_type_id.to_string().as_str()));
    }
    write_event(&mut writer, Event::Start(process))?;
    write_event(&mut writer, Event::Start(BytesStart::new("logic")))?;

    let nodes_by_id: AHashMap<&str, &GraphNode> =
        graph.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    // Every edge endpoint must resolve before traversal starts. A dangling
    // source would otherwise make its target look like a non-root and drop
    // the whole subtree without any error.
    for edge in &graph.edges {
        for endpoint in [&edge.source, &edge.target] {
            if !nodes_by_id.contains_key(endpoint.as_str()) {
                return Err(StructuralError::MissingNode {
                    edge_id: edge.id.clone(),
                    node_id: endpoint.clone(),
                });
            }
        }
    }

    let mut path = Vec::new();
    for root_id in graph.root_ids() {
        write_node(&mut writer, graph, &nodes_by_id, root_id, &mut path)?;
    }

    write_event(&mut writer, Event::End(BytesEnd::new("logic")))?;
    write_event(&mut writer, Event::End(BytesEnd::new("process")))?;

    let body = String::from_utf8(writer.into_inner())
        .map_err(|e| StructuralError::Write(e.to_string()))?;
    Ok(format!("{}{}", DECLARATION, body))
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), StructuralError> {
    writer
        .write_event(event)
        .map_err(|e| StructuralError::Write(e.to_string()))
}

/// Emits one node and, recursively, its children. The `path` holds the node
/// ids on the current branch; a repeated id means a cycle, which truncates
/// the branch silently. The path is threaded explicitly so concurrent or
/// sibling branches never observe each other's visits.
fn write_node(
    writer: &mut Writer<Vec<u8>>,
    graph: &FlowGraph,
    nodes_by_id: &AHashMap<&str, &GraphNode>,
    node_id: &str,
    path: &mut Vec<String>,
) -> Result<(), StructuralError> {
    if path.iter().any(|id| id == node_id) {
        return Ok(());
    }
    let node: &GraphNode = nodes_by_id[node_id];

    let Some(tag) = node.kind.tag_name() else {
        // Unknown kinds cannot be represented in markup.
        return Ok(());
    };

    let mut element = BytesStart::new(tag);
    let mut written: AHashSet<&str> = AHashSet::new();
    push_typed_attributes(node, &mut element, &mut written);
    for (key, value) in &node.attributes {
        if !value.is_empty() && !written.contains(key.as_str()) {
            element.push_attribute((key.as_str(), value.as_str()));
        }
    }

    // Endpoints were validated up front, so targets always resolve here.
    let child_ids: Vec<&str> = graph
        .outgoing(node_id)
        .map(|edge| edge.target.as_str())
        .collect();

    if node.exceptions.is_empty() && child_ids.is_empty() {
        return write_event(writer, Event::Empty(element));
    }

    write_event(writer, Event::Start(element))?;
    for exception in &node.exceptions {
        write_exception(writer, exception)?;
    }

    path.push(node_id.to_string());
    for child_id in child_ids {
        write_node(writer, graph, nodes_by_id, child_id, path)?;
    }
    path.pop();

    write_event(writer, Event::End(BytesEnd::new(tag)))
}

/// Writes the known typed fields first; they take precedence over any
/// same-named entries in the passthrough attribute bag.
fn push_typed_attributes<'a>(
    node: &'a GraphNode,
    element: &mut BytesStart<'_>,
    written: &mut AHashSet<&'a str>,
) {
    match node.kind {
        ElementKind::If | ElementKind::ElseIf => {
            if let Some(condition) = node.condition.as_deref() {
                if !condition.is_empty() {
                    element.push_attribute(("condition", condition));
                    written.insert("condition");
                }
            }
        }
        ElementKind::Invoke => {
            if let Some(detail) = &node.invoke {
                let fields = [
                    ("stepId", detail.step_id.as_str()),
                    ("stepDescription", detail.step_description.as_str()),
                    ("flowStatus", detail.flow_status.as_str()),
                    ("successFlowStatus", detail.success_flow_status.as_str()),
                    ("failFlowStatus", detail.fail_flow_status.as_str()),
                    ("interaction", detail.interaction.as_str()),
                ];
                for (key, value) in fields {
                    if !value.is_empty() {
                        element.push_attribute((key, value));
                        written.insert(key);
                    }
                }
            }
        }
        _ => {}
    }
}

fn write_exception(
    writer: &mut Writer<Vec<u8>>,
    exception: &ExceptionRecord,
) -> Result<(), StructuralError> {
    let mut element = BytesStart::new("exception");
    let fields = [
        ("idCondition", exception.id_condition.as_str()),
        ("stepId", exception.step_id.as_str()),
        ("flowStatus", exception.flow_status.as_str()),
    ];
    for (key, value) in fields {
        if !value.is_empty() {
            element.push_attribute((key, value));
        }
    }

    if exception.description.is_empty() {
        return write_event(writer, Event::Empty(element));
    }
    write_event(writer, Event::Start(element))?;
    write_event(writer, Event::Text(BytesText::new(&exception.description)))?;
    write_event(writer, Event::End(BytesEnd::new("exception")))
}
