use crate::error::ParseError;
use crate::graph::{
    ElementKind, ExceptionRecord, FlowGraph, FlowMetadata, GraphEdge, GraphNode, InvokeDetail,
    Position,
};
use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Horizontal offset per nesting level and vertical offset per visited node.
/// Placement hints for the visual editor only, not a semantic guarantee.
const X_ORIGIN: f64 = 100.0;
const X_STEP: f64 = 300.0;
const Y_ORIGIN: f64 = 100.0;
const Y_STEP: f64 = 100.0;

/// Parses markup text into a [`FlowGraph`].
///
/// The document must contain a root `process` element with a `logic` child.
/// Every element under `logic` becomes one node with a fresh sequential id;
/// unrecognized tags become [`ElementKind::Unknown`] nodes rather than being
/// dropped. Nesting is recorded as one containment edge per parent/child
/// pair; direct children of `logic` get no incoming edge.
pub fn parse(markup: &str) -> Result<FlowGraph, ParseError> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().trim_text(true);

    let metadata = read_until_process(&mut reader)?;
    read_until_logic(&mut reader)?;

    let mut builder = GraphBuilder::new(metadata);
    builder.read_logic_children(&mut reader)?;
    Ok(builder.finish())
}

/// Scans forward to the root `process` element and extracts its metadata.
fn read_until_process(reader: &mut Reader<&[u8]>) -> Result<FlowMetadata, ParseError> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"process" => {
                let attrs = collect_attributes(&e)?;
                let mut metadata = FlowMetadata::default();
                if let Some(name) = attrs.get("name") {
                    metadata.process_name = name.clone();
                }
                if let Some(version) = attrs.get("version") {
                    metadata.version = version.clone();
                }
                metadata.order_type_id = attrs.get("orderTypeId").and_then(|v| v.parse().ok());
                return Ok(metadata);
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"process" => {
                return Err(ParseError::MissingLogic);
            }
            Ok(Event::Start(_)) | Ok(Event::Empty(_)) | Ok(Event::Eof) => {
                return Err(ParseError::MissingProcess);
            }
            Ok(_) => {}
            Err(e) => return Err(ParseError::Malformed(e.to_string())),
        }
    }
}

/// Scans forward inside `process` to the opening `logic` element.
fn read_until_logic(reader: &mut Reader<&[u8]>) -> Result<(), ParseError> {
    let mut depth = 0usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"logic" => return Ok(()),
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => {
                if depth == 0 {
                    // `process` closed without a `logic` child.
                    return Err(ParseError::MissingLogic);
                }
                depth -= 1;
            }
            Ok(Event::Eof) => return Err(ParseError::MissingLogic),
            Ok(_) => {}
            Err(e) => return Err(ParseError::Malformed(e.to_string())),
        }
    }
}

fn collect_attributes(element: &BytesStart<'_>) -> Result<IndexMap<String, String>, ParseError> {
    let mut attributes = IndexMap::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| ParseError::Malformed(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| ParseError::Malformed(e.to_string()))?
            .into_owned();
        attributes.insert(key, value);
    }
    Ok(attributes)
}

/// Incremental graph construction state for one parse call.
struct GraphBuilder {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    metadata: FlowMetadata,
    next_id: usize,
    visit_count: usize,
    /// Ids and kinds of the currently open elements, innermost last.
    stack: Vec<(String, ElementKind)>,
}

impl GraphBuilder {
    fn new(metadata: FlowMetadata) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            metadata,
            next_id: 0,
            visit_count: 0,
            stack: Vec::new(),
        }
    }

    /// Walks the event stream from just after `<logic>` to its closing tag.
    ///
    /// The element stack is explicit, so document depth is bounded by memory
    /// rather than the call stack.
    fn read_logic_children(&mut self, reader: &mut Reader<&[u8]>) -> Result<(), ParseError> {
        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let attrs = collect_attributes(&e)?;
                    if self.parent_is_invoke() && tag == "exception" {
                        let description = read_element_text(reader)?;
                        self.push_exception(attrs, description);
                    } else {
                        let id = self.emit_node(&tag, attrs);
                        self.stack.push((id, ElementKind::from_tag(&tag)));
                    }
                }
                Ok(Event::Empty(e)) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let attrs = collect_attributes(&e)?;
                    if self.parent_is_invoke() && tag == "exception" {
                        self.push_exception(attrs, String::new());
                    } else {
                        self.emit_node(&tag, attrs);
                    }
                }
                Ok(Event::End(e)) => {
                    if self.stack.pop().is_none() {
                        // This closes `logic` itself; the rest of the
                        // document is process trailer.
                        debug_assert_eq!(e.name().as_ref(), b"logic");
                        return Ok(());
                    }
                }
                Ok(Event::Eof) => {
                    return Err(ParseError::Malformed(
                        "unexpected end of document inside logic element".to_string(),
                    ));
                }
                Ok(_) => {}
                Err(e) => return Err(ParseError::Malformed(e.to_string())),
            }
        }
    }

    fn parent_is_invoke(&self) -> bool {
        matches!(self.stack.last(), Some((_, ElementKind::Invoke)))
    }

    /// Creates the node for one element and its containment edge, returning
    /// the assigned id.
    fn emit_node(&mut self, tag: &str, attributes: IndexMap<String, String>) -> String {
        let id = format!("node-{}", self.next_id);
        self.next_id += 1;

        let kind = ElementKind::from_tag(tag);
        let depth = self.stack.len();
        let position = Position::new(
            X_ORIGIN + X_STEP * depth as f64,
            Y_ORIGIN + Y_STEP * self.visit_count as f64,
        );
        self.visit_count += 1;

        let condition = match kind {
            ElementKind::If | ElementKind::ElseIf => attributes.get("condition").cloned(),
            _ => None,
        };
        let invoke = (kind == ElementKind::Invoke).then(|| InvokeDetail {
            step_id: attributes.get("stepId").cloned().unwrap_or_default(),
            step_description: attributes
                .get("stepDescription")
                .cloned()
                .unwrap_or_default(),
            flow_status: attributes.get("flowStatus").cloned().unwrap_or_default(),
            success_flow_status: attributes
                .get("successFlowStatus")
                .cloned()
                .unwrap_or_default(),
            fail_flow_status: attributes
                .get("failFlowStatus")
                .cloned()
                .unwrap_or_default(),
            interaction: attributes.get("interaction").cloned().unwrap_or_default(),
        });
        let label = match kind {
            ElementKind::If => "IF Condition".to_string(),
            ElementKind::ElseIf => "ELSE IF Condition".to_string(),
            ElementKind::Else => "ELSE".to_string(),
            ElementKind::ForEach => "ForEach Loop".to_string(),
            ElementKind::Invoke => match invoke.as_ref() {
                Some(detail) if !detail.step_description.is_empty() => {
                    detail.step_description.clone()
                }
                _ => "Step".to_string(),
            },
            ElementKind::Exception => "Exception".to_string(),
            ElementKind::Unknown => "Unnamed Element".to_string(),
        };

        if let Some((parent_id, _)) = self.stack.last() {
            self.edges.push(GraphEdge::containment(parent_id.clone(), id.clone()));
        }

        self.nodes.push(GraphNode {
            id: id.clone(),
            kind,
            label,
            position,
            condition,
            invoke,
            exceptions: Vec::new(),
            attributes,
        });
        id
    }

    /// Attaches an exception record to the enclosing `invoke` node.
    fn push_exception(&mut self, attrs: IndexMap<String, String>, description: String) {
        let (invoke_id, _) = self.stack.last().expect("checked by caller");
        let record = ExceptionRecord {
            id_condition: attrs.get("idCondition").cloned().unwrap_or_default(),
            step_id: attrs.get("stepId").cloned().unwrap_or_default(),
            flow_status: attrs.get("flowStatus").cloned().unwrap_or_default(),
            description,
        };
        if let Some(node) = self.nodes.iter_mut().rev().find(|n| &n.id == invoke_id) {
            node.exceptions.push(record);
        }
    }

    fn finish(self) -> FlowGraph {
        FlowGraph {
            nodes: self.nodes,
            edges: self.edges,
            metadata: self.metadata,
        }
    }
}

/// Reads the text content of the element whose start tag was just consumed,
/// up to and including its end tag. Nested markup is skipped.
fn read_element_text(reader: &mut Reader<&[u8]>) -> Result<String, ParseError> {
    let mut text = String::new();
    let mut depth = 1usize;
    loop {
        match reader.read_event() {
            Ok(Event::Text(t)) => {
                let chunk = t.unescape().map_err(|e| ParseError::Malformed(e.to_string()))?;
                text.push_str(&chunk);
            }
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(text);
                }
            }
            Ok(Event::Eof) => {
                return Err(ParseError::Malformed(
                    "unexpected end of document inside exception element".to_string(),
                ));
            }
            Ok(_) => {}
            Err(e) => return Err(ParseError::Malformed(e.to_string())),
        }
    }
}
