//! Compiles flat relational transition rows into a flow graph and into
//! markup text.
//!
//! The pipeline follows the upstream export's shape: rows are grouped into
//! one [`ProcessRecord`] per process id, distinct `(source, target, kind)`
//! transitions become [`ConnectionRecord`]s with a synthesized boolean
//! condition, and the resulting process graph is projected either onto a
//! [`FlowGraph`] for the visual editor or onto nested markup starting from
//! the entry process.

use crate::error::CompileError;
use crate::graph::{
    ConnectionKind, ElementKind, FlowGraph, FlowMetadata, GraphEdge, GraphNode, InvokeDetail,
    Position,
};
use ahash::AHashSet;
use indexmap::IndexMap;
use itertools::Itertools;
use quick_xml::escape::escape;

mod classify;
mod model;

pub use classify::{KeywordClassifier, ProcessClassifier};
pub use model::{CompileOptions, ConnectionRecord, FlowStatuses, ProcessRecord, TransitionRow};

/// Compiles transition rows with a fixed option set and classification
/// strategy. Construct through [`RuleCompiler::builder`] or
/// [`RuleCompiler::from_json`].
pub struct RuleCompiler {
    rows: Vec<TransitionRow>,
    options: CompileOptions,
    classifier: Box<dyn ProcessClassifier>,
}

pub struct RuleCompilerBuilder {
    rows: Vec<TransitionRow>,
    options: CompileOptions,
    classifier: Box<dyn ProcessClassifier>,
}

impl RuleCompilerBuilder {
    pub fn new(rows: Vec<TransitionRow>) -> Self {
        Self {
            rows,
            options: CompileOptions::default(),
            classifier: Box::new(KeywordClassifier::default()),
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the default keyword heuristic deciding which processes
    /// render as condition branches.
    pub fn with_classifier(mut self, classifier: Box<dyn ProcessClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn build(self) -> RuleCompiler {
        RuleCompiler {
            rows: self.rows,
            options: self.options,
            classifier: self.classifier,
        }
    }
}

impl RuleCompiler {
    pub fn builder(rows: Vec<TransitionRow>) -> RuleCompilerBuilder {
        RuleCompilerBuilder::new(rows)
    }

    /// Builds a compiler from a JSON array of transition rows, accepting
    /// both camelCase and raw upstream column names.
    pub fn from_json(rows_json: &str) -> Result<RuleCompilerBuilder, CompileError> {
        let rows: Vec<TransitionRow> =
            serde_json::from_str(rows_json).map_err(|e| CompileError::RowParse(e.to_string()))?;
        Ok(RuleCompilerBuilder::new(rows))
    }

    /// Groups the rows into one record per process id, merging the
    /// channel/application/status sets of repeated rows.
    pub fn group_processes(&self) -> Result<IndexMap<i64, ProcessRecord>, CompileError> {
        let mut processes: IndexMap<i64, ProcessRecord> = IndexMap::new();
        for (index, row) in self.rows.iter().enumerate() {
            let process_id = row
                .process_id
                .ok_or(CompileError::MissingProcessId { index })?;

            let record = processes.entry(process_id).or_insert_with(|| ProcessRecord {
                id: process_id,
                description: row.process_description.clone(),
                ..ProcessRecord::default()
            });
            record.channels.extend(row.channel_ref);
            record.applications.extend(row.application_ref);
            record
                .application_modules
                .extend(row.application_module_ref);
            record.flow_statuses.current.extend(row.current_flow_status_ref);
            record.flow_statuses.success.extend(row.success_flow_status_ref);
            record.flow_statuses.failed.extend(row.failed_flow_status_ref);
            record.success_process_ids.extend(row.success_process_id);
            record.failed_process_ids.extend(row.failed_process_id);
        }
        Ok(processes)
    }

    /// Extracts the distinct transitions between processes.
    ///
    /// A row whose success (or failed) target equals its own process id
    /// means "stay in the current process" and produces no connection, as
    /// does an absent target. Rows repeating an existing `(source, target,
    /// kind)` key merge their sets into the record instead of duplicating
    /// it.
    pub fn connections(&self) -> Result<Vec<ConnectionRecord>, CompileError> {
        let mut connections: IndexMap<(i64, i64, ConnectionKind), ConnectionRecord> =
            IndexMap::new();

        for (index, row) in self.rows.iter().enumerate() {
            let source = row
                .process_id
                .ok_or(CompileError::MissingProcessId { index })?;

            for (target, kind) in [
                (row.success_process_id, ConnectionKind::Success),
                (row.failed_process_id, ConnectionKind::Failure),
            ] {
                let Some(target) = target else { continue };
                if target == source {
                    continue;
                }
                let record = connections
                    .entry((source, target, kind))
                    .or_insert_with(|| ConnectionRecord {
                        source_process_id: source,
                        target_process_id: target,
                        kind,
                        condition: synthesize_condition(row, kind),
                        channels: Default::default(),
                        applications: Default::default(),
                        application_modules: Default::default(),
                    });
                record.channels.extend(row.channel_ref);
                record.applications.extend(row.application_ref);
                record
                    .application_modules
                    .extend(row.application_module_ref);
            }
        }
        Ok(connections.into_values().collect())
    }

    /// Projects the rule table onto a [`FlowGraph`]: one node per process on
    /// a wrapping grid, one edge per connection carrying its kind and
    /// synthesized condition.
    pub fn compile(&self) -> Result<FlowGraph, CompileError> {
        let processes = self.group_processes()?;
        let connections = self.connections()?;

        let mut nodes = Vec::new();
        let (mut x, mut y) = (100.0, 100.0);
        for process in processes.values() {
            let kind = self.classifier.classify(&process.description);
            let mut attributes = IndexMap::new();
            attributes.insert("processId".to_string(), process.id.to_string());
            attributes.insert("channels".to_string(), process.channels.iter().join(","));
            attributes.insert(
                "applications".to_string(),
                process.applications.iter().join(","),
            );
            attributes.insert(
                "applicationModules".to_string(),
                process.application_modules.iter().join(","),
            );

            nodes.push(GraphNode {
                id: format!("process-{}", process.id),
                kind,
                label: process.description.clone(),
                position: Position::new(x, y),
                condition: None,
                invoke: Some(InvokeDetail {
                    step_id: process.id.to_string(),
                    step_description: process.description.clone(),
                    flow_status: process.flow_statuses.current.iter().join(","),
                    success_flow_status: process.flow_statuses.success.iter().join(","),
                    fail_flow_status: process.flow_statuses.failed.iter().join(","),
                    interaction: String::new(),
                }),
                exceptions: Vec::new(),
                attributes,
            });

            // Simple wrapping grid, three nodes per row.
            x += 300.0;
            if x > 900.0 {
                x = 100.0;
                y += 200.0;
            }
        }

        let edges = connections
            .iter()
            .enumerate()
            .map(|(index, conn)| GraphEdge {
                id: format!(
                    "edge-{}-{}-{}",
                    conn.source_process_id, conn.target_process_id, index
                ),
                source: format!("process-{}", conn.source_process_id),
                target: format!("process-{}", conn.target_process_id),
                kind: Some(conn.kind),
                condition: Some(conn.condition.clone()),
            })
            .collect();

        Ok(FlowGraph {
            nodes,
            edges,
            metadata: FlowMetadata {
                process_name: self.options.process_name.clone(),
                version: "1.0".to_string(),
                order_type_id: Some(self.options.order_type_id),
            },
        })
    }

    /// Renders the rule table as nested markup, starting from the entry
    /// process and following success and failure connections.
    pub fn compile_to_markup(&self) -> Result<String, CompileError> {
        let processes = self.group_processes()?;
        let connections = self.connections()?;

        let mut lines = vec![
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>".to_string(),
            format!(
                "<process name=\"{}\" version=\"1.0\" orderTypeId=\"{}\">",
                escape(&self.options.process_name),
                self.options.order_type_id
            ),
            "  <logic>".to_string(),
        ];

        if let Some(entry) = processes.get(&self.options.entry_process_id) {
            let mut visited = AHashSet::new();
            self.emit_process(&mut lines, entry, &processes, &connections, "    ", &mut visited);
        }

        lines.push("  </logic>".to_string());
        lines.push("</process>".to_string());
        Ok(lines.join("\n"))
    }

    /// Emits one process and recurses into its outgoing connections.
    ///
    /// The visited set tracks the ids on the current branch and is cloned
    /// before each recursion, so a process may appear on several independent
    /// branches but never twice within one. Re-encountering an id truncates
    /// the branch silently; upstream data does contain transition cycles.
    fn emit_process(
        &self,
        lines: &mut Vec<String>,
        process: &ProcessRecord,
        processes: &IndexMap<i64, ProcessRecord>,
        connections: &[ConnectionRecord],
        indent: &str,
        visited: &mut AHashSet<i64>,
    ) {
        if !visited.insert(process.id) {
            return;
        }

        match self.classifier.classify(&process.description) {
            ElementKind::If => {
                let condition = process_condition(process);
                lines.push(format!(
                    "{}<if condition=\"{}\">",
                    indent,
                    escape(&condition)
                ));
                self.emit_outcomes(
                    lines,
                    process,
                    processes,
                    connections,
                    &format!("{}  ", indent),
                    visited,
                );
                lines.push(format!("{}</if>", indent));
            }
            _ => {
                lines.push(format!("{}<invoke", indent));
                lines.push(format!("{}  stepId=\"{}\"", indent, process.id));
                lines.push(format!(
                    "{}  stepDescription=\"{}\"",
                    indent,
                    escape(&process.description)
                ));
                lines.push(format!(
                    "{}  flowStatus=\"{}\"",
                    indent,
                    process.flow_statuses.current.iter().join(",")
                ));
                lines.push(format!(
                    "{}  successFlowStatus=\"{}\"",
                    indent,
                    process.flow_statuses.success.iter().join(",")
                ));
                lines.push(format!(
                    "{}  failFlowStatus=\"{}\"",
                    indent,
                    process.flow_statuses.failed.iter().join(",")
                ));
                lines.push(format!("{}  interaction=\"true\">", indent));

                if process.channels.len() > 1 {
                    // A process reachable over several channels gets one
                    // conditional branch per channel.
                    for channel in &process.channels {
                        lines.push(format!(
                            "{}  <if condition=\"channelRef == {}\">",
                            indent, channel
                        ));
                        self.emit_outcomes(
                            lines,
                            process,
                            processes,
                            connections,
                            &format!("{}    ", indent),
                            visited,
                        );
                        lines.push(format!("{}  </if>", indent));
                    }
                } else {
                    self.emit_outcomes(
                        lines,
                        process,
                        processes,
                        connections,
                        &format!("{}  ", indent),
                        visited,
                    );
                }

                lines.push(format!("{}</invoke>", indent));
            }
        }
    }

    /// Emits the success continuations of a process, then wraps all its
    /// failure continuations in one exception container.
    fn emit_outcomes(
        &self,
        lines: &mut Vec<String>,
        process: &ProcessRecord,
        processes: &IndexMap<i64, ProcessRecord>,
        connections: &[ConnectionRecord],
        indent: &str,
        visited: &AHashSet<i64>,
    ) {
        let outgoing = |kind: ConnectionKind| {
            connections
                .iter()
                .filter(move |c| c.source_process_id == process.id && c.kind == kind)
        };

        for conn in outgoing(ConnectionKind::Success) {
            if let Some(target) = processes.get(&conn.target_process_id) {
                if !visited.contains(&target.id) {
                    lines.push(format!(
                        "{}<!-- Success path to: {} -->",
                        indent, target.description
                    ));
                    let mut branch = visited.clone();
                    self.emit_process(lines, target, processes, connections, indent, &mut branch);
                }
            }
        }

        let failures: Vec<_> = outgoing(ConnectionKind::Failure).collect();
        if failures.is_empty() {
            return;
        }
        lines.push(format!(
            "{}<exception idCondition=\"FLOW_EXCEPTION\">",
            indent
        ));
        for conn in failures {
            if let Some(target) = processes.get(&conn.target_process_id) {
                if !visited.contains(&target.id) {
                    lines.push(format!(
                        "{}  <!-- Failure path to: {} -->",
                        indent, target.description
                    ));
                    let mut branch = visited.clone();
                    self.emit_process(
                        lines,
                        target,
                        processes,
                        connections,
                        &format!("{}  ", indent),
                        &mut branch,
                    );
                }
            }
        }
        lines.push(format!("{}</exception>", indent));
    }
}

/// The `&&`-conjunction of equality predicates from one originating row.
/// Absent fields are omitted; an empty predicate set yields `true`.
fn synthesize_condition(row: &TransitionRow, kind: ConnectionKind) -> String {
    let mut parts = Vec::new();
    if let Some(channel) = row.channel_ref {
        parts.push(format!("channelRef == {}", channel));
    }
    if let Some(application) = row.application_ref {
        parts.push(format!("applicationRef == {}", application));
    }
    if let Some(module) = row.application_module_ref {
        parts.push(format!("applicationModuleRef == {}", module));
    }
    let status = match kind {
        ConnectionKind::Success => row.success_flow_status_ref,
        ConnectionKind::Failure => row.failed_flow_status_ref,
    };
    if let Some(status) = status {
        parts.push(format!("flowStatus == {}", status));
    }
    if parts.is_empty() {
        "true".to_string()
    } else {
        parts.join(" && ")
    }
}

/// Channel predicate for a process rendered as a condition branch.
fn process_condition(process: &ProcessRecord) -> String {
    let mut channels = process.channels.iter();
    match (channels.next(), channels.next()) {
        (None, _) => "true".to_string(),
        (Some(channel), None) => format!("channelRef == {}", channel),
        _ => format!("channelRef in ({})", process.channels.iter().join(",")),
    }
}
