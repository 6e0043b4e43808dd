//! Tests for the relational rule compiler.
mod common;
use akis::prelude::*;
use common::*;

#[test]
fn grouping_merges_rows_into_one_record_per_process() {
    let mut rows = vec![
        row(1, "Request intake", Some(313), Some(1)),
        row(1, "Request intake", Some(313), Some(1)),
    ];
    rows[1].channel_ref = Some(9);
    rows[1].application_ref = Some(14);

    let compiler = RuleCompiler::builder(rows).build();
    let processes = compiler.group_processes().unwrap();

    assert_eq!(processes.len(), 1);
    let process = &processes[&1];
    assert_eq!(process.description, "Request intake");
    assert_eq!(process.channels.iter().copied().collect::<Vec<_>>(), vec![2, 9]);
    assert_eq!(process.applications.iter().copied().collect::<Vec<_>>(), vec![8, 14]);
}

#[test]
fn repeated_connection_rows_merge_channel_sets() {
    let mut rows = vec![
        row(1, "Request intake", Some(313), None),
        row(1, "Request intake", Some(313), None),
    ];
    rows[1].channel_ref = Some(9);

    let compiler = RuleCompiler::builder(rows).build();
    let connections = compiler.connections().unwrap();

    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].channels.len(), 2);
    assert_eq!(connections[0].kind, ConnectionKind::Success);
}

#[test]
fn self_loops_and_absent_targets_produce_no_connection() {
    let rows = vec![
        row(1, "Request intake", Some(1), Some(1)), // both self-loops
        row(2, "Dangling", None, None),             // no targets at all
    ];

    let compiler = RuleCompiler::builder(rows).build();
    assert!(compiler.connections().unwrap().is_empty());
}

#[test]
fn condition_synthesis_joins_present_predicates() {
    let rows = vec![{
        let mut r = row(1, "Request intake", Some(313), None);
        r.success_flow_status_ref = Some(5);
        r
    }];

    let compiler = RuleCompiler::builder(rows).build();
    let connections = compiler.connections().unwrap();
    assert_eq!(
        connections[0].condition,
        "channelRef == 2 && applicationRef == 8 && applicationModuleRef == 11 && flowStatus == 5"
    );
}

#[test]
fn condition_synthesis_omits_absent_fields() {
    let sparse = TransitionRow {
        process_id: Some(1),
        success_process_id: Some(2),
        channel_ref: Some(7),
        ..TransitionRow::default()
    };
    let empty = TransitionRow {
        process_id: Some(1),
        failed_process_id: Some(3),
        ..TransitionRow::default()
    };

    let compiler = RuleCompiler::builder(vec![sparse, empty]).build();
    let connections = compiler.connections().unwrap();
    assert_eq!(connections[0].condition, "channelRef == 7");
    assert_eq!(connections[1].condition, "true");
}

#[test]
fn missing_process_id_is_rejected() {
    let rows = vec![row(1, "ok", None, None), TransitionRow::default()];
    let compiler = RuleCompiler::builder(rows).build();

    assert!(matches!(
        compiler.compile(),
        Err(CompileError::MissingProcessId { index: 1 })
    ));
}

#[test]
fn from_json_accepts_upstream_column_names() {
    let rows_json = r#"[{
        "NORDER_TYPE_ID": 101,
        "VPROCESS_DESC": "Talep Girisi",
        "NPROCESS_ID": 1,
        "NCUSTOMER_TYPE_REF": 2,
        "NCURRENT_FLOW_STATUS_REF": 1,
        "NSUCCESS_FLOW_STATUS_REF": 1,
        "NSUCCESS_PROCESS_ID": 313,
        "NFAILED_FLOW_STATUS_REF": 1,
        "NFAILED_PROCESS_ID": 1,
        "NCHANNEL_REF": 2,
        "NAPPLICATION_REF": 8,
        "NAPPLICATION_MODULE_REF": 11
    }]"#;

    let compiler = RuleCompiler::from_json(rows_json).unwrap().build();
    let graph = compiler.compile().unwrap();

    assert_eq!(graph.nodes.len(), 1);
    assert_eq!(graph.nodes[0].label, "Talep Girisi");
    assert_eq!(
        graph.nodes[0].attributes.get("processId").map(String::as_str),
        Some("1")
    );
}

#[test]
fn from_json_rejects_malformed_input() {
    assert!(matches!(
        RuleCompiler::from_json("{ not a list"),
        Err(CompileError::RowParse(_))
    ));
}

#[test]
fn scenario_compiles_to_two_nodes_and_two_success_edges() {
    let compiler = RuleCompiler::builder(scenario_rows()).build();
    let graph = compiler.compile().unwrap();

    // Only processes 1 and 313 have rows; 314 exists only as a target.
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 2);

    let success_edges: Vec<_> = graph
        .edges
        .iter()
        .filter(|e| e.kind == Some(ConnectionKind::Success))
        .collect();
    assert_eq!(success_edges.len(), 2);
    assert!(success_edges
        .iter()
        .any(|e| e.source == "process-1" && e.target == "process-313"));
    assert!(success_edges
        .iter()
        .any(|e| e.source == "process-313" && e.target == "process-314"));

    // Both failure routings were self-loops.
    assert!(graph.edges.iter().all(|e| e.kind != Some(ConnectionKind::Failure)));

    for edge in &graph.edges {
        let condition = edge.condition.as_deref().unwrap();
        assert!(condition.contains("channelRef == 2"), "{condition}");
    }
}

#[test]
fn classification_defaults_to_keyword_heuristic() {
    let compiler = RuleCompiler::builder(scenario_rows()).build();
    let graph = compiler.compile().unwrap();

    assert_eq!(graph.node("process-1").unwrap().kind, ElementKind::Invoke);
    // "validation" in the description makes this a condition branch.
    assert_eq!(graph.node("process-313").unwrap().kind, ElementKind::If);
}

#[test]
fn classifier_is_injectable() {
    struct AlwaysCondition;
    impl ProcessClassifier for AlwaysCondition {
        fn classify(&self, _description: &str) -> ElementKind {
            ElementKind::If
        }
    }

    let compiler = RuleCompiler::builder(scenario_rows())
        .with_classifier(Box::new(AlwaysCondition))
        .build();
    let graph = compiler.compile().unwrap();
    assert!(graph.nodes.iter().all(|n| n.kind == ElementKind::If));
}

#[test]
fn nodes_are_laid_out_on_a_wrapping_grid() {
    let rows = (1..=5)
        .map(|id| row(id, "Step", None, None))
        .collect::<Vec<_>>();
    let compiler = RuleCompiler::builder(rows).build();
    let graph = compiler.compile().unwrap();

    let positions: Vec<Position> = graph.nodes.iter().map(|n| n.position).collect();
    assert_eq!(positions[0], Position::new(100.0, 100.0));
    assert_eq!(positions[2], Position::new(700.0, 100.0));
    // Fourth node wraps to the next grid row.
    assert_eq!(positions[3], Position::new(100.0, 300.0));
    assert_eq!(positions[4], Position::new(400.0, 300.0));
}

#[test]
fn markup_output_follows_success_and_failure_paths() {
    let mut rows = scenario_rows();
    // Give the validation step a real failure target so an exception
    // container is emitted.
    rows.push(row(400, "Rollback", None, None));
    rows[1].failed_process_id = Some(400);

    let compiler = RuleCompiler::builder(rows).build();
    let markup = compiler.compile_to_markup().unwrap();

    assert!(markup.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(markup.contains("<process name=\"DeactivationFlow\" version=\"1.0\" orderTypeId=\"101\">"));
    assert!(markup.contains("stepId=\"1\""));
    assert!(markup.contains("<!-- Success path to: Subscriber line validation step -->"));
    assert!(markup.contains("<if condition=\"channelRef == 2\">"));
    assert!(markup.contains("<exception idCondition=\"FLOW_EXCEPTION\">"));
    assert!(markup.contains("<!-- Failure path to: Rollback -->"));
}

#[test]
fn markup_output_wraps_multi_channel_invokes_per_channel() {
    let mut rows = vec![
        row(1, "Request intake", Some(313), None),
        row(1, "Request intake", Some(313), None),
        row(313, "Provisioning", None, None),
    ];
    rows[1].channel_ref = Some(9);

    let compiler = RuleCompiler::builder(rows).build();
    let markup = compiler.compile_to_markup().unwrap();

    assert!(markup.contains("<if condition=\"channelRef == 2\">"));
    assert!(markup.contains("<if condition=\"channelRef == 9\">"));
    // The continuation is emitted once per channel branch.
    assert_eq!(markup.matches("stepDescription=\"Provisioning\"").count(), 2);
}

#[test]
fn markup_output_stops_on_transition_cycles() {
    let rows = vec![
        row(1, "Request intake", Some(2), None),
        row(2, "Review", Some(1), None), // cycles back to intake
    ];

    let compiler = RuleCompiler::builder(rows).build();
    let markup = compiler.compile_to_markup().unwrap();

    assert_eq!(markup.matches("stepDescription=\"Request intake\"").count(), 1);
    assert_eq!(markup.matches("stepDescription=\"Review\"").count(), 1);
}

#[test]
fn markup_output_escapes_descriptions() {
    let rows = vec![row(1, "Fast & <loose>", None, None)];
    let compiler = RuleCompiler::builder(rows).build();
    let markup = compiler.compile_to_markup().unwrap();

    assert!(markup.contains("stepDescription=\"Fast &amp; &lt;loose&gt;\""));
}
