//! Common test utilities for building markup documents and transition rows.
use akis::prelude::*;

/// A small but complete markup document covering every element kind.
#[allow(dead_code)]
pub const SAMPLE_MARKUP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<process name="DeactivationFlow" version="1.0" orderTypeId="101">
  <logic>
    <if condition="channelRef == 2">
      <invoke stepId="313" stepDescription="Validation step" flowStatus="4" successFlowStatus="5" failFlowStatus="4" interaction="true">
        <exception idCondition="FLOW_EXCEPTION" stepId="1" flowStatus="4">Return to intake</exception>
      </invoke>
      <foreach>
        <invoke stepId="314" stepDescription="Provisioning"/>
      </foreach>
      <else/>
    </if>
  </logic>
</process>
"#;

/// Builds a transition row with the given routing; the remaining fields
/// match the channel/application combination of the upstream sample export.
#[allow(dead_code)]
pub fn row(process_id: i64, description: &str, success: Option<i64>, failed: Option<i64>) -> TransitionRow {
    TransitionRow {
        order_type_id: Some(101),
        process_id: Some(process_id),
        process_description: description.to_string(),
        customer_type_ref: Some(2),
        current_flow_status_ref: Some(1),
        success_flow_status_ref: Some(1),
        success_process_id: success,
        failed_flow_status_ref: Some(1),
        failed_process_id: failed,
        channel_ref: Some(2),
        application_ref: Some(8),
        application_module_ref: Some(11),
    }
}

/// The two-row scenario from the upstream export: intake routes to a
/// validation step, both rows self-loop on failure.
#[allow(dead_code)]
pub fn scenario_rows() -> Vec<TransitionRow> {
    vec![
        row(1, "Request intake", Some(313), Some(1)),
        row(313, "Subscriber line validation step", Some(314), Some(313)),
    ]
}

/// Builds a graph node of the given kind with no attributes.
#[allow(dead_code)]
pub fn node(id: &str, kind: ElementKind) -> GraphNode {
    GraphNode::new(id, kind)
}

/// Builds a containment edge between two node ids.
#[allow(dead_code)]
pub fn edge(source: &str, target: &str) -> GraphEdge {
    GraphEdge::containment(source, target)
}
