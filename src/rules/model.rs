use crate::graph::ConnectionKind;
use serde::Deserialize;
use std::collections::BTreeSet;

/// One relational transition row, as exported by the upstream database.
///
/// Field aliases accept the raw column names of the export (`NPROCESS_ID`,
/// `VPROCESS_DESC`, ...) next to the camelCase names, so both the database
/// dump and a hand-written fixture deserialize without preprocessing. Every
/// numeric field is optional; a missing process id is the one condition the
/// compiler rejects.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransitionRow {
    #[serde(alias = "NORDER_TYPE_ID", alias = "orderTypeId")]
    pub order_type_id: Option<i64>,
    #[serde(alias = "NPROCESS_ID", alias = "processId")]
    pub process_id: Option<i64>,
    #[serde(alias = "VPROCESS_DESC", alias = "processDescription")]
    pub process_description: String,
    #[serde(alias = "NCUSTOMER_TYPE_REF", alias = "customerTypeRef")]
    pub customer_type_ref: Option<i64>,
    #[serde(alias = "NCURRENT_FLOW_STATUS_REF", alias = "currentFlowStatusRef")]
    pub current_flow_status_ref: Option<i64>,
    #[serde(alias = "NSUCCESS_FLOW_STATUS_REF", alias = "successFlowStatusRef")]
    pub success_flow_status_ref: Option<i64>,
    #[serde(alias = "NSUCCESS_PROCESS_ID", alias = "successProcessId")]
    pub success_process_id: Option<i64>,
    #[serde(alias = "NFAILED_FLOW_STATUS_REF", alias = "failedFlowStatusRef")]
    pub failed_flow_status_ref: Option<i64>,
    #[serde(alias = "NFAILED_PROCESS_ID", alias = "failedProcessId")]
    pub failed_process_id: Option<i64>,
    #[serde(alias = "NCHANNEL_REF", alias = "channelRef")]
    pub channel_ref: Option<i64>,
    #[serde(alias = "NAPPLICATION_REF", alias = "applicationRef")]
    pub application_ref: Option<i64>,
    #[serde(alias = "NAPPLICATION_MODULE_REF", alias = "applicationModuleRef")]
    pub application_module_ref: Option<i64>,
}

/// Flow statuses a process was observed in, split by routing column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowStatuses {
    pub current: BTreeSet<i64>,
    pub success: BTreeSet<i64>,
    pub failed: BTreeSet<i64>,
}

/// One process, grouped from every transition row sharing its id.
///
/// The sets deduplicate repeated rows that describe the same process under
/// different channel/application combinations. `BTreeSet` keeps the merged
/// values sorted so joined markup attributes are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessRecord {
    pub id: i64,
    pub description: String,
    pub channels: BTreeSet<i64>,
    pub applications: BTreeSet<i64>,
    pub application_modules: BTreeSet<i64>,
    pub flow_statuses: FlowStatuses,
    pub success_process_ids: BTreeSet<i64>,
    pub failed_process_ids: BTreeSet<i64>,
}

/// One distinct transition between two processes.
///
/// Keyed by `(source, target, kind)`; rows repeating the key merge their
/// channel/application/module sets into the existing record. The condition
/// is synthesized from the first row that created the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRecord {
    pub source_process_id: i64,
    pub target_process_id: i64,
    pub kind: ConnectionKind,
    pub condition: String,
    pub channels: BTreeSet<i64>,
    pub applications: BTreeSet<i64>,
    pub application_modules: BTreeSet<i64>,
}

/// Caller-supplied knobs for one compilation.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub order_type_id: i64,
    pub product_type_id: i64,
    pub customer_type_ref: i64,
    pub process_name: String,
    /// The well-known process id that represents request intake; markup
    /// synthesis starts here.
    pub entry_process_id: i64,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            order_type_id: 101,
            product_type_id: 1,
            customer_type_ref: 2,
            process_name: "DeactivationFlow".to_string(),
            entry_process_id: 1,
        }
    }
}
