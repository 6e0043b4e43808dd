use thiserror::Error;

/// Errors that can occur while parsing markup text into a flow graph.
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("Markup is not well-formed: {0}")]
    Malformed(String),

    #[error("Invalid markup structure: missing process element")]
    MissingProcess,

    #[error("Invalid markup structure: missing logic element")]
    MissingLogic,
}

/// Errors that can occur while serializing a flow graph back to markup.
#[derive(Error, Debug, Clone)]
pub enum StructuralError {
    #[error("Edge '{edge_id}' references node '{node_id}', which does not exist in the graph")]
    MissingNode { edge_id: String, node_id: String },

    #[error("Failed to write markup: {0}")]
    Write(String),
}

/// Errors that can occur while compiling relational transition rows.
#[derive(Error, Debug, Clone)]
pub enum CompileError {
    #[error("Failed to parse transition rows: {0}")]
    RowParse(String),

    #[error("Transition row {index} is missing its process id")]
    MissingProcessId { index: usize },
}
