//! Prelude module for convenient imports
//!
//! Re-exports the types and functions most callers need: the graph value
//! types, the three markup operations, and the rule compiler.
//!
//! # Example
//!
//! ```rust,no_run
//! use akis::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let markup = std::fs::read_to_string("path/to/flow.xml")?;
//! let graph = akis::markup::parse(&markup)?;
//! println!("{} nodes, {} edges", graph.nodes.len(), graph.edges.len());
//! # Ok(())
//! # }
//! ```

// Graph value types
pub use crate::graph::{
    ConnectionKind, ElementKind, ExceptionRecord, FlowGraph, FlowMetadata, GraphEdge, GraphNode,
    InvokeDetail, Position,
};

// Markup operations
pub use crate::markup::{format, parse, serialize};

// Rule compilation
pub use crate::rules::{
    CompileOptions, ConnectionRecord, KeywordClassifier, ProcessClassifier, ProcessRecord,
    RuleCompiler, TransitionRow,
};

// Error types
pub use crate::error::{CompileError, ParseError, StructuralError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
