//! # Akis - Flow Representation Conversion Engine
//!
//! **Akis** keeps three representations of a branching business process
//! semantically equivalent: a hierarchical markup grammar, a property graph
//! of positioned nodes and edges suitable for a visual editor, and the flat
//! relational rule table exported by an upstream database.
//!
//! ## Core Workflow
//!
//! Every conversion is a synchronous pure function over immutable inputs:
//!
//! 1.  **Parse**: [`markup::parse`] turns markup text into a [`graph::FlowGraph`],
//!     assigning stable node ids and containment edges.
//! 2.  **Serialize**: [`markup::serialize`] reconstructs nested markup from a
//!     graph, terminating even on graphs that contain cycles.
//! 3.  **Format**: [`markup::format`] re-indents markup text, degrading to a
//!     best-effort line heuristic when the text does not parse.
//! 4.  **Compile**: [`rules::RuleCompiler`] groups relational transition rows
//!     into processes and connections, synthesizes branch conditions, and
//!     emits either a graph or markup.
//!
//! The visual editing layer (canvas, drag and drop, clipboard, files) is an
//! external collaborator: it calls these functions with plain text or value
//! types and owns all presentation state.
//!
//! ## Quick Start
//!
//! ```rust
//! use akis::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let markup = r#"
//!         <process name="DeactivationFlow" version="1.0">
//!           <logic>
//!             <if condition="channelRef == 2">
//!               <invoke stepId="313" stepDescription="Validation step" flowStatus="4"/>
//!             </if>
//!           </logic>
//!         </process>
//!     "#;
//!
//!     // Markup -> graph
//!     let graph = akis::markup::parse(markup)?;
//!     assert_eq!(graph.nodes.len(), 2);
//!
//!     // Graph -> markup (round trip)
//!     let regenerated = akis::markup::serialize(&graph)?;
//!     let reparsed = akis::markup::parse(&regenerated)?;
//!     assert_eq!(reparsed.nodes.len(), graph.nodes.len());
//!
//!     // Rule table -> graph
//!     let rows = r#"[{"processId": 1, "processDescription": "Request intake",
//!                     "successProcessId": 313, "channelRef": 2}]"#;
//!     let compiler = RuleCompiler::from_json(rows)?.build();
//!     let compiled = compiler.compile()?;
//!     assert_eq!(compiled.nodes.len(), 1);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod graph;
pub mod markup;
pub mod prelude;
pub mod rules;
