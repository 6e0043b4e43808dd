//! The markup side of the conversion engine: parsing markup text into a
//! [`FlowGraph`](crate::graph::FlowGraph), serializing a graph back to
//! markup, and re-indenting markup text.
//!
//! The grammar is a small nested control-flow language:
//!
//! ```xml
//! <process name="DeactivationFlow" version="1.0">
//!   <logic>
//!     <if condition="channelRef == 2">
//!       <invoke stepId="313" stepDescription="Validation" flowStatus="4">
//!         <exception idCondition="FLOW_EXCEPTION" stepId="1">Retry intake</exception>
//!       </invoke>
//!     </if>
//!   </logic>
//! </process>
//! ```

mod formatter;
mod parser;
mod serializer;

pub use formatter::format;
pub use parser::parse;
pub use serializer::serialize;
