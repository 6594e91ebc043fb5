//! sablejs
//!
//! Lowering of resolved source assignments into the output scripting
//! language. The front end hands over a typed expression tree; this crate
//! turns each assignment into statements that keep the source language's
//! evaluation order and value-type copy semantics.
//!
//! ```ignore
//! use sablejs::prelude::*;
//!
//! let mut temps = TemporaryAllocator::for_options(&options);
//! let mut ctx = LoweringContext::new(&metadata, &mut temps, &mut diagnostics, &options, enclosing);
//! let lowered = lower_assignment(assign, ValueUsage::Discarded, &mut ctx);
//! ```

pub use sablejs_compiler as compiler;
pub use sablejs_core as model;

pub use sablejs_compiler::{LoweredAssignment, ValueUsage, lower_assignment};

// Re-export main types
pub mod prelude {
    pub use sablejs_compiler::{
        EnclosingMember, LoweredAssignment, LoweringContext, LoweringOptions, TemporaryAllocator, ValueUsage,
        lower_assignment,
    };
    pub use sablejs_core::ast::*;
    pub use sablejs_core::js::render_statements;
    pub use sablejs_core::{
        AccessorImpl, AssignOp, BinaryOp, Diagnostic, Diagnostics, ErrorCode, JsExpr, JsStmt, MetadataRegistry,
        MethodImpl, PropertyImpl, ScriptMetadata, Span, TypeSemantics,
    };
}
