//! Core types shared by the sablejs compiler crates.
//!
//! ## Modules
//!
//! - [`ast`]: Resolved expression tree produced by the front end
//! - [`error`]: Lowering errors, error codes and diagnostics
//! - [`js`]: Output-language expression/statement model and printer
//! - [`metadata`]: Script representation of types and members
//! - [`ops`]: Binary and assignment operators
//! - [`span`]: Source locations
//! - [`symbol_hash`]: Deterministic symbol identities

pub mod ast;
pub mod error;
pub mod js;
pub mod metadata;
pub mod ops;
pub mod span;
pub mod symbol_hash;

pub use error::{Diagnostic, DiagnosticSink, Diagnostics, ErrorCode, LoweringError, Severity};
pub use js::{JsExpr, JsStmt};
pub use metadata::{
    AccessorImpl, ConversionTag, MetadataRegistry, MethodImpl, PropertyImpl, ScriptMetadata, TypeSemantics,
};
pub use ops::{AssignOp, BinaryOp};
pub use span::Span;
pub use symbol_hash::SymbolHash;
