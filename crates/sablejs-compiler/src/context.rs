//! Lowering context.
//!
//! Bundles what a lowering pass needs besides the tree itself: metadata
//! lookup, the per-function temporary allocator, the diagnostic sink, the
//! configured runtime names and the member being compiled. Everything is
//! passed in explicitly, so independent functions can be lowered in parallel
//! with their own allocators and sinks.

use sablejs_core::ast::TypeRef;
use sablejs_core::{Diagnostic, DiagnosticSink, ScriptMetadata};

use crate::options::LoweringOptions;
use crate::temps::TemporaryAllocator;

/// The member whose body is being lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnclosingMember<'a> {
    /// The type declaring the member (the type of `this`).
    pub ty: TypeRef<'a>,
    /// Whether the member is an instance constructor.
    pub is_constructor: bool,
}

impl<'a> EnclosingMember<'a> {
    /// An ordinary method of `ty`.
    pub fn method(ty: TypeRef<'a>) -> Self {
        Self {
            ty,
            is_constructor: false,
        }
    }

    /// A constructor of `ty`.
    pub fn constructor(ty: TypeRef<'a>) -> Self {
        Self {
            ty,
            is_constructor: true,
        }
    }
}

/// State shared by all lowering steps of one function body.
pub struct LoweringContext<'a> {
    metadata: &'a dyn ScriptMetadata,
    temps: &'a mut TemporaryAllocator,
    diagnostics: &'a mut dyn DiagnosticSink,
    options: &'a LoweringOptions,
    enclosing: EnclosingMember<'a>,
}

impl<'a> LoweringContext<'a> {
    pub fn new(
        metadata: &'a dyn ScriptMetadata,
        temps: &'a mut TemporaryAllocator,
        diagnostics: &'a mut dyn DiagnosticSink,
        options: &'a LoweringOptions,
        enclosing: EnclosingMember<'a>,
    ) -> Self {
        Self {
            metadata,
            temps,
            diagnostics,
            options,
            enclosing,
        }
    }

    pub fn metadata(&self) -> &'a dyn ScriptMetadata {
        self.metadata
    }

    pub fn options(&self) -> &'a LoweringOptions {
        self.options
    }

    pub fn enclosing(&self) -> EnclosingMember<'a> {
        self.enclosing
    }

    /// Allocate a fresh temporary name.
    pub fn allocate_temp(&mut self) -> String {
        self.temps.allocate()
    }

    /// Report a diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.report(diagnostic);
    }
}
