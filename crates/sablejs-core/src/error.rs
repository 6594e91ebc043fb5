//! Error types for assignment lowering.
//!
//! ## Error Hierarchy
//!
//! ```text
//! LoweringError        - a lowering step failed (carries an ErrorCode and span)
//! Diagnostic           - what the entry point reports to a DiagnosticSink
//! Diagnostics          - collecting DiagnosticSink implementation
//! ```
//!
//! Every lowering step returns `Result<_, LoweringError>` and propagates with
//! `?`. Only the entry point converts the error into a [`Diagnostic`], so each
//! failed assignment is reported exactly once.

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use thiserror::Error;

use crate::Span;

// ============================================================================
// Error Codes
// ============================================================================

/// Stable numeric diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u16)]
pub enum ErrorCode {
    /// The member has no script representation.
    MemberNotUsableFromScript = 7501,
    /// Named arguments were passed to an indexer resolved at run time.
    DynamicIndexerNamedArgumentsUnsupported = 7526,
    /// A dynamic receiver was indexed with more than one argument.
    DynamicIndexerArityUnsupported = 7528,
    /// Run-time indexer candidates do not share one implementation.
    AmbiguousDynamicDispatchImplementation = 7532,
    /// `this` of a reference type was assigned.
    InvalidAssignmentToReceiver = 7537,
    /// `this` of an immutable value type was assigned outside a constructor.
    AssignmentToImmutableReceiver = 7538,
    /// The resolved tree violated a front-end guarantee.
    Internal = 7999,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SJ{}", u16::from(*self))
    }
}

// ============================================================================
// Lowering Errors
// ============================================================================

/// Errors that occur while lowering an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoweringError {
    /// The member is marked as not usable from script.
    #[error("at {span}: the member {member} can not be used from script")]
    MemberNotUsableFromScript { member: String, span: Span },

    #[error("at {span}: named arguments are not supported for indexers resolved at run time")]
    DynamicIndexerNamedArgumentsUnsupported { span: Span },

    #[error("at {span}: dynamic indexing with {count} arguments is not supported, exactly one is required")]
    DynamicIndexerArityUnsupported { count: usize, span: Span },

    /// Candidates picked at run time would need different script code.
    #[error("at {span}: the candidate indexers on {owner} are implemented differently in script and can not be dispatched at run time")]
    AmbiguousDynamicDispatchImplementation { owner: String, span: Span },

    #[error("at {span}: cannot assign to 'this' of reference type {type_name}")]
    InvalidAssignmentToReceiver { type_name: String, span: Span },

    #[error("at {span}: cannot assign to 'this' of immutable value type {type_name} outside a constructor")]
    AssignmentToImmutableReceiver { type_name: String, span: Span },

    /// A front-end guarantee was violated.
    #[error("at {span}: internal error: {message}")]
    Internal { message: String, span: Span },
}

impl LoweringError {
    /// Shorthand for [`LoweringError::Internal`].
    pub fn internal(message: impl Into<String>, span: Span) -> Self {
        LoweringError::Internal {
            message: message.into(),
            span,
        }
    }

    /// Get the diagnostic code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            LoweringError::MemberNotUsableFromScript { .. } => ErrorCode::MemberNotUsableFromScript,
            LoweringError::DynamicIndexerNamedArgumentsUnsupported { .. } => {
                ErrorCode::DynamicIndexerNamedArgumentsUnsupported
            }
            LoweringError::DynamicIndexerArityUnsupported { .. } => ErrorCode::DynamicIndexerArityUnsupported,
            LoweringError::AmbiguousDynamicDispatchImplementation { .. } => {
                ErrorCode::AmbiguousDynamicDispatchImplementation
            }
            LoweringError::InvalidAssignmentToReceiver { .. } => ErrorCode::InvalidAssignmentToReceiver,
            LoweringError::AssignmentToImmutableReceiver { .. } => ErrorCode::AssignmentToImmutableReceiver,
            LoweringError::Internal { .. } => ErrorCode::Internal,
        }
    }

    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            LoweringError::MemberNotUsableFromScript { span, .. }
            | LoweringError::DynamicIndexerNamedArgumentsUnsupported { span }
            | LoweringError::DynamicIndexerArityUnsupported { span, .. }
            | LoweringError::AmbiguousDynamicDispatchImplementation { span, .. }
            | LoweringError::InvalidAssignmentToReceiver { span, .. }
            | LoweringError::AssignmentToImmutableReceiver { span, .. }
            | LoweringError::Internal { span, .. } => *span,
        }
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

/// A reported diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    /// An error diagnostic.
    pub fn error(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            span,
        }
    }
}

impl From<&LoweringError> for Diagnostic {
    fn from(error: &LoweringError) -> Self {
        Diagnostic::error(error.code(), error.to_string(), error.span())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{severity} {}: {}", self.code, self.message)
    }
}

/// Receives diagnostics reported during lowering.
pub trait DiagnosticSink {
    /// Report a diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);
}

/// A collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create a new empty collection.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Check if there are any diagnostics.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of diagnostics.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    /// Iterate over the diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Convert to a Vec of diagnostics.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_round_trip_through_u16() {
        assert_eq!(u16::from(ErrorCode::DynamicIndexerArityUnsupported), 7528);
        assert_eq!(ErrorCode::try_from(7532u16).ok(), Some(ErrorCode::AmbiguousDynamicDispatchImplementation));
        assert!(ErrorCode::try_from(1234u16).is_err());
    }

    #[test]
    fn error_code_matches_variant() {
        let err = LoweringError::InvalidAssignmentToReceiver {
            type_name: "C".into(),
            span: Span::new(4, 9, 4),
        };
        assert_eq!(err.code(), ErrorCode::InvalidAssignmentToReceiver);
        assert_eq!(err.span(), Span::new(4, 9, 4));
    }

    #[test]
    fn not_usable_message_names_member() {
        let err = LoweringError::MemberNotUsableFromScript {
            member: "C.P".into(),
            span: Span::new(1, 1, 3),
        };
        assert!(err.to_string().contains("C.P"));
    }

    #[test]
    fn diagnostics_collect_reports() {
        let mut sink = Diagnostics::new();
        assert!(sink.is_empty());
        let err = LoweringError::internal("unexpected target", Span::new(2, 3, 1));
        sink.report(Diagnostic::from(&err));
        assert_eq!(sink.len(), 1);
        assert!(sink.has_errors());
        let diag = sink.iter().next().unwrap();
        assert_eq!(diag.code, ErrorCode::Internal);
        assert_eq!(diag.span, Span::new(2, 3, 1));
        assert!(sink.to_string().starts_with("error SJ7999"));
    }
}
