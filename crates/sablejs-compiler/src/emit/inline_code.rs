//! Inline-code template substitution.
//!
//! Templates are literal script text with `{name}` placeholders:
//! `{this}` for the receiver, `{value}` for the assigned value, a declared
//! parameter name, or a positional index (`{0}`, `{1}`, ...). `{{` and `}}`
//! stand for literal braces.
//!
//! A template may drop, repeat or reorder its operands, so every operand
//! substituted into one must already be trivially reusable or a temporary.

use sablejs_core::js::JsExpr;
use sablejs_core::{AccessorImpl, LoweringError, Span};

/// A parsed template fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece<'t> {
    Text(String),
    Placeholder(&'t str),
}

fn parse(template: &str, span: Span) -> Result<Vec<Piece<'_>>, LoweringError> {
    let mut pieces = Vec::new();
    let mut text = String::new();
    let mut chars = template.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        match ch {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                text.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                text.push('}');
            }
            '{' => {
                let start = i + 1;
                let end = loop {
                    match chars.next() {
                        Some((j, '}')) => break j,
                        Some(_) => {}
                        None => {
                            return Err(LoweringError::internal(
                                format!("unterminated placeholder in inline code '{template}'"),
                                span,
                            ));
                        }
                    }
                };
                if !text.is_empty() {
                    pieces.push(Piece::Text(std::mem::take(&mut text)));
                }
                pieces.push(Piece::Placeholder(&template[start..end]));
            }
            '}' => {
                return Err(LoweringError::internal(
                    format!("unmatched '}}' in inline code '{template}'"),
                    span,
                ));
            }
            c => text.push(c),
        }
    }
    if !text.is_empty() {
        pieces.push(Piece::Text(text));
    }
    Ok(pieces)
}

/// Whether `accessor` is an inline-code template.
pub fn is_inline(accessor: Option<&AccessorImpl>) -> bool {
    matches!(accessor, Some(AccessorImpl::InlineCode { .. }))
}

/// Substitute placeholders. Operands that are not atomic are parenthesized.
pub fn substitute<'e>(
    template: &str,
    span: Span,
    lookup: impl Fn(&str) -> Option<&'e JsExpr>,
) -> Result<String, LoweringError> {
    let mut out = String::with_capacity(template.len());
    for piece in parse(template, span)? {
        match piece {
            Piece::Text(text) => out.push_str(&text),
            Piece::Placeholder(name) => {
                let expr = lookup(name).ok_or_else(|| {
                    LoweringError::internal(
                        format!("unknown placeholder '{{{name}}}' in inline code '{template}'"),
                        span,
                    )
                })?;
                if expr.is_atomic() {
                    out.push_str(&expr.to_string());
                } else {
                    out.push_str(&format!("({expr})"));
                }
            }
        }
    }
    Ok(out)
}
