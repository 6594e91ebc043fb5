//! Output-language (JavaScript) expression and statement model.
//!
//! The model is deliberately small: it covers what assignment lowering
//! produces. [`fmt::Display`] prints it with the minimal parentheses implied
//! by operator precedence.
//!
//! # Example
//!
//! ```
//! use sablejs_core::js::{JsExpr, JsStmt};
//!
//! let store = JsExpr::assign(JsExpr::member(JsExpr::This, "$F"), JsExpr::ident("$i"));
//! assert_eq!(JsStmt::Expr(store).to_string(), "this.$F = $i;");
//! ```

use std::fmt;

use ordered_float::OrderedFloat;

use crate::ops::BinaryOp;

/// Precedence of assignment and the comma-free expression level.
const PREC_ASSIGN: u8 = 1;
/// Precedence of member access, indexing and calls.
const PREC_POSTFIX: u8 = 18;
/// Precedence of primary expressions.
const PREC_PRIMARY: u8 = 20;

/// An output-language expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JsExpr {
    /// `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Numeric literal
    Number(OrderedFloat<f64>),
    /// String literal, printed single-quoted
    String(String),
    /// Identifier reference
    Identifier(String),
    /// `this`
    This,
    /// Reference to a type object, printed `{Name}`
    TypeHandle(String),
    /// `object.name`
    Member(Box<JsExpr>, String),
    /// `object[index]`
    Index(Box<JsExpr>, Box<JsExpr>),
    /// `callee(args...)`
    Invoke(Box<JsExpr>, Vec<JsExpr>),
    /// `[items...]`
    Array(Vec<JsExpr>),
    /// `target = value`
    Assign(Box<JsExpr>, Box<JsExpr>),
    /// `target op= value`
    CompoundAssign(BinaryOp, Box<JsExpr>, Box<JsExpr>),
    /// `left op right`
    Binary(BinaryOp, Box<JsExpr>, Box<JsExpr>),
    /// Literal script text (substituted inline code)
    Verbatim(String),
}

impl JsExpr {
    /// Identifier reference.
    pub fn ident(name: impl Into<String>) -> Self {
        JsExpr::Identifier(name.into())
    }

    /// Numeric literal.
    pub fn number(value: f64) -> Self {
        JsExpr::Number(OrderedFloat(value))
    }

    /// String literal.
    pub fn string(value: impl Into<String>) -> Self {
        JsExpr::String(value.into())
    }

    /// Type handle.
    pub fn type_handle(name: impl Into<String>) -> Self {
        JsExpr::TypeHandle(name.into())
    }

    /// `object.name`
    pub fn member(object: JsExpr, name: impl Into<String>) -> Self {
        JsExpr::Member(Box::new(object), name.into())
    }

    /// `object[index]`
    pub fn index(object: JsExpr, index: JsExpr) -> Self {
        JsExpr::Index(Box::new(object), Box::new(index))
    }

    /// `callee(args...)`
    pub fn invoke(callee: JsExpr, args: Vec<JsExpr>) -> Self {
        JsExpr::Invoke(Box::new(callee), args)
    }

    /// `object.name(args...)`
    pub fn call_method(object: JsExpr, name: impl Into<String>, args: Vec<JsExpr>) -> Self {
        JsExpr::invoke(JsExpr::member(object, name), args)
    }

    /// `target = value`
    pub fn assign(target: JsExpr, value: JsExpr) -> Self {
        JsExpr::Assign(Box::new(target), Box::new(value))
    }

    /// `target op= value`
    pub fn compound_assign(op: BinaryOp, target: JsExpr, value: JsExpr) -> Self {
        JsExpr::CompoundAssign(op, Box::new(target), Box::new(value))
    }

    /// `left op right`
    pub fn binary(op: BinaryOp, left: JsExpr, right: JsExpr) -> Self {
        JsExpr::Binary(op, Box::new(left), Box::new(right))
    }

    /// Whether the expression can be used as an operand of member access
    /// without parentheses.
    pub fn is_atomic(&self) -> bool {
        self.precedence() >= PREC_POSTFIX
    }

    /// Whether evaluating the expression twice is indistinguishable from
    /// evaluating it once.
    pub fn is_reusable(&self) -> bool {
        matches!(
            self,
            JsExpr::Null
                | JsExpr::Bool(_)
                | JsExpr::Number(_)
                | JsExpr::String(_)
                | JsExpr::Identifier(_)
                | JsExpr::This
                | JsExpr::TypeHandle(_)
        )
    }

    fn precedence(&self) -> u8 {
        match self {
            JsExpr::Assign(..) | JsExpr::CompoundAssign(..) | JsExpr::Verbatim(_) => PREC_ASSIGN,
            JsExpr::Binary(op, ..) => op.precedence(),
            JsExpr::Member(..) | JsExpr::Index(..) | JsExpr::Invoke(..) => PREC_POSTFIX,
            _ => PREC_PRIMARY,
        }
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, min_prec: u8) -> fmt::Result {
        let parens = self.precedence() < min_prec;
        if parens {
            f.write_str("(")?;
        }
        match self {
            JsExpr::Null => f.write_str("null")?,
            JsExpr::Bool(b) => write!(f, "{b}")?,
            JsExpr::Number(n) => write_number(f, n.0)?,
            JsExpr::String(s) => write_string(f, s)?,
            JsExpr::Identifier(name) => f.write_str(name)?,
            JsExpr::This => f.write_str("this")?,
            JsExpr::TypeHandle(name) => write!(f, "{{{name}}}")?,
            JsExpr::Member(object, name) => {
                object.write(f, PREC_POSTFIX)?;
                write!(f, ".{name}")?;
            }
            JsExpr::Index(object, index) => {
                object.write(f, PREC_POSTFIX)?;
                f.write_str("[")?;
                index.write(f, PREC_ASSIGN)?;
                f.write_str("]")?;
            }
            JsExpr::Invoke(callee, args) => {
                callee.write(f, PREC_POSTFIX)?;
                f.write_str("(")?;
                write_list(f, args)?;
                f.write_str(")")?;
            }
            JsExpr::Array(items) => {
                f.write_str("[")?;
                write_list(f, items)?;
                f.write_str("]")?;
            }
            JsExpr::Assign(target, value) => {
                target.write(f, PREC_POSTFIX)?;
                f.write_str(" = ")?;
                value.write(f, PREC_ASSIGN)?;
            }
            JsExpr::CompoundAssign(op, target, value) => {
                target.write(f, PREC_POSTFIX)?;
                write!(f, " {op}= ")?;
                value.write(f, PREC_ASSIGN)?;
            }
            JsExpr::Binary(op, left, right) => {
                let prec = op.precedence();
                left.write(f, prec)?;
                write!(f, " {op} ")?;
                right.write(f, prec + 1)?;
            }
            JsExpr::Verbatim(text) => f.write_str(text)?,
        }
        if parens {
            f.write_str(")")?;
        }
        Ok(())
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[JsExpr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        item.write(f, PREC_ASSIGN)?;
    }
    Ok(())
}

fn write_number(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        write!(f, "{}", value as i64)
    } else {
        write!(f, "{value}")
    }
}

fn write_string(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("'")?;
    for ch in value.chars() {
        match ch {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("'")
}

impl fmt::Display for JsExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, PREC_ASSIGN)
    }
}

/// An output-language statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JsStmt {
    /// `expr;`
    Expr(JsExpr),
    /// `var name = init;`
    VarDecl { name: String, init: JsExpr },
}

impl fmt::Display for JsStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsStmt::Expr(expr) => write!(f, "{expr};"),
            JsStmt::VarDecl { name, init } => write!(f, "var {name} = {init};"),
        }
    }
}

/// Print statements one per line.
pub fn render_statements(statements: &[JsStmt]) -> String {
    statements
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chained_assignment_prints_right_associative() {
        let chain = JsExpr::assign(
            JsExpr::ident("$i"),
            JsExpr::assign(JsExpr::ident("$j"), JsExpr::ident("$k")),
        );
        assert_eq!(chain.to_string(), "$i = $j = $k");
    }

    #[test]
    fn integral_numbers_print_without_fraction() {
        assert_eq!(JsExpr::number(123.0).to_string(), "123");
        assert_eq!(JsExpr::number(1.5).to_string(), "1.5");
    }

    #[test]
    fn strings_are_single_quoted_and_escaped() {
        assert_eq!(JsExpr::string("set_$P").to_string(), "'set_$P'");
        assert_eq!(JsExpr::string("it's").to_string(), "'it\\'s'");
    }

    #[test]
    fn intrinsic_call_with_type_handle() {
        let clone = JsExpr::invoke(
            JsExpr::ident("$Clone"),
            vec![JsExpr::ident("$k"), JsExpr::type_handle("to_Int32")],
        );
        assert_eq!(clone.to_string(), "$Clone($k, {to_Int32})");
    }

    #[test]
    fn binary_precedence_parenthesizes() {
        let sum = JsExpr::binary(BinaryOp::Add, JsExpr::ident("a"), JsExpr::ident("b"));
        let product = JsExpr::binary(BinaryOp::Mul, sum.clone(), JsExpr::ident("c"));
        assert_eq!(product.to_string(), "(a + b) * c");
        let nested = JsExpr::binary(BinaryOp::Sub, JsExpr::ident("a"), sum);
        assert_eq!(nested.to_string(), "a - (a + b)");
    }

    #[test]
    fn assignment_as_operand_is_parenthesized() {
        let store = JsExpr::assign(JsExpr::ident("x"), JsExpr::number(1.0));
        let read = JsExpr::member(store, "y");
        assert_eq!(read.to_string(), "(x = 1).y");
    }

    #[test]
    fn reusable_expressions() {
        assert!(JsExpr::ident("$tmp1").is_reusable());
        assert!(JsExpr::This.is_reusable());
        assert!(!JsExpr::member(JsExpr::This, "$F").is_reusable());
        assert!(JsExpr::member(JsExpr::This, "$F").is_atomic());
        assert!(!JsExpr::Verbatim("a + b".into()).is_atomic());
    }

    #[test]
    fn statements() {
        let decl = JsStmt::VarDecl {
            name: "$tmp1".into(),
            init: JsExpr::call_method(JsExpr::This, "$F", vec![]),
        };
        let store = JsStmt::Expr(JsExpr::compound_assign(
            BinaryOp::Add,
            JsExpr::index(JsExpr::ident("$d"), JsExpr::string("X")),
            JsExpr::ident("$tmp1"),
        ));
        assert_eq!(
            render_statements(&[decl, store]),
            "var $tmp1 = this.$F();\n$d['X'] += $tmp1;"
        );
    }
}
