//! Resolved expression tree handed over by the front end.
//!
//! Every node is fully resolved: member references point at their symbols,
//! types are known, and overload resolution has already happened. Nodes are
//! arena-allocated and borrowed for `'ast`; nothing downstream mutates them.
//!
//! The lowering engine only reads this tree. It builds lvalue descriptors from
//! assignment targets and walks operands to decide evaluation order.

use bitflags::bitflags;

use crate::ops::{AssignOp, BinaryOp};
use crate::{Span, SymbolHash};

/// Name of the type given to dynamically dispatched expressions.
pub const DYNAMIC_TYPE_NAME: &str = "dynamic";

bitflags! {
    /// Flags attached to resolved symbols.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SymbolFlags: u8 {
        /// Local aliasing a caller's storage (`ref`/`out` parameter).
        const BY_REF = 1 << 0;
        /// Property is an indexer (`this[...]`).
        const INDEXER = 1 << 1;
    }
}

/// A resolved type reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRef<'ast> {
    /// Qualified type name.
    pub name: &'ast str,
    /// Identity of the type.
    pub hash: SymbolHash,
}

impl<'ast> TypeRef<'ast> {
    /// Create a type reference from its qualified name.
    pub fn new(name: &'ast str) -> Self {
        Self {
            name,
            hash: SymbolHash::from_name(name),
        }
    }

    /// The `dynamic` type.
    pub fn dynamic() -> TypeRef<'static> {
        TypeRef::new(DYNAMIC_TYPE_NAME)
    }

    /// Whether values of this type are dispatched dynamically.
    pub fn is_dynamic(&self) -> bool {
        self.name == DYNAMIC_TYPE_NAME
    }
}

// ============================================================================
// Symbols
// ============================================================================

/// A local variable or parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalSymbol<'ast> {
    /// Script identifier already allocated for the local.
    pub name: &'ast str,
    /// Declared type.
    pub ty: TypeRef<'ast>,
    /// Symbol flags (`BY_REF` for `ref`/`out` parameters).
    pub flags: SymbolFlags,
}

impl LocalSymbol<'_> {
    /// Whether the local aliases a caller's storage.
    pub fn is_by_ref(&self) -> bool {
        self.flags.contains(SymbolFlags::BY_REF)
    }
}

/// A field declared on a type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSymbol<'ast> {
    /// Source name.
    pub name: &'ast str,
    /// The type declaring the field.
    pub declaring_type: TypeRef<'ast>,
    /// Field type.
    pub ty: TypeRef<'ast>,
}

impl FieldSymbol<'_> {
    /// Identity used by the metadata store.
    pub fn hash(&self) -> SymbolHash {
        SymbolHash::from_member(self.declaring_type.hash, self.name)
    }
}

/// A parameter of an indexer or method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    /// Declared parameter name.
    pub name: &'ast str,
    /// Declared type.
    pub ty: TypeRef<'ast>,
    /// Declared default value for optional parameters.
    pub default: Option<&'ast Expr<'ast>>,
}

/// A property or indexer declared on a type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertySymbol<'ast> {
    /// Source name (`Item` for indexers).
    pub name: &'ast str,
    /// The type declaring the property.
    pub declaring_type: TypeRef<'ast>,
    /// Property type.
    pub ty: TypeRef<'ast>,
    /// Indexer parameters in declaration order; empty for plain properties.
    pub params: &'ast [Param<'ast>],
    /// Symbol flags.
    pub flags: SymbolFlags,
}

impl PropertySymbol<'_> {
    /// Whether this property is an indexer.
    pub fn is_indexer(&self) -> bool {
        self.flags.contains(SymbolFlags::INDEXER)
    }

    /// Identity used by the metadata store.
    pub fn hash(&self) -> SymbolHash {
        if self.is_indexer() {
            let params: Vec<SymbolHash> = self.params.iter().map(|p| p.ty.hash).collect();
            SymbolHash::from_indexer(self.declaring_type.hash, &params)
        } else {
            SymbolHash::from_member(self.declaring_type.hash, self.name)
        }
    }

    /// `DeclaringType.Member`, as used in diagnostics.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring_type.name, self.name)
    }
}

/// A method declared on a type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodSymbol<'ast> {
    /// Source name.
    pub name: &'ast str,
    /// The type declaring the method.
    pub declaring_type: TypeRef<'ast>,
    /// Return type.
    pub return_type: TypeRef<'ast>,
    /// Parameters in declaration order.
    pub params: &'ast [Param<'ast>],
}

impl MethodSymbol<'_> {
    /// Identity used by the metadata store.
    pub fn hash(&self) -> SymbolHash {
        SymbolHash::from_member(self.declaring_type.hash, self.name)
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// A resolved expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Literal value
    Literal(LiteralExpr<'ast>),
    /// Local variable or parameter
    Local(LocalExpr<'ast>),
    /// The receiver of the enclosing method
    This(ThisExpr<'ast>),
    /// `default(T)`
    Default(DefaultExpr<'ast>),
    /// Field access
    Field(&'ast FieldExpr<'ast>),
    /// Property access
    Property(&'ast PropertyExpr<'ast>),
    /// Indexer access
    Indexer(&'ast IndexerExpr<'ast>),
    /// Array element access
    ArrayElement(&'ast ArrayElementExpr<'ast>),
    /// Member or index access on a `dynamic` receiver
    Dynamic(&'ast DynamicExpr<'ast>),
    /// Method call
    Call(&'ast CallExpr<'ast>),
    /// Binary operation
    Binary(&'ast BinaryExpr<'ast>),
    /// Assignment (possibly the head of a chain)
    Assign(&'ast AssignExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Local(e) => e.span,
            Self::This(e) => e.span,
            Self::Default(e) => e.span,
            Self::Field(e) => e.span,
            Self::Property(e) => e.span,
            Self::Indexer(e) => e.span,
            Self::ArrayElement(e) => e.span,
            Self::Dynamic(e) => e.span,
            Self::Call(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Assign(e) => e.span,
        }
    }

    /// Get the resolved type of this expression.
    pub fn ty(&self) -> TypeRef<'ast> {
        match self {
            Self::Literal(e) => e.ty,
            Self::Local(e) => e.local.ty,
            Self::This(e) => e.ty,
            Self::Default(e) => e.ty,
            Self::Field(e) => e.field.ty,
            Self::Property(e) => e.property.ty,
            Self::Indexer(e) => e.ty,
            Self::ArrayElement(e) => e.ty,
            Self::Dynamic(_) => TypeRef::dynamic(),
            Self::Call(e) => e.method.return_type,
            Self::Binary(e) => e.ty,
            Self::Assign(e) => e.target.ty(),
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    /// The literal kind
    pub kind: LiteralKind<'ast>,
    /// Resolved type
    pub ty: TypeRef<'ast>,
    /// Source location
    pub span: Span,
}

/// The kind of literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind<'ast> {
    /// Integer literal
    Int(i64),
    /// Floating point literal
    Double(f64),
    /// Boolean literal
    Bool(bool),
    /// String literal
    String(&'ast str),
    /// Null literal
    Null,
}

/// A local variable reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalExpr<'ast> {
    /// The referenced local
    pub local: &'ast LocalSymbol<'ast>,
    /// Source location
    pub span: Span,
}

/// The receiver of the enclosing method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThisExpr<'ast> {
    /// The enclosing type
    pub ty: TypeRef<'ast>,
    /// Source location
    pub span: Span,
}

/// `default(T)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultExpr<'ast> {
    /// The defaulted type
    pub ty: TypeRef<'ast>,
    /// Source location
    pub span: Span,
}

/// How a member is reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Receiver<'ast> {
    /// Through an object expression (`obj.Member`, or implicit `this`).
    Instance(&'ast Expr<'ast>),
    /// Through the declaring type (`Type.Member`).
    Static(TypeRef<'ast>),
    /// Through `base`: the receiver is `this` but dispatch must bind to the
    /// given base type instead of the runtime type.
    Base(TypeRef<'ast>),
}

/// Field access.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldExpr<'ast> {
    /// How the field is reached
    pub receiver: Receiver<'ast>,
    /// The accessed field
    pub field: &'ast FieldSymbol<'ast>,
    /// Source location
    pub span: Span,
}

/// Property access (non-indexer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyExpr<'ast> {
    /// How the property is reached
    pub receiver: Receiver<'ast>,
    /// The accessed property
    pub property: &'ast PropertySymbol<'ast>,
    /// Source location
    pub span: Span,
}

/// A call-site argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Argument<'ast> {
    /// Name for named arguments (`name: value`)
    pub name: Option<&'ast str>,
    /// Argument value
    pub value: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// Which indexer an access refers to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndexerTarget<'ast> {
    /// Statically resolved indexer.
    Resolved(&'ast PropertySymbol<'ast>),
    /// Arguments are dynamic; any of these candidates may be picked at run time.
    Dynamic(&'ast [&'ast PropertySymbol<'ast>]),
}

/// Indexer access (`obj[args]` on a non-array, non-dynamic receiver).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexerExpr<'ast> {
    /// How the indexer is reached
    pub receiver: Receiver<'ast>,
    /// The indexer being invoked
    pub target: IndexerTarget<'ast>,
    /// Arguments in call-site order
    pub args: &'ast [Argument<'ast>],
    /// Element type
    pub ty: TypeRef<'ast>,
    /// Source location
    pub span: Span,
}

/// Array element access. The rank is the number of indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayElementExpr<'ast> {
    /// The array
    pub array: &'ast Expr<'ast>,
    /// Index expressions, one per dimension
    pub indices: &'ast [&'ast Expr<'ast>],
    /// Element type
    pub ty: TypeRef<'ast>,
    /// Source location
    pub span: Span,
}

/// Member or index access on a `dynamic` receiver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicExpr<'ast> {
    /// The dynamic receiver
    pub receiver: &'ast Expr<'ast>,
    /// What is accessed
    pub access: DynamicAccess<'ast>,
    /// Source location
    pub span: Span,
}

/// The access performed by a [`DynamicExpr`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DynamicAccess<'ast> {
    /// `d.name`
    Member(&'ast str),
    /// `d[args]`
    Index(&'ast [Argument<'ast>]),
}

/// Method call. Arguments are in declared-parameter order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    /// How the method is reached
    pub receiver: Receiver<'ast>,
    /// The invoked method
    pub method: &'ast MethodSymbol<'ast>,
    /// Arguments
    pub args: &'ast [&'ast Expr<'ast>],
    /// Source location
    pub span: Span,
}

/// A binary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    /// Left operand
    pub left: &'ast Expr<'ast>,
    /// Operator
    pub op: BinaryOp,
    /// Right operand
    pub right: &'ast Expr<'ast>,
    /// Result type
    pub ty: TypeRef<'ast>,
    /// Source location
    pub span: Span,
}

/// An assignment expression.
///
/// A chain `a = b = c` is an `AssignExpr` whose `value` is another
/// `Expr::Assign`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignExpr<'ast> {
    /// Left-hand side (target)
    pub target: &'ast Expr<'ast>,
    /// Assignment operator
    pub op: AssignOp,
    /// Right-hand side (value)
    pub value: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;

    #[test]
    fn dynamic_type_is_recognised() {
        assert!(TypeRef::dynamic().is_dynamic());
        assert!(!TypeRef::new("Int32").is_dynamic());
    }

    #[test]
    fn indexer_overloads_have_distinct_hashes() {
        let arena = Bump::new();
        let owner = TypeRef::new("C");
        let int_params = arena.alloc_slice_copy(&[Param {
            name: "a",
            ty: TypeRef::new("Int32"),
            default: None,
        }]);
        let string_params = arena.alloc_slice_copy(&[Param {
            name: "b",
            ty: TypeRef::new("String"),
            default: None,
        }]);
        let by_int = PropertySymbol {
            name: "Item",
            declaring_type: owner,
            ty: TypeRef::new("Int32"),
            params: int_params,
            flags: SymbolFlags::INDEXER,
        };
        let by_string = PropertySymbol {
            params: string_params,
            ..by_int
        };
        assert_ne!(by_int.hash(), by_string.hash());
        assert_eq!(by_int.qualified_name(), "C.Item");
    }

    #[test]
    fn assignment_type_is_target_type() {
        let arena = Bump::new();
        let local = arena.alloc(LocalSymbol {
            name: "$i",
            ty: TypeRef::new("Int32"),
            flags: SymbolFlags::empty(),
        });
        let target = arena.alloc(Expr::Local(LocalExpr {
            local,
            span: Span::default(),
        }));
        let value = arena.alloc(Expr::Literal(LiteralExpr {
            kind: LiteralKind::Null,
            ty: TypeRef::new("Object"),
            span: Span::default(),
        }));
        let assign = Expr::Assign(arena.alloc(AssignExpr {
            target,
            op: AssignOp::Assign,
            value,
            span: Span::new(2, 5, 5),
        }));
        assert_eq!(assign.ty().name, "Int32");
        assert_eq!(assign.span(), Span::new(2, 5, 5));
    }
}
