//! Arena-backed builders for resolved trees used by the unit tests.

use bumpalo::Bump;
use sablejs_core::ast::*;
use sablejs_core::js::render_statements;
use sablejs_core::{AssignOp, BinaryOp, Diagnostics, MetadataRegistry, Span, TypeSemantics};

use crate::context::{EnclosingMember, LoweringContext};
use crate::options::LoweringOptions;
use crate::temps::TemporaryAllocator;
use crate::{LoweredAssignment, ValueUsage, lower_assignment};

pub(crate) const INT: &str = "Int32";

/// Builds resolved expressions in an arena. The enclosing class is `C`.
pub(crate) struct Tree<'a> {
    arena: &'a Bump,
}

impl<'a> Tree<'a> {
    pub(crate) fn new(arena: &'a Bump) -> Self {
        Self { arena }
    }

    pub(crate) fn this(&self) -> &'a Expr<'a> {
        self.this_of("C")
    }

    pub(crate) fn this_of(&self, ty: &'a str) -> &'a Expr<'a> {
        self.arena.alloc(Expr::This(ThisExpr {
            ty: TypeRef::new(ty),
            span: Span::default(),
        }))
    }

    pub(crate) fn local(&self, name: &'a str, ty: &'a str) -> &'a Expr<'a> {
        self.local_with(name, ty, SymbolFlags::empty())
    }

    pub(crate) fn ref_local(&self, name: &'a str, ty: &'a str) -> &'a Expr<'a> {
        self.local_with(name, ty, SymbolFlags::BY_REF)
    }

    fn local_with(&self, name: &'a str, ty: &'a str, flags: SymbolFlags) -> &'a Expr<'a> {
        let local = self.arena.alloc(LocalSymbol {
            name,
            ty: TypeRef::new(ty),
            flags,
        });
        self.arena.alloc(Expr::Local(LocalExpr {
            local,
            span: Span::default(),
        }))
    }

    pub(crate) fn int(&self, value: i64) -> &'a Expr<'a> {
        self.arena.alloc(Expr::Literal(LiteralExpr {
            kind: LiteralKind::Int(value),
            ty: TypeRef::new(INT),
            span: Span::default(),
        }))
    }

    pub(crate) fn string(&self, value: &'a str) -> &'a Expr<'a> {
        self.arena.alloc(Expr::Literal(LiteralExpr {
            kind: LiteralKind::String(value),
            ty: TypeRef::new("String"),
            span: Span::default(),
        }))
    }

    pub(crate) fn default_of(&self, ty: &'a str) -> &'a Expr<'a> {
        self.arena.alloc(Expr::Default(DefaultExpr {
            ty: TypeRef::new(ty),
            span: Span::default(),
        }))
    }

    pub(crate) fn field_of(&self, receiver: Receiver<'a>, owner: &'a str, name: &'a str, ty: &'a str) -> &'a Expr<'a> {
        let field = self.arena.alloc(FieldSymbol {
            name,
            declaring_type: TypeRef::new(owner),
            ty: TypeRef::new(ty),
        });
        self.arena.alloc(Expr::Field(self.arena.alloc(FieldExpr {
            receiver,
            field,
            span: Span::default(),
        })))
    }

    /// Instance field of `C` accessed through `this`.
    pub(crate) fn field(&self, name: &'a str, ty: &'a str) -> &'a Expr<'a> {
        self.field_of(Receiver::Instance(self.this()), "C", name, ty)
    }

    pub(crate) fn property_symbol(&self, owner: &'a str, name: &'a str, ty: &'a str) -> &'a PropertySymbol<'a> {
        self.arena.alloc(PropertySymbol {
            name,
            declaring_type: TypeRef::new(owner),
            ty: TypeRef::new(ty),
            params: &[],
            flags: SymbolFlags::empty(),
        })
    }

    pub(crate) fn property_of(&self, receiver: Receiver<'a>, property: &'a PropertySymbol<'a>) -> &'a Expr<'a> {
        self.arena.alloc(Expr::Property(self.arena.alloc(PropertyExpr {
            receiver,
            property,
            span: Span::default(),
        })))
    }

    /// Instance property of `C` accessed through `this`.
    pub(crate) fn property(&self, name: &'a str, ty: &'a str) -> &'a Expr<'a> {
        let symbol = self.property_symbol("C", name, ty);
        self.property_of(Receiver::Instance(self.this()), symbol)
    }

    pub(crate) fn param(&self, name: &'a str, ty: &'a str) -> Param<'a> {
        Param {
            name,
            ty: TypeRef::new(ty),
            default: None,
        }
    }

    pub(crate) fn optional(&self, name: &'a str, ty: &'a str, default: &'a Expr<'a>) -> Param<'a> {
        Param {
            name,
            ty: TypeRef::new(ty),
            default: Some(default),
        }
    }

    pub(crate) fn indexer_symbol(&self, owner: &'a str, ty: &'a str, params: &[Param<'a>]) -> &'a PropertySymbol<'a> {
        self.arena.alloc(PropertySymbol {
            name: "Item",
            declaring_type: TypeRef::new(owner),
            ty: TypeRef::new(ty),
            params: self.arena.alloc_slice_copy(params),
            flags: SymbolFlags::INDEXER,
        })
    }

    pub(crate) fn arg(&self, value: &'a Expr<'a>) -> Argument<'a> {
        Argument {
            name: None,
            value,
            span: value.span(),
        }
    }

    pub(crate) fn named(&self, name: &'a str, value: &'a Expr<'a>) -> Argument<'a> {
        Argument {
            name: Some(name),
            value,
            span: value.span(),
        }
    }

    pub(crate) fn indexer(
        &self,
        receiver: Receiver<'a>,
        symbol: &'a PropertySymbol<'a>,
        args: &[Argument<'a>],
    ) -> &'a Expr<'a> {
        self.arena.alloc(Expr::Indexer(self.arena.alloc(IndexerExpr {
            receiver,
            target: IndexerTarget::Resolved(symbol),
            args: self.arena.alloc_slice_copy(args),
            ty: symbol.ty,
            span: Span::default(),
        })))
    }

    pub(crate) fn dynamic_indexer(
        &self,
        receiver: Receiver<'a>,
        candidates: &[&'a PropertySymbol<'a>],
        args: &[Argument<'a>],
    ) -> &'a Expr<'a> {
        let candidates = self.arena.alloc_slice_copy(candidates);
        self.arena.alloc(Expr::Indexer(self.arena.alloc(IndexerExpr {
            receiver,
            target: IndexerTarget::Dynamic(candidates),
            args: self.arena.alloc_slice_copy(args),
            ty: candidates[0].ty,
            span: Span::new(7, 9, 8),
        })))
    }

    pub(crate) fn element(&self, array: &'a Expr<'a>, indices: &[&'a Expr<'a>], ty: &'a str) -> &'a Expr<'a> {
        self.arena.alloc(Expr::ArrayElement(self.arena.alloc(ArrayElementExpr {
            array,
            indices: self.arena.alloc_slice_copy(indices),
            ty: TypeRef::new(ty),
            span: Span::default(),
        })))
    }

    pub(crate) fn dyn_member(&self, receiver: &'a Expr<'a>, name: &'a str) -> &'a Expr<'a> {
        self.arena.alloc(Expr::Dynamic(self.arena.alloc(DynamicExpr {
            receiver,
            access: DynamicAccess::Member(name),
            span: Span::default(),
        })))
    }

    pub(crate) fn dyn_index(&self, receiver: &'a Expr<'a>, args: &[Argument<'a>]) -> &'a Expr<'a> {
        self.arena.alloc(Expr::Dynamic(self.arena.alloc(DynamicExpr {
            receiver,
            access: DynamicAccess::Index(self.arena.alloc_slice_copy(args)),
            span: Span::new(3, 2, 7),
        })))
    }

    pub(crate) fn method_symbol(&self, owner: &'a str, name: &'a str, ret: &'a str) -> &'a MethodSymbol<'a> {
        self.arena.alloc(MethodSymbol {
            name,
            declaring_type: TypeRef::new(owner),
            return_type: TypeRef::new(ret),
            params: &[],
        })
    }

    pub(crate) fn call_of(
        &self,
        receiver: Receiver<'a>,
        method: &'a MethodSymbol<'a>,
        args: &[&'a Expr<'a>],
    ) -> &'a Expr<'a> {
        self.arena.alloc(Expr::Call(self.arena.alloc(CallExpr {
            receiver,
            method,
            args: self.arena.alloc_slice_copy(args),
            span: Span::default(),
        })))
    }

    /// Parameterless instance method of `C` called through `this`.
    pub(crate) fn call(&self, name: &'a str, ret: &'a str) -> &'a Expr<'a> {
        let method = self.method_symbol("C", name, ret);
        self.call_of(Receiver::Instance(self.this()), method, &[])
    }

    pub(crate) fn binary(&self, op: BinaryOp, left: &'a Expr<'a>, right: &'a Expr<'a>) -> &'a Expr<'a> {
        self.arena.alloc(Expr::Binary(self.arena.alloc(BinaryExpr {
            left,
            op,
            right,
            ty: left.ty(),
            span: Span::default(),
        })))
    }

    pub(crate) fn assign(&self, target: &'a Expr<'a>, value: &'a Expr<'a>) -> &'a AssignExpr<'a> {
        self.compound(AssignOp::Assign, target, value)
    }

    pub(crate) fn compound(&self, op: AssignOp, target: &'a Expr<'a>, value: &'a Expr<'a>) -> &'a AssignExpr<'a> {
        self.arena.alloc(AssignExpr {
            target,
            op,
            value,
            span: Span::new(1, 1, 1),
        })
    }

    pub(crate) fn compound_expr(&self, op: AssignOp, target: &'a Expr<'a>, value: &'a Expr<'a>) -> &'a Expr<'a> {
        self.arena.alloc(Expr::Assign(self.compound(op, target, value)))
    }

    /// `target = value` as an expression, for chains.
    pub(crate) fn assign_expr(&self, target: &'a Expr<'a>, value: &'a Expr<'a>) -> &'a Expr<'a> {
        self.arena.alloc(Expr::Assign(self.assign(target, value)))
    }
}

/// Metadata, options and diagnostics for one lowering run.
pub(crate) struct Harness {
    pub(crate) metadata: MetadataRegistry,
    pub(crate) options: LoweringOptions,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) enclosing: &'static str,
    pub(crate) in_constructor: bool,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self {
            metadata: MetadataRegistry::new(),
            options: LoweringOptions::default(),
            diagnostics: Diagnostics::new(),
            enclosing: "C",
            in_constructor: false,
        }
    }

    /// Treat the given types as mutable value types with a `to_<Name>` tag.
    pub(crate) fn mutable(mut self, names: &[&str]) -> Self {
        for name in names {
            self.metadata
                .register_type(name, TypeSemantics::mutable(format!("to_{name}")));
        }
        self
    }

    pub(crate) fn lower<'ast>(&mut self, assign: &'ast AssignExpr<'ast>, usage: ValueUsage) -> LoweredAssignment {
        let mut temps = TemporaryAllocator::for_options(&self.options);
        let enclosing = if self.in_constructor {
            EnclosingMember::constructor(TypeRef::new(self.enclosing))
        } else {
            EnclosingMember::method(TypeRef::new(self.enclosing))
        };
        let mut ctx = LoweringContext::new(
            &self.metadata,
            &mut temps,
            &mut self.diagnostics,
            &self.options,
            enclosing,
        );
        lower_assignment(assign, usage, &mut ctx)
    }

    /// Lower in statement context and print the statements.
    pub(crate) fn statements<'ast>(&mut self, assign: &'ast AssignExpr<'ast>) -> String {
        let lowered = self.lower(assign, ValueUsage::Discarded);
        assert!(self.diagnostics.is_empty(), "unexpected diagnostics: {}", self.diagnostics);
        render_statements(&lowered.statements)
    }
}
