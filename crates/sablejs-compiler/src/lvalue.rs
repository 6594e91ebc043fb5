//! Assignment target classification.
//!
//! [`classify`] turns a resolved target expression into an [`Lvalue`]: what
//! kind of storage is written, which operands address it, and how the
//! metadata store says it is implemented in script. Classification is pure;
//! nothing is lowered here.
//!
//! Indexer arguments are reordered from call-site order into declared
//! parameter order, with omitted optional parameters filled in from their
//! declared defaults. Each supplied argument remembers its call-site position
//! so the planner can still evaluate operands left to right.

use sablejs_core::ast::{
    Argument, DynamicAccess, Expr, IndexerExpr, IndexerTarget, PropertySymbol, Receiver, TypeRef,
};
use sablejs_core::{AccessorImpl, LoweringError, PropertyImpl, Span, TypeSemantics};

use crate::context::LoweringContext;

type Result<T> = std::result::Result<T, LoweringError>;

/// What kind of storage an assignment writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LvalueKind<'ast> {
    /// Plain local variable.
    Local { name: &'ast str },
    /// By-reference parameter, stored in a cell (`name.$`).
    RefLocal { name: &'ast str },
    InstanceField,
    StaticField,
    InstanceProperty,
    StaticProperty,
    InstanceIndexer,
    /// Rank-1 array element.
    NativeArrayElement,
    /// Element of an array with rank > 1.
    MultiDimArrayElement,
    DynamicMember { name: &'ast str },
    DynamicIndexer,
    /// `this` of a value type.
    ThisOfValueType,
}

/// How the target is implemented in script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Implementation {
    /// Addressed directly by the output language.
    Native,
    /// Stored in a script field.
    Field { name: String },
    /// Getter/setter pair.
    Accessors { getter: AccessorImpl, setter: AccessorImpl },
    /// Native subscript on the receiver.
    NativeIndexer,
}

/// Member dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch<'ast> {
    /// Dispatch on the runtime type of the receiver.
    Virtual,
    /// `base.Member`: bind to the implementation in `declaring_type`.
    NonVirtual { declaring_type: TypeRef<'ast> },
}

/// An index argument in declared-parameter order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndexArg<'ast> {
    /// Supplied at the call site.
    Supplied {
        expr: &'ast Expr<'ast>,
        /// Position among the supplied arguments at the call site.
        position: usize,
        /// Declared parameter type.
        ty: TypeRef<'ast>,
    },
    /// Omitted optional parameter.
    Default { expr: &'ast Expr<'ast>, ty: TypeRef<'ast> },
}

impl<'ast> IndexArg<'ast> {
    pub fn expr(&self) -> &'ast Expr<'ast> {
        match self {
            IndexArg::Supplied { expr, .. } | IndexArg::Default { expr, .. } => *expr,
        }
    }

    pub fn ty(&self) -> TypeRef<'ast> {
        match self {
            IndexArg::Supplied { ty, .. } | IndexArg::Default { ty, .. } => *ty,
        }
    }
}

/// A classified assignment target.
#[derive(Debug, Clone, PartialEq)]
pub struct Lvalue<'ast> {
    pub kind: LvalueKind<'ast>,
    /// Object operand: instance receiver, array, or dynamic receiver.
    pub receiver: Option<&'ast Expr<'ast>>,
    /// Declaring type of a static member.
    pub static_owner: Option<TypeRef<'ast>>,
    /// Index arguments in declared order.
    pub args: Vec<IndexArg<'ast>>,
    /// Declared parameter names, for inline-code placeholders.
    pub param_names: Vec<&'ast str>,
    pub implementation: Implementation,
    pub dispatch: Dispatch<'ast>,
    /// Type of the stored value.
    pub ty: TypeRef<'ast>,
    pub span: Span,
}

impl<'ast> Lvalue<'ast> {
    fn new(kind: LvalueKind<'ast>, ty: TypeRef<'ast>, span: Span) -> Self {
        Self {
            kind,
            receiver: None,
            static_owner: None,
            args: Vec::new(),
            param_names: Vec::new(),
            implementation: Implementation::Native,
            dispatch: Dispatch::Virtual,
            ty,
            span,
        }
    }

    fn with_receiver(mut self, receiver: Receiver<'ast>) -> Self {
        match receiver {
            Receiver::Instance(expr) => self.receiver = Some(expr),
            Receiver::Static(owner) => self.static_owner = Some(owner),
            Receiver::Base(declaring_type) => self.dispatch = Dispatch::NonVirtual { declaring_type },
        }
        self
    }

    /// Whether the output language can assign the target with `=`.
    pub fn is_natively_assignable(&self) -> bool {
        match self.kind {
            LvalueKind::MultiDimArrayElement | LvalueKind::ThisOfValueType => false,
            _ => !matches!(self.implementation, Implementation::Accessors { .. }),
        }
    }

    pub fn getter(&self) -> Option<&AccessorImpl> {
        match &self.implementation {
            Implementation::Accessors { getter, .. } => Some(getter),
            _ => None,
        }
    }

    pub fn setter(&self) -> Option<&AccessorImpl> {
        match &self.implementation {
            Implementation::Accessors { setter, .. } => Some(setter),
            _ => None,
        }
    }

    /// Whether reading the target calls a script method, so the value read
    /// is a new instance.
    pub fn load_is_fresh(&self) -> bool {
        matches!(
            self.getter(),
            Some(AccessorImpl::Method { .. } | AccessorImpl::InlineCode { .. })
        )
    }

    /// Declared indices of the supplied arguments, in call-site order.
    pub fn call_site_order(&self) -> Vec<usize> {
        let mut supplied: Vec<(usize, usize)> = self
            .args
            .iter()
            .enumerate()
            .filter_map(|(declared, arg)| match arg {
                IndexArg::Supplied { position, .. } => Some((*position, declared)),
                IndexArg::Default { .. } => None,
            })
            .collect();
        supplied.sort_unstable();
        supplied.into_iter().map(|(_, declared)| declared).collect()
    }

    /// Operands addressing the target, in evaluation order: the receiver
    /// followed by the supplied arguments in call-site order.
    pub fn operands(&self) -> Vec<&'ast Expr<'ast>> {
        self.receiver
            .into_iter()
            .chain(self.call_site_order().into_iter().map(|i| self.args[i].expr()))
            .collect()
    }
}

/// Classify an assignment target.
pub fn classify<'ast>(target: &'ast Expr<'ast>, ctx: &LoweringContext<'_>) -> Result<Lvalue<'ast>> {
    let metadata = ctx.metadata();
    let span = target.span();
    match target {
        Expr::Local(local) => {
            let name = local.local.name;
            let kind = if local.local.is_by_ref() {
                LvalueKind::RefLocal { name }
            } else {
                LvalueKind::Local { name }
            };
            Ok(Lvalue::new(kind, local.local.ty, span))
        }

        Expr::Field(field) => {
            let kind = match field.receiver {
                Receiver::Static(_) => LvalueKind::StaticField,
                _ => LvalueKind::InstanceField,
            };
            let mut lvalue = Lvalue::new(kind, field.field.ty, span).with_receiver(field.receiver);
            lvalue.implementation = Implementation::Field {
                name: metadata.field_name(field.field),
            };
            Ok(lvalue)
        }

        Expr::Property(property) => {
            let kind = match property.receiver {
                Receiver::Static(_) => LvalueKind::StaticProperty,
                _ => LvalueKind::InstanceProperty,
            };
            let mut lvalue = Lvalue::new(kind, property.property.ty, span).with_receiver(property.receiver);
            lvalue.implementation = implementation_of(
                metadata.property_semantics(property.property),
                property.property,
                span,
            )?;
            if lvalue.implementation == Implementation::NativeIndexer {
                return Err(LoweringError::internal(
                    format!("property {} is not an indexer", property.property.qualified_name()),
                    span,
                ));
            }
            Ok(lvalue)
        }

        Expr::Indexer(indexer) => classify_indexer(indexer, ctx),

        Expr::ArrayElement(element) => {
            let kind = match element.indices.len() {
                0 => return Err(LoweringError::internal("array access without indices", span)),
                1 => LvalueKind::NativeArrayElement,
                _ => LvalueKind::MultiDimArrayElement,
            };
            let mut lvalue = Lvalue::new(kind, element.ty, span);
            lvalue.receiver = Some(element.array);
            lvalue.args = supplied_in_order(element.indices.iter().copied());
            Ok(lvalue)
        }

        Expr::Dynamic(dynamic) => {
            let ty = TypeRef::dynamic();
            let mut lvalue = match dynamic.access {
                DynamicAccess::Member(name) => Lvalue::new(LvalueKind::DynamicMember { name }, ty, span),
                DynamicAccess::Index(args) => {
                    reject_named_arguments(args, span)?;
                    if args.len() != 1 {
                        return Err(LoweringError::DynamicIndexerArityUnsupported {
                            count: args.len(),
                            span,
                        });
                    }
                    let mut lvalue = Lvalue::new(LvalueKind::DynamicIndexer, ty, span);
                    lvalue.args = supplied_in_order(args.iter().map(|a| a.value));
                    lvalue
                }
            };
            lvalue.receiver = Some(dynamic.receiver);
            Ok(lvalue)
        }

        Expr::This(this) => {
            let enclosing = ctx.enclosing();
            match metadata.type_semantics(enclosing.ty) {
                TypeSemantics::MutableValueType { .. } => Ok(Lvalue::new(LvalueKind::ThisOfValueType, this.ty, span)),
                TypeSemantics::ImmutableValueType if enclosing.is_constructor => {
                    Ok(Lvalue::new(LvalueKind::ThisOfValueType, this.ty, span))
                }
                TypeSemantics::ImmutableValueType => Err(LoweringError::AssignmentToImmutableReceiver {
                    type_name: enclosing.ty.name.to_string(),
                    span,
                }),
                TypeSemantics::ReferenceType => Err(LoweringError::InvalidAssignmentToReceiver {
                    type_name: enclosing.ty.name.to_string(),
                    span,
                }),
            }
        }

        Expr::Literal(_) | Expr::Default(_) | Expr::Call(_) | Expr::Binary(_) | Expr::Assign(_) => {
            Err(LoweringError::internal("expression is not assignable", span))
        }
    }
}

fn classify_indexer<'ast>(indexer: &'ast IndexerExpr<'ast>, ctx: &LoweringContext<'_>) -> Result<Lvalue<'ast>> {
    let metadata = ctx.metadata();
    let span = indexer.span;
    let mut lvalue = Lvalue::new(LvalueKind::InstanceIndexer, indexer.ty, span).with_receiver(indexer.receiver);

    match indexer.target {
        IndexerTarget::Resolved(property) => {
            lvalue.implementation = implementation_of(metadata.property_semantics(property), property, span)?;
            lvalue.args = reorder_arguments(property, indexer.args, span)?;
            lvalue.param_names = property.params.iter().map(|p| p.name).collect();
        }
        IndexerTarget::Dynamic(candidates) => {
            reject_named_arguments(indexer.args, span)?;
            let Some((first, rest)) = candidates.split_first() else {
                return Err(LoweringError::internal("dynamic indexer access without candidates", span));
            };
            let implementation = metadata.property_semantics(first);
            if rest
                .iter()
                .any(|candidate| metadata.property_semantics(candidate) != implementation)
            {
                return Err(LoweringError::AmbiguousDynamicDispatchImplementation {
                    owner: first.declaring_type.name.to_string(),
                    span,
                });
            }
            lvalue.implementation = implementation_of(implementation, first, span)?;
            lvalue.args = supplied_in_order(indexer.args.iter().map(|a| a.value));
            lvalue.param_names = first.params.iter().map(|p| p.name).collect();
        }
    }
    Ok(lvalue)
}

fn implementation_of(implementation: PropertyImpl, property: &PropertySymbol<'_>, span: Span) -> Result<Implementation> {
    match implementation.normalized() {
        PropertyImpl::Field { name } => Ok(Implementation::Field { name }),
        PropertyImpl::Accessors { getter, setter } => Ok(Implementation::Accessors { getter, setter }),
        PropertyImpl::NativeIndexer => Ok(Implementation::NativeIndexer),
        PropertyImpl::NotUsableFromScript => Err(LoweringError::MemberNotUsableFromScript {
            member: property.qualified_name(),
            span,
        }),
    }
}

fn reject_named_arguments(args: &[Argument<'_>], span: Span) -> Result<()> {
    if args.iter().any(|a| a.name.is_some()) {
        return Err(LoweringError::DynamicIndexerNamedArgumentsUnsupported { span });
    }
    Ok(())
}

fn supplied_in_order<'ast>(exprs: impl Iterator<Item = &'ast Expr<'ast>>) -> Vec<IndexArg<'ast>> {
    exprs
        .enumerate()
        .map(|(position, expr)| IndexArg::Supplied {
            expr,
            position,
            ty: expr.ty(),
        })
        .collect()
}

/// Map call-site arguments onto declared parameters.
///
/// Positional arguments fill parameters from the left; named arguments go to
/// the parameter with that name. Remaining parameters take their default.
pub fn reorder_arguments<'ast>(
    property: &PropertySymbol<'ast>,
    args: &'ast [Argument<'ast>],
    span: Span,
) -> Result<Vec<IndexArg<'ast>>> {
    let params = property.params;
    let mut slots: Vec<Option<IndexArg<'ast>>> = vec![None; params.len()];
    let mut next_positional = 0;

    for (position, arg) in args.iter().enumerate() {
        let declared = match arg.name {
            None => {
                next_positional += 1;
                next_positional - 1
            }
            Some(name) => params.iter().position(|p| p.name == name).ok_or_else(|| {
                LoweringError::internal(
                    format!("no parameter named '{name}' on {}", property.qualified_name()),
                    arg.span,
                )
            })?,
        };
        let Some(slot) = slots.get_mut(declared) else {
            return Err(LoweringError::internal(
                format!("too many arguments for {}", property.qualified_name()),
                arg.span,
            ));
        };
        if slot.is_some() {
            return Err(LoweringError::internal(
                format!("parameter '{}' supplied twice", params[declared].name),
                arg.span,
            ));
        }
        *slot = Some(IndexArg::Supplied {
            expr: arg.value,
            position,
            ty: params[declared].ty,
        });
    }

    slots
        .into_iter()
        .zip(params)
        .map(|(slot, param)| match (slot, param.default) {
            (Some(arg), _) => Ok(arg),
            (None, Some(expr)) => Ok(IndexArg::Default { expr, ty: param.ty }),
            (None, None) => Err(LoweringError::internal(
                format!("missing argument for required parameter '{}'", param.name),
                span,
            )),
        })
        .collect()
}
