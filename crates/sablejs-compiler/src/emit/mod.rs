//! Script shapes for loads and stores.
//!
//! Given a classified [`Lvalue`] and its already-evaluated operands, the
//! emitter builds the output expression that reads or writes it:
//!
//! - fields and native targets: `recv.name = v`, `recv[i] = v`, `cell.$ = v`
//! - accessor methods: `recv.set_X(args..., v)`, or
//!   `$CallBase({Base}, 'set_X', [], [this, args..., v])` for `base` access
//! - inline code: template substitution
//! - multi-dimensional arrays: `$MultidimArraySet(arr, i..., v)`
//! - `this` of a value type: `$ShallowCopy(v, this)`
//!
//! The emitter never evaluates anything; ordering and cloning are decided by
//! the planner before operands reach it.

pub mod inline_code;

use sablejs_core::LoweringError;
use sablejs_core::ast::TypeRef;
use sablejs_core::js::JsExpr;

use crate::lvalue::{Dispatch, Implementation, Lvalue, LvalueKind};
use crate::options::LoweringOptions;

type Result<T> = std::result::Result<T, LoweringError>;

/// Evaluated addressing operands of an lvalue.
#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    /// Receiver, array or dynamic object; `None` for locals, static
    /// members and `base` access.
    pub object: Option<JsExpr>,
    /// Index arguments in declared order.
    pub args: Vec<JsExpr>,
}

/// The object a member is reached through.
pub fn object_of(lvalue: &Lvalue<'_>, address: &Address) -> JsExpr {
    match (&address.object, lvalue.static_owner) {
        (Some(object), _) => object.clone(),
        (None, Some(owner)) => JsExpr::type_handle(owner.name),
        (None, None) => JsExpr::This,
    }
}

/// The natively assignable expression denoting the target.
pub fn native_target(lvalue: &Lvalue<'_>, address: &Address, options: &LoweringOptions) -> Result<JsExpr> {
    match (&lvalue.kind, &lvalue.implementation) {
        (LvalueKind::Local { name }, _) => Ok(JsExpr::ident(*name)),
        (LvalueKind::RefLocal { name }, _) => Ok(JsExpr::member(JsExpr::ident(*name), options.by_ref_field())),
        (LvalueKind::DynamicMember { name }, _) => Ok(JsExpr::member(object_of(lvalue, address), *name)),
        (_, Implementation::Field { name }) => Ok(JsExpr::member(object_of(lvalue, address), name.as_str())),
        (LvalueKind::NativeArrayElement | LvalueKind::DynamicIndexer, _) | (_, Implementation::NativeIndexer) => {
            subscript(lvalue, address)
        }
        _ => Err(LoweringError::internal(
            format!("{:?} target is not natively assignable", lvalue.kind),
            lvalue.span,
        )),
    }
}

fn subscript(lvalue: &Lvalue<'_>, address: &Address) -> Result<JsExpr> {
    match address.args.as_slice() {
        [index] => Ok(JsExpr::index(object_of(lvalue, address), index.clone())),
        args => Err(LoweringError::internal(
            format!("native subscript needs exactly one index, got {}", args.len()),
            lvalue.span,
        )),
    }
}

/// Store `value` into the target.
pub fn emit_store(lvalue: &Lvalue<'_>, address: &Address, value: JsExpr, options: &LoweringOptions) -> Result<JsExpr> {
    match lvalue.kind {
        LvalueKind::ThisOfValueType => Ok(JsExpr::invoke(
            JsExpr::ident(options.shallow_copy_intrinsic()),
            vec![value, JsExpr::This],
        )),
        LvalueKind::MultiDimArrayElement => {
            let mut args = multidim_args(lvalue, address);
            args.push(value);
            Ok(JsExpr::invoke(JsExpr::ident(options.multidim_set_intrinsic()), args))
        }
        _ => match lvalue.setter() {
            Some(setter) => accessor_call(setter, lvalue, address, Some(value), options),
            None => Ok(JsExpr::assign(native_target(lvalue, address, options)?, value)),
        },
    }
}

/// Read the current value of the target.
pub fn emit_load(lvalue: &Lvalue<'_>, address: &Address, options: &LoweringOptions) -> Result<JsExpr> {
    match lvalue.kind {
        LvalueKind::ThisOfValueType => Ok(JsExpr::This),
        LvalueKind::MultiDimArrayElement => Ok(JsExpr::invoke(
            JsExpr::ident(options.multidim_get_intrinsic()),
            multidim_args(lvalue, address),
        )),
        _ => match lvalue.getter() {
            Some(getter) => accessor_call(getter, lvalue, address, None, options),
            None => native_target(lvalue, address, options),
        },
    }
}

fn multidim_args(lvalue: &Lvalue<'_>, address: &Address) -> Vec<JsExpr> {
    let mut args = Vec::with_capacity(address.args.len() + 2);
    args.push(object_of(lvalue, address));
    args.extend(address.args.iter().cloned());
    args
}

/// `$CallBase({Type}, 'name', [], [this, args...])`
pub fn call_base(declaring_type: TypeRef<'_>, name: &str, args: Vec<JsExpr>, options: &LoweringOptions) -> JsExpr {
    let mut call_args = Vec::with_capacity(args.len() + 1);
    call_args.push(JsExpr::This);
    call_args.extend(args);
    JsExpr::invoke(
        JsExpr::ident(options.call_base_intrinsic()),
        vec![
            JsExpr::type_handle(declaring_type.name),
            JsExpr::string(name),
            JsExpr::Array(Vec::new()),
            JsExpr::Array(call_args),
        ],
    )
}

fn accessor_call(
    accessor: &sablejs_core::AccessorImpl,
    lvalue: &Lvalue<'_>,
    address: &Address,
    value: Option<JsExpr>,
    options: &LoweringOptions,
) -> Result<JsExpr> {
    use sablejs_core::AccessorImpl;

    match accessor {
        AccessorImpl::Method { name } => {
            let mut args = address.args.clone();
            args.extend(value);
            Ok(match lvalue.dispatch {
                Dispatch::NonVirtual { declaring_type } => call_base(declaring_type, name, args, options),
                Dispatch::Virtual => JsExpr::call_method(object_of(lvalue, address), name.as_str(), args),
            })
        }
        AccessorImpl::InlineCode { template } => {
            let this = object_of(lvalue, address);
            let text = inline_code::substitute(template, lvalue.span, |placeholder| match placeholder {
                "this" => Some(&this),
                "value" => value.as_ref(),
                name => lvalue
                    .param_names
                    .iter()
                    .position(|p| *p == name)
                    .or_else(|| name.parse::<usize>().ok())
                    .and_then(|i| address.args.get(i)),
            })?;
            Ok(JsExpr::Verbatim(text))
        }
        AccessorImpl::NativeIndexer => {
            let target = subscript(lvalue, address)?;
            Ok(match value {
                Some(value) => JsExpr::assign(target, value),
                None => target,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lvalue::IndexArg;
    use sablejs_core::{AccessorImpl, ErrorCode, Span};

    fn lvalue(kind: LvalueKind<'static>, implementation: Implementation) -> Lvalue<'static> {
        Lvalue {
            kind,
            receiver: None,
            static_owner: None,
            args: Vec::<IndexArg<'static>>::new(),
            param_names: Vec::new(),
            implementation,
            dispatch: Dispatch::Virtual,
            ty: TypeRef::new("Int32"),
            span: Span::default(),
        }
    }

    fn address(object: Option<JsExpr>, args: Vec<JsExpr>) -> Address {
        Address { object, args }
    }

    #[test]
    fn static_field_store_uses_type_handle() {
        let mut lv = lvalue(LvalueKind::StaticField, Implementation::Field { name: "$F".into() });
        lv.static_owner = Some(TypeRef::new("C"));
        let store = emit_store(&lv, &address(None, vec![]), JsExpr::ident("$i"), &LoweringOptions::default()).unwrap();
        assert_eq!(store.to_string(), "{C}.$F = $i");
    }

    #[test]
    fn by_ref_cell_store() {
        let lv = lvalue(LvalueKind::RefLocal { name: "$i" }, Implementation::Native);
        let store = emit_store(&lv, &address(None, vec![]), JsExpr::number(1.0), &LoweringOptions::default()).unwrap();
        assert_eq!(store.to_string(), "$i.$ = 1");
    }

    #[test]
    fn setter_and_getter_methods() {
        let lv = lvalue(
            LvalueKind::InstanceIndexer,
            Implementation::Accessors {
                getter: AccessorImpl::method("get_$Item"),
                setter: AccessorImpl::method("set_$Item"),
            },
        );
        let addr = address(Some(JsExpr::This), vec![JsExpr::ident("$i"), JsExpr::ident("$j")]);
        let options = LoweringOptions::default();
        let store = emit_store(&lv, &addr, JsExpr::ident("$k"), &options).unwrap();
        assert_eq!(store.to_string(), "this.set_$Item($i, $j, $k)");
        let load = emit_load(&lv, &addr, &options).unwrap();
        assert_eq!(load.to_string(), "this.get_$Item($i, $j)");
    }

    #[test]
    fn non_virtual_setter_goes_through_call_base() {
        let mut lv = lvalue(LvalueKind::InstanceProperty, Implementation::Accessors {
            getter: AccessorImpl::method("get_$P"),
            setter: AccessorImpl::method("set_$P"),
        });
        lv.dispatch = Dispatch::NonVirtual {
            declaring_type: TypeRef::new("B"),
        };
        let store = emit_store(&lv, &address(None, vec![]), JsExpr::number(10.0), &LoweringOptions::default()).unwrap();
        assert_eq!(store.to_string(), "$CallBase({B}, 'set_$P', [], [this, 10])");
    }

    #[test]
    fn inline_setter_substitutes_parameters() {
        let mut lv = lvalue(
            LvalueKind::InstanceIndexer,
            Implementation::Accessors {
                getter: AccessorImpl::inline("get_({this})._({x})"),
                setter: AccessorImpl::inline("set_({this})._({x})._({value})"),
            },
        );
        lv.param_names = vec!["x"];
        let addr = address(Some(JsExpr::This), vec![JsExpr::ident("$i")]);
        let store = emit_store(&lv, &addr, JsExpr::ident("$k"), &LoweringOptions::default()).unwrap();
        assert_eq!(store.to_string(), "set_(this)._($i)._($k)");
    }

    #[test]
    fn multidim_intrinsics() {
        let lv = lvalue(LvalueKind::MultiDimArrayElement, Implementation::Native);
        let addr = address(Some(JsExpr::ident("$arr")), vec![JsExpr::ident("$i"), JsExpr::ident("$j")]);
        let options = LoweringOptions::default();
        let store = emit_store(&lv, &addr, JsExpr::ident("$k"), &options).unwrap();
        assert_eq!(store.to_string(), "$MultidimArraySet($arr, $i, $j, $k)");
        let load = emit_load(&lv, &addr, &options).unwrap();
        assert_eq!(load.to_string(), "$MultidimArrayGet($arr, $i, $j)");
    }

    #[test]
    fn receiver_store_is_shallow_copy() {
        let lv = lvalue(LvalueKind::ThisOfValueType, Implementation::Native);
        let store = emit_store(&lv, &address(None, vec![]), JsExpr::ident("$o"), &LoweringOptions::default()).unwrap();
        assert_eq!(store.to_string(), "$ShallowCopy($o, this)");
    }

    #[test]
    fn native_indexer_needs_one_index() {
        let lv = lvalue(LvalueKind::InstanceIndexer, Implementation::NativeIndexer);
        let addr = address(Some(JsExpr::This), vec![JsExpr::number(1.0), JsExpr::number(2.0)]);
        let err = emit_store(&lv, &addr, JsExpr::Null, &LoweringOptions::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Internal);
    }
}
