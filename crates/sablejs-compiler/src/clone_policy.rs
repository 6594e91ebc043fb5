//! When stored values must be copied.
//!
//! A mutable value type must never end up shared between two storage
//! locations. A value is copied with the clone intrinsic when it is stored
//! into a mutable-value-typed slot, unless it is a fresh instance (call
//! result, literal, default value, operator result) consumed exactly once.

use sablejs_core::js::JsExpr;
use sablejs_core::{ConversionTag, TypeSemantics};

use crate::options::LoweringOptions;

/// The conversion tag of types whose values must be copied on store.
pub fn requires_clone(semantics: &TypeSemantics) -> Option<&ConversionTag> {
    match semantics {
        TypeSemantics::MutableValueType { conversion_tag } => Some(conversion_tag),
        TypeSemantics::ReferenceType | TypeSemantics::ImmutableValueType => None,
    }
}

/// The tag to clone with when storing a value `uses` times.
pub fn clone_for_store(semantics: &TypeSemantics, fresh: bool, uses: usize) -> Option<&ConversionTag> {
    requires_clone(semantics).filter(|_| !(fresh && uses == 1))
}

/// `$Clone(value, {tag})`
pub fn wrap_clone(value: JsExpr, tag: &ConversionTag, options: &LoweringOptions) -> JsExpr {
    JsExpr::invoke(
        JsExpr::ident(options.clone_intrinsic()),
        vec![value, JsExpr::type_handle(tag.as_str())],
    )
}
