//! How types and members are represented in script.
//!
//! The lowering engine never decides naming or implementation strategy
//! itself. It asks a [`ScriptMetadata`] implementation:
//!
//! - whether a type is a reference type or a (mutable/immutable) value type,
//! - how a property or indexer is implemented (field, accessor pair, native
//!   subscript, inline code, or not usable at all),
//! - the script name of fields and methods.
//!
//! [`MetadataRegistry`] is the standard implementation: explicit
//! registrations backed by `FxHashMap`, falling back to naming defaults for
//! anything not registered.

use rustc_hash::FxHashMap;

use crate::SymbolHash;
use crate::ast::{FieldSymbol, MethodSymbol, PropertySymbol, TypeRef};

// ============================================================================
// Semantics
// ============================================================================

/// Identifies the conversion passed to the clone intrinsic of a mutable value
/// type (`$Clone(v, {to_Int32})`). The tag is printed as a type handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversionTag(pub String);

impl ConversionTag {
    /// Create a tag.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The tag name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Copy semantics of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSemantics {
    /// Instances are shared by reference.
    ReferenceType,
    /// Value type whose instances never change after construction; sharing is
    /// safe so no copy is made.
    ImmutableValueType,
    /// Value type whose instances can change; every store needs its own copy.
    MutableValueType { conversion_tag: ConversionTag },
}

impl TypeSemantics {
    /// Shorthand for a mutable value type.
    pub fn mutable(conversion_tag: impl Into<String>) -> Self {
        TypeSemantics::MutableValueType {
            conversion_tag: ConversionTag::new(conversion_tag),
        }
    }

    /// Whether the type has value semantics.
    pub fn is_value_type(&self) -> bool {
        !matches!(self, TypeSemantics::ReferenceType)
    }
}

/// How one accessor of a property is implemented.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccessorImpl {
    /// Ordinary method call: `recv.name(args...)`.
    Method { name: String },
    /// Literal script template with `{placeholder}` substitution.
    InlineCode { template: String },
    /// Native subscript: `recv[arg]`.
    NativeIndexer,
}

impl AccessorImpl {
    /// Shorthand for a method accessor.
    pub fn method(name: impl Into<String>) -> Self {
        AccessorImpl::Method { name: name.into() }
    }

    /// Shorthand for an inline-code accessor.
    pub fn inline(template: impl Into<String>) -> Self {
        AccessorImpl::InlineCode {
            template: template.into(),
        }
    }
}

/// How a property or indexer is implemented in script.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyImpl {
    /// Stored directly in a script field.
    Field { name: String },
    /// Getter/setter pair.
    Accessors { getter: AccessorImpl, setter: AccessorImpl },
    /// Native subscript on the receiver (indexers only).
    NativeIndexer,
    /// Has no script representation.
    NotUsableFromScript,
}

impl PropertyImpl {
    /// Shorthand for a getter/setter method pair.
    pub fn accessors(getter: impl Into<String>, setter: impl Into<String>) -> Self {
        PropertyImpl::Accessors {
            getter: AccessorImpl::method(getter),
            setter: AccessorImpl::method(setter),
        }
    }

    /// Collapse an accessor pair whose halves are both native subscripts.
    pub fn normalized(self) -> Self {
        match self {
            PropertyImpl::Accessors {
                getter: AccessorImpl::NativeIndexer,
                setter: AccessorImpl::NativeIndexer,
            } => PropertyImpl::NativeIndexer,
            other => other,
        }
    }
}

/// How a method is implemented in script.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodImpl {
    /// Ordinary method with a script name.
    Normal { name: String },
    /// Literal script template.
    InlineCode { template: String },
    /// Has no script representation.
    NotUsableFromScript,
}

/// Read-only lookup of script representations.
pub trait ScriptMetadata {
    /// Copy semantics of a type.
    fn type_semantics(&self, ty: TypeRef<'_>) -> TypeSemantics;

    /// Implementation of a property or indexer.
    fn property_semantics(&self, property: &PropertySymbol<'_>) -> PropertyImpl;

    /// Script name of a field.
    fn field_name(&self, field: &FieldSymbol<'_>) -> String;

    /// Implementation of a method.
    fn method_semantics(&self, method: &MethodSymbol<'_>) -> MethodImpl;
}

// ============================================================================
// Registry
// ============================================================================

/// Naming defaults applied to members without an explicit registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingDefaults {
    /// Prefix of field and method script names.
    pub member_prefix: String,
    /// Prefix of getter names (`get_` + prefix + name).
    pub getter_prefix: String,
    /// Prefix of setter names.
    pub setter_prefix: String,
}

impl Default for NamingDefaults {
    fn default() -> Self {
        Self {
            member_prefix: "$".to_string(),
            getter_prefix: "get_".to_string(),
            setter_prefix: "set_".to_string(),
        }
    }
}

/// `FxHashMap`-backed [`ScriptMetadata`].
///
/// Unregistered types are reference types. Unregistered properties and
/// indexers use a `get_$Name`/`set_$Name` method pair, fields and methods
/// use `$Name`.
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    types: FxHashMap<SymbolHash, TypeSemantics>,
    properties: FxHashMap<SymbolHash, PropertyImpl>,
    fields: FxHashMap<SymbolHash, String>,
    methods: FxHashMap<SymbolHash, MethodImpl>,
    naming: NamingDefaults,
}

impl MetadataRegistry {
    /// Create an empty registry with default naming.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the naming defaults.
    pub fn with_naming(mut self, naming: NamingDefaults) -> Self {
        self.naming = naming;
        self
    }

    /// Register the semantics of a type by name.
    pub fn register_type(&mut self, name: &str, semantics: TypeSemantics) {
        self.types.insert(SymbolHash::from_name(name), semantics);
    }

    /// Register the implementation of a property or indexer.
    pub fn register_property(&mut self, property: &PropertySymbol<'_>, implementation: PropertyImpl) {
        self.properties.insert(property.hash(), implementation.normalized());
    }

    /// Register the script name of a field.
    pub fn register_field(&mut self, field: &FieldSymbol<'_>, script_name: impl Into<String>) {
        self.fields.insert(field.hash(), script_name.into());
    }

    /// Register the implementation of a method.
    pub fn register_method(&mut self, method: &MethodSymbol<'_>, implementation: MethodImpl) {
        self.methods.insert(method.hash(), implementation);
    }

    fn default_member_name(&self, name: &str) -> String {
        format!("{}{}", self.naming.member_prefix, name)
    }
}

impl ScriptMetadata for MetadataRegistry {
    fn type_semantics(&self, ty: TypeRef<'_>) -> TypeSemantics {
        self.types
            .get(&ty.hash)
            .cloned()
            .unwrap_or(TypeSemantics::ReferenceType)
    }

    fn property_semantics(&self, property: &PropertySymbol<'_>) -> PropertyImpl {
        if let Some(registered) = self.properties.get(&property.hash()) {
            return registered.clone();
        }
        let name = self.default_member_name(property.name);
        PropertyImpl::accessors(
            format!("{}{}", self.naming.getter_prefix, name),
            format!("{}{}", self.naming.setter_prefix, name),
        )
    }

    fn field_name(&self, field: &FieldSymbol<'_>) -> String {
        self.fields
            .get(&field.hash())
            .cloned()
            .unwrap_or_else(|| self.default_member_name(field.name))
    }

    fn method_semantics(&self, method: &MethodSymbol<'_>) -> MethodImpl {
        self.methods
            .get(&method.hash())
            .cloned()
            .unwrap_or_else(|| MethodImpl::Normal {
                name: self.default_member_name(method.name),
            })
    }
}
