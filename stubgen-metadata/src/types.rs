//! Catalogue type definitions.
//!
//! This module contains the data structures describing the types of a
//! compiled module: the catalogue itself, type definitions, generic
//! parameters and enum constants.

use crate::members::{ConstructorDef, EventDef, FieldDef, MethodDef, PropertyDef};
use crate::typeref::{SYSTEM_NAMESPACE, TypeRef};
use bitflags::bitflags;
use std::collections::HashMap;

/// Complete type catalogue of one module.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Module the catalogue was read from.
    pub module: String,
    /// Type definitions in declaration order.
    pub types: Vec<TypeDef>,
    /// Lookup by fully-qualified name.
    type_map: HashMap<String, usize>,
}

impl Catalog {
    /// Creates a new empty catalogue.
    #[must_use]
    pub fn new(module: String) -> Self {
        Self {
            module,
            types: Vec::new(),
            type_map: HashMap::new(),
        }
    }

    /// Adds a type definition to the catalogue.
    ///
    /// A later definition with the same full name shadows the earlier one for
    /// lookups; validation reports the duplicate.
    pub fn add_type(&mut self, type_def: TypeDef) {
        let index = self.types.len();
        self.type_map.insert(type_def.full_name(), index);
        self.types.push(type_def);
    }

    /// Looks up a type by fully-qualified metadata name.
    #[must_use]
    pub fn get_type(&self, full_name: &str) -> Option<&TypeDef> {
        self.type_map.get(full_name).map(|&idx| &self.types[idx])
    }
}

/// Declared shape of a type, before delegate detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeFlavor {
    /// Reference type (classes and delegates).
    Class,
    /// Interface.
    Interface,
    /// Non-enum value type.
    Struct,
    /// Enumeration.
    Enum,
    /// Anything else the metadata reader reported.
    Other(String),
}

impl TypeFlavor {
    /// Parses a flavor from its catalogue name.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "class" => Self::Class,
            "interface" => Self::Interface,
            "struct" | "valuetype" => Self::Struct,
            "enum" => Self::Enum,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Member or type accessibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Visible everywhere.
    #[default]
    Public,
    /// Visible within the assembly.
    Internal,
    /// Visible to derived types.
    Protected,
    /// Visible to derived types or within the assembly.
    ProtectedInternal,
    /// Visible to derived types within the assembly.
    PrivateProtected,
    /// Visible to the declaring type only.
    Private,
}

impl Visibility {
    /// Parses a visibility from its catalogue name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Self::Public),
            "internal" | "assembly" => Some(Self::Internal),
            "protected" | "family" => Some(Self::Protected),
            "protected internal" | "famorassem" => Some(Self::ProtectedInternal),
            "private protected" | "famandassem" => Some(Self::PrivateProtected),
            "private" => Some(Self::Private),
            _ => None,
        }
    }

    /// Returns true for public visibility.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }
}

/// Type definition.
#[derive(Debug, Clone)]
pub struct TypeDef {
    /// Metadata name (with arity suffix for generic definitions).
    pub name: String,
    /// Namespace, absent for the global namespace.
    pub namespace: Option<String>,
    /// Declared flavor.
    pub flavor: TypeFlavor,
    /// Accessibility.
    pub visibility: Visibility,
    /// Whether the type is nested inside another type.
    pub is_nested: bool,
    /// Whether this entry only describes a referenced type.
    pub is_external: bool,
    /// Base type.
    pub base_type: Option<TypeRef>,
    /// Directly declared interfaces.
    pub interfaces: Vec<TypeRef>,
    /// Type-level generic parameters.
    pub generic_params: Vec<GenericParam>,
    /// Declared methods.
    pub methods: Vec<MethodDef>,
    /// Declared properties and indexers.
    pub properties: Vec<PropertyDef>,
    /// Declared events.
    pub events: Vec<EventDef>,
    /// Declared fields.
    pub fields: Vec<FieldDef>,
    /// Declared constructors.
    pub constructors: Vec<ConstructorDef>,
    /// Enum storage type (enums only).
    pub underlying_type: Option<TypeRef>,
    /// Enum constants in declaration order (enums only).
    pub enum_values: Vec<EnumValue>,
}

impl TypeDef {
    /// Creates a new type definition.
    #[must_use]
    pub fn new(name: String, namespace: Option<String>, flavor: TypeFlavor) -> Self {
        Self {
            name,
            namespace,
            flavor,
            visibility: Visibility::Public,
            is_nested: false,
            is_external: false,
            base_type: None,
            interfaces: Vec::new(),
            generic_params: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            events: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
            underlying_type: None,
            enum_values: Vec::new(),
        }
    }

    /// Returns the fully-qualified metadata name.
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(ns) if !ns.is_empty() => format!("{}.{}", ns, self.name),
            _ => self.name.clone(),
        }
    }

    /// Returns the enum storage type, defaulting to `System.Int32`.
    #[must_use]
    pub fn enum_underlying_type(&self) -> TypeRef {
        self.underlying_type
            .clone()
            .unwrap_or_else(|| TypeRef::named(SYSTEM_NAMESPACE, "Int32"))
    }

    /// Finds a declared method by name.
    #[must_use]
    pub fn find_method(&self, name: &str) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Returns the public, instance, non-accessor methods in declaration order.
    ///
    /// The position of a method in this sequence is its declaration index.
    pub fn public_instance_methods(&self) -> impl Iterator<Item = &MethodDef> {
        self.methods
            .iter()
            .filter(|m| m.visibility.is_public() && !m.is_static && !m.is_special_name)
    }

    /// Returns the public instance properties in declaration order.
    pub fn public_instance_properties(&self) -> impl Iterator<Item = &PropertyDef> {
        self.properties
            .iter()
            .filter(|p| p.visibility.is_public() && !p.is_static)
    }

    /// Returns the public instance events in declaration order.
    pub fn public_instance_events(&self) -> impl Iterator<Item = &EventDef> {
        self.events
            .iter()
            .filter(|e| e.visibility.is_public() && !e.is_static)
    }

    /// Returns the public instance fields in declaration order.
    pub fn public_instance_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields
            .iter()
            .filter(|f| f.visibility.is_public() && !f.is_static)
    }

    /// Returns the public instance constructors in declaration order.
    pub fn public_constructors(&self) -> impl Iterator<Item = &ConstructorDef> {
        self.constructors
            .iter()
            .filter(|c| c.visibility.is_public() && !c.is_static)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Generic parameter variance and special constraints.
    pub struct GenericParamAttributes: u32 {
        /// The parameter is covariant (`out T`).
        const COVARIANT = 0x0001;
        /// The parameter is contravariant (`in T`).
        const CONTRAVARIANT = 0x0002;
        /// The parameter has a reference type constraint (`class`).
        const REFERENCE_TYPE_CONSTRAINT = 0x0004;
        /// The parameter has a value type constraint (`struct`).
        const NOT_NULLABLE_VALUE_TYPE_CONSTRAINT = 0x0008;
        /// The parameter has a constructor constraint (`new()`).
        const DEFAULT_CONSTRUCTOR_CONSTRAINT = 0x0010;
    }
}

/// Generic parameter of a type or method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericParam {
    /// Parameter name.
    pub name: String,
    /// Variance and special constraint flags.
    pub attributes: GenericParamAttributes,
    /// Explicit base-type and interface constraints.
    pub constraints: Vec<TypeRef>,
}

impl GenericParam {
    /// Creates an unconstrained generic parameter.
    #[must_use]
    pub fn new(name: String) -> Self {
        Self {
            name,
            attributes: GenericParamAttributes::empty(),
            constraints: Vec::new(),
        }
    }

    /// Adds an explicit constraint.
    pub fn add_constraint(&mut self, constraint: TypeRef) {
        self.constraints.push(constraint);
    }
}

/// Enum constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// Constant name.
    pub name: String,
    /// Raw numeric value.
    pub value: i128,
}

impl EnumValue {
    /// Creates a new enum constant.
    #[must_use]
    pub fn new(name: String, value: i128) -> Self {
        Self { name, value }
    }
}

/// Integral types an enum may be stored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegralType {
    /// Signed 8-bit integer.
    SByte,
    /// Unsigned 8-bit integer.
    Byte,
    /// Signed 16-bit integer.
    Int16,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 64-bit integer.
    UInt64,
}

impl IntegralType {
    /// Resolves an integral type from a type reference.
    #[must_use]
    pub fn from_type_ref(ty: &TypeRef) -> Option<Self> {
        let named = ty.as_named()?;
        if named.namespace.as_deref() != Some(SYSTEM_NAMESPACE) || !named.type_args.is_empty() {
            return None;
        }
        match named.name.as_str() {
            "SByte" => Some(Self::SByte),
            "Byte" => Some(Self::Byte),
            "Int16" => Some(Self::Int16),
            "UInt16" => Some(Self::UInt16),
            "Int32" => Some(Self::Int32),
            "UInt32" => Some(Self::UInt32),
            "Int64" => Some(Self::Int64),
            "UInt64" => Some(Self::UInt64),
            _ => None,
        }
    }

    /// Returns the smallest representable value.
    #[must_use]
    pub const fn min_value(&self) -> i128 {
        match self {
            Self::SByte => i8::MIN as i128,
            Self::Int16 => i16::MIN as i128,
            Self::Int32 => i32::MIN as i128,
            Self::Int64 => i64::MIN as i128,
            Self::Byte | Self::UInt16 | Self::UInt32 | Self::UInt64 => 0,
        }
    }

    /// Returns the largest representable value.
    #[must_use]
    pub const fn max_value(&self) -> i128 {
        match self {
            Self::SByte => i8::MAX as i128,
            Self::Byte => u8::MAX as i128,
            Self::Int16 => i16::MAX as i128,
            Self::UInt16 => u16::MAX as i128,
            Self::Int32 => i32::MAX as i128,
            Self::UInt32 => u32::MAX as i128,
            Self::Int64 => i64::MAX as i128,
            Self::UInt64 => u64::MAX as i128,
        }
    }

    /// Returns true if `value` fits this type.
    #[must_use]
    pub const fn contains(&self, value: i128) -> bool {
        value >= self.min_value() && value <= self.max_value()
    }
}
