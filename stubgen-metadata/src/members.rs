//! Member definitions.
//!
//! Methods, properties, events, fields and constructors as declared on a
//! catalogue type. Only the declaring type's own members are recorded;
//! inherited members live on the base type's entry.

use crate::typeref::TypeRef;
use crate::types::{GenericParam, Visibility};

/// Method or indexer parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Parameter type (by-reference parameters carry a `TypeRef::ByRef`).
    pub ty: TypeRef,
    /// Whether the parameter is output-only.
    pub is_out: bool,
}

impl Parameter {
    /// Creates a by-value parameter.
    #[must_use]
    pub fn new(name: String, ty: TypeRef) -> Self {
        Self {
            name,
            ty,
            is_out: false,
        }
    }
}

/// Method definition.
#[derive(Debug, Clone)]
pub struct MethodDef {
    /// Method name.
    pub name: String,
    /// Return type (`System.Void` when nothing is returned).
    pub return_type: TypeRef,
    /// Parameters in declaration order.
    pub parameters: Vec<Parameter>,
    /// Method-level generic parameters.
    pub generic_params: Vec<GenericParam>,
    /// Accessibility.
    pub visibility: Visibility,
    /// Whether the method is static.
    pub is_static: bool,
    /// Whether the method is a property or event accessor.
    pub is_special_name: bool,
}

impl MethodDef {
    /// Creates a new public instance method.
    #[must_use]
    pub fn new(name: String, return_type: TypeRef) -> Self {
        Self {
            name,
            return_type,
            parameters: Vec::new(),
            generic_params: Vec::new(),
            visibility: Visibility::Public,
            is_static: false,
            is_special_name: false,
        }
    }

    /// Adds a parameter.
    pub fn add_parameter(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }

    /// Returns true if the method returns nothing.
    #[must_use]
    pub fn returns_void(&self) -> bool {
        self.return_type.is_void()
    }

    /// Returns true if the method declares generic parameters.
    #[must_use]
    pub fn is_generic(&self) -> bool {
        !self.generic_params.is_empty()
    }
}

/// Property or indexer definition.
#[derive(Debug, Clone)]
pub struct PropertyDef {
    /// Property name (`Item` for the default indexer).
    pub name: String,
    /// Property type.
    pub ty: TypeRef,
    /// Indexer parameters; empty for ordinary properties.
    pub index_parameters: Vec<Parameter>,
    /// Whether a getter is declared.
    pub can_read: bool,
    /// Whether a setter is declared.
    pub can_write: bool,
    /// Accessibility.
    pub visibility: Visibility,
    /// Whether the property is static.
    pub is_static: bool,
}

impl PropertyDef {
    /// Creates a new public read/write instance property.
    #[must_use]
    pub fn new(name: String, ty: TypeRef) -> Self {
        Self {
            name,
            ty,
            index_parameters: Vec::new(),
            can_read: true,
            can_write: true,
            visibility: Visibility::Public,
            is_static: false,
        }
    }

    /// Returns true if this property is an indexer.
    #[must_use]
    pub fn is_indexer(&self) -> bool {
        !self.index_parameters.is_empty()
    }
}

/// Event definition.
#[derive(Debug, Clone)]
pub struct EventDef {
    /// Event name.
    pub name: String,
    /// Handler delegate type.
    pub handler_type: TypeRef,
    /// Invocation signature of the handler, when the reader supplied one.
    pub handler_parameters: Option<Vec<Parameter>>,
    /// Accessibility.
    pub visibility: Visibility,
    /// Whether the event is static.
    pub is_static: bool,
}

impl EventDef {
    /// Creates a new public instance event.
    #[must_use]
    pub fn new(name: String, handler_type: TypeRef) -> Self {
        Self {
            name,
            handler_type,
            handler_parameters: None,
            visibility: Visibility::Public,
            is_static: false,
        }
    }
}

/// Field definition.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Field type.
    pub ty: TypeRef,
    /// Accessibility.
    pub visibility: Visibility,
    /// Whether the field is static.
    pub is_static: bool,
}

impl FieldDef {
    /// Creates a new public instance field.
    #[must_use]
    pub fn new(name: String, ty: TypeRef) -> Self {
        Self {
            name,
            ty,
            visibility: Visibility::Public,
            is_static: false,
        }
    }
}

/// Constructor definition.
#[derive(Debug, Clone, Default)]
pub struct ConstructorDef {
    /// Parameters in declaration order.
    pub parameters: Vec<Parameter>,
    /// Accessibility.
    pub visibility: Visibility,
    /// Whether this is the type initializer.
    pub is_static: bool,
}
