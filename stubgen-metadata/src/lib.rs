//! # stubgen metadata
//!
//! Type catalogue model and reader.
//!
//! This crate provides:
//! - The [`MetadataSource`] capability the generator reads through
//! - A catalogue representation of a module's types and members
//! - A parser for catalogue XML and for type expressions
//! - Catalogue validation

pub mod error;
pub mod members;
pub mod parser;
pub mod source;
pub mod typeref;
pub mod types;
pub mod validation;

pub use error::{CatalogError, ParseError};
pub use members::{ConstructorDef, EventDef, FieldDef, MethodDef, Parameter, PropertyDef};
pub use parser::{parse_catalog, parse_catalog_file};
pub use source::MetadataSource;
pub use typeref::{NamedType, SYSTEM_NAMESPACE, TypeRef};
pub use types::{
    Catalog, EnumValue, GenericParam, GenericParamAttributes, IntegralType, TypeDef, TypeFlavor,
    Visibility,
};
pub use validation::{validate_catalog, validate_type};
