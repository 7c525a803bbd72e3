//! Read-only access to type metadata.

use crate::typeref::TypeRef;
use crate::types::{Catalog, TypeDef};

/// Reflection-like queries over a module's types.
///
/// The generator only ever reads through this trait, so any metadata reader
/// that can enumerate types and resolve references can drive it.
pub trait MetadataSource {
    /// Name of the module the metadata describes.
    fn module_name(&self) -> &str;

    /// All type definitions, in metadata order.
    fn types(&self) -> &[TypeDef];

    /// Resolves a reference to its definition, if the source knows it.
    ///
    /// Constructed generic instances resolve to their generic definition.
    fn resolve(&self, ty: &TypeRef) -> Option<&TypeDef>;
}

impl MetadataSource for Catalog {
    fn module_name(&self) -> &str {
        &self.module
    }

    fn types(&self) -> &[TypeDef] {
        &self.types
    }

    fn resolve(&self, ty: &TypeRef) -> Option<&TypeDef> {
        let named = ty.strip_by_ref().as_named()?;
        self.get_type(&named.full_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeFlavor;

    #[test]
    fn test_resolve_generic_instance() {
        let mut catalog = Catalog::new("Test.dll".to_string());
        catalog.add_type(TypeDef::new(
            "Box`1".to_string(),
            Some("Acme".to_string()),
            TypeFlavor::Class,
        ));

        let source: &dyn MetadataSource = &catalog;
        let ty = TypeRef::parse("Acme.Box`1[System.String]").unwrap();
        assert_eq!(source.resolve(&ty).unwrap().name, "Box`1");
        assert!(source.resolve(&TypeRef::generic_param("T")).is_none());
        assert_eq!(source.module_name(), "Test.dll");
    }
}
