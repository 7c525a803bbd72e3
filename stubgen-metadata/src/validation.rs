//! Catalogue validation utilities.
//!
//! Catalogue-wide checks run once before generation; per-type checks run as
//! each type is generated so that one malformed type does not sink the run.

use crate::error::CatalogError;
use crate::typeref::TypeRef;
use crate::types::{Catalog, IntegralType, TypeDef, TypeFlavor};
use std::collections::HashSet;

/// Validates catalogue-wide invariants.
///
/// # Errors
/// Returns `CatalogError::DuplicateType` if two entries share a full name.
pub fn validate_catalog(catalog: &Catalog) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();

    for type_def in &catalog.types {
        let full_name = type_def.full_name();
        if !seen.insert(full_name.clone()) {
            return Err(CatalogError::DuplicateType { name: full_name });
        }
    }

    Ok(())
}

/// Validates a single type definition.
///
/// # Errors
/// Returns `CatalogError` if the enum constants or generic parameter
/// references of the type are inconsistent.
pub fn validate_type(type_def: &TypeDef) -> Result<(), CatalogError> {
    if type_def.flavor == TypeFlavor::Enum {
        validate_enum(type_def)?;
    }
    validate_generic_references(type_def)
}

/// Validates an enum type definition.
fn validate_enum(enum_def: &TypeDef) -> Result<(), CatalogError> {
    let underlying = enum_def.enum_underlying_type();
    let integral =
        IntegralType::from_type_ref(&underlying).ok_or_else(|| CatalogError::InvalidUnderlyingType {
            enum_name: enum_def.full_name(),
            underlying: underlying.to_string(),
        })?;

    let mut seen_names = HashSet::new();

    for value in &enum_def.enum_values {
        if !seen_names.insert(&value.name) {
            return Err(CatalogError::Validation {
                message: format!(
                    "Duplicate enum value name '{}' in enum '{}'",
                    value.name,
                    enum_def.full_name()
                ),
            });
        }

        if !integral.contains(value.value) {
            return Err(CatalogError::EnumValueOutOfRange {
                enum_name: enum_def.full_name(),
                constant: value.name.clone(),
                value: value.value,
                underlying: underlying.to_string(),
            });
        }
    }

    Ok(())
}

/// Checks that every generic parameter a member mentions is declared by the
/// member or by the type.
fn validate_generic_references(type_def: &TypeDef) -> Result<(), CatalogError> {
    let type_params: HashSet<&str> = type_def
        .generic_params
        .iter()
        .map(|p| p.name.as_str())
        .collect();

    let check = |member: &str, ty: &TypeRef, method_params: &HashSet<&str>| {
        let mut unbound = None;
        ty.for_each_generic_param(&mut |name| {
            if unbound.is_none() && !type_params.contains(name) && !method_params.contains(name) {
                unbound = Some(name.to_string());
            }
        });
        match unbound {
            Some(parameter) => Err(CatalogError::UnboundGenericParameter {
                type_name: type_def.full_name(),
                member: member.to_string(),
                parameter,
            }),
            None => Ok(()),
        }
    };

    let none = HashSet::new();

    if let Some(base) = &type_def.base_type {
        check("base type", base, &none)?;
    }
    for iface in &type_def.interfaces {
        check("interface list", iface, &none)?;
    }
    for param in &type_def.generic_params {
        for constraint in &param.constraints {
            check(&param.name, constraint, &none)?;
        }
    }
    for method in &type_def.methods {
        let method_params: HashSet<&str> =
            method.generic_params.iter().map(|p| p.name.as_str()).collect();
        check(&method.name, &method.return_type, &method_params)?;
        for param in &method.parameters {
            check(&method.name, &param.ty, &method_params)?;
        }
        for generic in &method.generic_params {
            for constraint in &generic.constraints {
                check(&method.name, constraint, &method_params)?;
            }
        }
    }
    for property in &type_def.properties {
        check(&property.name, &property.ty, &none)?;
        for param in &property.index_parameters {
            check(&property.name, &param.ty, &none)?;
        }
    }
    for event in &type_def.events {
        check(&event.name, &event.handler_type, &none)?;
    }
    for field in &type_def.fields {
        check(&field.name, &field.ty, &none)?;
    }
    for ctor in &type_def.constructors {
        for param in &ctor.parameters {
            check(".ctor", &param.ty, &none)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_catalog;

    #[test]
    fn test_validate_valid_catalog() {
        let xml = r#"<catalog module="Test.dll">
    <type name="Box`1" namespace="Acme" kind="class">
        <genericParameter name="T"/>
        <method name="Get" returns="!T"/>
        <method name="Map" returns="!!U">
            <genericParameter name="U"/>
            <parameter name="value" type="!T"/>
        </method>
    </type>
</catalog>"#;

        let catalog = parse_catalog(xml).expect("Failed to parse");
        assert!(validate_catalog(&catalog).is_ok());
        assert!(validate_type(&catalog.types[0]).is_ok());
    }

    #[test]
    fn test_validate_duplicate_type() {
        let xml = r#"<catalog module="Test.dll">
    <type name="Widget" namespace="Acme" kind="class"/>
    <type name="Widget" namespace="Acme" kind="struct"/>
</catalog>"#;

        let catalog = parse_catalog(xml).expect("Failed to parse");
        let result = validate_catalog(&catalog);
        assert!(matches!(result, Err(CatalogError::DuplicateType { .. })));
    }

    #[test]
    fn test_validate_unbound_generic_parameter() {
        let xml = r#"<catalog module="Test.dll">
    <type name="Widget" namespace="Acme" kind="class">
        <method name="Get" returns="!T"/>
    </type>
</catalog>"#;

        let catalog = parse_catalog(xml).expect("Failed to parse");
        let err = validate_type(&catalog.types[0]).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::UnboundGenericParameter { ref parameter, .. } if parameter == "T"
        ));
    }

    #[test]
    fn test_validate_enum_range() {
        let xml = r#"<catalog module="Test.dll">
    <type name="Small" namespace="Acme" kind="enum" underlying="System.Byte">
        <value name="Ok">255</value>
        <value name="TooBig">256</value>
    </type>
</catalog>"#;

        let catalog = parse_catalog(xml).expect("Failed to parse");
        let err = validate_type(&catalog.types[0]).unwrap_err();
        assert!(matches!(err, CatalogError::EnumValueOutOfRange { value: 256, .. }));
    }

    #[test]
    fn test_validate_enum_duplicate_name() {
        let xml = r#"<catalog module="Test.dll">
    <type name="Twice" namespace="Acme" kind="enum">
        <value name="A">1</value>
        <value name="A">2</value>
    </type>
</catalog>"#;

        let catalog = parse_catalog(xml).expect("Failed to parse");
        assert!(validate_type(&catalog.types[0]).is_err());
    }

    #[test]
    fn test_validate_enum_bad_underlying() {
        let xml = r#"<catalog module="Test.dll">
    <type name="Odd" namespace="Acme" kind="enum" underlying="System.String"/>
</catalog>"#;

        let catalog = parse_catalog(xml).expect("Failed to parse");
        assert!(matches!(
            validate_type(&catalog.types[0]),
            Err(CatalogError::InvalidUnderlyingType { .. })
        ));
    }
}
