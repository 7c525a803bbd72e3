//! # Stubgen Codegen
//!
//! C# stub generation from .NET type metadata.
//!
//! This crate provides:
//! - Class stubs whose members forward to configurable hooks
//! - Interface, struct, enum and delegate re-declarations
//! - `using` collection and type-name rendering
//! - Writing generated files into a namespace directory tree

pub mod csharp;
pub mod emit;
pub mod error;
pub mod generator;
pub mod names;
pub mod namespaces;

pub use emit::{GenerationReport, StubWriter};
pub use error::CodegenError;
pub use generator::{Dispatch, GeneratedUnit, Generator, SkipReason, StubKind, TypeOutcome};

use stubgen_metadata::{parse_catalog, parse_catalog_file, validate_catalog};

/// Generates stubs for every type in an XML type catalogue.
///
/// # Arguments
/// * `xml` - Catalogue content
///
/// # Returns
/// One outcome per catalogue type, in catalogue order.
///
/// # Errors
/// Returns `CodegenError` if the catalogue cannot be parsed or two types
/// share a full name.
pub fn generate_from_xml(xml: &str) -> Result<Vec<TypeOutcome>, CodegenError> {
    let catalog = parse_catalog(xml)?;
    validate_catalog(&catalog)?;
    Ok(Generator::new(&catalog).generate())
}

/// Generates stubs for a catalogue file and writes them under `output_dir`.
///
/// # Arguments
/// * `path` - Path to the catalogue
/// * `output_dir` - Root of the generated directory tree
///
/// # Errors
/// Returns `CodegenError` if the catalogue cannot be read, parsed or
/// validated, or if a generated file cannot be written. Types that cannot be
/// generated are reported in the returned [`GenerationReport`] instead.
pub fn generate_from_file(
    path: &std::path::Path,
    output_dir: &std::path::Path,
) -> Result<GenerationReport, CodegenError> {
    let catalog = parse_catalog_file(path)?;
    validate_catalog(&catalog)?;
    StubWriter::new(output_dir).write_all(&Generator::new(&catalog))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn source_of<'a>(outcomes: &'a [TypeOutcome], type_name: &str) -> &'a str {
        outcomes
            .iter()
            .find_map(|o| match o {
                TypeOutcome::Generated(unit) if unit.type_name == type_name => {
                    Some(unit.source.as_str())
                }
                _ => None,
            })
            .unwrap_or_else(|| panic!("no unit for {}", type_name))
    }

    #[test]
    fn test_generate_from_xml() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<catalog module="Acme.Shop.dll">
    <type name="IPriced" namespace="Acme.Shop" kind="interface">
        <property name="Price" type="System.Decimal"/>
    </type>
    <type name="Product" namespace="Acme.Shop" kind="class">
        <base type="System.Object"/>
        <interface type="Acme.Shop.IPriced"/>
        <property name="Price" type="System.Decimal"/>
        <method name="Discount" returns="System.Decimal">
            <parameter name="percent" type="System.Int32"/>
        </method>
    </type>
    <type name="Category" namespace="Acme.Shop" kind="enum" underlying="System.Int16">
        <value name="Food">1</value>
        <value name="Tools">2</value>
    </type>
</catalog>"#;

        let outcomes = generate_from_xml(xml).expect("Failed to generate");
        assert_eq!(outcomes.len(), 3);

        let product = source_of(&outcomes, "Product");
        assert!(product.contains("    public partial class Product : IPriced\n"));
        assert!(product.contains("public virtual System.Decimal Discount(System.Int32 percent)"));
        assert!(product.contains("public Func<System.Int32, System.Decimal>? Discount_0 { get; set; }"));
        assert!(product.contains("public Func<System.Decimal>? get_Price { get; set; }"));

        let category = source_of(&outcomes, "Category");
        assert!(category.contains("public enum Category : System.Int16"));

        let priced = source_of(&outcomes, "IPriced");
        assert!(priced.contains("        System.Decimal Price { get; }\n"));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let xml = r#"<catalog module="Test.dll">
    <type name="Ledger" namespace="Acme.Accounts" kind="class">
        <interface type="System.IDisposable"/>
        <method name="Post" returns="System.Guid">
            <parameter name="amount" type="System.Decimal"/>
            <parameter name="memo" type="Acme.Text.Memo"/>
        </method>
        <method name="Post" returns="System.Guid">
            <parameter name="amount" type="System.Decimal"/>
        </method>
        <event name="Posted" type="System.EventHandler"/>
    </type>
</catalog>"#;

        let render = |outcomes: Vec<TypeOutcome>| -> Vec<String> {
            outcomes
                .into_iter()
                .filter_map(|o| match o {
                    TypeOutcome::Generated(unit) => Some(unit.source),
                    _ => None,
                })
                .collect()
        };
        let first = render(generate_from_xml(xml).unwrap());
        let second = render(generate_from_xml(xml).unwrap());

        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
        assert!(first[0].starts_with("using Acme.Text;\nusing System;\n\n"));
    }

    #[test]
    fn test_nested_type_of_generic_outer() {
        let xml = r#"<catalog module="Test.dll">
    <type name="Good" namespace="Acme" kind="class">
        <method name="Run"/>
    </type>
    <type name="Index" namespace="Acme" kind="class">
        <property name="Keys" type="System.Collections.Generic.Dictionary`2+KeyCollection[System.String,System.Int32]"/>
    </type>
</catalog>"#;

        let outcomes = generate_from_xml(xml).expect("Failed to generate");

        assert!(source_of(&outcomes, "Good").contains("public virtual void Run()"));
        let index = source_of(&outcomes, "Index");
        assert!(index.contains("using System.Collections.Generic;\n"));
        assert!(index.contains(
            "public virtual System.Collections.Generic.Dictionary<System.String, System.Int32>.KeyCollection Keys\n"
        ));
    }

    #[test]
    fn test_duplicate_types_rejected() {
        let xml = r#"<catalog module="Test.dll">
    <type name="Twin" namespace="Acme" kind="class"/>
    <type name="Twin" namespace="Acme" kind="class"/>
</catalog>"#;
        assert!(matches!(generate_from_xml(xml), Err(CodegenError::Catalog(_))));
    }

    #[test]
    fn test_generate_from_file() {
        let dir = TempDir::new().unwrap();
        let catalog_path = dir.path().join("catalog.xml");
        std::fs::write(
            &catalog_path,
            r#"<catalog module="Test.dll">
    <type name="Clock" namespace="Acme.Time" kind="class">
        <property name="Now" type="System.DateTime"/>
    </type>
</catalog>"#,
        )
        .unwrap();
        let out = dir.path().join("out");

        let report = generate_from_file(&catalog_path, &out).expect("Failed to generate");

        assert!(report.is_success());
        let written = std::fs::read_to_string(out.join("Acme/Time/Clock.cs")).unwrap();
        assert!(written.starts_with("using System;\n\nnamespace Acme.Time\n{\n"));
        assert!(written.contains("get => Configure.get_Now?.Invoke() ?? throw"));
    }

    #[test]
    fn test_missing_catalog_file() {
        let dir = TempDir::new().unwrap();
        let result = generate_from_file(&dir.path().join("missing.xml"), dir.path());
        assert!(result.is_err());
    }
}
