//! Struct stub generation.

use crate::csharp::interface::accessor_list;
use crate::csharp::members::{
    constraint_clauses, constraint_lines, generic_declaration, out_defaults, parameter_list,
};
use crate::csharp::{close_namespace, open_namespace, render_usings};
use crate::generator::StubKind;
use crate::names::{escape_identifier, render_type, strip_arity};
use crate::namespaces::collect_namespaces;
use stubgen_metadata::{MethodDef, Parameter, PropertyDef, TypeDef};

const NOT_IMPLEMENTED: &str = "throw new NotImplementedException()";

/// Generator for struct stubs.
///
/// Structs get no configuration type: fields and auto-properties are
/// declared, and every method body is empty or throws.
pub struct StructGenerator<'a> {
    type_def: &'a TypeDef,
}

impl<'a> StructGenerator<'a> {
    /// Creates a new struct generator.
    #[must_use]
    pub fn new(type_def: &'a TypeDef) -> Self {
        Self { type_def }
    }

    /// Generates the source file.
    #[must_use]
    pub fn generate(&self) -> String {
        let ns = self.namespace();
        let name = strip_arity(&self.type_def.name);
        let mut output = String::new();

        output.push_str(&render_usings(&collect_namespaces(
            self.type_def,
            StubKind::Struct,
        )));
        output.push_str(&open_namespace(ns));
        output.push_str(&format!(
            "    public partial struct {}{}\n",
            name,
            generic_declaration(&self.type_def.generic_params, false)
        ));
        output.push_str(&constraint_lines(
            &constraint_clauses(&self.type_def.generic_params, ns),
            "        ",
        ));
        output.push_str("    {\n");

        for field in self.type_def.public_instance_fields() {
            output.push_str(&format!(
                "        public {} {};\n",
                render_type(&field.ty, ns, None),
                escape_identifier(&field.name)
            ));
        }

        for property in self.type_def.public_instance_properties() {
            output.push_str(&self.generate_property(property));
        }

        for ctor in self.type_def.public_constructors() {
            output.push_str(&format!(
                "        public {}({}) {}\n",
                name,
                parameter_list(&ctor.parameters, ns),
                empty_body(&ctor.parameters)
            ));
        }

        for method in self.type_def.public_instance_methods() {
            output.push_str(&self.generate_method(method));
        }

        output.push_str("    }\n");
        output.push_str(close_namespace());
        output
    }

    fn namespace(&self) -> &'a str {
        self.type_def.namespace.as_deref().unwrap_or_default()
    }

    fn generate_property(&self, property: &PropertyDef) -> String {
        let ns = self.namespace();
        let ty = render_type(&property.ty, ns, None);

        if !property.is_indexer() {
            return format!(
                "        public {} {} {{{} }}\n",
                ty,
                escape_identifier(&property.name),
                accessor_list(property)
            );
        }

        // Indexers cannot be auto-implemented.
        let mut accessors = String::new();
        if property.can_read {
            accessors.push_str(&format!(" get => {};", NOT_IMPLEMENTED));
        }
        if property.can_write {
            accessors.push_str(" set { }");
        }
        format!(
            "        public {} this[{}] {{{} }}\n",
            ty,
            parameter_list(&property.index_parameters, ns),
            accessors
        )
    }

    fn generate_method(&self, method: &MethodDef) -> String {
        let ns = self.namespace();
        let signature = format!(
            "        public {} {}{}({})",
            render_type(&method.return_type, ns, None),
            escape_identifier(&method.name),
            generic_declaration(&method.generic_params, false),
            parameter_list(&method.parameters, ns)
        );
        let clauses = constraint_clauses(&method.generic_params, ns);
        let body = if method.returns_void() {
            empty_body(&method.parameters)
        } else {
            format!("=> {};", NOT_IMPLEMENTED)
        };

        if clauses.is_empty() {
            format!("{} {}\n", signature, body)
        } else {
            format!(
                "{}\n{}            {}\n",
                signature,
                constraint_lines(&clauses, "            "),
                body
            )
        }
    }
}

/// Empty block that still assigns every `out` parameter.
fn empty_body(parameters: &[Parameter]) -> String {
    let assignments = out_defaults(parameters, "");
    if assignments.is_empty() {
        "{ }".to_string()
    } else {
        format!("{{ {} }}", assignments.trim_end().replace('\n', " "))
    }
}
