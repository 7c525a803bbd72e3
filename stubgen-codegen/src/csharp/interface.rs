//! Interface declaration generation.

use crate::csharp::members::{
    constraint_clauses, constraint_lines, generic_declaration, parameter_list,
};
use crate::csharp::{close_namespace, open_namespace, render_usings};
use crate::generator::StubKind;
use crate::names::{escape_identifier, render_type, strip_arity};
use crate::namespaces::collect_namespaces;
use stubgen_metadata::{MethodDef, PropertyDef, TypeDef};

/// Generator for interface declarations.
///
/// Interfaces are re-declared member for member; no configuration type is
/// produced.
pub struct InterfaceGenerator<'a> {
    type_def: &'a TypeDef,
}

impl<'a> InterfaceGenerator<'a> {
    /// Creates a new interface generator.
    #[must_use]
    pub fn new(type_def: &'a TypeDef) -> Self {
        Self { type_def }
    }

    /// Generates the source file.
    #[must_use]
    pub fn generate(&self) -> String {
        let ns = self.namespace();
        let mut output = String::new();

        output.push_str(&render_usings(&collect_namespaces(
            self.type_def,
            StubKind::Interface,
        )));
        output.push_str(&open_namespace(ns));

        output.push_str(&format!(
            "    public interface {}{}",
            strip_arity(&self.type_def.name),
            generic_declaration(&self.type_def.generic_params, true)
        ));
        if !self.type_def.interfaces.is_empty() {
            let bases: Vec<String> = self
                .type_def
                .interfaces
                .iter()
                .map(|i| render_type(i, ns, None))
                .collect();
            output.push_str(&format!(" : {}", bases.join(", ")));
        }
        output.push('\n');
        output.push_str(&constraint_lines(
            &constraint_clauses(&self.type_def.generic_params, ns),
            "        ",
        ));
        output.push_str("    {\n");

        for property in self.type_def.public_instance_properties() {
            output.push_str(&self.generate_property(property));
        }
        for event in self.type_def.public_instance_events() {
            output.push_str(&format!(
                "        event {}? {};\n",
                render_type(&event.handler_type, ns, None),
                escape_identifier(&event.name)
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

    /// Generates a method signature; `where` clauses precede the semicolon.
    fn generate_method(&self, method: &MethodDef) -> String {
        let ns = self.namespace();
        let signature = format!(
            "        {} {}{}({})",
            render_type(&method.return_type, ns, None),
            escape_identifier(&method.name),
            generic_declaration(&method.generic_params, false),
            parameter_list(&method.parameters, ns)
        );

        let clauses = constraint_clauses(&method.generic_params, ns);
        if clauses.is_empty() {
            return format!("{};\n", signature);
        }

        let mut output = format!("{}\n", signature);
        for (i, clause) in clauses.iter().enumerate() {
            let terminator = if i + 1 == clauses.len() { ";" } else { "" };
            output.push_str(&format!("            {}{}\n", clause, terminator));
        }
        output
    }

    fn generate_property(&self, property: &PropertyDef) -> String {
        let ns = self.namespace();
        let accessors = accessor_list(property);
        let ty = render_type(&property.ty, ns, None);

        if property.is_indexer() {
            format!(
                "        {} this[{}] {{{} }}\n",
                ty,
                parameter_list(&property.index_parameters, ns),
                accessors
            )
        } else {
            format!(
                "        {} {} {{{} }}\n",
                ty,
                escape_identifier(&property.name),
                accessors
            )
        }
    }
}

/// Renders ` get; set;` for the accessors a property declares.
pub(crate) fn accessor_list(property: &PropertyDef) -> String {
    let mut accessors = String::new();
    if property.can_read {
        accessors.push_str(" get;");
    }
    if property.can_write {
        accessors.push_str(" set;");
    }
    accessors
}
