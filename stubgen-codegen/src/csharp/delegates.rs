//! Delegate declaration generation.

use crate::csharp::members::{constraint_clauses, generic_declaration, parameter_list};
use crate::csharp::{close_namespace, open_namespace, render_usings};
use crate::error::CodegenError;
use crate::generator::StubKind;
use crate::names::{render_type, strip_arity};
use crate::namespaces::collect_namespaces;
use stubgen_metadata::TypeDef;

/// Generator for delegate declarations.
///
/// The declaration mirrors the delegate's `Invoke` method.
pub struct DelegateGenerator<'a> {
    type_def: &'a TypeDef,
}

impl<'a> DelegateGenerator<'a> {
    /// Creates a new delegate generator.
    #[must_use]
    pub fn new(type_def: &'a TypeDef) -> Self {
        Self { type_def }
    }

    /// Generates the source file.
    ///
    /// # Errors
    /// Returns `CodegenError::UnsupportedMember` if the delegate has no
    /// `Invoke` method.
    pub fn generate(&self) -> Result<String, CodegenError> {
        let ns = self.type_def.namespace.as_deref().unwrap_or_default();
        let invoke = self.type_def.find_method("Invoke").ok_or_else(|| {
            CodegenError::unsupported(
                self.type_def.full_name(),
                "Invoke",
                "delegate declares no Invoke method",
            )
        })?;

        let mut output = String::new();
        output.push_str(&render_usings(&collect_namespaces(
            self.type_def,
            StubKind::Delegate,
        )));
        output.push_str(&open_namespace(ns));

        let declaration = format!(
            "    public delegate {} {}{}({})",
            render_type(&invoke.return_type, ns, None),
            strip_arity(&self.type_def.name),
            generic_declaration(&self.type_def.generic_params, true),
            parameter_list(&invoke.parameters, ns)
        );
        let clauses = constraint_clauses(&self.type_def.generic_params, ns);
        if clauses.is_empty() {
            output.push_str(&format!("{};\n", declaration));
        } else {
            output.push_str(&format!("{}\n", declaration));
            output.push_str(&format!("        {};\n", clauses.join("\n        ")));
        }

        output.push_str(close_namespace());
        Ok(output)
    }
}
