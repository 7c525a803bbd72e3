//! Enum declaration generation.

use crate::csharp::{close_namespace, open_namespace};
use crate::names::{escape_identifier, render_type, strip_arity};
use stubgen_metadata::{SYSTEM_NAMESPACE, TypeDef};

/// Generator for enum declarations.
pub struct EnumGenerator<'a> {
    type_def: &'a TypeDef,
}

impl<'a> EnumGenerator<'a> {
    /// Creates a new enum generator.
    #[must_use]
    pub fn new(type_def: &'a TypeDef) -> Self {
        Self { type_def }
    }

    /// Generates the source file.
    ///
    /// The underlying type is written only when it is not `System.Int32`.
    /// Constants keep their declaration order and literal values.
    #[must_use]
    pub fn generate(&self) -> String {
        let ns = self.type_def.namespace.as_deref().unwrap_or_default();
        let underlying = self.type_def.enum_underlying_type();
        let mut output = String::new();

        output.push_str(&open_namespace(ns));
        output.push_str(&format!(
            "    public enum {}",
            strip_arity(&self.type_def.name)
        ));
        if !underlying.is(SYSTEM_NAMESPACE, "Int32") {
            output.push_str(&format!(" : {}", render_type(&underlying, ns, None)));
        }
        output.push('\n');
        output.push_str("    {\n");

        let count = self.type_def.enum_values.len();
        for (i, value) in self.type_def.enum_values.iter().enumerate() {
            let separator = if i + 1 < count { "," } else { "" };
            output.push_str(&format!(
                "        {} = {}{}\n",
                escape_identifier(&value.name),
                value.value,
                separator
            ));
        }

        output.push_str("    }\n");
        output.push_str(close_namespace());
        output
    }
}
