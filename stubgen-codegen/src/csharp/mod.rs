//! C# code generation modules.

pub mod class;
pub mod delegates;
pub mod enums;
pub mod interface;
pub mod members;
pub mod structs;

pub use class::ClassGenerator;
pub use delegates::DelegateGenerator;
pub use enums::EnumGenerator;
pub use interface::InterfaceGenerator;
pub use structs::StructGenerator;

use std::collections::BTreeSet;

/// Renders sorted `using` lines followed by a blank line.
#[must_use]
pub fn render_usings(namespaces: &BTreeSet<String>) -> String {
    let mut output = String::new();
    for ns in namespaces {
        output.push_str(&format!("using {};\n", ns));
    }
    output.push('\n');
    output
}

/// Opens the namespace block of a generated file.
#[must_use]
pub fn open_namespace(namespace: &str) -> String {
    format!("namespace {}\n{{\n", namespace)
}

/// Closes the namespace block of a generated file.
#[must_use]
pub fn close_namespace() -> &'static str {
    "}\n"
}
