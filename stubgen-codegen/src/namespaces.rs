//! Namespace collection for `using` directives.

use crate::generator::StubKind;
use std::collections::BTreeSet;
use stubgen_metadata::{SYSTEM_NAMESPACE, TypeDef, TypeRef};

/// Collects the namespaces a generated file needs to import.
///
/// `System` is always present. Namespaces equal to the type's own are
/// omitted, as are empty ones; generic parameters contribute nothing. The
/// set is sorted so `using` lines come out in a stable order.
#[must_use]
pub fn collect_namespaces(type_def: &TypeDef, kind: StubKind) -> BTreeSet<String> {
    let own = type_def.namespace.as_deref().unwrap_or_default();
    let mut namespaces = BTreeSet::new();
    namespaces.insert(SYSTEM_NAMESPACE.to_string());

    let mut add = |ty: &TypeRef| add_namespaces(ty, own, &mut namespaces);

    match kind {
        StubKind::Enum => add(&type_def.enum_underlying_type()),
        StubKind::Delegate => {
            if let Some(invoke) = type_def.find_method("Invoke") {
                add(&invoke.return_type);
                for param in &invoke.parameters {
                    add(&param.ty);
                }
            }
        }
        StubKind::Class | StubKind::Interface | StubKind::Struct => {
            if kind == StubKind::Class {
                if let Some(base) = &type_def.base_type {
                    add(base);
                }
            }
            if kind == StubKind::Interface {
                for iface in &type_def.interfaces {
                    add(iface);
                }
            }
            for method in type_def
                .methods
                .iter()
                .filter(|m| m.visibility.is_public() && !m.is_special_name)
            {
                add(&method.return_type);
                for param in &method.parameters {
                    add(&param.ty);
                }
            }
            for property in type_def.properties.iter().filter(|p| p.visibility.is_public()) {
                add(&property.ty);
                for param in &property.index_parameters {
                    add(&param.ty);
                }
            }
            for field in type_def.fields.iter().filter(|f| f.visibility.is_public()) {
                add(&field.ty);
            }
            for event in type_def.events.iter().filter(|e| e.visibility.is_public()) {
                add(&event.handler_type);
            }
        }
    }

    namespaces
}

fn add_namespaces(ty: &TypeRef, own: &str, namespaces: &mut BTreeSet<String>) {
    match ty {
        TypeRef::GenericParam(_) => {}
        TypeRef::ByRef(inner) | TypeRef::Pointer(inner) => add_namespaces(inner, own, namespaces),
        TypeRef::Array { element, .. } => add_namespaces(element, own, namespaces),
        TypeRef::Named(named) => {
            for arg in &named.type_args {
                add_namespaces(arg, own, namespaces);
            }
            match named.namespace.as_deref() {
                Some(ns) if !ns.is_empty() && ns != own => {
                    namespaces.insert(ns.to_string());
                }
                _ => {}
            }
        }
    }
}
