//! Type-name rendering.
//!
//! Turns [`TypeRef`] expressions into C# type syntax relative to the
//! namespace of the file being generated.

use stubgen_metadata::{Parameter, TypeRef};

/// Storage type used by hooks for values whose type mentions a generic parameter.
pub const ERASED_TYPE: &str = "object?";

/// C# reserved keywords, which need an `@` prefix when used as identifiers.
const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Renders a type reference as C# source.
///
/// By-reference types lose their marker; when `parameter` is given the
/// marker becomes an `out ` or `ref ` prefix according to its direction.
///
/// # Arguments
/// * `ty` - Type to render
/// * `current_ns` - Namespace of the file being generated
/// * `parameter` - Parameter the type belongs to, if any
#[must_use]
pub fn render_type(ty: &TypeRef, current_ns: &str, parameter: Option<&Parameter>) -> String {
    match ty {
        TypeRef::ByRef(inner) => {
            let prefix = match parameter {
                Some(p) if p.is_out => "out ",
                Some(_) => "ref ",
                None => "",
            };
            format!("{}{}", prefix, render_plain(inner, current_ns))
        }
        other => render_plain(other, current_ns),
    }
}

fn render_plain(ty: &TypeRef, current_ns: &str) -> String {
    if ty.is_void() {
        return "void".to_string();
    }

    match ty {
        TypeRef::GenericParam(name) => name.clone(),
        TypeRef::ByRef(inner) => render_plain(inner, current_ns),
        TypeRef::Pointer(inner) => format!("{}*", render_plain(inner, current_ns)),
        TypeRef::Array { element, rank } => format!(
            "{}[{}]",
            render_plain(element, current_ns),
            ",".repeat(usize::from(rank.saturating_sub(1)))
        ),
        TypeRef::Named(named) => {
            // Each nesting level takes the arguments its own arity declares.
            let segments: Vec<String> = named
                .segments()
                .into_iter()
                .map(|(segment, args)| {
                    let mut rendered = strip_arity(segment);
                    if !args.is_empty() {
                        let args: Vec<String> =
                            args.iter().map(|a| render_plain(a, current_ns)).collect();
                        rendered.push('<');
                        rendered.push_str(&args.join(", "));
                        rendered.push('>');
                    }
                    rendered
                })
                .collect();
            let name = segments.join(".");
            match named.namespace.as_deref() {
                Some(ns) if !ns.is_empty() && ns != current_ns => format!("{}.{}", ns, name),
                _ => name,
            }
        }
    }
}

/// Renders the type a hook stores for a value of type `ty`.
///
/// The by-reference marker is dropped (hooks receive values), and any type
/// mentioning a generic parameter is erased to `object?`.
#[must_use]
pub fn render_hook_type(ty: &TypeRef, current_ns: &str) -> String {
    let ty = ty.strip_by_ref();
    if uses_generic_parameter(ty) {
        ERASED_TYPE.to_string()
    } else {
        render_plain(ty, current_ns)
    }
}

/// Returns true if `ty` structurally references an open generic parameter.
#[must_use]
pub fn uses_generic_parameter(ty: &TypeRef) -> bool {
    ty.uses_generic_parameter()
}

/// Removes generic arity suffixes (``List`1`` becomes `List`).
#[must_use]
pub fn strip_arity(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '`' {
            while chars.peek().is_some_and(char::is_ascii_digit) {
                chars.next();
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Prefixes C# keywords with `@` so they can be used as identifiers.
#[must_use]
pub fn escape_identifier(name: &str) -> String {
    if CSHARP_KEYWORDS.contains(&name) {
        format!("@{}", name)
    } else {
        name.to_string()
    }
}
