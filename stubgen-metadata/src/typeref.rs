//! Type expressions.
//!
//! A [`TypeRef`] names a type the way metadata signatures do: a named type
//! (optionally instantiated with type arguments), a generic parameter, or one
//! of the by-reference, array and pointer wrappers around another type.
//!
//! The textual form accepted by [`TypeRef::parse`] follows the reflection
//! naming convention:
//!
//! | Form                                   | Meaning                          |
//! |----------------------------------------|----------------------------------|
//! | `System.String`                        | named type                       |
//! | ``System.Collections.Generic.List`1[System.Int32]`` | generic instance    |
//! | `!T`, `!!T`                            | type / method generic parameter  |
//! | `System.Int32&`                        | by-reference                     |
//! | `System.Byte[]`, `System.Byte[,]`      | array of rank 1 / 2              |
//! | `System.Void*`                         | unmanaged pointer                |

use crate::error::ParseError;
use std::fmt;

/// Namespace of the core runtime types.
pub const SYSTEM_NAMESPACE: &str = "System";

/// A type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A named type, possibly a constructed generic instance.
    Named(NamedType),
    /// An unbound generic parameter, by name.
    GenericParam(String),
    /// A by-reference type (`ref`/`out` parameters).
    ByRef(Box<TypeRef>),
    /// An array type.
    Array {
        /// Element type.
        element: Box<TypeRef>,
        /// Number of dimensions (1 for `T[]`).
        rank: u8,
    },
    /// An unmanaged pointer type.
    Pointer(Box<TypeRef>),
}

/// A named type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedType {
    /// Namespace, if any.
    pub namespace: Option<String>,
    /// Metadata name, including the arity suffix for generic types
    /// (``List`1``) and `+` separators for nested types.
    pub name: String,
    /// Type arguments of a constructed generic instance.
    pub type_args: Vec<TypeRef>,
}

impl NamedType {
    /// Returns the namespace-qualified metadata name without type arguments.
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(ns) if !ns.is_empty() => format!("{}.{}", ns, self.name),
            _ => self.name.clone(),
        }
    }

    /// Returns the declared arity encoded in the name, if any.
    ///
    /// For nested types the arities of all enclosing segments add up, since
    /// the type argument list covers the outer type's parameters too.
    #[must_use]
    pub fn arity(&self) -> Option<usize> {
        self.name
            .split('+')
            .filter_map(segment_arity)
            .fold(None, |total, n| Some(total.unwrap_or(0) + n))
    }

    /// Splits the type arguments across the `+`-separated name segments.
    ///
    /// Returns each segment (arity suffix kept) with the arguments it
    /// declares. Segments beyond the available arguments get none.
    #[must_use]
    pub fn segments(&self) -> Vec<(&str, &[TypeRef])> {
        let mut rest = self.type_args.as_slice();
        self.name
            .split('+')
            .map(|segment| {
                let count = segment_arity(segment).unwrap_or(0).min(rest.len());
                let (own, tail) = rest.split_at(count);
                rest = tail;
                (segment, own)
            })
            .collect()
    }
}

fn segment_arity(segment: &str) -> Option<usize> {
    segment
        .rsplit_once('`')
        .and_then(|(_, digits)| digits.parse().ok())
}

impl TypeRef {
    /// Creates a non-generic named type reference.
    #[must_use]
    pub fn named(namespace: &str, name: &str) -> Self {
        Self::Named(NamedType {
            namespace: (!namespace.is_empty()).then(|| namespace.to_string()),
            name: name.to_string(),
            type_args: Vec::new(),
        })
    }

    /// Creates a generic parameter reference.
    #[must_use]
    pub fn generic_param(name: &str) -> Self {
        Self::GenericParam(name.to_string())
    }

    /// Wraps this type in a by-reference marker.
    #[must_use]
    pub fn by_ref(self) -> Self {
        Self::ByRef(Box::new(self))
    }

    /// Parses a type expression.
    ///
    /// # Errors
    /// Returns `ParseError::InvalidTypeExpression` if the text is malformed.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut parser = TypeParser {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        };
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if parser.pos != parser.bytes.len() {
            return Err(parser.error("unexpected trailing characters"));
        }
        Ok(ty)
    }

    /// Returns the named type, if this is one.
    #[must_use]
    pub fn as_named(&self) -> Option<&NamedType> {
        match self {
            Self::Named(named) => Some(named),
            _ => None,
        }
    }

    /// Returns true if this names the given namespace-qualified type.
    #[must_use]
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.as_named().is_some_and(|n| {
            n.name == name && n.namespace.as_deref().unwrap_or_default() == namespace
        })
    }

    /// Returns true for `System.Void`.
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.is(SYSTEM_NAMESPACE, "Void")
    }

    /// Returns true for `System.Object`.
    #[must_use]
    pub fn is_object(&self) -> bool {
        self.is(SYSTEM_NAMESPACE, "Object")
    }

    /// Returns true for a by-reference type.
    #[must_use]
    pub const fn is_by_ref(&self) -> bool {
        matches!(self, Self::ByRef(_))
    }

    /// Returns the referenced type of a by-reference type, or `self`.
    #[must_use]
    pub fn strip_by_ref(&self) -> &Self {
        match self {
            Self::ByRef(inner) => inner,
            other => other,
        }
    }

    /// Returns true if the expression mentions a generic parameter anywhere.
    #[must_use]
    pub fn uses_generic_parameter(&self) -> bool {
        match self {
            Self::GenericParam(_) => true,
            Self::ByRef(inner) | Self::Pointer(inner) => inner.uses_generic_parameter(),
            Self::Array { element, .. } => element.uses_generic_parameter(),
            Self::Named(named) => named.type_args.iter().any(Self::uses_generic_parameter),
        }
    }

    /// Visits every generic parameter name in the expression.
    pub fn for_each_generic_param<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            Self::GenericParam(name) => f(name),
            Self::ByRef(inner) | Self::Pointer(inner) => inner.for_each_generic_param(f),
            Self::Array { element, .. } => element.for_each_generic_param(f),
            Self::Named(named) => {
                for arg in &named.type_args {
                    arg.for_each_generic_param(f);
                }
            }
        }
    }

    /// Replaces generic parameters by the matching argument.
    ///
    /// `params` and `args` are positional; parameters without an argument are
    /// left untouched.
    #[must_use]
    pub fn substitute(&self, params: &[&str], args: &[TypeRef]) -> Self {
        match self {
            Self::GenericParam(name) => params
                .iter()
                .position(|p| p == name)
                .and_then(|idx| args.get(idx))
                .cloned()
                .unwrap_or_else(|| self.clone()),
            Self::ByRef(inner) => Self::ByRef(Box::new(inner.substitute(params, args))),
            Self::Pointer(inner) => Self::Pointer(Box::new(inner.substitute(params, args))),
            Self::Array { element, rank } => Self::Array {
                element: Box::new(element.substitute(params, args)),
                rank: *rank,
            },
            Self::Named(named) => Self::Named(NamedType {
                namespace: named.namespace.clone(),
                name: named.name.clone(),
                type_args: named
                    .type_args
                    .iter()
                    .map(|a| a.substitute(params, args))
                    .collect(),
            }),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(named) => {
                f.write_str(&named.full_name())?;
                if !named.type_args.is_empty() {
                    f.write_str("[")?;
                    for (i, arg) in named.type_args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(",")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    f.write_str("]")?;
                }
                Ok(())
            }
            Self::GenericParam(name) => write!(f, "!{}", name),
            Self::ByRef(inner) => write!(f, "{}&", inner),
            Self::Pointer(inner) => write!(f, "{}*", inner),
            Self::Array { element, rank } => {
                write!(f, "{}[", element)?;
                for _ in 1..*rank {
                    f.write_str(",")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Recursive-descent parser over a type expression.
struct TypeParser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl TypeParser<'_> {
    fn error(&self, message: &str) -> ParseError {
        ParseError::InvalidTypeExpression {
            expression: self.text.to_string(),
            message: format!("{} at offset {}", message, self.pos),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn parse_type(&mut self) -> Result<TypeRef, ParseError> {
        self.skip_ws();
        let base = if self.peek() == Some(b'!') {
            self.pos += 1;
            if self.peek() == Some(b'!') {
                self.pos += 1;
            }
            let start = self.pos;
            while self
                .peek()
                .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
            {
                self.pos += 1;
            }
            if start == self.pos {
                return Err(self.error("expected generic parameter name"));
            }
            TypeRef::GenericParam(self.text[start..self.pos].to_string())
        } else {
            self.parse_named()?
        };
        self.parse_suffixes(base)
    }

    fn parse_named(&mut self) -> Result<TypeRef, ParseError> {
        let start = self.pos;
        let mut outer_end = None;
        let mut arity = None;

        // Segments are joined by `+`; each may carry its own arity suffix.
        loop {
            let segment_start = self.pos;
            while self.peek().is_some_and(|b| {
                !matches!(b, b'`' | b'+' | b'[' | b']' | b',' | b'&' | b'*')
                    && !b.is_ascii_whitespace()
            }) {
                self.pos += 1;
            }
            if segment_start == self.pos {
                return Err(self.error("expected type name"));
            }
            outer_end.get_or_insert(self.pos);

            if self.peek() == Some(b'`') {
                self.pos += 1;
                let digits_start = self.pos;
                while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                    self.pos += 1;
                }
                let count = self.text[digits_start..self.pos]
                    .parse::<usize>()
                    .map_err(|_| self.error("expected generic arity"))?;
                arity = Some(arity.unwrap_or(0) + count);
            }

            if self.peek() != Some(b'+') {
                break;
            }
            self.pos += 1;
        }
        let name_end = self.pos;

        // Namespace ends at the last dot of the outermost segment.
        let outer = &self.text[start..outer_end.unwrap_or(name_end)];
        let (namespace, name_start) = match outer.rfind('.') {
            Some(dot) => (Some(outer[..dot].to_string()), start + dot + 1),
            None => (None, start),
        };
        let name = self.text[name_start..name_end].to_string();

        let mut type_args = Vec::new();
        if let Some(arity) = arity {
            if self.peek() == Some(b'[') && !self.at_array_suffix() {
                self.pos += 1;
                loop {
                    type_args.push(self.parse_type()?);
                    self.skip_ws();
                    match self.peek() {
                        Some(b',') => self.pos += 1,
                        Some(b']') => {
                            self.pos += 1;
                            break;
                        }
                        _ => return Err(self.error("expected ',' or ']' in type arguments")),
                    }
                }
                if type_args.len() != arity {
                    return Err(self.error(&format!(
                        "expected {} type arguments, found {}",
                        arity,
                        type_args.len()
                    )));
                }
            }
        }

        Ok(TypeRef::Named(NamedType {
            namespace,
            name,
            type_args,
        }))
    }

    /// Returns true if the cursor sits on `[]` or `[,...]`.
    fn at_array_suffix(&self) -> bool {
        self.peek() == Some(b'[') && matches!(self.bytes.get(self.pos + 1), Some(b']' | b','))
    }

    fn parse_suffixes(&mut self, mut ty: TypeRef) -> Result<TypeRef, ParseError> {
        loop {
            match self.peek() {
                Some(b'&') => {
                    self.pos += 1;
                    ty = TypeRef::ByRef(Box::new(ty));
                }
                Some(b'*') => {
                    self.pos += 1;
                    ty = TypeRef::Pointer(Box::new(ty));
                }
                Some(b'[') if self.at_array_suffix() => {
                    self.pos += 1;
                    let mut rank: u8 = 1;
                    while self.peek() == Some(b',') {
                        self.pos += 1;
                        rank = rank.saturating_add(1);
                    }
                    if self.peek() != Some(b']') {
                        return Err(self.error("expected ']' after array rank"));
                    }
                    self.pos += 1;
                    ty = TypeRef::Array {
                        element: Box::new(ty),
                        rank,
                    };
                }
                Some(b'[') => return Err(self.error("type arguments on a non-generic type")),
                _ => return Ok(ty),
            }
        }
    }
}
