//! Error types for catalogue parsing and validation.

use thiserror::Error;

/// Error type for catalogue parsing operations.
#[derive(Debug, Error)]
pub enum ParseError {
    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML entity unescaping error.
    #[error("XML escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    /// Missing required attribute.
    #[error("missing required attribute '{attribute}' on element '{element}'")]
    MissingAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
    },

    /// Invalid attribute value.
    #[error("invalid value '{value}' for attribute '{attribute}' on element '{element}'")]
    InvalidAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
        /// Invalid value.
        value: String,
    },

    /// Malformed type expression.
    #[error("invalid type expression '{expression}': {message}")]
    InvalidTypeExpression {
        /// The offending expression.
        expression: String,
        /// What went wrong.
        message: String,
    },

    /// Invalid catalogue structure.
    #[error("invalid catalog structure: {message}")]
    InvalidStructure {
        /// Error message.
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Error type for catalogue validation.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Parsing error.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Two catalogue entries share a fully-qualified name.
    #[error("duplicate type definition: '{name}'")]
    DuplicateType {
        /// Fully-qualified type name.
        name: String,
    },

    /// A generic parameter is referenced but never declared.
    #[error("unbound generic parameter '{parameter}' in '{member}' of type '{type_name}'")]
    UnboundGenericParameter {
        /// Owning type.
        type_name: String,
        /// Member that references the parameter.
        member: String,
        /// Parameter name.
        parameter: String,
    },

    /// An enum constant does not fit the enum's underlying type.
    #[error("value {value} of '{constant}' is out of range for {underlying} in enum '{enum_name}'")]
    EnumValueOutOfRange {
        /// Enum name.
        enum_name: String,
        /// Constant name.
        constant: String,
        /// Declared value.
        value: i128,
        /// Underlying type name.
        underlying: String,
    },

    /// An enum declares an unsupported underlying type.
    #[error("unsupported underlying type '{underlying}' for enum '{enum_name}'")]
    InvalidUnderlyingType {
        /// Enum name.
        enum_name: String,
        /// Declared underlying type.
        underlying: String,
    },

    /// Validation error.
    #[error("validation error: {message}")]
    Validation {
        /// Error message.
        message: String,
    },
}

impl ParseError {
    /// Creates a missing attribute error.
    pub fn missing_attr(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            element: element.into(),
            attribute: attribute.into(),
        }
    }

    /// Creates an invalid attribute error.
    pub fn invalid_attr(
        element: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            element: element.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}
