//! Error types for code generation.

use thiserror::Error;

/// Error type for code generation operations.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Catalogue parsing error.
    #[error("catalog parse error: {0}")]
    Parse(#[from] stubgen_metadata::ParseError),

    /// Catalogue validation error.
    #[error("catalog error: {0}")]
    Catalog(#[from] stubgen_metadata::CatalogError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Member that cannot be expressed as a hook.
    #[error("cannot stub member '{member}' of '{type_name}': {reason}")]
    UnsupportedMember {
        /// Declaring type.
        type_name: String,
        /// Member name.
        member: String,
        /// Why the member is rejected.
        reason: String,
    },

    /// Two members map to the same configuration slot.
    #[error("hook name '{hook}' is used twice in '{type_name}'")]
    HookCollision {
        /// Declaring type.
        type_name: String,
        /// Colliding hook name.
        hook: String,
    },
}

impl CodegenError {
    /// Creates an unsupported-member error.
    pub fn unsupported(
        type_name: impl Into<String>,
        member: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnsupportedMember {
            type_name: type_name.into(),
            member: member.into(),
            reason: reason.into(),
        }
    }
}
