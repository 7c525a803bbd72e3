//! Prelude module for convenient imports.
//!
//! ```ignore
//! use stubgen::prelude::*;
//! ```

// Metadata
pub use stubgen_metadata::{
    Catalog, CatalogError, MetadataSource, ParseError, TypeDef, TypeRef, parse_catalog,
    parse_catalog_file, validate_catalog,
};

// Generation
pub use stubgen_codegen::emit::DEFAULT_EXTENSION;
pub use stubgen_codegen::{
    CodegenError, GeneratedUnit, GenerationReport, Generator, SkipReason, StubKind, StubWriter,
    TypeOutcome, generate_from_file, generate_from_xml,
};
