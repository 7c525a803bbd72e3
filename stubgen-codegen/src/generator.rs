//! Type-kind dispatch.
//!
//! Decides, for every type in a metadata source, whether a stub is produced
//! and which generator produces it.

use crate::csharp::{
    ClassGenerator, DelegateGenerator, EnumGenerator, InterfaceGenerator, StructGenerator,
};
use crate::error::CodegenError;
use std::fmt;
use stubgen_metadata::{MetadataSource, SYSTEM_NAMESPACE, TypeDef, TypeFlavor, TypeRef, validate_type};
use tracing::debug;

/// Guards inheritance walks against cyclic metadata.
const MAX_INHERITANCE_DEPTH: usize = 64;

/// Generation strategy for a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StubKind {
    /// Class stub plus configuration type.
    Class,
    /// Interface re-declaration.
    Interface,
    /// Struct stub.
    Struct,
    /// Enum re-declaration.
    Enum,
    /// Delegate re-declaration.
    Delegate,
}

impl fmt::Display for StubKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Delegate => "delegate",
        };
        f.write_str(name)
    }
}

/// Why a type produced no output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Type is not public.
    NotPublic,
    /// Type is nested in another type.
    Nested,
    /// Type lives in the global namespace.
    NoNamespace,
    /// Entry only describes a referenced type.
    External,
    /// Type kind has no generation strategy.
    UnsupportedKind(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPublic => f.write_str("not public"),
            Self::Nested => f.write_str("nested type"),
            Self::NoNamespace => f.write_str("no namespace"),
            Self::External => f.write_str("external reference"),
            Self::UnsupportedKind(kind) => write!(f, "unsupported kind '{}'", kind),
        }
    }
}

/// Routing decision for a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Generate with the given strategy.
    Generate(StubKind),
    /// Produce nothing.
    Skip(SkipReason),
}

/// Source text produced for one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    /// Namespace the file is placed under.
    pub namespace: String,
    /// Metadata name of the type, used as the file stem.
    pub type_name: String,
    /// Strategy that produced the text.
    pub kind: StubKind,
    /// Generated source.
    pub source: String,
}

/// Result of processing one type.
#[derive(Debug)]
pub enum TypeOutcome {
    /// A source file was produced.
    Generated(GeneratedUnit),
    /// The type was skipped.
    Skipped {
        /// Full name of the type.
        type_name: String,
        /// Why it was skipped.
        reason: SkipReason,
    },
    /// Generation failed for this type only.
    Failed {
        /// Full name of the type.
        type_name: String,
        /// Failure cause.
        error: CodegenError,
    },
}

/// Stub generator over a metadata source.
pub struct Generator<'a> {
    source: &'a dyn MetadataSource,
}

impl<'a> Generator<'a> {
    /// Creates a new generator.
    #[must_use]
    pub fn new(source: &'a dyn MetadataSource) -> Self {
        Self { source }
    }

    /// Processes every type of the source, in metadata order.
    ///
    /// A failure on one type is recorded and does not stop the others.
    #[must_use]
    pub fn generate(&self) -> Vec<TypeOutcome> {
        self.source
            .types()
            .iter()
            .map(|type_def| {
                let type_name = type_def.full_name();
                match self.generate_type(type_def) {
                    Ok(Ok(unit)) => TypeOutcome::Generated(unit),
                    Ok(Err(reason)) => {
                        debug!("skipping {}: {}", type_name, reason);
                        TypeOutcome::Skipped { type_name, reason }
                    }
                    Err(error) => TypeOutcome::Failed { type_name, error },
                }
            })
            .collect()
    }

    /// Decides how a type is handled.
    #[must_use]
    pub fn classify(&self, type_def: &TypeDef) -> Dispatch {
        if !type_def.visibility.is_public() {
            return Dispatch::Skip(SkipReason::NotPublic);
        }
        if type_def.is_nested {
            return Dispatch::Skip(SkipReason::Nested);
        }
        if type_def.is_external {
            return Dispatch::Skip(SkipReason::External);
        }
        if type_def.namespace.as_deref().is_none_or(str::is_empty) {
            return Dispatch::Skip(SkipReason::NoNamespace);
        }

        match &type_def.flavor {
            TypeFlavor::Enum => Dispatch::Generate(StubKind::Enum),
            TypeFlavor::Interface => Dispatch::Generate(StubKind::Interface),
            TypeFlavor::Struct => Dispatch::Generate(StubKind::Struct),
            TypeFlavor::Class if self.is_delegate(type_def) => {
                Dispatch::Generate(StubKind::Delegate)
            }
            TypeFlavor::Class => Dispatch::Generate(StubKind::Class),
            TypeFlavor::Other(kind) => Dispatch::Skip(SkipReason::UnsupportedKind(kind.clone())),
        }
    }

    /// Generates the unit for one type, or the reason it is skipped.
    ///
    /// # Errors
    /// Returns `CodegenError` if the type fails validation or a member
    /// cannot be generated.
    pub fn generate_type(
        &self,
        type_def: &TypeDef,
    ) -> Result<Result<GeneratedUnit, SkipReason>, CodegenError> {
        let kind = match self.classify(type_def) {
            Dispatch::Generate(kind) => kind,
            Dispatch::Skip(reason) => return Ok(Err(reason)),
        };

        validate_type(type_def)?;
        debug!("generating {} stub for {}", kind, type_def.full_name());

        let source = match kind {
            StubKind::Enum => EnumGenerator::new(type_def).generate(),
            StubKind::Interface => InterfaceGenerator::new(type_def).generate(),
            StubKind::Struct => StructGenerator::new(type_def).generate(),
            StubKind::Delegate => DelegateGenerator::new(type_def).generate()?,
            StubKind::Class => {
                ClassGenerator::new(self.source, type_def, self.class_bases(type_def)).generate()?
            }
        };

        Ok(Ok(GeneratedUnit {
            namespace: type_def.namespace.clone().unwrap_or_default(),
            type_name: type_def.name.clone(),
            kind,
            source,
        }))
    }

    /// Returns true if the type derives from `System.MulticastDelegate`,
    /// directly or through catalogue types.
    fn is_delegate(&self, type_def: &TypeDef) -> bool {
        let mut base = type_def.base_type.as_ref();
        for _ in 0..MAX_INHERITANCE_DEPTH {
            let Some(ty) = base else {
                return false;
            };
            if ty.is(SYSTEM_NAMESPACE, "MulticastDelegate") || ty.is(SYSTEM_NAMESPACE, "Delegate")
            {
                return true;
            }
            base = self.source.resolve(ty).and_then(|d| d.base_type.as_ref());
        }
        false
    }

    /// Computes the base list of a class stub.
    ///
    /// The base class comes first unless it is `System.Object`. It is
    /// followed by the interfaces the class implements itself, closed over
    /// interface inheritance, minus every interface the base class already
    /// implements. Interfaces are compared as full type references, so two
    /// instantiations of one generic interface are both kept.
    #[must_use]
    pub fn class_bases(&self, type_def: &TypeDef) -> Vec<TypeRef> {
        let mut bases = Vec::new();

        let mut own = Vec::new();
        for iface in &type_def.interfaces {
            self.push_interface(iface, &mut own, 0);
        }

        let mut inherited = Vec::new();
        if let Some(base) = &type_def.base_type {
            if !base.is_object() {
                bases.push(base.clone());
            }
            self.collect_implemented(base, &mut inherited, 0);
        }

        bases.extend(own.into_iter().filter(|i| !inherited.contains(i)));
        bases
    }

    /// Adds `iface` and every interface it inherits.
    fn push_interface(&self, iface: &TypeRef, out: &mut Vec<TypeRef>, depth: usize) {
        if depth > MAX_INHERITANCE_DEPTH || out.contains(iface) {
            return;
        }
        out.push(iface.clone());

        if let Some(def) = self.source.resolve(iface) {
            for parent in &def.interfaces {
                let parent = instantiate(def, iface, parent);
                self.push_interface(&parent, out, depth + 1);
            }
        }
    }

    /// Adds every interface implemented by `ty` and its base classes.
    fn collect_implemented(&self, ty: &TypeRef, out: &mut Vec<TypeRef>, depth: usize) {
        if depth > MAX_INHERITANCE_DEPTH {
            return;
        }
        let Some(def) = self.source.resolve(ty) else {
            return;
        };

        for iface in &def.interfaces {
            let iface = instantiate(def, ty, iface);
            self.push_interface(&iface, out, depth + 1);
        }
        if let Some(base) = &def.base_type {
            let base = instantiate(def, ty, base);
            self.collect_implemented(&base, out, depth + 1);
        }
    }
}

/// Rewrites a type mentioned by `def` in terms of the arguments `reference`
/// instantiates it with.
fn instantiate(def: &TypeDef, reference: &TypeRef, mentioned: &TypeRef) -> TypeRef {
    let Some(named) = reference.as_named() else {
        return mentioned.clone();
    };
    let params: Vec<&str> = def.generic_params.iter().map(|p| p.name.as_str()).collect();
    mentioned.substitute(&params, &named.type_args)
}
