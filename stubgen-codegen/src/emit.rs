//! Writing generated units to disk.

use crate::error::CodegenError;
use crate::generator::{GeneratedUnit, Generator, SkipReason, TypeOutcome};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default extension of generated files.
pub const DEFAULT_EXTENSION: &str = "cs";

/// Writes generated units under an output directory.
///
/// A unit for namespace `A.B` and type `T` lands at `<out>/A/B/T.<ext>`.
/// Existing files are overwritten.
#[derive(Debug, Clone)]
pub struct StubWriter {
    output_dir: PathBuf,
    extension: String,
}

impl StubWriter {
    /// Creates a writer rooted at `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Sets the file extension (without the dot).
    #[must_use]
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Returns the output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Returns the path a unit is written to.
    #[must_use]
    pub fn unit_path(&self, unit: &GeneratedUnit) -> PathBuf {
        let mut path = self.output_dir.clone();
        for segment in unit.namespace.split('.').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path.push(format!("{}.{}", unit.type_name, self.extension));
        path
    }

    /// Writes one unit, creating its directory as needed.
    ///
    /// # Errors
    /// Returns `CodegenError::Io` if the directory or file cannot be written.
    pub fn write_unit(&self, unit: &GeneratedUnit) -> Result<PathBuf, CodegenError> {
        let path = self.unit_path(unit);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, &unit.source)?;
        debug!("wrote {}", path.display());
        Ok(path)
    }

    /// Runs the generator and writes every produced unit.
    ///
    /// Types that cannot be generated are logged and recorded in the report
    /// without stopping the run.
    ///
    /// # Errors
    /// Returns `CodegenError::Io` as soon as a directory or file cannot be
    /// written.
    pub fn write_all(&self, generator: &Generator<'_>) -> Result<GenerationReport, CodegenError> {
        let mut report = GenerationReport::default();

        for outcome in generator.generate() {
            match outcome {
                TypeOutcome::Generated(unit) => {
                    let path = self.write_unit(&unit)?;
                    report.written.push(path);
                }
                TypeOutcome::Skipped { type_name, reason } => {
                    report.skipped.push((type_name, reason));
                }
                TypeOutcome::Failed { type_name, error } => {
                    warn!("failed to generate {}: {}", type_name, error);
                    report.failed.push((type_name, error));
                }
            }
        }

        info!(
            "generated {} files ({} skipped, {} failed)",
            report.written.len(),
            report.skipped.len(),
            report.failed.len()
        );
        Ok(report)
    }
}

/// Summary of a generation run.
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Files written, in metadata order.
    pub written: Vec<PathBuf>,
    /// Types skipped, with the reason.
    pub skipped: Vec<(String, SkipReason)>,
    /// Types that could not be generated, with the cause.
    pub failed: Vec<(String, CodegenError)>,
}

impl GenerationReport {
    /// Returns true if no type failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::StubKind;
    use stubgen_metadata::parse_catalog;
    use tempfile::TempDir;

    fn unit(namespace: &str, type_name: &str) -> GeneratedUnit {
        GeneratedUnit {
            namespace: namespace.to_string(),
            type_name: type_name.to_string(),
            kind: StubKind::Class,
            source: "// generated\n".to_string(),
        }
    }

    #[test]
    fn test_unit_path_layout() {
        let writer = StubWriter::new("/out");
        assert_eq!(
            writer.unit_path(&unit("Acme.Data.Sql", "Store")),
            PathBuf::from("/out/Acme/Data/Sql/Store.cs")
        );

        let writer = writer.extension("g.cs");
        assert_eq!(
            writer.unit_path(&unit("Acme", "Box`1")),
            PathBuf::from("/out/Acme/Box`1.g.cs")
        );
    }

    #[test]
    fn test_write_unit_overwrites() {
        let dir = TempDir::new().unwrap();
        let writer = StubWriter::new(dir.path());

        let first = writer.write_unit(&unit("Acme.Core", "Widget")).unwrap();
        let mut second_unit = unit("Acme.Core", "Widget");
        second_unit.source = "// regenerated\n".to_string();
        let second = writer.write_unit(&second_unit).unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(&second).unwrap(), "// regenerated\n");
    }

    #[test]
    fn test_write_all_report() {
        let xml = r#"<catalog module="Test.dll">
    <type name="Shape" namespace="Acme.Geometry" kind="class">
        <method name="Area" returns="System.Double"/>
    </type>
    <type name="Kind" namespace="Acme.Geometry" kind="enum">
        <value name="Circle">0</value>
    </type>
    <type name="Detail" namespace="Acme.Geometry" kind="class" nested="true"/>
    <type name="Broken" namespace="Acme" kind="class">
        <event name="Lost" type="Other.Mystery"/>
    </type>
</catalog>"#;
        let catalog = parse_catalog(xml).unwrap();
        let dir = TempDir::new().unwrap();
        let writer = StubWriter::new(dir.path());

        let report = writer.write_all(&Generator::new(&catalog)).unwrap();

        assert_eq!(report.written.len(), 2);
        assert!(dir.path().join("Acme/Geometry/Shape.cs").exists());
        assert!(dir.path().join("Acme/Geometry/Kind.cs").exists());
        assert!(!dir.path().join("Acme/Geometry/Detail.cs").exists());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].1, SkipReason::Nested);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "Acme.Broken");
        assert!(!report.is_success());
    }

    #[test]
    fn test_write_all_propagates_io_errors() {
        let xml = r#"<catalog module="Test.dll">
    <type name="Good" namespace="Acme" kind="class">
        <method name="Run"/>
    </type>
</catalog>"#;
        let catalog = parse_catalog(xml).unwrap();
        let dir = TempDir::new().unwrap();
        // A regular file where the namespace directory belongs.
        fs::write(dir.path().join("Acme"), "occupied").unwrap();

        let result = StubWriter::new(dir.path()).write_all(&Generator::new(&catalog));

        assert!(matches!(result, Err(CodegenError::Io(_))));
    }
}
