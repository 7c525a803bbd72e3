//! Stubgen command-line tool.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use stubgen::prelude::*;
use tracing::info;

const USAGE: &str = "Usage: stubgen <modulePath> <outputDir>";

#[derive(Parser)]
#[command(name = "stubgen")]
#[command(about = "Generate configurable C# stubs from a .NET type catalogue", long_about = None)]
#[command(version)]
struct Cli {
    /// Type catalogue exported from the module
    module_path: Option<PathBuf>,
    /// Root directory for generated files
    output_dir: Option<PathBuf>,
    /// Extension of generated files
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    extension: String,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let (Some(module_path), Some(output_dir)) = (cli.module_path, cli.output_dir) else {
        println!("{}", USAGE);
        return Ok(ExitCode::SUCCESS);
    };

    let module_path = std::path::absolute(&module_path)
        .with_context(|| format!("invalid module path {}", module_path.display()))?;
    let output_dir = std::path::absolute(&output_dir)
        .with_context(|| format!("invalid output directory {}", output_dir.display()))?;
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let catalog = parse_catalog_file(&module_path)
        .with_context(|| format!("failed to load {}", module_path.display()))?;
    validate_catalog(&catalog)?;
    info!(
        "loaded {} types from {}",
        catalog.types().len(),
        catalog.module_name()
    );

    let report = StubWriter::new(&output_dir)
        .extension(cli.extension)
        .write_all(&Generator::new(&catalog))
        .with_context(|| format!("failed to write stubs under {}", output_dir.display()))?;

    for path in &report.written {
        println!("Generated {}", path.display());
    }
    for (type_name, error) in &report.failed {
        eprintln!("Failed {}: {}", type_name, error);
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_arguments_optional() {
        let cli = Cli::try_parse_from(["stubgen"]).unwrap();
        assert!(cli.module_path.is_none());
        assert!(cli.output_dir.is_none());
        assert_eq!(cli.extension, "cs");
    }

    #[test]
    fn test_cli_full_arguments() {
        let cli = Cli::try_parse_from([
            "stubgen",
            "Acme.Shop.xml",
            "out",
            "--extension",
            "g.cs",
        ])
        .unwrap();
        assert_eq!(cli.module_path, Some(PathBuf::from("Acme.Shop.xml")));
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.extension, "g.cs");
    }
}
