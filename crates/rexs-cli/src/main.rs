//! # rexs-cli
//!
//! Command line interface for the REXS engine.
//!
//! Exit codes: `0` when every model validates cleanly, `1` when warnings
//! were recorded, `2` when a model failed to validate.

use anyhow::Context;
use clap::{Parser, Subcommand};
use rexs_ir::{Mode, ValidationResult};
use rexs_pipeline::{FileReport, Pipeline, PipelineConfig};
use rexs_schema::SchemaLoader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rexs")]
#[command(about = "REXS model validation engine")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate model files and merge their data sources
    Validate {
        /// Model files
        #[arg(required = true)]
        models: Vec<PathBuf>,

        /// Schema directory
        #[arg(short, long)]
        schemas: Option<PathBuf>,

        /// Record schema violations as warnings
        #[arg(long)]
        relaxed: bool,
    },

    /// List the schemas found in a directory
    Schemas {
        /// Schema directory
        dir: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn print_issues(result: &ValidationResult) {
    for issue in result.issues() {
        println!("  {issue}");
    }
}

fn print_report(report: &FileReport) {
    println!("file={}", report.path.display());
    print_issues(&report.result);
    println!(
        "Critical: {}, Errors: {}, Warnings: {}",
        report.result.criticals().count(),
        report.result.errors().count(),
        report.result.warnings().count()
    );
    match &report.model {
        Some(model) if report.result.is_empty() => println!(
            "Validation passed with no warnings ({} components, {} relations).",
            model.components().len(),
            model.relations().len()
        ),
        Some(_) => println!("Validation passed with warnings."),
        None => println!("Validation failed."),
    }
}

fn validate(
    mut config: PipelineConfig,
    models: &[PathBuf],
    schemas: Option<PathBuf>,
    relaxed: bool,
) -> anyhow::Result<ExitCode> {
    if let Some(schemas) = schemas {
        config.schema_dir = schemas;
    }
    if relaxed {
        config.mode = Mode::Relaxed;
    }
    if !config.schema_dir.is_dir() {
        anyhow::bail!(
            "Failed to load schemas: {} is not a directory",
            config.schema_dir.display()
        );
    }

    let mut pipeline = Pipeline::new(config).context("Failed to set up pipeline")?;
    if !pipeline.schema_issues().is_empty() {
        println!("schemas={}", pipeline.config().schema_dir.display());
        print_issues(pipeline.schema_issues());
    }

    let reports = pipeline.validate_files(models);
    for report in &reports {
        print_report(report);
    }

    let stats = pipeline.stats();
    tracing::info!(
        files = stats.files_processed,
        failed = stats.files_failed,
        issues = stats.issues,
        "Validation finished"
    );

    if stats.files_failed > 0 {
        Ok(ExitCode::from(2))
    } else if stats.issues > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn list_schemas(dir: &Path) -> anyhow::Result<ExitCode> {
    if !dir.is_dir() {
        anyhow::bail!("Failed to load schemas: {} is not a directory", dir.display());
    }
    let (registry, result) = SchemaLoader::new(vec![dir.to_path_buf()]).load();

    let mut keys = registry.keys();
    keys.sort();
    for (version, language) in keys {
        println!("{version} {language}");
    }
    print_issues(&result);

    if result.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(2))
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Validate {
            models,
            schemas,
            relaxed,
        } => validate(config, &models, schemas, relaxed),
        Commands::Schemas { dir } => list_schemas(&dir),
    }
}
