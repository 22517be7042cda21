//! mesh-manifold: report non-manifold edges in a triangle mesh and export the
//! welded result as OBJ.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use mesh_manifold::{
    CheckConfig, CollectingSink, ManifoldChecker, MergeStrategy, NonManifoldOccurrence,
    NonManifoldReport,
};

mod output;

use output::ConsoleSink;

#[derive(Parser, Debug)]
#[command(name = "mesh-manifold")]
#[command(about = "Find edges not shared by exactly two triangles and export the mesh as OBJ", long_about = None)]
struct Cli {
    /// Input mesh file (.stl or .obj)
    input: PathBuf,

    /// Output OBJ file path
    #[arg(short, long, default_value = "./output_obj.obj")]
    output: PathBuf,

    /// Per-axis tolerance for merging coordinates
    #[arg(long)]
    epsilon: Option<f64>,

    /// Merge chains of near-duplicates into one vertex
    #[arg(long)]
    transitive: bool,

    /// TOML file with check settings; flags override its values
    #[arg(long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Suppress report output
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Machine-readable result of one run.
#[derive(Debug, Serialize)]
struct Summary<'a> {
    input: &'a PathBuf,
    output: &'a PathBuf,
    config: &'a CheckConfig,
    report: &'a NonManifoldReport,
    occurrences: &'a [NonManifoldOccurrence],
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<CheckConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {:?}", path))?;
            CheckConfig::from_toml(&text)
                .with_context(|| format!("Failed to parse config file {:?}", path))?
        }
        None => CheckConfig::default(),
    };

    if let Some(epsilon) = cli.epsilon {
        config = config.with_epsilon(epsilon);
    }
    if cli.transitive {
        config = config.with_merge(MergeStrategy::Transitive);
    }

    Ok(config.validated()?)
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    let checker = ManifoldChecker::load(&cli.input, &config)
        .with_context(|| format!("Failed to load mesh from {:?}", cli.input))?;

    match cli.format {
        OutputFormat::Text => {
            output::counts(checker.topology(), cli.quiet);

            let mut sink = ConsoleSink::stdout(cli.quiet);
            let report = checker.check_non_manifold(&mut sink);
            sink.finish().context("Failed to write report")?;
            mesh_manifold::log_report(&report);

            checker
                .export_obj(&cli.output)
                .with_context(|| format!("Failed to export OBJ to {:?}", cli.output))?;

            output::success(
                &format!("Exported {} triangles to {}", report.triangle_count, cli.output.display()),
                cli.format,
                cli.quiet,
            );
        }
        OutputFormat::Json => {
            let mut sink = CollectingSink::default();
            let report = checker.check_non_manifold(&mut sink);
            mesh_manifold::log_report(&report);

            checker
                .export_obj(&cli.output)
                .with_context(|| format!("Failed to export OBJ to {:?}", cli.output))?;

            let summary = Summary {
                input: &cli.input,
                output: &cli.output,
                config: checker.config(),
                report: &report,
                occurrences: &sink.occurrences,
            };
            output::print(&summary, cli.format, cli.quiet);
        }
    }

    Ok(())
}
