use anyhow::Context;
use cinder_core::{
    AnalyzerOptions, ConsoleDiagnosticHandler, Node, OptimizationLevel, OptionOverrides, Optimizer,
};
use clap::Parser;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const CONFIG_FILE: &str = "cinder.yaml";

/// Cinder - optimizing analysis passes for compiled templates
#[derive(Parser, Debug, Clone)]
#[command(name = "cinder")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Template syntax trees (JSON) to optimize
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Path to a cinder.yaml or cinder.json options file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Optimization preset (0-3) used when no config file is given
    #[arg(short = 'O', long = "opt-level", value_name = "LEVEL")]
    opt_level: Option<String>,

    /// Output directory for optimized syntax trees
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Write a default cinder.yaml to the current directory
    #[arg(long)]
    init: bool,

    /// Print diagnostics without ANSI styling
    #[arg(long)]
    plain: bool,

    #[arg(long, value_name = "BOOL")]
    cache_resolved_placeholders: Option<bool>,

    #[arg(long, value_name = "BOOL")]
    cache_filtered_placeholders: Option<bool>,

    #[arg(long, value_name = "BOOL")]
    enable_warnings: Option<bool>,

    #[arg(long, value_name = "BOOL")]
    warnings_as_errors: Option<bool>,

    #[arg(long, value_name = "BOOL")]
    static_analysis: Option<bool>,

    #[arg(long, value_name = "BOOL")]
    directly_access_defined_variables: Option<bool>,

    #[arg(long, value_name = "BOOL")]
    hoist_conditional_aliases: Option<bool>,
}

impl Cli {
    fn overrides(&self) -> OptionOverrides {
        OptionOverrides {
            cache_resolved_placeholders: self.cache_resolved_placeholders,
            enable_warnings: self.enable_warnings,
            warnings_as_errors: self.warnings_as_errors,
            static_analysis: self.static_analysis,
            directly_access_defined_variables: self.directly_access_defined_variables,
            hoist_conditional_aliases: self.hoist_conditional_aliases,
            cache_filtered_placeholders: self.cache_filtered_placeholders,
        }
    }

    fn level(&self) -> anyhow::Result<OptimizationLevel> {
        match &self.opt_level {
            Some(level) => OptimizationLevel::parse(level)
                .with_context(|| format!("invalid optimization level '{}', expected 0-3", level)),
            None => Ok(OptimizationLevel::default()),
        }
    }
}

/// What happened to one input file
enum Outcome {
    Optimized { warnings: usize, hoists: usize },
    /// The analyzer rejected the template; its diagnostics were already printed
    Rejected,
}

fn main() -> anyhow::Result<()> {
    // Set RUST_LOG=debug for detailed logs, RUST_LOG=info for normal output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.init {
        AnalyzerOptions::init_file(Path::new(CONFIG_FILE), cli.level()?)
            .with_context(|| format!("failed to write {}", CONFIG_FILE))?;
        println!("Created {}", CONFIG_FILE);
        return Ok(());
    }

    if cli.files.is_empty() {
        eprintln!("Error: No input files specified. Use --help for usage information.");
        std::process::exit(1);
    }

    let options = load_options(&cli)?;
    debug!(?options, "resolved analyzer options");
    info!("Optimizing {} file(s)", cli.files.len());

    let results: Vec<(&PathBuf, anyhow::Result<Outcome>)> = cli
        .files
        .par_iter()
        .map(|path| (path, optimize_file(path, &options, &cli)))
        .collect();

    let mut failed = 0;
    for (path, result) in &results {
        match result {
            Ok(Outcome::Optimized { warnings, hoists }) => {
                debug!(file = %path.display(), warnings, hoists, "optimized");
            }
            Ok(Outcome::Rejected) => failed += 1,
            Err(err) => {
                eprintln!("error: {}: {:#}", path.display(), err);
                failed += 1;
            }
        }
    }

    info!(
        "Optimized {} of {} file(s)",
        results.len() - failed,
        results.len()
    );
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Config file (or preset) first, then per-flag overrides
fn load_options(cli: &Cli) -> anyhow::Result<AnalyzerOptions> {
    let mut options = match &cli.config {
        Some(path) => AnalyzerOptions::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AnalyzerOptions::for_level(cli.level()?),
    };
    options.apply(&cli.overrides());
    Ok(options)
}

fn optimize_file(path: &Path, options: &AnalyzerOptions, cli: &Cli) -> anyhow::Result<Outcome> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut root: Node = serde_json::from_str(&source).context("malformed syntax tree")?;

    let handler = ConsoleDiagnosticHandler::new(!cli.plain).with_origin(path.display().to_string());
    let optimizer = Optimizer::new(options.clone()).with_handler(Arc::new(handler));
    let report = match optimizer.optimize(&mut root) {
        Ok(report) => report,
        Err(_) => return Ok(Outcome::Rejected),
    };

    if let Some(out_dir) = &cli.out_dir {
        let output_path = output_path(path, out_dir);
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("failed to create {}", out_dir.display()))?;
        let json = serde_json::to_string_pretty(&root)?;
        std::fs::write(&output_path, json)
            .with_context(|| format!("failed to write {}", output_path.display()))?;
        debug!(output = %output_path.display(), "wrote optimized tree");
    }

    Ok(Outcome::Optimized {
        warnings: report.warnings.len(),
        hoists: report.hoist_count(),
    })
}

fn output_path(input: &Path, out_dir: &Path) -> PathBuf {
    let file_name = input
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("template.json"));
    out_dir.join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("cinder").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_preset_then_overrides() {
        let cli = parse(&["-O", "2", "--static-analysis", "true", "--cache-resolved-placeholders", "false", "t.json"]);
        let options = load_options(&cli).unwrap();
        assert!(options.static_analysis);
        assert!(options.directly_access_defined_variables);
        assert!(!options.cache_resolved_placeholders);
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let cli = parse(&["-O", "7", "t.json"]);
        assert!(load_options(&cli).is_err());
    }

    #[test]
    fn test_output_path_keeps_file_name() {
        let path = output_path(Path::new("templates/index.json"), Path::new("out"));
        assert_eq!(path, PathBuf::from("out/index.json"));
    }
}
