use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dep_audit::{
    cache::Cache,
    checker::{AuditSource, FileAudit, NpmAudit, OutdatedProbe, RegistryProbe},
    config::Config,
    engine::{self, AggregateOptions, AuditRun, EXIT_FAILURE, EXIT_SUCCESS},
    filter::ExclusionSet,
    model::Severity,
    output::{print_outcome, DisplayOptions, OutputFormat},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dep-audit")]
#[command(
    author,
    version,
    about = "Audit npm dependencies for vulnerabilities and outdated packages"
)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    audit: AuditArgs,
}

#[derive(clap::Args)]
struct AuditArgs {
    /// Project path
    #[arg(short, long, default_value = ".")]
    path: PathBuf,

    /// Minimum severity shown in the vulnerability table (none, low, moderate, high, critical)
    #[arg(short, long)]
    severity: Option<Severity>,

    /// Comma-separated packages to exclude
    #[arg(short = 'x', long)]
    exclude: Option<String>,

    /// Emit GitHub Actions annotations
    #[arg(long)]
    gha: bool,

    /// Fail when a vulnerability at or above this severity is found
    #[arg(long)]
    fail_on: Option<Severity>,

    /// Output format (table, json)
    #[arg(short, long)]
    format: Option<String>,

    /// Config file to use instead of the one found in the project
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read a saved `npm audit --json` report instead of running npm
    #[arg(long)]
    audit_file: Option<PathBuf>,

    /// Skip the outdated dependency check
    #[arg(long)]
    no_outdated: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or create the project config file
    Config {
        /// Project path
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Write a default dep-audit.toml
        #[arg(long)]
        init: bool,
    },

    /// Clear cached registry answers
    ClearCache,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Unexpected error: {:#}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config { path, init }) => {
            handle_config(&path, init)?;
            Ok(EXIT_SUCCESS)
        }
        Some(Commands::ClearCache) => {
            Cache::default().clear()?;
            println!("Cache cleared.");
            Ok(EXIT_SUCCESS)
        }
        None => {
            init_logging(cli.audit.verbose);
            run_audit(cli.audit).await
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "dep_audit=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run_audit(args: AuditArgs) -> Result<u8> {
    let project = std::path::absolute(&args.path)
        .with_context(|| format!("Invalid project path: {}", args.path.display()))?;

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::discover(&project),
    };

    let format_str = args.format.unwrap_or(config.format.clone());
    let format = OutputFormat::from_str(&format_str).map_err(|e| anyhow::anyhow!(e))?;
    let is_interactive = format == OutputFormat::Table;

    // A flag that names no packages leaves the configured list in place.
    let exclusions = args
        .exclude
        .as_deref()
        .map(ExclusionSet::parse_list)
        .filter(|set| !set.is_empty())
        .unwrap_or_else(|| ExclusionSet::new(&config.exclude));
    let options = AggregateOptions {
        annotations: args.gha || config.github_annotations,
        fail_on: args.fail_on.unwrap_or(config.fail_on),
    };
    let display = DisplayOptions {
        min_severity: args.severity.unwrap_or(config.severity),
        color: std::io::stdout().is_terminal(),
    };

    let source: Box<dyn AuditSource> = match &args.audit_file {
        Some(path) => Box::new(FileAudit::new(path)),
        None => Box::new(NpmAudit::new()),
    };
    let probe = (!args.no_outdated && config.check_outdated).then(|| {
        RegistryProbe::new(&config.registry).with_cache(Cache::new(config.cache_ttl_hours))
    });

    if is_interactive {
        println!("Running {} on {}...", source.name(), project.display());
    }

    let spinner = (is_interactive && std::io::stderr().is_terminal()).then(|| audit_spinner(probe.is_some()));

    let run = engine::run(
        &project,
        source.as_ref(),
        probe.as_ref().map(|p| p as &dyn OutdatedProbe),
        &exclusions,
        &options,
    )
    .await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match &run {
        AuditRun::NoResult => {
            eprintln!("Could not obtain audit results.");
        }
        AuditRun::Completed(outcome) => {
            print_outcome(outcome, format, &display)?;
        }
    }

    Ok(run.result_code())
}

fn audit_spinner(checking_outdated: bool) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(if checking_outdated {
        "Auditing and checking for outdated dependencies..."
    } else {
        "Auditing dependencies..."
    });
    pb
}

fn handle_config(project: &Path, init: bool) -> Result<()> {
    if init {
        let path = project.join("dep-audit.toml");
        if path.exists() {
            println!("Config file already exists at: {}", path.display());
            return Ok(());
        }
        std::fs::write(&path, Config::generate_default_config())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Created config file at: {}", path.display());
        return Ok(());
    }

    match Config::candidate_paths(project).into_iter().find(|p| p.is_file()) {
        Some(path) => {
            let content = std::fs::read_to_string(&path)?;
            println!("Config file: {}", path.display());
            println!();
            println!("{}", content);
        }
        None => {
            println!("No config file found.");
            println!("Run 'dep-audit config --init' to create one.");
            println!();
            println!("Default configuration:");
            println!("{}", Config::generate_default_config());
        }
    }

    Ok(())
}
