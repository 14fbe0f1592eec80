//! CLI command definitions, routing, and tracing setup.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use tracing::info;

use profilegen_core::ContextAssembler;
use profilegen_shared::{AppConfig, init_config, load_config, load_config_from};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// profilegen — deterministic context assembly for job-profile generation.
#[derive(Parser)]
#[command(
    name = "profilegen",
    version,
    about = "Assemble bounded generation context from an org chart and metric documents.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Use a specific config file instead of ~/.profilegen/profilegen.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Assemble generation context for a department and role.
    Assemble {
        /// Department short name or full path.
        #[arg(short, long)]
        department: String,

        /// Role title.
        #[arg(short, long)]
        role: String,
    },

    /// List or filter org units for search/autocomplete.
    Search {
        /// Case-insensitive filter over names and paths; omit for all.
        query: Option<String>,
    },

    /// Print the org tree with a target path highlighted.
    Tree {
        /// Full unit path to highlight.
        #[arg(long)]
        target: String,
    },

    /// Resolve the metric document for a department.
    Metric {
        /// Department short name or full path.
        department: String,
    },

    /// Validate the loaded data set: index invariants and metric coverage.
    Validate,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "profilegen=info",
        1 => "profilegen=debug",
        _ => "profilegen=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().with_env_filter(env_filter).json().init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command routing
// ---------------------------------------------------------------------------

/// Route and execute the parsed command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Assemble { department, role } => {
            let assembler = build_assembler(&cli.config)?;
            let context = assembler.assemble(&department, &role);
            println!("{}", serde_json::to_string_pretty(&context)?);
            Ok(())
        }

        Command::Search { query } => {
            let assembler = build_assembler(&cli.config)?;
            let entries = assembler.search(query.as_deref().unwrap_or(""));
            info!(count = entries.len(), "search complete");
            println!("{}", serde_json::to_string_pretty(&entries)?);
            Ok(())
        }

        Command::Tree { target } => {
            let assembler = build_assembler(&cli.config)?;
            let tree = assembler.highlighted_tree(&target);
            println!("{}", serde_json::to_string_pretty(&tree)?);
            Ok(())
        }

        Command::Metric { department } => {
            let assembler = build_assembler(&cli.config)?;
            let resolved = assembler.resolve_metric(&department);
            println!("provenance: {}", resolved.provenance);
            println!("source: {}", resolved.source);
            println!();
            println!("{}", resolved.text);
            Ok(())
        }

        Command::Validate => {
            let assembler = build_assembler(&cli.config)?;
            run_validate(&assembler)
        }

        Command::Config { action } => run_config(action),
    }
}

/// Load config (explicit path or the default location) and construct the
/// assembler from it.
fn build_assembler(config_path: &Option<PathBuf>) -> Result<ContextAssembler> {
    let config = resolve_config(config_path)?;
    ContextAssembler::from_config(&config)
        .map_err(|e| eyre!("failed to build context assembler: {e}"))
}

fn resolve_config(config_path: &Option<PathBuf>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

fn run_validate(assembler: &ContextAssembler) -> Result<()> {
    let index = assembler.index();
    index
        .verify_invariants()
        .map_err(|e| eyre!("index invariants violated: {e}"))?;

    let coverage = assembler.metric_coverage();
    let mut by_provenance: BTreeMap<String, usize> = BTreeMap::new();
    for (_, provenance) in &coverage {
        *by_provenance.entry(provenance.to_string()).or_default() += 1;
    }

    println!("units: {}", index.unit_count());
    println!("positions: {}", index.position_count());
    println!("metric coverage: {} departments", coverage.len());
    for (provenance, count) in &by_provenance {
        println!("  {provenance}: {count}");
    }

    info!("validation passed");
    Ok(())
}

fn run_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = init_config()?;
            println!("created {}", path.display());
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_config()?;
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}
