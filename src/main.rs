//! Modgraph CLI - resolve the transitive import graph of a Python module

use clap::{Parser, Subcommand};
use modgraph::config::{self, ModgraphConfig};
use modgraph::{GraphBuilder, ModuleName, SearchPath};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "modgraph")]
#[command(version = "0.1.0")]
#[command(about = "Transitive import-graph resolver for bundling Python programs")]
#[command(long_about = r#"
Modgraph scans a Python entry module and follows every import it can
reach, resolving each against a search path under package,
namespace-package, and relative-import rules. The result is the exact
module set a bundler needs, plus every import that is missing or only
conditionally available.

Example usage:
  modgraph resolve --entry myapp.main --path ./src
  modgraph edges --entry myapp.main --path ./src
  modgraph resolve --entry myapp.main --path ./src --format json
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a modgraph.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the import graph and print the report
    Resolve {
        /// Qualified name of the entry module
        #[arg(short, long)]
        entry: Option<String>,

        /// Search-path root (repeatable, ordered)
        #[arg(short, long)]
        path: Vec<PathBuf>,

        /// Treat a module name as not-found (repeatable)
        #[arg(short = 'x', long)]
        exclude: Vec<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print the ordered dependency edge list
    Edges {
        /// Qualified name of the entry module
        #[arg(short, long)]
        entry: Option<String>,

        /// Search-path root (repeatable, ordered)
        #[arg(short, long)]
        path: Vec<PathBuf>,

        /// Treat a module name as not-found (repeatable)
        #[arg(short = 'x', long)]
        exclude: Vec<String>,
    },

    /// Write a starter modgraph.toml
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = config::load_config(cli.config.as_deref())?.unwrap_or_default();

    match cli.command {
        Commands::Resolve { entry, path, exclude, format } => {
            let report = run(&config, entry, path, exclude)?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report);
            }
        }

        Commands::Edges { entry, path, exclude } => {
            let report = run(&config, entry, path, exclude)?;
            for (from, to) in &report.edges {
                println!("{} -> {}", from, to);
            }
        }

        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(config::default_config_path);
            let starter = ModgraphConfig {
                entry: Some("myapp.main".to_string()),
                path: vec![PathBuf::from(".")],
                excludes: vec![],
                builtins: vec![],
            };
            config::write_config(&path, &starter, force)?;
            println!("📝 Wrote {}", path.display());
        }
    }

    Ok(())
}

fn run(
    config: &ModgraphConfig,
    entry: Option<String>,
    path: Vec<PathBuf>,
    exclude: Vec<String>,
) -> anyhow::Result<modgraph::Report> {
    let entry = entry
        .or_else(|| config.entry.clone())
        .ok_or_else(|| anyhow::anyhow!("no entry module (pass --entry or set it in modgraph.toml)"))?;
    let entry = ModuleName::parse(&entry)?;

    let roots = if path.is_empty() { config.path.clone() } else { path };
    if roots.is_empty() {
        anyhow::bail!("no search path (pass --path or set it in modgraph.toml)");
    }

    let mut search = SearchPath::new(roots);
    for builtin in &config.builtins {
        search.add_builtin(builtin);
    }

    let mut builder = GraphBuilder::new(search)?;
    for name in exclude.into_iter().chain(config.excludes.iter().cloned()) {
        builder = builder.exclude(name);
    }

    Ok(builder.build(&entry)?)
}
