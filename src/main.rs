//! scaffold-plugins CLI entrypoint
//! Loads a design, evaluates its security expressions and reports on them.
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use scaffold_plugins::Config;
use scaffold_plugins::design::{DesignError, DesignRoot, eval};
use scaffold_plugins::infrastructure::{DesignLoader, FileDesignLoader, RequirementsReport};
use scaffold_plugins::plugins::{PluginRegistry, Stage};

#[derive(Parser)]
#[command(name = "scaffold-plugins")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Validate and finalize the security expressions of a design
    Validate {
        /// Design document (YAML or JSON)
        #[arg(long)]
        design: Option<PathBuf>,
    },
    /// Print the effective security requirements of every method as JSON
    Requirements {
        /// Design document (YAML or JSON)
        #[arg(long)]
        design: Option<PathBuf>,
        /// Only report the methods of this service
        #[arg(long)]
        service: Option<String>,
    },
    /// List the registered plugins per stage
    Plugins,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with default level INFO
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).await?;

    match &cli.command {
        Commands::Validate { design } => {
            let root = evaluate(&config, design.as_deref()).await?;
            info!(
                api = %root.api.name,
                services = root.services().len(),
                "Design is valid"
            );
        }
        Commands::Requirements { design, service } => {
            let root = evaluate(&config, design.as_deref()).await?;
            if let Some(service) = service {
                if root.service(service).is_none() {
                    anyhow::bail!("Unknown service: {service}");
                }
            }
            let report = RequirementsReport::new(&root, service.as_deref());
            println!(
                "{}",
                report.to_json().context("Failed to serialize requirements")?
            );
        }
        Commands::Plugins => {
            let registry = PluginRegistry::with_defaults(&config)
                .context("Failed to initialize plugins")?;
            for stage in [Stage::Gen, Stage::Example] {
                println!("{stage}: {}", registry.names(stage).join(", "));
            }
        }
    }
    Ok(())
}

async fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .await
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Load the design and run validation then finalization on it
async fn evaluate(config: &Config, design: Option<&Path>) -> anyhow::Result<DesignRoot> {
    let path = config
        .design_path(design)
        .context("No design document given, use --design or set [design] path")?;

    info!(path = %path.display(), "Loading design");
    let mut root = FileDesignLoader::new()
        .load(&path)
        .await
        .with_context(|| format!("Failed to load design from {}", path.display()))?;

    match eval::run(&mut root) {
        Ok(()) => Ok(root),
        Err(DesignError::Validation(errors)) => {
            for err in &errors {
                error!(node = %err.node, "{}", err.message);
            }
            anyhow::bail!("Design has {} validation error(s)", errors.len())
        }
        Err(e) => Err(e).context("Failed to evaluate design"),
    }
}
