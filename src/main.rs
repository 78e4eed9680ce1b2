// file: src/main.rs
// description: commandline application entry point
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use workspace_init::{Config, Synchronizer, SystemCommandRunner};

#[derive(Parser)]
#[command(name = "workspace_init")]
#[command(author = "HappyPathway")]
#[command(version = "0.1.0")]
#[command(about = "Clone or update an organization's repositories into a local workspace", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    /// Dump the fully resolved configuration before running
    #[arg(long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Override the maximum number of concurrent repository tasks
    #[arg(long, value_name = "NUM")]
    concurrency: Option<usize>,

    /// Override the workspace base directory
    #[arg(long, value_name = "DIR")]
    base_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    workspace_init::utils::logging::init_logger(cli.color, cli.verbose);

    info!("Workspace Init");
    info!("Loading configuration from: {}", cli.config.display());

    let mut config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    if let Some(concurrency) = cli.concurrency {
        config.git.max_concurrent = concurrency;
    }
    if let Some(base_dir) = cli.base_dir {
        config.workspace.base_dir = base_dir;
    }
    config.validate().context("Invalid configuration")?;

    if cli.debug {
        let dump =
            serde_json::to_string_pretty(&config).context("Failed to serialize configuration")?;
        println!("Configuration:\n{}", dump);
    }

    let runner = Arc::new(SystemCommandRunner::new());
    let synchronizer = Synchronizer::new(config, runner);

    let stats = synchronizer
        .run()
        .await
        .context("Workspace initialization failed")?;

    if stats.failed() > 0 {
        warn!(
            "{} repositories need attention; see the lines above",
            stats.failed()
        );
    }

    Ok(())
}
