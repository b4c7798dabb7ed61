//! budgetweb main entry point

use anyhow::Context;
use budgetweb_api::start_server;
use budgetweb_config::{Config, ConfigError};
use budgetweb_core::{Engine, InMemoryLedgerStore, InsightRules};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "budgetweb")]
#[command(author = "Budgetweb Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Budget tracking service with spending insights", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn load_config(path: PathBuf) -> anyhow::Result<Config> {
    match Config::load(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound { path }) => {
            eprintln!("[WARN] Config file not found: {}, using defaults", path);
            Ok(Config::default())
        }
        Err(e) => Err(e).context("Failed to load configuration"),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = load_config(args.config)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();
    log::info!(
        "Config loaded: bind={}, dedup={}, retention={} days",
        config.bind_address(),
        config.insights.dedup,
        config.retention.default_days
    );

    let rules = InsightRules::from(&config.insights);
    let engine = Engine::new(Arc::new(InMemoryLedgerStore::new()), rules);

    let rt = Runtime::new()?;
    rt.block_on(start_server(config, engine))
}
