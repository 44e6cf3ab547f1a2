use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use clap::{Parser, Subcommand};
use marketplace::{Marketplace, MarketplaceConfig};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const INGRESS: &str = "api_ingress";
const MARKETPLACE: &str = "marketplace";

/// EventFlow Server - event supplier marketplace
#[derive(Parser)]
#[command(name = "eventflow-server")]
#[command(about = "EventFlow Server - event supplier marketplace")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

/// Module sections decoded from the config bag, with server fallbacks applied.
struct ModuleConfigs {
    ingress: ApiIngressConfig,
    marketplace: MarketplaceConfig,
}

impl ModuleConfigs {
    fn from_app(config: &AppConfig) -> Result<Self> {
        let ingress = config
            .module_config::<ApiIngressConfig>(INGRESS)?
            .with_fallback_addr(&config.server.host, config.server.port);
        let addr = ingress
            .bind_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid bind address '{}'", ingress.bind_addr))?;
        // The sitemap fallback points at the port actually bound.
        let marketplace = config
            .module_config::<MarketplaceConfig>(MARKETPLACE)?
            .with_fallback_base_url(addr.port());
        marketplace.validate()?;
        Ok(Self {
            ingress,
            marketplace,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, &config.home_dir());
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "EventFlow Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

async fn run_server(config: AppConfig) -> Result<()> {
    let modules = ModuleConfigs::from_app(&config)?;
    let home = config.home_dir();

    let marketplace = Marketplace::init(modules.marketplace, &home)
        .await
        .context("failed to initialize marketplace module")?;

    let ingress = Arc::new(ApiIngress::new(modules.ingress));
    ingress.build_router(&[&marketplace])?;

    let cancel = CancellationToken::new();
    let signals = modkit::runtime::cancel_on_signal(cancel.clone());
    let result = ingress.serve(cancel.clone()).await;
    cancel.cancel();
    let _ = signals.await;
    tracing::info!("EventFlow Server stopped");
    result
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    let modules = ModuleConfigs::from_app(config)?;
    tracing::info!(bind_addr = %modules.ingress.bind_addr, "Configuration is valid");
    println!("Configuration check passed");
    println!("Public base URL: {}", modules.marketplace.public_base_url);
    println!("{}", config.to_yaml()?);
    Ok(())
}
