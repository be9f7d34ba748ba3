mod compress_cmd;
mod config;
mod config_cmd;
mod demo_cmd;
mod models_cmd;
mod route_cmd;
mod status_cmd;
mod terminal_output;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use compress_cmd::CompressArgs;
use config::Config;
use kvforge_gateway::{start_server, GatewayState};

#[derive(Parser)]
#[command(name = "kvforge")]
#[command(about = "kvforge: KV-cache compression and prompt routing")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Address to bind the HTTP server to
        #[arg(short, long)]
        bind: Option<String>,
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Compress a cache file
    Compress(CompressArgs),
    /// Classify a prompt and show which model it routes to
    Route {
        prompt: String,
        #[arg(short, long)]
        context: Option<String>,
    },
    /// List registered models and the complexity mapping
    Models,
    /// Check a running gateway
    Status,
    /// Run the pipeline and router on synthetic data
    Demo,
    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default config.yaml
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().await?;

    logging::init_logger(
        config.log_dir().as_deref(),
        &config.log_level(),
        config.log_json(),
    )?;

    let defaults = config.file.compression_parameters();
    let result = match cli.command {
        Commands::Serve { bind, port } => run_server(&config, bind, port).await,
        Commands::Compress(args) => compress_cmd::run(args, defaults).await,
        Commands::Route { prompt, context } => {
            let router = config.router().await;
            route_cmd::run(&router, &prompt, context.as_deref()).await
        }
        Commands::Models => {
            let router = config.router().await;
            models_cmd::run(router.registry()).await
        }
        Commands::Status => {
            let (bind, port) = config.file.bind_address();
            status_cmd::run(&bind, port).await
        }
        Commands::Demo => {
            let router = config.router().await;
            demo_cmd::run(defaults, &router).await
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { force } => config_cmd::init(&config.config_path(), force).await,
            ConfigAction::Show => config_cmd::show(&config),
        },
    };

    if let Err(e) = result {
        terminal_output::note_error(&format!("{e:#}"));
        std::process::exit(1);
    }
    Ok(())
}

async fn run_server(config: &Config, bind: Option<String>, port: Option<u16>) -> Result<()> {
    let (default_bind, default_port) = config.file.bind_address();
    let bind = bind.unwrap_or(default_bind);
    let port = port.unwrap_or(default_port);
    let addr: SocketAddr = format!("{bind}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address {bind}:{port}"))?;

    let router = config.router().await;
    info!(
        %addr,
        config = %config.config_path().display(),
        registry = %config.registry_path().display(),
        "Starting kvforge gateway"
    );

    let state = GatewayState::new(config.file.compression_parameters(), router);
    start_server(addr, state).await
}
