//! mvxkit - MultiversX tools over the command line and HTTP.
//!
//! Tool output goes to stdout as JSON; logs go to stderr.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

mod config;
mod http;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use mvxkit::config::Settings;
use mvxkit::feed::{build_feed, validate_feed};
use mvxkit::network::{Network, NetworkConfig};
use mvxkit::tools::{ToolContext, toolbox};
use mvxkit::ToolError;
use serde_json::{Value, json};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, FileConfig};

/// mvxkit - MultiversX transaction, search and registry tools
#[derive(Parser)]
#[command(name = "mvxkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "MVX_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Network override (mainnet, devnet, testnet)
    #[arg(long, global = true)]
    network: Option<Network>,

    /// API base URL override
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tool descriptors as JSON
    Tools,

    /// Run one tool and print its result envelope
    Call(CallArgs),

    /// Print the product feed and its validation report
    Feed,

    /// Start the HTTP server
    Serve(ServeArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for the call command
#[derive(Args)]
struct CallArgs {
    /// Tool name
    name: String,

    /// Tool arguments as a JSON object
    #[arg(short, long, default_value = "{}")]
    args: String,
}

/// Arguments for the serve command
#[derive(Args)]
struct ServeArgs {
    /// Socket address to listen on
    #[arg(short, long)]
    bind: Option<String>,
}

/// Arguments for the config command
#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the config file location
    Path,
    /// Show the resolved config file content
    Show,
}

/// Top-level failure of a command.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Library(#[from] mvxkit::Error),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

type CliResult<T> = Result<T, CliError>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "failed to start the async runtime");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbosity: u8) {
    let (level, deps) = match verbosity {
        0 => (Level::INFO, "warn"),
        1 => (Level::DEBUG, "warn"),
        _ => (Level::TRACE, "debug"),
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{deps},mvxkit={level},mvxkit_server={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> CliResult<ExitCode> {
    let path = cli.config.clone().unwrap_or_else(config::config_path);

    if let Commands::Config(args) = &cli.command {
        return config_command(&args.command, &path).await;
    }

    let (mut settings, file) = config::resolve_settings(&path).await?;
    apply_flags(&cli, &mut settings);
    let context = Arc::new(ToolContext::from_settings(settings)?);
    let tools = toolbox(&context);

    match cli.command {
        Commands::Tools => {
            println!("{}", serde_json::to_string_pretty(&tools.definitions())?);
        }
        Commands::Call(args) => {
            let input: Value = serde_json::from_str(&args.args)?;
            let response = tools.call(&args.name, input).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            if response.is_error {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Feed => {
            let items = serde_json::to_value(build_feed(context.provider(), context.search_mode()).await)?;
            let report = validate_feed(&items);
            println!("{}", serde_json::to_string_pretty(&json!({ "items": items, "report": report }))?);
        }
        Commands::Serve(args) => {
            let bind = args.bind.unwrap_or(file.server.bind);
            let listener = tokio::net::TcpListener::bind(&bind).await?;
            http::run(listener, http::AppState::new(Arc::new(tools), context)).await?;
        }
        Commands::Config(_) => {}
    }
    Ok(ExitCode::SUCCESS)
}

/// Command-line flags win over the file and the environment.
fn apply_flags(cli: &Cli, settings: &mut Settings) {
    if let Some(network) = cli.network {
        settings.network = NetworkConfig::for_network(network);
    }
    if let Some(url) = &cli.api_url {
        settings.network = settings.network.clone().with_api_url(url.as_str());
    }
}

async fn config_command(command: &ConfigCommands, path: &std::path::Path) -> CliResult<ExitCode> {
    match command {
        ConfigCommands::Path => {
            println!("{}", path.display());
        }
        ConfigCommands::Show => {
            let file: FileConfig = config::load_config_from(path).await?;
            let text = toml::to_string_pretty(&file).map_err(ConfigError::from)?;
            println!("# {}\n{text}", path.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}
