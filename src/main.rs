use anyhow::Result;
use clap::{Parser, Subcommand};
use xrates::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for xrates::AppCommand {
    fn from(cmd: Commands) -> xrates::AppCommand {
        match cmd {
            Commands::Serve => xrates::AppCommand::Serve,
            Commands::Refresh => xrates::AppCommand::Refresh,
            Commands::List => xrates::AppCommand::List,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Serve the currency API and refresh rates periodically
    Serve,
    /// Run a single exchange rate refresh and exit
    Refresh,
    /// List stored currencies
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Setup => match cli.config_path.as_deref() {
            Some(path) => xrates::cli::setup::setup_at_path(path),
            None => xrates::cli::setup::setup(),
        },
        cmd => xrates::run_command(cmd.into(), cli.config_path.as_deref()).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
