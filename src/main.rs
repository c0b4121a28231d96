use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use houston_housing::core::SeriesRole;
use houston_housing::core::log::init_logging;

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

impl From<Commands> for houston_housing::AppCommand {
    fn from(cmd: Commands) -> houston_housing::AppCommand {
        match cmd {
            Commands::Dashboard => houston_housing::AppCommand::Dashboard,
            Commands::Series { role, limit } => {
                houston_housing::AppCommand::Series { role, limit }
            }
            Commands::Json => houston_housing::AppCommand::Json,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the Houston housing market dashboard
    Dashboard,
    /// Display a single series as a table
    Series {
        /// One of: hpi, inventory, rent, permits, unemployment
        role: SeriesRole,

        /// Show only the most recent N points
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Print the dashboard payload as JSON
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => houston_housing::cli::setup::setup(),
        Some(cmd) => houston_housing::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
