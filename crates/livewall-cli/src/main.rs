mod live;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "livewall-cli")]
#[command(about = "Livewall command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch from every configured platform, store the snapshot, and print it
    Refresh {
        /// Search text (defaults to `LIVEWALL_DEFAULT_QUERY`)
        #[arg(long, short)]
        query: Option<String>,
        /// Items wanted per platform (defaults to `LIVEWALL_DEFAULT_LIMIT`)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=50))]
        max: Option<u32>,
    },
    /// Print the stored snapshot without calling any platform
    Show {
        /// Print only a one-line count per platform
        #[arg(long)]
        summary: bool,
    },
    /// Snapshot store maintenance
    Store {
        #[command(subcommand)]
        command: StoreCommands,
    },
}

#[derive(Debug, Subcommand)]
enum StoreCommands {
    /// Check that the snapshot store is reachable
    Ping,
    /// Apply pending migrations (Postgres backend only)
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("livewall-cli ready; see --help for commands");
        return Ok(());
    };

    let config = livewall_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // stdout carries the JSON output; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Refresh { query, max } => {
            live::run_refresh(&config, query.as_deref(), max).await
        }
        Commands::Show { summary } => live::run_show(&config, summary).await,
        Commands::Store {
            command: StoreCommands::Ping,
        } => live::run_store_ping(&config).await,
        Commands::Store {
            command: StoreCommands::Migrate,
        } => live::run_store_migrate(&config).await,
    }
}

#[cfg(test)]
mod tests;
