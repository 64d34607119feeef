use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fixtureforge::{api, cli, config::AppConfig, db};

#[derive(Parser)]
#[command(name = "fixtureforge")]
#[command(about = "Tournament scheduling and standings for cricket and football")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Initialize the database
    InitDb,
    /// Load demo teams and tournaments
    Seed,
    /// List tournaments
    Tournaments,
    /// Generate fixtures and start a tournament
    Start {
        #[arg(short, long)]
        id: String,
    },
    /// Show the schedule a tournament would get, without saving it
    Preview {
        #[arg(short, long)]
        id: String,
    },
    /// Show the live scoreboard of a match
    Live {
        #[arg(short, long)]
        id: String,
    },
    /// Show standings and leaderboards
    Standings {
        #[arg(short, long)]
        id: String,
    },
    /// Export the team table as CSV
    Export {
        #[arg(short, long)]
        id: String,
    },
    /// Look up a team by (approximate) name
    Team {
        #[arg(short, long)]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    match cli.command {
        Some(Commands::Serve { port }) => {
            let config = config.with_port(port);
            tracing::info!("Starting FixtureForge API server on port {}", config.port);
            api::serve(&config.database_url, config.port).await?;
        }
        Some(Commands::InitDb) => {
            tracing::info!("Initializing database...");
            db::init_database(&config.database_url).await?;
        }
        Some(Commands::Seed) => {
            tracing::info!("Seeding demo data...");
            cli::seed(&config).await?;
        }
        Some(Commands::Tournaments) => {
            cli::show_tournaments(&config).await?;
        }
        Some(Commands::Start { id }) => {
            tracing::info!("Starting tournament: {}", id);
            cli::start(&config, &id).await?;
        }
        Some(Commands::Preview { id }) => {
            cli::preview(&config, &id).await?;
        }
        Some(Commands::Live { id }) => {
            cli::live(&config, &id).await?;
        }
        Some(Commands::Standings { id }) => {
            cli::standings(&config, &id).await?;
        }
        Some(Commands::Export { id }) => {
            cli::export_standings(&config, &id).await?;
        }
        Some(Commands::Team { name }) => {
            tracing::info!("Querying team: {}", name);
            cli::query_team(&config, &name).await?;
        }
        None => {
            // Default to serving
            tracing::info!("Starting FixtureForge API server on port {}", config.port);
            api::serve(&config.database_url, config.port).await?;
        }
    }

    Ok(())
}
