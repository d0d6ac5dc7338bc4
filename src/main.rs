use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quiz_books_graphql::config::Config;
use quiz_books_graphql::fixtures::load_fixture_file;
use quiz_books_graphql::graphql::create_schema;
use quiz_books_graphql::observability::{self, metrics};
use quiz_books_graphql::server;
use quiz_books_graphql::storage::{InMemoryStorage, SqliteStorage, Storage};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "quiz_books_graphql")]
#[command(about = "Read-only GraphQL API for the Books catalog and Quiz domain")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the GraphQL HTTP server
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
        /// SQLite database file (overrides config)
        #[arg(long)]
        database: Option<PathBuf>,
        /// Keep all data in memory instead of SQLite
        #[arg(long)]
        in_memory: bool,
        /// Fixture to load into the store before serving
        #[arg(long)]
        fixture: Option<PathBuf>,
    },
    /// Create the database tables
    Migrate {
        #[arg(long)]
        database: Option<PathBuf>,
    },
    /// Load a fixture file into the database
    LoadFixture {
        path: PathBuf,
        #[arg(long)]
        database: Option<PathBuf>,
    },
    /// Print the GraphQL schema in SDL form
    PrintSchema,
}

fn open_database(config: &Config, database: Option<PathBuf>) -> Result<SqliteStorage> {
    let path = database.unwrap_or_else(|| config.database.path.clone());
    let storage = SqliteStorage::open(&path)
        .with_context(|| format!("opening database {}", path.display()))?;
    storage.run_migrations()?;
    Ok(storage)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let mut config = Config::load()?;

    match cli.command {
        Commands::Serve {
            port,
            database,
            in_memory,
            fixture,
        } => {
            let _guard = observability::init_logging(&config.logging.directory);
            if let Some(port) = port {
                config.server.port = port;
            }
            if config.metrics.enabled {
                metrics::init_or_warn(config.metrics_addr()?);
            }

            let storage: Arc<dyn Storage> = if in_memory {
                info!("Using in-memory storage (data will not persist)");
                let storage = Arc::new(InMemoryStorage::new());
                if let Some(path) = &fixture {
                    load_fixture_file(storage.as_ref(), path).await?;
                }
                storage
            } else {
                let storage = Arc::new(open_database(&config, database)?);
                if let Some(path) = &fixture {
                    load_fixture_file(storage.as_ref(), path).await?;
                }
                storage
            };

            server::start_server(storage, config.server_addr()?).await?;
        }
        Commands::Migrate { database } => {
            observability::init_console_logging();
            open_database(&config, database)?;
        }
        Commands::LoadFixture { path, database } => {
            observability::init_console_logging();
            let storage = open_database(&config, database)?;
            let summary = load_fixture_file(&storage, &path).await?;
            println!(
                "Installed {} object(s) from {}",
                summary.total(),
                path.display()
            );
        }
        Commands::PrintSchema => {
            let schema = create_schema(Arc::new(InMemoryStorage::new()));
            println!("{}", schema.sdl());
        }
    }

    Ok(())
}
