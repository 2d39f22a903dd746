use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use planner::db::CatalogStore;
use planner::planner::{Catalog, CatalogBuilder, PlannerConfig};
use planner::server::create_router;
use planner::types::AppState;

const CONFIG_ENV: &str = "PLANNER_CONFIG";
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser, Debug)]
#[command(name = "planner", version, about = "Conflict-free class schedule planner")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serves the schedule API. Without a config path, PLANNER_CONFIG is used.
    Serve { config: Option<PathBuf> },
    /// Folds a flat row export into an organized catalog document.
    Organize { rows: PathBuf, out: PathBuf },
    /// Replaces a term's rows in the SQLite store with a flat row export.
    Import {
        rows: PathBuf,
        db: PathBuf,
        term: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Serve { config: None }) {
        Commands::Serve { config } => serve(load_config(config.as_deref())?).await,
        Commands::Organize { rows, out } => organize(&rows, &out),
        Commands::Import { rows, db, term } => import(&rows, &db, &term),
    }
}

/// Reads the config from the given path, then `PLANNER_CONFIG`, falling back
/// to defaults when neither is set.
fn load_config(path: Option<&Path>) -> anyhow::Result<PlannerConfig> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));

    match path {
        Some(path) => PlannerConfig::load_from_file(&path)
            .with_context(|| format!("could not load config from {}", path.display())),
        None => {
            info!("No config given, using defaults");
            Ok(PlannerConfig::default())
        }
    }
}

fn load_catalog(config: &PlannerConfig) -> anyhow::Result<Catalog> {
    let catalog = match &config.catalog_db {
        Some(db) => {
            let store = CatalogStore::new(db)
                .with_context(|| format!("could not open {}", db.display()))?;
            if !store.term_has_data(&config.term)? {
                warn!("No rows stored for term {}", config.term);
            }
            store.load_catalog(&config.term)?
        }
        None => Catalog::load_json(&config.catalog_path).with_context(|| {
            format!("could not load catalog {}", config.catalog_path.display())
        })?,
    };

    info!("Loaded catalog with {} courses", catalog.len());
    Ok(catalog)
}

async fn serve(config: PlannerConfig) -> anyhow::Result<()> {
    let catalog = load_catalog(&config)?;
    let address = config.bind_address();
    let state = Arc::new(AppState::new(catalog, config));

    let cleanup_state = Arc::clone(&state);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            cleanup_state.sessions.cleanup_expired();
        }
    });

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("could not bind {address}"))?;
    info!("Listening on {}", address);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down");
        })
        .await?;

    Ok(())
}

/// Folds a flat row export into the organized catalog document.
fn organize(rows: &Path, out: &Path) -> anyhow::Result<()> {
    let catalog = CatalogBuilder::load_rows_json(rows)
        .with_context(|| format!("could not organize {}", rows.display()))?;
    catalog.write_json(out)?;
    info!("Wrote {} courses to {}", catalog.len(), out.display());
    Ok(())
}

/// Replaces a term's rows in the SQLite store with a flat row export.
fn import(rows: &Path, db: &Path, term: &str) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(rows)
        .with_context(|| format!("could not read {}", rows.display()))?;
    let parsed = serde_json::from_str::<Vec<planner::planner::SectionRow>>(&content)
        .with_context(|| format!("could not parse {}", rows.display()))?;

    // validate before touching the store
    CatalogBuilder::from_rows(parsed.clone())?;

    let store = CatalogStore::new(db)?;
    let cleared = store.clear_term(term)?;
    if cleared > 0 {
        info!("Replaced {} existing rows for term {}", cleared, term);
    }
    store.insert_rows(term, &parsed)?;
    Ok(())
}
