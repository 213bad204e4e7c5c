use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use adoptiverse_api::rest::{AppState, create_router};
use adoptiverse_api::{ApiAuditLogger, DataStore, MemoryStore, PetUpdateLookup, SqliteStore};

#[derive(Parser)]
#[command(name = "adoptiverse-api")]
#[command(about = "Adoptiverse API Server - shelters and their pets over REST")]
struct Args {
    /// Listen address for the REST API
    #[arg(short, long, default_value = "[::]:8080")]
    listen: String,

    /// Data directory for the SQLite database
    #[arg(short, long, default_value = "/var/lib/adoptiverse")]
    data_dir: PathBuf,

    /// Run in development mode (in-memory storage, nothing persisted)
    #[arg(long)]
    dev: bool,

    /// Only let PUT overwrite pets that belong to the shelter in the path
    #[arg(long)]
    scoped_pet_updates: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("adoptiverse_api=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let store: Arc<dyn DataStore> = if args.dev {
        info!("Using in-memory store (dev mode)");
        Arc::new(MemoryStore::new())
    } else {
        tokio::fs::create_dir_all(&args.data_dir)
            .await
            .with_context(|| format!("creating data dir {}", args.data_dir.display()))?;
        info!(data_dir = %args.data_dir.display(), "Opening SQLite store");
        Arc::new(SqliteStore::open(&args.data_dir).await?)
    };

    let pet_update_lookup = if args.scoped_pet_updates {
        PetUpdateLookup::Scoped
    } else {
        PetUpdateLookup::Global
    };

    let app_state = Arc::new(AppState::new(store, pet_update_lookup));

    // Audit trail for every committed change
    let audit = Arc::new(ApiAuditLogger::new());
    let audit_handle = audit.start_event_listener(app_state.subscribe());

    let router = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("binding {}", args.listen))?;
    info!("REST API listening on {}", args.listen);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router held the last event sender; the listener drains and exits.
    let _ = audit_handle.await;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = signal::ctrl_c();
    let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            tracing::warn!("Failed to install SIGTERM handler: {}", e);
            let _ = ctrl_c.await;
            info!("Received SIGINT");
            return;
        }
    };

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = sigterm.recv() => info!("Received SIGTERM"),
    }
}
