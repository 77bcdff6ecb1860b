use anyhow::Result;
use moviedb::routes::{api, RequestState};
use moviedb::MovieDb;
use reconbit::tower_http::cors::{self, CorsLayer};
use reconbit::*;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::new("config/settings")?;
    let (created, storage) = Storage::init(PathBuf::from(&config.storage.db_path), config.storage.db_cache_size_mb)?;
    if created {
        info!("Created new movie db at {}", config.storage.db_path);
    }
    let db = Arc::new(MovieDb::open(storage)?);

    if !config.http.enable {
        info!("HTTP server is disabled, skipping");
        return Ok(());
    }
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });
    let cors = CorsLayer::new().allow_origin(cors::Any).allow_methods(cors::Any).allow_headers(cors::Any);
    let state = RequestState::new(db, &config.http);
    serve(state, config.http.bind_address, api(), Some(cors), shutdown_rx).await?;
    Ok(())
}
