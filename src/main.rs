use std::net::SocketAddr;
use tracing::{error, info};
use tuneshelf::api::{create_router, AppState};
use tuneshelf::config::Config;
use tuneshelf::db::Database;
use tuneshelf::storage::StorageLayout;

#[tokio::main]
async fn main() {
    // Use RUST_LOG env var if set, otherwise default to info level
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(log_filter).init();

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    info!("Data root: {:?}", config.data_root);

    StorageLayout::new(&config.data_root).ensure_dirs().await?;
    if let Some(parent) = config.database_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let database = Database::new(&config.database_path.to_string_lossy()).await?;
    let bind_addr = config.bind_addr;
    let app = create_router(AppState::new(config, database));

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on http://{}", bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
