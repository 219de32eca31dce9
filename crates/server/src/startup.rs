use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use models::User;
use service::{
    pagination::PageSettings,
    storage::{CollectionStore, JsonFileStore},
    UserService,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn page_settings(cfg: &AppConfig) -> PageSettings {
    PageSettings { default_limit: cfg.api.default_page_size, max_limit: cfg.api.max_page_size }
}

/// Wire store, service and router from configuration.
pub fn build_app(cfg: &AppConfig) -> Router {
    let store: Arc<dyn CollectionStore<User>> = Arc::new(JsonFileStore::<User>::new(&cfg.storage.data_file));
    let users = UserService::with_page_settings(store, page_settings(cfg));
    routes::build_router(AppState::new(users), build_cors())
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!(event = "shutdown_signal", "received Ctrl+C, shutting down");
    }
}

/// Public entry: build the app and run the HTTP server until Ctrl+C
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    common::env::ensure_data_dir(&cfg.storage.data_file).await?;

    let app = build_app(&cfg);
    let addr = bind_addr(&cfg)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, data_file = %cfg.storage.data_file.display(), "user directory listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
