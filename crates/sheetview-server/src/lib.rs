pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod service;

#[cfg(test)]
mod testing;

use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::client::GoogleSheetsClient;
use crate::config::Config;
use crate::service::SheetDataService;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SheetDataService>,
    /// Sheet refreshed when a request does not name one
    pub default_sheet: String,
}

/// Build the application router around `state`
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the server with the given configuration
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let client = GoogleSheetsClient::from_config(&config)?;
    let service = Arc::new(SheetDataService::new(Arc::new(client)));

    // Initial fetch, mirroring a viewer that loads as soon as it opens
    if let Some(spreadsheet_id) = &config.spreadsheet_id {
        let result = service
            .initialize_and_fetch(spreadsheet_id, &config.sheet_name)
            .await;
        match result.error() {
            None => tracing::info!("Loaded {}!{}", spreadsheet_id, config.sheet_name),
            Some(error) => tracing::warn!("Initial load failed, serving without data: {}", error),
        }
    } else {
        tracing::info!("SPREADSHEET_ID not set, waiting for /api/sheet/initialize");
    }

    let state = AppState {
        service,
        default_sheet: config.sheet_name.clone(),
    };

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
