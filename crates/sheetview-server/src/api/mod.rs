mod health;
mod sheet;

use axum::Router;

use crate::AppState;

/// Create the API router
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(sheet::router())
}
