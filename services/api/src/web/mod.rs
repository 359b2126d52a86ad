pub mod form;
pub mod protocol;
pub mod rest;
pub mod state;

pub use rest::{
    chat_handler, export_csv_handler, export_xlsx_handler, generate_handler, health_handler,
};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use state::AppState;
use std::sync::Arc;

/// Builds the API router. CORS and the Swagger UI are layered on by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Upload routes stream their parts and enforce limits per part, so an
    // oversize screenshot is still measured and answered with FILE_TOO_LARGE.
    let uploads = Router::new()
        .route("/api/generate", post(generate_handler))
        .route("/api/chat", post(chat_handler))
        .layer(DefaultBodyLimit::disable());

    let exports = Router::new()
        .route("/api/export/csv", post(export_csv_handler))
        .route("/api/export/xlsx", post(export_xlsx_handler))
        .layer(DefaultBodyLimit::max(app_state.config.max_request_bytes));

    Router::new()
        .route("/health", get(health_handler))
        .merge(uploads)
        .merge(exports)
        .with_state(app_state)
}
