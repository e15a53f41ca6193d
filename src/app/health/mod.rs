use axum::{http::StatusCode, routing::get, Router};

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health_check", get(health_check))
}

/// Liveness probe. Answers with an empty body and never touches the stores.
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
