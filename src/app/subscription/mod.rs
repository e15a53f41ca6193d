use axum::{
    routing::{delete, get, post},
    Router,
};

use super::AppState;

pub mod route;
pub mod schema;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/subscribe/:email/:category", post(route::subscribe))
        .route(
            "/unsubscribe/:email/:category",
            delete(route::unsubscribe_from_category),
        )
        .route("/unsubscribe/:email", delete(route::unsubscribe_from_all))
        .route("/subscribers", get(route::list_subscribers))
        .route("/subscribers/:email/:category", get(route::get_subscriber))
}
