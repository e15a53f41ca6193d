use axum::{
    routing::{get, post},
    Router,
};

use crate::app::AppState;

pub mod route;
pub mod schema;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/newsletters",
            post(route::create_newsletter)
                .get(route::list_newsletters)
                .put(route::update_newsletter),
        )
        .route(
            "/newsletters/:id",
            get(route::get_newsletter).delete(route::delete_newsletter),
        )
        .route("/newsletters/send/:newsletter_id", post(route::send_newsletter))
}
