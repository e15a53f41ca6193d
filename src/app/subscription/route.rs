use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::schema::{ListParams, SubscribeResponse, SubscriptionPath, UnsubscribeResponse};
use crate::{
    app::{
        error::{AppError, AppResult},
        AppState,
    },
    domain::subscriber::{email::Email, NewSubscriber, Subscriber},
    store::Page,
};

#[tracing::instrument(
    name = "Adding a new subscriber",
    skip(state, path),
    fields(email = %path.email, category = %path.category)
)]
pub async fn subscribe(
    State(state): State<AppState>,
    Path(path): Path<SubscriptionPath>,
) -> AppResult<Json<SubscribeResponse>> {
    let new_subscriber = NewSubscriber::try_from(path).map_err(|e| {
        tracing::error!(detail = %e, "failed to parse subscriber from path");
        AppError::ValidationError(e)
    })?;

    // The store enforces (email, category) uniqueness, so a concurrent
    // duplicate surfaces here as a conflict.
    let subscriber = state.subscribers.insert(new_subscriber).await?;

    Ok(Json(SubscribeResponse {
        status: "success",
        message: format!("Subscribed to {}", subscriber.category),
        subscriber,
    }))
}

/// Validates the path the same way `subscribe` does, so every route
/// addresses the subscription under its stored key.
fn parse_path(path: SubscriptionPath) -> AppResult<NewSubscriber> {
    NewSubscriber::try_from(path).map_err(AppError::ValidationError)
}

#[tracing::instrument(name = "Unsubscribing from a category", skip(state))]
pub async fn unsubscribe_from_category(
    State(state): State<AppState>,
    Path(path): Path<SubscriptionPath>,
) -> AppResult<Json<UnsubscribeResponse>> {
    let NewSubscriber { email, category } = parse_path(path)?;
    let removed = state
        .subscribers
        .delete_by_email(email.as_ref(), Some(category.as_ref()))
        .await?;

    Ok(Json(UnsubscribeResponse {
        status: "success",
        message: format!("Unsubscribed from {}", category),
        removed,
    }))
}

#[tracing::instrument(name = "Unsubscribing from every category", skip(state))]
pub async fn unsubscribe_from_all(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<UnsubscribeResponse>> {
    let email = Email::try_from(email).map_err(AppError::ValidationError)?;
    let removed = state
        .subscribers
        .delete_by_email(email.as_ref(), None)
        .await?;

    Ok(Json(UnsubscribeResponse {
        status: "success",
        message: "Unsubscribed from every category".into(),
        removed,
    }))
}

#[tracing::instrument(name = "Get subscriber", skip(state))]
pub async fn get_subscriber(
    State(state): State<AppState>,
    Path(path): Path<SubscriptionPath>,
) -> AppResult<Json<Subscriber>> {
    let NewSubscriber { email, category } = parse_path(path)?;
    let subscriber = state
        .subscribers
        .get_by_email_and_category(email.as_ref(), category.as_ref())
        .await?;

    Ok(Json(subscriber))
}

#[tracing::instrument(name = "List subscribers", skip(state))]
pub async fn list_subscribers(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<Subscriber>>> {
    let page = Page::new(params.page, params.page_size);
    let subscribers = state
        .subscribers
        .list(
            params.email.as_deref().filter(|e| !e.is_empty()),
            params
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty()),
            page,
        )
        .await?;

    Ok(Json(subscribers))
}
