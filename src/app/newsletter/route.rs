use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::schema::{
    CreatedResponse, ListParams, NewsletterBody, SendResponse, StatusResponse,
    UpdateNewsletterBody,
};
use crate::{
    app::{
        error::{AppError, AppResult},
        AppState,
    },
    domain::newsletter::{NewNewsletter, Newsletter},
    store::Page,
};

fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::ValidationError(format!("`{}` is not a valid id", raw)))
}

#[tracing::instrument(
    name = "Create newsletter",
    skip(state, body),
    fields(category = %body.category)
)]
pub async fn create_newsletter(
    State(state): State<AppState>,
    Json(body): Json<NewsletterBody>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let newsletter = NewNewsletter::try_from(body).map_err(AppError::ValidationError)?;

    if state
        .newsletters
        .get_by_category(newsletter.category.as_ref())
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "a newsletter for category {} already exists",
            newsletter.category
        )));
    }

    let newsletter = state.newsletters.insert(newsletter).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            status: "success",
            message: "Newsletter created successfully".into(),
            id: newsletter.id,
        }),
    ))
}

#[tracing::instrument(name = "List newsletters", skip(state))]
pub async fn list_newsletters(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<Newsletter>>> {
    let page = Page::new(params.page, params.page_size);
    let newsletters = state
        .newsletters
        .list(params.name.as_deref().filter(|n| !n.is_empty()), page)
        .await?;

    Ok(Json(newsletters))
}

#[tracing::instrument(name = "Get newsletter", skip(state))]
pub async fn get_newsletter(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Newsletter>> {
    let newsletter = state.newsletters.get_by_id(parse_id(&id)?).await?;

    Ok(Json(newsletter))
}

#[tracing::instrument(name = "Update newsletter", skip(state, body), fields(id = %body.id))]
pub async fn update_newsletter(
    State(state): State<AppState>,
    Json(body): Json<UpdateNewsletterBody>,
) -> AppResult<Json<StatusResponse>> {
    let id = body.id;
    let newsletter = NewNewsletter::try_from(body.newsletter).map_err(AppError::ValidationError)?;

    state.newsletters.get_by_id(id).await?;
    if let Some(other) = state
        .newsletters
        .get_by_category(newsletter.category.as_ref())
        .await?
    {
        if other.id != id {
            return Err(AppError::Conflict(format!(
                "a newsletter for category {} already exists",
                newsletter.category
            )));
        }
    }

    state.newsletters.update(&newsletter.with_id(id)).await?;

    Ok(Json(StatusResponse {
        status: "success",
        message: "Newsletter updated successfully".into(),
    }))
}

#[tracing::instrument(name = "Delete newsletter", skip(state))]
pub async fn delete_newsletter(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<StatusResponse>> {
    state.newsletters.delete(parse_id(&id)?).await?;

    Ok(Json(StatusResponse {
        status: "success",
        message: "Newsletter deleted successfully".into(),
    }))
}

#[tracing::instrument(name = "Send newsletter", skip(state))]
pub async fn send_newsletter(
    State(state): State<AppState>,
    Path(newsletter_id): Path<String>,
) -> AppResult<Json<SendResponse>> {
    let report = state.dispatcher.send_newsletter(&newsletter_id).await?;

    Ok(Json(report.into()))
}
