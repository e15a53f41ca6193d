use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::dispatch::DispatchError;
use crate::store::StoreError;

pub type AppResult<T, E = AppError> = std::result::Result<T, E>;

/// JSON body of every error response.
#[derive(serde::Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

/// A common error type that can be used throughout the API.
///
/// Can be returned in a `Result` from an API handler function. Every variant
/// is rendered as an [`ErrorBody`].
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => Self::NotFound(format!("{} was not found", what)),
            StoreError::AlreadyExists(what) => Self::Conflict(format!("{} already exists", what)),
            StoreError::Unexpected(e) => Self::UnexpectedError(e),
        }
    }
}

impl From<DispatchError> for AppError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::NotFound(_) => Self::NotFound(e.to_string()),
            DispatchError::InvalidArgument(_)
            | DispatchError::InvalidAttachment(_)
            | DispatchError::EmptyContent => Self::ValidationError(e.to_string()),
            DispatchError::LookupFailed(_) => Self::UnexpectedError(anyhow::Error::new(e)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match self {
            Self::ValidationError(ref s) | Self::NotFound(ref s) | Self::Conflict(ref s) => {
                tracing::warn!("{}", s);
                s.to_owned()
            }
            Self::UnexpectedError(ref e) => {
                tracing::error!("{:?}", e);
                "Unexpected error".to_owned()
            }
        };
        let status = self.status_code();

        (
            status,
            Json(ErrorBody {
                code: status.as_u16(),
                message,
            }),
        )
            .into_response()
    }
}
