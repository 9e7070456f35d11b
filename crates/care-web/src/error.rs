//! Error types for the care web API.

use std::error::Error as _;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use care_core::CareError;
use serde::Serialize;
use thiserror::Error;

use crate::state::AppState;

/// Errors returned by handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Domain or store failure.
    #[error(transparent)]
    Care(#[from] CareError),

    /// Missing or malformed request parameter.
    #[error("{0}")]
    BadRequest(String),
}

/// JSON error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Body without the debug chain, stashed on the response for [`redact_errors`].
#[derive(Debug, Clone)]
struct Redacted(ErrorBody);

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Care(CareError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Care(CareError::InvalidInput(_)) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Care(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            ApiError::Care(CareError::NotFound { entity, .. }) => match *entity {
                "animal" => "Animal not found",
                "treatment sheet" => "No sheet found for this animal",
                "treatment row" => "No matching treatment found for today",
                _ => "Not found",
            },
            ApiError::Care(CareError::InvalidInput(_)) | ApiError::BadRequest(_) => "Invalid request",
            ApiError::Care(CareError::Configuration(_)) => {
                "Service is not configured; check the configuration sheet and environment"
            }
            ApiError::Care(CareError::Store(_)) => "Spreadsheet request failed",
        }
    }

    fn chain(&self) -> String {
        let mut lines = vec![format!("{:?}", self)];
        let mut source = self.source();
        while let Some(err) = source {
            lines.push(format!("caused by: {}", err));
            source = err.source();
        }
        lines.join("\n")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        let body = ErrorBody {
            error: self.summary().to_string(),
            message: self.to_string(),
            stack: Some(self.chain()),
        };
        let redacted = Redacted(ErrorBody {
            stack: None,
            ..body.clone()
        });

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(redacted);
        response
    }
}

/// Drop the debug chain from error bodies in production.
pub async fn redact_errors(State(state): State<AppState>, mut response: Response) -> Response {
    if !state.production {
        return response;
    }
    match response.extensions_mut().remove::<Redacted>() {
        Some(Redacted(body)) => (response.status(), Json(body)).into_response(),
        None => response,
    }
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
