pub mod parse;

use axum::{
    Json,
    Router,
    http::StatusCode,
    response::{
        IntoResponse,
        Response,
    },
    routing,
};
use serde::Serialize;

use crate::types::TankHeight;

#[derive(Clone, Debug)]
pub struct Api {
    /// Used when a request doesn't specify a tank height.
    pub default_tank_height: TankHeight,
}

impl Api {
    pub fn router(&self) -> Router<()> {
        Router::new()
            .route("/parse", routing::post(parse::post_parse))
            .route("/examples", routing::get(parse::get_examples))
            .fallback(not_found)
            .with_state(self.clone())
    }
}

impl Default for Api {
    fn default() -> Self {
        Self {
            default_tank_height: TankHeight::DEFAULT,
        }
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found")
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: ErrorResponseInner,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponseInner {
    message: String,
    error: ApiError,
}

impl ErrorResponse {
    pub fn api_error(&self) -> &ApiError {
        &self.error.error
    }
}

impl From<ApiError> for ErrorResponse {
    fn from(value: ApiError) -> Self {
        Self {
            error: ErrorResponseInner {
                message: value.to_string(),
                error: value,
            },
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.error.error.status_code(), Json(self)).into_response()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiError {
    #[error("No hex string provided")]
    MissingHexString,
    #[error("Hex string cannot be empty")]
    EmptyHexString,
    #[error("Tank height must be a finite number of meters")]
    InvalidTankHeight,
    #[error("Failed to parse the hex string. Please check that it is a valid sensor payload.")]
    InvalidPayload,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingHexString
            | Self::EmptyHexString
            | Self::InvalidTankHeight
            | Self::InvalidPayload => StatusCode::BAD_REQUEST,
        }
    }
}
