use axum::{
    Json,
    extract::State,
};
use serde::Deserialize;

use crate::{
    api::{
        Api,
        ApiError,
        ErrorResponse,
    },
    examples::{
        EXAMPLE_PAYLOADS,
        ExamplePayload,
    },
    process::{
        ResultFrame,
        process,
    },
    types::TankHeight,
};

#[derive(Debug, Default, Deserialize)]
pub struct ParseRequest {
    #[serde(default)]
    pub hex_string: Option<String>,

    /// Tank height in meters
    #[serde(default)]
    pub tank_height: Option<f64>,
}

pub async fn post_parse(
    State(api): State<Api>,
    Json(request): Json<ParseRequest>,
) -> Result<Json<ResultFrame>, ErrorResponse> {
    let hex_string = request.hex_string.ok_or(ApiError::MissingHexString)?;
    let hex_string = hex_string.trim();
    if hex_string.is_empty() {
        return Err(ApiError::EmptyHexString.into());
    }

    let tank_height = match request.tank_height {
        Some(meters) => TankHeight::from_meters(meters).ok_or(ApiError::InvalidTankHeight)?,
        None => api.default_tank_height,
    };

    let result = process(hex_string, tank_height).map_err(|error| {
        tracing::warn!(%error, hex_string, "rejected payload");
        ApiError::InvalidPayload
    })?;

    Ok(Json(result))
}

pub async fn get_examples() -> Json<[ExamplePayload; 4]> {
    Json(EXAMPLE_PAYLOADS)
}
