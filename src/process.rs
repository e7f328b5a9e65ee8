use serde::Serialize;

use crate::{
    level,
    payload::{
        DecodeError,
        SensorFrame,
    },
    tof::{
        DEFAULT_VREF,
        estimate_time_of_flight,
    },
    types::TankHeight,
};

/// A decoded frame together with the level measurement.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultFrame {
    #[serde(flatten)]
    pub sensor: SensorFrame,

    /// Time of flight in seconds, 0 if there was no echo.
    pub tof: f64,
    pub level_inches: f64,
    pub level_cm: f64,
    pub is_empty: bool,
    /// Fill percentage, 0 if the tank is empty.
    pub percentage: u8,
}

impl ResultFrame {
    pub fn from_sensor_frame(sensor: SensorFrame, tank_height: TankHeight) -> Self {
        let tof = estimate_time_of_flight(&sensor.peaks, DEFAULT_VREF);
        let is_empty = level::is_empty(tof);
        let percentage = if is_empty {
            0
        }
        else {
            level::percentage(tof, tank_height)
        };

        Self {
            sensor,
            tof,
            level_inches: level::level_inches(tof),
            level_cm: level::level_cm(tof),
            is_empty,
            percentage,
        }
    }
}

/// Decodes a hex payload and measures the liquid level.
pub fn process(hex_string: &str, tank_height: TankHeight) -> Result<ResultFrame, DecodeError> {
    let sensor = SensorFrame::from_hex(hex_string).inspect_err(|error| {
        tracing::debug!(%error, "failed to decode payload");
    })?;
    Ok(ResultFrame::from_sensor_frame(sensor, tank_height))
}
