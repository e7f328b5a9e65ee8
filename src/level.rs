//! Conversion from time of flight to liquid level.

use crate::types::TankHeight;

/// Speed of sound in the liquid, in inches per second.
const INCHES_PER_SECOND: f64 = 13700.0;

const INCH_OFFSET: f64 = 0.5;

const CM_PER_INCH: f64 = 2.54;

/// The sensor can't see liquid below this height, in meters.
const DEAD_ZONE: f64 = 0.0381;

const MIN_PERCENTAGE: f64 = 2.0;
const MAX_PERCENTAGE: f64 = 100.0;

pub fn level_inches(tof: f64) -> f64 {
    INCHES_PER_SECOND * tof + INCH_OFFSET
}

pub fn level_cm(tof: f64) -> f64 {
    level_inches(tof) * CM_PER_INCH
}

/// Fill percentage of a tank, in `[2, 100]`.
///
/// Tanks that are no taller than the dead zone always read 100.
pub fn percentage(tof: f64, tank_height: TankHeight) -> u8 {
    let tank_height = tank_height.meters();
    if tank_height <= DEAD_ZONE {
        return 100;
    }

    let level = level_cm(tof) / 100.0;
    let percentage = 98.0 * (level - DEAD_ZONE) / (tank_height - DEAD_ZONE) + 2.0;

    // ties round to even, like the vendor app
    percentage
        .clamp(MIN_PERCENTAGE, MAX_PERCENTAGE)
        .round_ties_even() as u8
}

/// No echo was found.
pub fn is_empty(tof: f64) -> bool {
    tof == 0.0
}
