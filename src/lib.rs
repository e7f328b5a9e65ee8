//! # Ultrasonic tank level sensor decoder
//!
//! Decodes the Bluetooth LE advertisements of ultrasonic liquid level sensors
//! and estimates how full the tank is.
//!
//! ```
//! use mopeka_level::{
//!     process::process,
//!     types::TankHeight,
//! };
//!
//! let result = process(
//!     "1AFF0D000002B765924F310302157CA080030D74E08107EA287B270302A0AD",
//!     TankHeight::DEFAULT,
//! )
//! .unwrap();
//! assert!(!result.is_empty);
//! ```

pub mod api;
pub mod examples;
pub mod level;
pub mod payload;
pub mod process;
pub mod tof;
pub mod types;
pub mod util;

pub use crate::{
    payload::{
        DecodeError,
        SensorFrame,
    },
    process::{
        ResultFrame,
        process,
    },
};
