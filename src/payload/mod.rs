//! Advertisement payload decoder
//!
//! # Layout
//!
//! ```plain
//! byte:  0 1 | 2 3 | 4   | 5    | 6       | 7    | 8 ...
//!        hdr | mfr | acc | hwid | battery | temp | peaks
//! ```
//!
//! Offsets in this module are relative to the manufacturer data, which starts
//! after the 2 byte advertisement header.

pub mod peaks;

use std::{
    fmt::Debug,
    ops::Deref,
};

use bytes::Buf;
use serde::{
    Serialize,
    Serializer,
};

use crate::util::serialize_rounded_2;

/// Minimum length of a payload in bytes, including the advertisement header.
pub const MIN_PAYLOAD_LENGTH: usize = 8;

/// Maximum number of peaks a frame can carry.
pub const MAX_PEAKS: usize = 12;

/// Offset of the peak data in the manufacturer data.
pub const PEAKS_OFFSET: usize = 6;

/// Maps a 4 bit accelerometer nibble to a signed tilt value.
const ACCELEROMETER_MAP: [i8; 16] = [-7, 1, 2, 3, 4, 5, 6, 0, -6, -5, -8, 7, -4, -3, -2, -1];

const HARDWARE_VERSION_MASK: u8 = 0xcf;

const TEMPERATURE_MASK: u8 = 0x3f;
const SLOW_UPDATE_FLAG: u8 = 0x40;
const SYNC_PRESSED_FLAG: u8 = 0x80;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid hex string")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("payload is {length} bytes long, but at least 8 bytes are required")]
    TooShort { length: usize },

    /// `offset` is the byte offset into the whole payload, advertisement
    /// header included.
    #[error("payload truncated at byte {offset}")]
    Truncated { offset: usize },
}

/// A decoded sensor advertisement.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SensorFrame {
    /// Advertisement header. Not validated.
    #[serde(serialize_with = "hex::serde::serialize")]
    pub header: [u8; 2],

    /// Manufacturer data header. Usually `0d00`, but not validated.
    #[serde(serialize_with = "hex::serde::serialize")]
    pub manufacturer_header: [u8; 2],

    pub accelerometer: Accelerometer,

    pub hardware_id: u8,
    pub hardware_family: HardwareFamily,
    pub hardware_version: u8,

    pub battery_raw: u8,
    /// Battery voltage in volts
    #[serde(serialize_with = "serialize_rounded_2")]
    pub battery_voltage: f64,

    pub temperature_raw: u8,
    /// Temperature in degrees celsius
    #[serde(serialize_with = "serialize_rounded_2")]
    pub temperature_c: f64,

    pub slow_update: bool,
    pub sync_pressed: bool,

    #[serde(rename = "advertisement_peaks")]
    pub peaks: Peaks,
}

impl SensorFrame {
    /// Decodes a payload from a hex string.
    ///
    /// Whitespace between the digits is ignored.
    pub fn from_hex(hex_string: &str) -> Result<Self, DecodeError> {
        let digits = hex_string
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect::<String>();
        let data = hex::decode(digits)?;
        Self::decode(&data)
    }

    /// Decodes a payload from raw bytes.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < MIN_PAYLOAD_LENGTH {
            return Err(DecodeError::TooShort { length: data.len() });
        }

        let mut buffer = data;
        let header = [get_u8(data, &mut buffer)?, get_u8(data, &mut buffer)?];

        let manufacturer_header = [get_u8(data, &mut buffer)?, get_u8(data, &mut buffer)?];
        let accelerometer = Accelerometer::from_u8(get_u8(data, &mut buffer)?);

        let hardware_id = get_u8(data, &mut buffer)?;
        let hardware_family = HardwareFamily::from_hardware_id(hardware_id);

        let battery_raw = get_u8(data, &mut buffer)?;

        let temperature_byte = get_u8(data, &mut buffer)?;
        let temperature_raw = temperature_byte & TEMPERATURE_MASK;

        // the buffer now starts at PEAKS_OFFSET
        let peaks = hardware_family.decode_peaks(buffer);

        tracing::debug!(
            hardware_id,
            ?hardware_family,
            num_peaks = peaks.len(),
            "decoded payload"
        );

        Ok(Self {
            header,
            manufacturer_header,
            accelerometer,
            hardware_id,
            hardware_family,
            hardware_version: hardware_id & HARDWARE_VERSION_MASK,
            battery_raw,
            battery_voltage: battery_voltage(battery_raw),
            temperature_raw,
            temperature_c: temperature_celsius(temperature_raw),
            slow_update: temperature_byte & SLOW_UPDATE_FLAG != 0,
            sync_pressed: temperature_byte & SYNC_PRESSED_FLAG != 0,
            peaks,
        })
    }
}

/// Reads the next byte of `data` from `buffer`, which is a suffix of it.
fn get_u8(data: &[u8], buffer: &mut &[u8]) -> Result<u8, DecodeError> {
    let offset = data.len() - buffer.remaining();
    buffer
        .try_get_u8()
        .map_err(|_| DecodeError::Truncated { offset })
}

/// Battery voltage in volts, in `[1.5, 3.5)`.
pub fn battery_voltage(raw: u8) -> f64 {
    f64::from(raw) / 256.0 * 2.0 + 1.5
}

/// Temperature in degrees celsius from the 6 bit raw value.
///
/// A raw value of 0 means the sensor is at or below -40 degrees.
pub fn temperature_celsius(raw: u8) -> f64 {
    if raw == 0 {
        -40.0
    }
    else {
        (f64::from(raw) - 25.0) * 1.776964
    }
}

/// Tilt of the sensor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Accelerometer {
    pub raw: u8,
    /// From the low nibble. Always in `[-8, 7]`.
    pub x: i8,
    /// From the high nibble. Always in `[-8, 7]`.
    pub y: i8,
}

impl Accelerometer {
    pub fn from_u8(raw: u8) -> Self {
        Self {
            raw,
            x: ACCELEROMETER_MAP[usize::from(raw & 0x0f)],
            y: ACCELEROMETER_MAP[usize::from(raw >> 4)],
        }
    }
}

/// Hardware family of a sensor. Selects how the peaks are encoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareFamily {
    Gen2,
    Xl,
}

impl HardwareFamily {
    /// Odd hardware ids are xl sensors.
    pub fn from_hardware_id(hardware_id: u8) -> Self {
        if hardware_id & 1 == 1 {
            Self::Xl
        }
        else {
            Self::Gen2
        }
    }

    /// Decodes the peak data, which starts at [`PEAKS_OFFSET`] in the
    /// manufacturer data.
    pub fn decode_peaks(&self, data: &[u8]) -> Peaks {
        match self {
            Self::Gen2 => peaks::decode_gen2(data),
            Self::Xl => peaks::decode_xl(data),
        }
    }
}

/// A single ultrasonic echo.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Peak {
    pub amplitude: u8,
    /// Time offset in half units.
    pub time_offset: u16,
}

impl Peak {
    pub const fn new(amplitude: u8, time_offset: u16) -> Self {
        Self {
            amplitude,
            time_offset,
        }
    }
}

/// Ordered list of at most [`MAX_PEAKS`] peaks.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Peaks {
    items: [Peak; MAX_PEAKS],
    len: usize,
}

impl Peaks {
    pub const fn new() -> Self {
        Self {
            items: [Peak::new(0, 0); MAX_PEAKS],
            len: 0,
        }
    }

    /// Appends a peak, or hands it back if the list is full.
    pub fn push(&mut self, peak: Peak) -> Result<(), Peak> {
        if self.is_full() {
            Err(peak)
        }
        else {
            self.items[self.len] = peak;
            self.len += 1;
            Ok(())
        }
    }

    pub fn is_full(&self) -> bool {
        self.len == MAX_PEAKS
    }

    pub fn as_slice(&self) -> &[Peak] {
        &self.items[..self.len]
    }
}

impl Default for Peaks {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Peaks {
    type Target = [Peak];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl Debug for Peaks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl Serialize for Peaks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.as_slice())
    }
}
