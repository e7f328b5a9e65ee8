//! Peak encodings
//!
//! # xl
//!
//! Up to 12 little-endian 10 bit slots:
//!
//! ```plain
//! bit:   0 .. 4 | 5 .. 9
//!        dt - 1 | amp
//! ```
//!
//! `dt` advances the time axis, even if `amp` is 0 and no peak is emitted.
//!
//! # gen2
//!
//! Byte pairs `(amp, time)` until a `(0, 0)` sentinel or the end of the data.
//! These are not rescaled.

use byteorder::{
    ByteOrder,
    LittleEndian,
};

use crate::payload::{
    MAX_PEAKS,
    Peak,
    Peaks,
};

const XL_SLOTS: usize = 12;
const XL_SLOT_BITS: usize = 10;

/// The time axis of an xl frame ends here.
const XL_MAX_TIME: u16 = 255;

pub fn decode_xl(data: &[u8]) -> Peaks {
    let mut peaks = Peaks::new();
    let mut last_time: u16 = 0;

    for slot in 0..XL_SLOTS {
        let bit_position = slot * XL_SLOT_BITS;
        let byte_offset = bit_position / 8;
        let shift = bit_position % 8;

        let Some(bytes) = data.get(byte_offset..byte_offset + 2) else {
            break;
        };
        let value = LittleEndian::read_u16(bytes) >> shift;

        let dt = (value & 0x1f) + 1;
        let amplitude = (value >> 5) & 0x1f;

        let time = last_time + dt;
        last_time = time;
        if time > XL_MAX_TIME {
            break;
        }
        if amplitude == 0 {
            continue;
        }

        let peak = Peak {
            // at most (31 - 1) * 4 + 6 = 126
            amplitude: ((amplitude - 1) * 4 + 6) as u8,
            time_offset: time * 2,
        };
        if peaks.push(peak).is_err() {
            break;
        }
    }

    peaks
}

pub fn decode_gen2(data: &[u8]) -> Peaks {
    let mut peaks = Peaks::new();

    for pair in data.chunks_exact(2).take(MAX_PEAKS) {
        let (amplitude, time_offset) = (pair[0], pair[1]);
        if amplitude == 0 && time_offset == 0 {
            break;
        }
        if peaks.push(Peak::new(amplitude, time_offset.into())).is_err() {
            break;
        }
    }

    peaks
}
