//! SMS-ADPCM: waveform codec for the SMS audio engine
//!
//! Pure sample-format conversion between the four wave formats stored in
//! wave archives. There is no I/O here; callers slice their buffers into
//! 16-sample frames and thread a [`History`] through successive calls.
//!
//! # Frame Format
//!
//! ```text
//! ADPCM4 frame (9 bytes, 16 samples):
//!   0x00: scale exponent (high nibble) | coefficient index (low nibble)
//!   0x01: 8 bytes of signed 4-bit deltas, high nibble first
//!
//! ADPCM2 frame (5 bytes, 16 samples):
//!   0x00: scale exponent (high nibble) | coefficient index (low nibble)
//!   0x01: 4 bytes of signed 2-bit deltas, most significant pair first
//! ```
//!
//! Each decoded sample is predicted from the two previous samples using one
//! of 16 fixed coefficient pairs, so a frame can only be decoded correctly
//! when the caller supplies the history left behind by the previous frame.
//!
//! # Usage
//!
//! ```
//! use sms_adpcm::{History, decode_adpcm4, encode_adpcm4};
//!
//! let frame = [100i16; 16];
//! let mut encoder = History::default();
//! let bytes = encode_adpcm4(&frame, &mut encoder);
//!
//! let mut decoder = History::default();
//! let decoded = decode_adpcm4(&bytes, &mut decoder);
//! assert_eq!(encoder, decoder);
//! assert!(decoded.iter().all(|&s| (s - 100).abs() <= 16));
//! ```

mod decode;
mod encode;

pub use decode::{decode_adpcm2, decode_adpcm4};
pub use encode::{encode_adpcm2, encode_adpcm4};

// =============================================================================
// Constants
// =============================================================================

/// Samples per ADPCM frame
pub const FRAME_SAMPLES: usize = 16;

/// Encoded size of a 2-bit ADPCM frame
pub const ADPCM2_FRAME_SIZE: usize = 5;

/// Encoded size of a 4-bit ADPCM frame
pub const ADPCM4_FRAME_SIZE: usize = 9;

/// Prediction coefficient pairs, selected by the low nibble of a frame header.
/// Applied as `(c0 * last + c1 * penult) >> 11`.
pub const COEFFICIENTS: [[i32; 2]; 16] = [
    [0, 0],
    [2048, 0],
    [0, 2048],
    [1024, 1024],
    [4096, -2048],
    [3584, -1536],
    [3072, -1024],
    [4608, -2560],
    [4200, -2248],
    [4800, -2300],
    [5120, -3072],
    [2048, -2048],
    [1024, -1024],
    [-1024, 1024],
    [-1024, 0],
    [-2048, 0],
];

// =============================================================================
// Prediction History
// =============================================================================

/// Predictor state carried from one frame to the next
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct History {
    /// Most recent decoded sample
    pub last: i16,
    /// Sample before `last`
    pub penult: i16,
}

impl History {
    pub const fn new(last: i16, penult: i16) -> Self {
        Self { last, penult }
    }

    /// Linear prediction scaled by 2^11
    #[inline]
    pub(crate) fn predict(&self, coefficients: [i32; 2]) -> i32 {
        coefficients[0] * self.last as i32 + coefficients[1] * self.penult as i32
    }

    #[inline]
    pub(crate) fn push(&mut self, sample: i16) {
        self.penult = self.last;
        self.last = sample;
    }
}

// =============================================================================
// PCM Conversions
// =============================================================================

/// Widen a signed 8-bit sample to 16 bits
#[inline]
pub fn pcm8_to_pcm16(sample: i8) -> i16 {
    (sample as i16) << 8
}

/// Truncate a 16-bit sample to its high byte
#[inline]
pub fn pcm16_to_pcm8(sample: i16) -> i8 {
    (sample >> 8) as i8
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Clamp value to 16-bit signed range
#[inline]
pub(crate) fn clamp_i16(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Split a frame header byte into (scale exponent, coefficient index)
#[inline]
pub(crate) fn split_header(header: u8) -> (u32, usize) {
    ((header >> 4) as u32, (header & 0xF) as usize)
}

// =============================================================================
// Tests
// =============================================================================
