//! Waves and sample mixers for SMS wave banks
//!
//! A [`WaveMixer`] wraps a source of samples (a headerless archive dump or a
//! Microsoft WAVE file) and can re-emit the whole wave in any of the four
//! [`WaveFormat`]s, seeding ADPCM history for loop points on the way.

mod error;
mod format;
pub mod mixer;
pub mod stream;
mod wave;
pub mod wav;

pub use error::WaveError;
pub use format::WaveFormat;
pub use mixer::{MixerMode, WaveMixer};
pub use wave::Wave;

/// Root key written when a wave carries no pitch information
pub const DEFAULT_ROOT_KEY: u8 = 60;
