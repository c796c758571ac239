use sms_adpcm::{ADPCM2_FRAME_SIZE, ADPCM4_FRAME_SIZE, FRAME_SAMPLES};
use std::fmt;
use std::str::FromStr;

/// Sample encoding of a wave inside an archive
///
/// Discriminants are the values stored in wave records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WaveFormat {
    Adpcm4 = 0,
    Adpcm2 = 1,
    Pcm8 = 2,
    Pcm16 = 3,
}

impl WaveFormat {
    pub const ALL: [WaveFormat; 4] = [
        WaveFormat::Adpcm4,
        WaveFormat::Adpcm2,
        WaveFormat::Pcm8,
        WaveFormat::Pcm16,
    ];

    pub fn from_raw(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|f| *f as u8 == value)
    }

    /// Lowercase name used in XML and file names
    pub fn name(self) -> &'static str {
        match self {
            WaveFormat::Adpcm4 => "adpcm4",
            WaveFormat::Adpcm2 => "adpcm2",
            WaveFormat::Pcm8 => "pcm8",
            WaveFormat::Pcm16 => "pcm16",
        }
    }

    pub fn is_adpcm(self) -> bool {
        matches!(self, WaveFormat::Adpcm4 | WaveFormat::Adpcm2)
    }

    /// Bytes per ADPCM frame, `None` for PCM
    pub fn frame_size(self) -> Option<usize> {
        match self {
            WaveFormat::Adpcm4 => Some(ADPCM4_FRAME_SIZE),
            WaveFormat::Adpcm2 => Some(ADPCM2_FRAME_SIZE),
            WaveFormat::Pcm8 | WaveFormat::Pcm16 => None,
        }
    }

    /// Number of samples held by `byte_size` bytes of data
    pub fn sample_count(self, byte_size: u32) -> u32 {
        match self {
            WaveFormat::Adpcm4 => byte_size / ADPCM4_FRAME_SIZE as u32 * FRAME_SAMPLES as u32,
            WaveFormat::Adpcm2 => byte_size / ADPCM2_FRAME_SIZE as u32 * FRAME_SAMPLES as u32,
            WaveFormat::Pcm8 => byte_size,
            WaveFormat::Pcm16 => byte_size / 2,
        }
    }

    /// Bytes needed to store `sample_count` samples (ADPCM rounds up to whole frames)
    pub fn byte_size(self, sample_count: u32) -> u32 {
        match self.frame_size() {
            Some(frame) => sample_count.div_ceil(FRAME_SAMPLES as u32) * frame as u32,
            None if self == WaveFormat::Pcm16 => sample_count * 2,
            None => sample_count,
        }
    }
}

impl fmt::Display for WaveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WaveFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown wave format '{s}'"))
    }
}
