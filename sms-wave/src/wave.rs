use crate::{DEFAULT_ROOT_KEY, WaveFormat};
use sms_adpcm::History;

/// One wave in a wave bank
#[derive(Debug, Clone, PartialEq)]
pub struct Wave {
    /// Id referenced by instrument velocity regions
    pub id: u16,
    /// Source or extracted file, relative to the wave directory
    pub file_name: String,
    pub format: WaveFormat,
    pub root_key: u8,
    pub sample_rate: f32,
    /// Byte offset of the data inside the archive
    pub wave_start: u32,
    /// Byte size of the data inside the archive
    pub wave_size: u32,
    pub looping: bool,
    pub loop_start: u32,
    pub loop_end: u32,
    pub sample_count: u32,
    /// ADPCM predictor state at `loop_start`
    pub history: History,
}

impl Default for Wave {
    fn default() -> Self {
        Self {
            id: 0,
            file_name: String::new(),
            format: WaveFormat::Adpcm4,
            root_key: DEFAULT_ROOT_KEY,
            sample_rate: 0.0,
            wave_start: 0,
            wave_size: 0,
            looping: false,
            loop_start: 0,
            loop_end: 0,
            sample_count: 0,
            history: History::default(),
        }
    }
}

impl Wave {
    pub fn new(id: u16, format: WaveFormat) -> Self {
        Self {
            id,
            format,
            ..Self::default()
        }
    }

    /// Name of the extracted file, e.g. `bank_00012.adpcm4.wav`
    pub fn extracted_name(&self, archive_stem: &str, extension: &str) -> String {
        format!("{}_{:05}.{}.{}", archive_stem, self.id, self.format, extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracted_name() {
        let wave = Wave::new(12, WaveFormat::Pcm16);
        assert_eq!(wave.extracted_name("bank", "raw"), "bank_00012.pcm16.raw");
        assert_eq!(wave.root_key, 60);
    }
}
