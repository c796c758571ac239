use super::decode_frame;
use crate::WaveFormat;
use sms_adpcm::{History, pcm8_to_pcm16, pcm16_to_pcm8};

/// Headerless mono sample data in one of the archive formats
///
/// PCM16 data is big-endian. ADPCM data is decoded once up front so that
/// random access does not replay the stream for every sample.
pub struct RawWaveMixer {
    data: Vec<u8>,
    format: WaveFormat,
    sample_count: usize,
    pcm16: Vec<i16>,
}

impl RawWaveMixer {
    pub fn new(data: Vec<u8>, format: WaveFormat) -> Self {
        let sample_count = format.sample_count(data.len() as u32) as usize;

        let pcm16 = match format {
            WaveFormat::Pcm8 => data[..sample_count]
                .iter()
                .map(|&b| pcm8_to_pcm16(b as i8))
                .collect(),
            WaveFormat::Pcm16 => data
                .chunks_exact(2)
                .map(|pair| i16::from_be_bytes([pair[0], pair[1]]))
                .collect(),
            WaveFormat::Adpcm4 | WaveFormat::Adpcm2 => {
                let size = format.frame_size().unwrap_or(1);
                let mut history = History::default();
                data.chunks_exact(size)
                    .flat_map(|frame| decode_frame(format, frame, &mut history))
                    .collect()
            }
        };

        Self {
            data,
            format,
            sample_count,
            pcm16,
        }
    }

    pub fn format(&self) -> WaveFormat {
        self.format
    }

    /// Whole frames of the underlying data (trailing partial frames dropped)
    pub fn frames(&self) -> &[u8] {
        let used = self.format.byte_size(self.sample_count as u32) as usize;
        &self.data[..used.min(self.data.len())]
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn read_pcm8(&self, sample: usize) -> i8 {
        match self.format {
            WaveFormat::Pcm8 => self.data[sample] as i8,
            _ => pcm16_to_pcm8(self.pcm16[sample]),
        }
    }

    pub fn read_pcm16(&self, sample: usize) -> i16 {
        self.pcm16[sample]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm16_is_big_endian() {
        let mixer = RawWaveMixer::new(vec![0x12, 0x34, 0xFF, 0xFE, 0x00], WaveFormat::Pcm16);
        assert_eq!(mixer.sample_count(), 2);
        assert_eq!(mixer.read_pcm16(0), 0x1234);
        assert_eq!(mixer.read_pcm16(1), -2);
        assert_eq!(mixer.read_pcm8(0), 0x12);
    }

    #[test]
    fn test_pcm8() {
        let mixer = RawWaveMixer::new(vec![0x7F, 0x80], WaveFormat::Pcm8);
        assert_eq!(mixer.read_pcm8(1), -128);
        assert_eq!(mixer.read_pcm16(0), 0x7F00);
    }

    #[test]
    fn test_adpcm_sample_count_ignores_partial_frame() {
        let mixer = RawWaveMixer::new(vec![0; 9 * 3 + 4], WaveFormat::Adpcm4);
        assert_eq!(mixer.sample_count(), 48);
        assert_eq!(mixer.frames().len(), 27);

        let mixer = RawWaveMixer::new(vec![0; 5 * 2], WaveFormat::Adpcm2);
        assert_eq!(mixer.sample_count(), 32);
        assert_eq!(mixer.read_pcm16(31), 0);
    }
}
