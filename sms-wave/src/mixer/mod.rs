//! Sample mixers
//!
//! Both variants expose the same capabilities: random access to PCM8/PCM16
//! samples (mono-mixed or per channel), a whole-wave write in any target
//! format, and ADPCM history at an arbitrary sample.

mod microsoft;
mod raw;

pub use microsoft::MicrosoftWaveMixer;
pub use raw::RawWaveMixer;

use crate::{Wave, WaveError, WaveFormat};
use sms_adpcm::{
    ADPCM2_FRAME_SIZE, ADPCM4_FRAME_SIZE, FRAME_SAMPLES, History, decode_adpcm2, decode_adpcm4,
    encode_adpcm2, encode_adpcm4,
};
use sms_audio_shared::BinaryWriter;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

/// How stereo sources are folded into one channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MixerMode {
    /// Average both channels
    #[default]
    Mix,
    Left,
    Right,
}

impl MixerMode {
    /// PCM8 mix sums before halving
    pub fn mix_pcm8(self, left: i8, right: i8) -> i8 {
        match self {
            MixerMode::Mix => ((left as i16 + right as i16) >> 1) as i8,
            MixerMode::Left => left,
            MixerMode::Right => right,
        }
    }

    /// PCM16 mix halves each channel before summing
    pub fn mix_pcm16(self, left: i16, right: i16) -> i16 {
        match self {
            MixerMode::Mix => (left >> 1) + (right >> 1),
            MixerMode::Left => left,
            MixerMode::Right => right,
        }
    }
}

impl fmt::Display for MixerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MixerMode::Mix => f.write_str("mix"),
            MixerMode::Left => f.write_str("left"),
            MixerMode::Right => f.write_str("right"),
        }
    }
}

impl FromStr for MixerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mix" => Ok(MixerMode::Mix),
            "left" => Ok(MixerMode::Left),
            "right" => Ok(MixerMode::Right),
            _ => Err(format!("unknown mixer mode '{s}'")),
        }
    }
}

/// A source of samples
pub enum WaveMixer {
    Raw(RawWaveMixer),
    Microsoft(MicrosoftWaveMixer),
}

impl WaveMixer {
    /// Mixer over a headerless dump in `format`
    pub fn raw(data: Vec<u8>, format: WaveFormat) -> Self {
        WaveMixer::Raw(RawWaveMixer::new(data, format))
    }

    /// Mixer over the bytes of a RIFF/WAVE file
    pub fn microsoft(data: &[u8], mode: MixerMode) -> Result<Self, WaveError> {
        Ok(WaveMixer::Microsoft(MicrosoftWaveMixer::new(data, mode)?))
    }

    pub fn sample_count(&self) -> usize {
        match self {
            WaveMixer::Raw(raw) => raw.sample_count(),
            WaveMixer::Microsoft(wav) => wav.sample_count(),
        }
    }

    /// Source sample rate, when the container records one
    pub fn sample_rate(&self) -> Option<u32> {
        match self {
            WaveMixer::Raw(_) => None,
            WaveMixer::Microsoft(wav) => Some(wav.sample_rate()),
        }
    }

    pub fn read_pcm8(&self, sample: usize) -> i8 {
        match self {
            WaveMixer::Raw(raw) => raw.read_pcm8(sample),
            WaveMixer::Microsoft(wav) => wav.read_pcm8(sample),
        }
    }

    pub fn read_pcm8_stereo(&self, sample: usize) -> (i8, i8) {
        match self {
            WaveMixer::Raw(raw) => {
                let pcm8 = raw.read_pcm8(sample);
                (pcm8, pcm8)
            }
            WaveMixer::Microsoft(wav) => wav.read_pcm8_stereo(sample),
        }
    }

    pub fn read_pcm16(&self, sample: usize) -> i16 {
        match self {
            WaveMixer::Raw(raw) => raw.read_pcm16(sample),
            WaveMixer::Microsoft(wav) => wav.read_pcm16(sample),
        }
    }

    pub fn read_pcm16_stereo(&self, sample: usize) -> (i16, i16) {
        match self {
            WaveMixer::Raw(raw) => {
                let pcm16 = raw.read_pcm16(sample);
                (pcm16, pcm16)
            }
            WaveMixer::Microsoft(wav) => wav.read_pcm16_stereo(sample),
        }
    }

    /// Fill in sample count (and sample rate, when known) left unset on `wave`
    pub fn copy_wave_info(&self, wave: &mut Wave) {
        if wave.sample_count == 0 {
            wave.sample_count = self.sample_count() as u32;
        }
        if wave.sample_rate <= 0.0 {
            if let Some(rate) = self.sample_rate() {
                wave.sample_rate = rate as f32;
            }
        }
    }

    /// Native ADPCM frames that can be copied without re-encoding
    fn native_frames(&self, format: WaveFormat) -> Option<&[u8]> {
        match self {
            WaveMixer::Raw(raw) if raw.format() == format && format.is_adpcm() => {
                Some(raw.frames())
            }
            _ => None,
        }
    }

    /// One 16-sample frame of mono PCM16, zero past the end
    fn frame_pcm16(&self, frame: usize) -> [i16; 16] {
        let count = self.sample_count();
        let mut pcm16 = [0i16; FRAME_SAMPLES];
        for (j, slot) in pcm16.iter_mut().enumerate() {
            let sample = frame * FRAME_SAMPLES + j;
            if sample < count {
                *slot = self.read_pcm16(sample);
            }
        }
        pcm16
    }

    /// All samples as mono PCM16
    pub fn to_pcm16(&self) -> Vec<i16> {
        (0..self.sample_count()).map(|i| self.read_pcm16(i)).collect()
    }

    /// Write every sample in `format`; ADPCM output zero-fills the last frame
    pub fn write<W: Write>(&self, format: WaveFormat, writer: &mut BinaryWriter<W>) -> io::Result<()> {
        let count = self.sample_count();

        if let Some(frames) = self.native_frames(format) {
            return writer.write_bytes(frames);
        }

        match format {
            WaveFormat::Pcm8 => {
                for i in 0..count {
                    writer.write_i8(self.read_pcm8(i))?;
                }
            }
            WaveFormat::Pcm16 => {
                for i in 0..count {
                    writer.write_i16(self.read_pcm16(i))?;
                }
            }
            WaveFormat::Adpcm4 | WaveFormat::Adpcm2 => {
                let mut history = History::default();
                for frame in 0..count.div_ceil(FRAME_SAMPLES) {
                    writer.write_bytes(&encode_frame(format, &self.frame_pcm16(frame), &mut history))?;
                }
            }
        }

        Ok(())
    }

    /// Decoder history at `sample` when the wave is stored in `format`
    ///
    /// Replays every frame before the one holding `sample` through an
    /// encode/decode round trip, so a loop can resume with the predictor
    /// state the console would have at that point. PCM formats and the first
    /// frame have zero history.
    pub fn calculate_history(&self, sample: usize, format: WaveFormat) -> Result<History, WaveError> {
        let count = self.sample_count();
        if sample >= count {
            return Err(WaveError::SampleOutOfRange { sample, count });
        }

        let frames = sample / FRAME_SAMPLES;
        let mut decoder = History::default();
        if frames == 0 || !format.is_adpcm() {
            return Ok(decoder);
        }

        if let Some(data) = self.native_frames(format) {
            let size = format.frame_size().unwrap_or(ADPCM4_FRAME_SIZE);
            for bytes in data.chunks_exact(size).take(frames) {
                decode_frame(format, bytes, &mut decoder);
            }
            return Ok(decoder);
        }

        let mut encoder = History::default();
        for frame in 0..frames {
            let bytes = encode_frame(format, &self.frame_pcm16(frame), &mut encoder);
            decode_frame(format, &bytes, &mut decoder);
        }

        Ok(decoder)
    }
}

/// Encode one frame; `format` must be an ADPCM format
pub(crate) fn encode_frame(format: WaveFormat, pcm16: &[i16; 16], history: &mut History) -> Vec<u8> {
    match format {
        WaveFormat::Adpcm2 => encode_adpcm2(pcm16, history).to_vec(),
        _ => encode_adpcm4(pcm16, history).to_vec(),
    }
}

/// Decode one frame; `bytes` must hold exactly one frame of `format`
pub(crate) fn decode_frame(format: WaveFormat, bytes: &[u8], history: &mut History) -> [i16; 16] {
    match format {
        WaveFormat::Adpcm2 => {
            let mut frame = [0u8; ADPCM2_FRAME_SIZE];
            frame.copy_from_slice(bytes);
            decode_adpcm2(&frame, history)
        }
        _ => {
            let mut frame = [0u8; ADPCM4_FRAME_SIZE];
            frame.copy_from_slice(bytes);
            decode_adpcm4(&frame, history)
        }
    }
}

#[cfg(test)]
mod tests;
