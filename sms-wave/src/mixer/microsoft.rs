use super::MixerMode;
use crate::WaveError;
use sms_adpcm::{pcm8_to_pcm16, pcm16_to_pcm8};
use std::io::Cursor;

/// Linear PCM from a RIFF/WAVE file, mono or stereo, 8 or 16 bits
pub struct MicrosoftWaveMixer {
    /// Interleaved samples at their native depth (8-bit values are signed)
    samples: Vec<i16>,
    channels: u16,
    bits: u16,
    sample_rate: u32,
    mode: MixerMode,
}

impl MicrosoftWaveMixer {
    pub fn new(data: &[u8], mode: MixerMode) -> Result<Self, WaveError> {
        let mut reader = hound::WavReader::new(Cursor::new(data))?;
        let spec = reader.spec();

        if spec.sample_format != hound::SampleFormat::Int {
            return Err(WaveError::UnsupportedSampleFormat);
        }
        if !(1..=2).contains(&spec.channels) {
            return Err(WaveError::UnsupportedChannels(spec.channels));
        }

        let samples = match spec.bits_per_sample {
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(i16::from))
                .collect::<Result<Vec<_>, _>>()?,
            16 => reader.samples::<i16>().collect::<Result<Vec<_>, _>>()?,
            bits => return Err(WaveError::UnsupportedBitDepth(bits)),
        };

        tracing::debug!(
            "WAV: {} channel(s), {}-bit, {}Hz, {} sample(s)",
            spec.channels,
            spec.bits_per_sample,
            spec.sample_rate,
            samples.len() / spec.channels as usize
        );

        Ok(Self {
            samples,
            channels: spec.channels,
            bits: spec.bits_per_sample,
            sample_rate: spec.sample_rate,
            mode,
        })
    }

    pub fn mode(&self) -> MixerMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: MixerMode) {
        self.mode = mode;
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn bit_depth(&self) -> u16 {
        self.bits
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Native values of (left, right); mono repeats the one channel
    fn frame(&self, sample: usize) -> (i16, i16) {
        let at = sample * self.channels as usize;
        if self.channels == 1 {
            (self.samples[at], self.samples[at])
        } else {
            (self.samples[at], self.samples[at + 1])
        }
    }

    pub fn read_pcm8(&self, sample: usize) -> i8 {
        let (left, right) = self.frame(sample);
        match (self.channels, self.bits) {
            (1, 8) => left as i8,
            (1, _) => pcm16_to_pcm8(left),
            (_, 8) => self.mode.mix_pcm8(left as i8, right as i8),
            _ => pcm16_to_pcm8(self.mode.mix_pcm16(left, right)),
        }
    }

    pub fn read_pcm8_stereo(&self, sample: usize) -> (i8, i8) {
        let (left, right) = self.frame(sample);
        if self.bits == 8 {
            (left as i8, right as i8)
        } else {
            (pcm16_to_pcm8(left), pcm16_to_pcm8(right))
        }
    }

    pub fn read_pcm16(&self, sample: usize) -> i16 {
        let (left, right) = self.frame(sample);
        match (self.channels, self.bits) {
            (1, 16) => left,
            (1, _) => pcm8_to_pcm16(left as i8),
            (_, 16) => self.mode.mix_pcm16(left, right),
            _ => pcm8_to_pcm16(self.mode.mix_pcm8(left as i8, right as i8)),
        }
    }

    pub fn read_pcm16_stereo(&self, sample: usize) -> (i16, i16) {
        let (left, right) = self.frame(sample);
        if self.bits == 16 {
            (left, right)
        } else {
            (pcm8_to_pcm16(left as i8), pcm8_to_pcm16(right as i8))
        }
    }
}
