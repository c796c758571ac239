//! PCM16 WAV output
//!
//! Plain files go through `hound`. Files that need a `smpl` chunk (loop
//! points or a root key) are laid out by hand since `hound` cannot emit
//! extra chunks.

use crate::WaveError;
use sms_audio_shared::{BinaryWriter, Endian};
use std::io::Cursor;

/// Sampler metadata stored in a `smpl` chunk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampler {
    pub root_key: u8,
    /// Forward loop as (first sample, last sample) inclusive
    pub loop_range: Option<(u32, u32)>,
}

const FMT_SIZE: u32 = 16;
const SMPL_SIZE: u32 = 36;
const SMPL_LOOP_SIZE: u32 = 24;

/// Encode interleaved PCM16 samples as a WAV file
pub fn encode_wav(
    samples: &[i16],
    channels: u16,
    sample_rate: u32,
    sampler: Option<&Sampler>,
) -> Result<Vec<u8>, WaveError> {
    match sampler {
        None => encode_plain(samples, channels, sample_rate),
        Some(sampler) => encode_with_sampler(samples, channels, sample_rate, sampler),
    }
}

fn encode_plain(samples: &[i16], channels: u16, sample_rate: u32) -> Result<Vec<u8>, WaveError> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

fn encode_with_sampler(
    samples: &[i16],
    channels: u16,
    sample_rate: u32,
    sampler: &Sampler,
) -> Result<Vec<u8>, WaveError> {
    let block_align = channels * 2;
    let data_size = samples.len() as u32 * 2;
    let loops = sampler.loop_range.iter().count() as u32;
    let smpl_size = SMPL_SIZE + SMPL_LOOP_SIZE * loops;
    let riff_size = 4 + (8 + FMT_SIZE) + (8 + smpl_size) + (8 + data_size);

    let mut out = BinaryWriter::new(Vec::new(), Endian::Little);
    out.write_bytes(b"RIFF")?;
    out.write_u32(riff_size)?;
    out.write_bytes(b"WAVE")?;

    out.write_bytes(b"fmt ")?;
    out.write_u32(FMT_SIZE)?;
    out.write_u16(1)?;
    out.write_u16(channels)?;
    out.write_u32(sample_rate)?;
    out.write_u32(sample_rate * block_align as u32)?;
    out.write_u16(block_align)?;
    out.write_u16(16)?;

    out.write_bytes(b"smpl")?;
    out.write_u32(smpl_size)?;
    out.write_u32(0)?; // manufacturer
    out.write_u32(0)?; // product
    out.write_u32(sample_period(sample_rate))?;
    out.write_u32(sampler.root_key as u32)?;
    out.write_u32(0)?; // pitch fraction
    out.write_u32(0)?; // SMPTE format
    out.write_u32(0)?; // SMPTE offset
    out.write_u32(loops)?;
    out.write_u32(0)?; // sampler data
    if let Some((start, end)) = sampler.loop_range {
        out.write_u32(0)?; // cue point id
        out.write_u32(0)?; // forward
        out.write_u32(start)?;
        out.write_u32(end)?;
        out.write_u32(0)?; // fraction
        out.write_u32(0)?; // play count (infinite)
    }

    out.write_bytes(b"data")?;
    out.write_u32(data_size)?;
    for &sample in samples {
        out.write_i16(sample)?;
    }

    Ok(out.into_inner())
}

/// Nanoseconds per sample
fn sample_period(sample_rate: u32) -> u32 {
    if sample_rate == 0 {
        0
    } else {
        1_000_000_000 / sample_rate
    }
}
