//! AFC streams
//!
//! Streamed music is stored as stereo audio behind a 32-byte big-endian
//! header:
//!
//! ```text
//! 0x00: data size (i32)
//! 0x04: sample count (i32)
//! 0x08: sample rate (u16)
//! 0x0A: format (u16, 2 = PCM16, 4 = ADPCM4)
//! 0x0C: unused (u16)
//! 0x0E: frame rate (u16)
//! 0x10: loop flag (i32)
//! 0x14: loop start (i32)
//! ```
//!
//! PCM data interleaves left/right samples. ADPCM data stores each 16-sample
//! block as a 9-byte left frame followed by a 9-byte right frame, each
//! channel with its own history.

use crate::{WaveError, WaveMixer};
use sms_adpcm::{ADPCM4_FRAME_SIZE, FRAME_SAMPLES, History, decode_adpcm4, encode_adpcm4};
use sms_audio_shared::{BinaryReader, BinaryWriter, Endian};
use std::fmt;
use std::str::FromStr;

pub const HEADER_SIZE: u64 = 32;

/// Default frame rate written into new streams
pub const DEFAULT_FRAME_RATE: u16 = 30;

/// Sample encoding of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum StreamFormat {
    Pcm = 2,
    Adpcm = 4,
}

impl StreamFormat {
    pub fn from_raw(value: u16) -> Option<Self> {
        match value {
            2 => Some(StreamFormat::Pcm),
            4 => Some(StreamFormat::Adpcm),
            _ => None,
        }
    }

    /// Bytes of stereo data for `sample_count` samples
    ///
    /// Computed in 64 bits so any header count has a size.
    pub fn data_size(self, sample_count: u32) -> u64 {
        let count = u64::from(sample_count);
        match self {
            StreamFormat::Pcm => count * 4,
            StreamFormat::Adpcm => {
                count.div_ceil(FRAME_SAMPLES as u64) * (2 * ADPCM4_FRAME_SIZE as u64)
            }
        }
    }
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamFormat::Pcm => f.write_str("pcm"),
            StreamFormat::Adpcm => f.write_str("adpcm"),
        }
    }
}

impl FromStr for StreamFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pcm" => Ok(StreamFormat::Pcm),
            "adpcm" => Ok(StreamFormat::Adpcm),
            _ => Err(format!("unknown stream format '{s}'")),
        }
    }
}

/// Stream header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader {
    pub data_size: u32,
    pub sample_count: u32,
    pub sample_rate: u16,
    pub format: StreamFormat,
    pub frame_rate: u16,
    pub loop_start: Option<u32>,
}

/// A decoded stream
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedStream {
    pub header: StreamHeader,
    /// Interleaved left/right PCM16
    pub samples: Vec<i16>,
}

/// Encode a mixer's stereo samples as an AFC stream
pub fn encode_stream(
    mixer: &WaveMixer,
    format: StreamFormat,
    sample_rate: u16,
    frame_rate: u16,
    loop_start: Option<u32>,
) -> Result<Vec<u8>, WaveError> {
    let count = mixer.sample_count();
    let sample_count = u32::try_from(count).map_err(|_| WaveError::StreamTooLong(count))?;
    let data_size = u32::try_from(format.data_size(sample_count))
        .map_err(|_| WaveError::StreamTooLong(count))?;
    let header = StreamHeader {
        data_size,
        sample_count,
        sample_rate,
        format,
        frame_rate,
        loop_start,
    };

    let mut writer = BinaryWriter::new(Vec::new(), Endian::Big);
    writer.write_u32(header.data_size)?;
    writer.write_u32(header.sample_count)?;
    writer.write_u16(header.sample_rate)?;
    writer.write_u16(header.format as u16)?;
    writer.write_u16(0)?;
    writer.write_u16(header.frame_rate)?;
    writer.write_i32(if loop_start.is_some() { 1 } else { 0 })?;
    writer.write_u32(loop_start.unwrap_or(0))?;
    writer.pad_to(HEADER_SIZE as u32)?;

    match format {
        StreamFormat::Pcm => {
            for i in 0..count {
                let (left, right) = mixer.read_pcm16_stereo(i);
                writer.write_i16(left)?;
                writer.write_i16(right)?;
            }
        }
        StreamFormat::Adpcm => {
            let mut left_history = History::default();
            let mut right_history = History::default();
            for start in (0..count).step_by(FRAME_SAMPLES) {
                let mut left = [0i16; FRAME_SAMPLES];
                let mut right = [0i16; FRAME_SAMPLES];
                for j in 0..FRAME_SAMPLES.min(count - start) {
                    (left[j], right[j]) = mixer.read_pcm16_stereo(start + j);
                }
                writer.write_bytes(&encode_adpcm4(&left, &mut left_history))?;
                writer.write_bytes(&encode_adpcm4(&right, &mut right_history))?;
            }
        }
    }

    writer.pad_to(32)?;
    tracing::debug!("AFC: encoded {} sample(s) as {}", count, format);
    Ok(writer.into_inner())
}

/// Decode an AFC stream to interleaved PCM16
pub fn decode_stream(data: &[u8]) -> Result<DecodedStream, WaveError> {
    let mut reader = BinaryReader::new(data, Endian::Big);
    let data_size = reader.read_u32()?;
    let sample_count = reader.read_u32()?;
    let sample_rate = reader.read_u16()?;
    let raw_format = reader.read_u16()?;
    let format = StreamFormat::from_raw(raw_format).ok_or(WaveError::BadStreamFormat(raw_format))?;
    reader.skip(2)?;
    let frame_rate = reader.read_u16()?;
    let looping = reader.read_i32()? != 0;
    let loop_start = reader.read_u32()?;

    let header = StreamHeader {
        data_size,
        sample_count,
        sample_rate,
        format,
        frame_rate,
        loop_start: looping.then_some(loop_start),
    };

    let expected = HEADER_SIZE + format.data_size(sample_count);
    if (data.len() as u64) < expected {
        return Err(WaveError::TruncatedStream { expected });
    }
    reader.goto(HEADER_SIZE)?;

    let count = sample_count as usize;
    let mut samples = Vec::with_capacity(count * 2);
    match format {
        StreamFormat::Pcm => {
            for _ in 0..count * 2 {
                samples.push(reader.read_i16()?);
            }
        }
        StreamFormat::Adpcm => {
            let mut left_history = History::default();
            let mut right_history = History::default();
            for start in (0..count).step_by(FRAME_SAMPLES) {
                let left = decode_adpcm4(&read_frame(&mut reader)?, &mut left_history);
                let right = decode_adpcm4(&read_frame(&mut reader)?, &mut right_history);
                for j in 0..FRAME_SAMPLES.min(count - start) {
                    samples.push(left[j]);
                    samples.push(right[j]);
                }
            }
        }
    }

    Ok(DecodedStream { header, samples })
}

fn read_frame(reader: &mut BinaryReader<'_>) -> Result<[u8; ADPCM4_FRAME_SIZE], WaveError> {
    let mut frame = [0u8; ADPCM4_FRAME_SIZE];
    frame.copy_from_slice(&reader.read_bytes(ADPCM4_FRAME_SIZE)?);
    Ok(frame)
}
