//! WAVE errand: convert a single wave between raw dumps, WAV files and AFC streams

use crate::{Endpoint, Pipeline};
use anyhow::{Context, Result, bail};
use sms_audio_shared::{BinaryWriter, Diagnostics, Endian};
use sms_wave::stream::{DEFAULT_FRAME_RATE, StreamFormat, decode_stream, encode_stream};
use sms_wave::wav::encode_wav;
use sms_wave::{MixerMode, WaveFormat, WaveMixer};
use std::fmt;
use std::str::FromStr;

/// Format of a wave input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveInput {
    /// Headerless dump in one of the wave formats
    Raw(WaveFormat),
    Wav,
    Stream,
}

/// Format of a wave output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveOutput {
    Raw(WaveFormat),
    Wav,
    Stream(StreamFormat),
}

impl FromStr for WaveInput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wav" => Ok(WaveInput::Wav),
            "afc" | "stream" | "afc-pcm" | "afc-adpcm" => Ok(WaveInput::Stream),
            _ => s.parse().map(WaveInput::Raw),
        }
    }
}

impl FromStr for WaveOutput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "wav" => Ok(WaveOutput::Wav),
            _ => match lower.strip_prefix("afc-") {
                Some(stream) => stream.parse().map(WaveOutput::Stream),
                None => s.parse().map(WaveOutput::Raw),
            },
        }
    }
}

impl fmt::Display for WaveInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveInput::Raw(format) => write!(f, "{format}"),
            WaveInput::Wav => f.write_str("wav"),
            WaveInput::Stream => f.write_str("afc"),
        }
    }
}

impl fmt::Display for WaveOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveOutput::Raw(format) => write!(f, "{format}"),
            WaveOutput::Wav => f.write_str("wav"),
            WaveOutput::Stream(format) => write!(f, "afc-{format}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WaveOptions {
    pub input: Endpoint<WaveInput>,
    pub output: Endpoint<WaveOutput>,
    pub mix_mode: MixerMode,
    /// Rate for raw inputs, or an override for WAV inputs
    pub sample_rate: Option<u32>,
    pub frame_rate: u16,
    /// Loop start sample for stream output
    pub loop_start: Option<u32>,
}

impl WaveOptions {
    pub fn new(input: Endpoint<WaveInput>, output: Endpoint<WaveOutput>) -> Self {
        Self {
            input,
            output,
            mix_mode: MixerMode::default(),
            sample_rate: None,
            frame_rate: DEFAULT_FRAME_RATE,
            loop_start: None,
        }
    }
}

/// Samples on their way through the errand
pub enum WaveData {
    /// A mono or stereo source behind a mixer
    Mixer(WaveMixer),
    /// A decoded stream, interleaved stereo PCM16
    Stream { samples: Vec<i16>, sample_rate: u32 },
}

/// Build the pipeline for one wave conversion
pub fn pipeline(options: &WaveOptions) -> Result<Pipeline<'_, WaveData>> {
    let input = &options.input;
    let output = &options.output;

    let pipeline = match input.format {
        WaveInput::Raw(format) => Pipeline::new("WAVE: read raw", move |_| {
            Ok(WaveData::Mixer(WaveMixer::raw(input.read()?, format)))
        }),
        WaveInput::Wav => Pipeline::new("WAVE: read wav", move |_| {
            let data = input.read()?;
            let mixer = WaveMixer::microsoft(&data, options.mix_mode)
                .with_context(|| format!("Failed to load WAV: {:?}", input.path))?;
            Ok(WaveData::Mixer(mixer))
        }),
        WaveInput::Stream => Pipeline::new("WAVE: read afc", move |_| {
            let stream = decode_stream(&input.read()?)
                .with_context(|| format!("Failed to load stream: {:?}", input.path))?;
            Ok(WaveData::Stream {
                samples: stream.samples,
                sample_rate: stream.header.sample_rate as u32,
            })
        }),
    };

    let pipeline = match output.format {
        WaveOutput::Raw(format) => pipeline.then("WAVE: write raw", move |data, _| {
            let WaveData::Mixer(mixer) = data else {
                bail!("WAVE: streams can only be converted to wav");
            };
            let mut writer = BinaryWriter::new(Vec::new(), Endian::Big);
            mixer.write(format, &mut writer)?;
            tracing::info!("WAVE: wrote {} {} sample(s)", mixer.sample_count(), format);
            output.write(writer.into_inner())
        }),
        WaveOutput::Wav => pipeline.then("WAVE: write wav", move |data, _| {
            let bytes = match data {
                WaveData::Mixer(mixer) => {
                    let rate = sample_rate(mixer, options.sample_rate)?;
                    encode_wav(&mixer.to_pcm16(), 1, rate, None)?
                }
                WaveData::Stream {
                    samples,
                    sample_rate,
                } => encode_wav(samples, 2, options.sample_rate.unwrap_or(*sample_rate), None)?,
            };
            output.write(bytes)
        }),
        WaveOutput::Stream(format) => pipeline.then("WAVE: write afc", move |data, _| {
            let WaveData::Mixer(mixer) = data else {
                bail!("WAVE: streams can only be converted to wav");
            };
            let rate = sample_rate(mixer, options.sample_rate)?;
            let rate = u16::try_from(rate).with_context(|| format!("WAVE: sample rate {rate} is too high for a stream"))?;
            if let Some(start) = options.loop_start
                && start as usize >= mixer.sample_count()
            {
                bail!("WAVE: loop start {start} is past the last sample");
            }
            output.write(encode_stream(mixer, format, rate, options.frame_rate, options.loop_start)?)
        }),
    };

    Ok(pipeline)
}

/// Rate given on the command line, else the one recorded in the source
fn sample_rate(mixer: &WaveMixer, requested: Option<u32>) -> Result<u32> {
    match requested.or_else(|| mixer.sample_rate()) {
        Some(rate) if rate > 0 => Ok(rate),
        _ => bail!("WAVE: a sample rate is required for raw input (use --sample-rate)"),
    }
}

/// Run one wave conversion
pub fn run(options: &WaveOptions, diag: &mut Diagnostics) -> Result<()> {
    tracing::info!(
        "WAVE: {:?} ({}) -> {:?} ({})",
        options.input.path,
        options.input.format,
        options.output.path,
        options.output.format
    );
    if options.loop_start.is_some() && !matches!(options.output.format, WaveOutput::Stream(_)) {
        diag.warn("WAVE: ignoring --loop, it only applies to stream output");
    }
    pipeline(options)?.run(diag)?;
    Ok(())
}
