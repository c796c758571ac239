//! sms-convert - SMS audio bank converter
//!
//! Moves instrument banks (IBNK), wave banks (WSYS) and single waves between
//! their binary, XML, SoundFont, WAV and stream forms.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use sms_audio_shared::Diagnostics;
use sms_convert::ibnk::IbnkOptions;
use sms_convert::wave::WaveOptions;
use sms_convert::wsys::WsysOptions;
use sms_convert::{Endpoint, ibnk, wave, wsys};
use sms_wave::MixerMode;
use sms_wave::stream::DEFAULT_FRAME_RATE;
use sms_wsys::{DEFAULT_BANK_DIR, DEFAULT_WAVE_DIR};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sms-convert")]
#[command(about = "SMS audio bank converter")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Input and output files shared by every errand
#[derive(Args)]
struct Files {
    /// Input file and its format
    #[arg(long, num_args = 2, value_names = ["FILE", "FMT"], required = true)]
    input: Vec<String>,

    /// Output file and its format
    #[arg(long, num_args = 2, value_names = ["FILE", "FMT"], required = true)]
    output: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an instrument bank (formats: xml, be, le, sf2)
    Ibnk {
        #[command(flatten)]
        files: Files,
    },

    /// Convert a wave bank, packing or extracting its archives (formats: xml, be, le, sf2)
    Wsys {
        #[command(flatten)]
        files: Files,

        /// How stereo WAV files are folded to mono (mix, left, right)
        #[arg(long, default_value = "mix")]
        mix_mode: MixerMode,

        /// Loose wave directory, relative to the XML file
        #[arg(long, default_value = DEFAULT_WAVE_DIR)]
        wave_dir: PathBuf,

        /// Archive directory, relative to the binary file
        #[arg(long, default_value = DEFAULT_BANK_DIR)]
        bank_dir: PathBuf,

        /// Extract waves as .wav instead of raw dumps
        #[arg(long)]
        extract_wav: bool,
    },

    /// Convert a single wave (formats: pcm8, pcm16, adpcm2, adpcm4, wav, afc, afc-pcm, afc-adpcm)
    Wave {
        #[command(flatten)]
        files: Files,

        /// How stereo WAV files are folded to mono (mix, left, right)
        #[arg(long, default_value = "mix")]
        mix_mode: MixerMode,

        /// Sample rate for raw input
        #[arg(long)]
        sample_rate: Option<u32>,

        /// Frame rate written into streams
        #[arg(long, default_value_t = DEFAULT_FRAME_RATE)]
        frame_rate: u16,

        /// Loop start sample for stream output
        #[arg(long = "loop", value_name = "SAMPLE")]
        loop_start: Option<u32>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let mut diag = Diagnostics::new();

    let result = match cli.command {
        Commands::Ibnk { files } => {
            let options = IbnkOptions {
                input: Endpoint::parse(&files.input)?,
                output: Endpoint::parse(&files.output)?,
            };
            ibnk::run(&options, &mut diag)
        }

        Commands::Wsys {
            files,
            mix_mode,
            wave_dir,
            bank_dir,
            extract_wav,
        } => {
            let options = WsysOptions {
                input: Endpoint::parse(&files.input)?,
                output: Endpoint::parse(&files.output)?,
                mix_mode,
                wave_dir,
                bank_dir,
                extract_wav,
            };
            wsys::run(&options, &mut diag)
        }

        Commands::Wave {
            files,
            mix_mode,
            sample_rate,
            frame_rate,
            loop_start,
        } => {
            let options = WaveOptions {
                input: Endpoint::parse(&files.input)?,
                output: Endpoint::parse(&files.output)?,
                mix_mode,
                sample_rate,
                frame_rate,
                loop_start,
            };
            wave::run(&options, &mut diag)
        }
    };

    match &result {
        Ok(()) => tracing::info!("Done with {} warning(s)", diag.warnings()),
        Err(_) => tracing::error!("Failed with {} warning(s)", diag.warnings()),
    }
    result
}
