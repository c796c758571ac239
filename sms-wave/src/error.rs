use std::io;

/// Errors raised while reading or converting sample data
#[derive(Debug, thiserror::Error)]
pub enum WaveError {
    #[error("WAV: {0}")]
    Wav(#[from] hound::Error),

    #[error("WAV: only LPCM is supported")]
    UnsupportedSampleFormat,

    #[error("WAV: only mono or stereo is supported (found {0} channels)")]
    UnsupportedChannels(u16),

    #[error("WAV: only bit-depths of 8 and 16 are supported (found {0})")]
    UnsupportedBitDepth(u16),

    #[error("sample {sample} is out of range (wave has {count} samples)")]
    SampleOutOfRange { sample: usize, count: usize },

    #[error("stream: unknown format {0}")]
    BadStreamFormat(u16),

    #[error("stream: data ends before {expected} bytes")]
    TruncatedStream { expected: u64 },

    #[error("stream: {0} samples do not fit in a stream header")]
    StreamTooLong(usize),

    #[error(transparent)]
    Io(#[from] io::Error),
}
