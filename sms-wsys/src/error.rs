//! Wave bank error types

use sms_audio_shared::xml::XmlWriteError;
use sms_wave::WaveError;
use std::io;
use std::path::PathBuf;

/// Fatal errors while converting a wave bank
#[derive(Debug, thiserror::Error)]
pub enum WsysError {
    #[error("WSYS: could not find header")]
    MissingHeader,

    #[error("WSYS: could not find {section} at 0x{offset:06X}")]
    MissingSection { section: &'static str, offset: u32 },

    #[error("WSYS: bad {what} count '{count}'")]
    BadCount { what: &'static str, count: i32 },

    #[error("WSYS: {first} count ({first_count}) does not match {second} count ({second_count})")]
    CountMismatch {
        first: &'static str,
        first_count: usize,
        second: &'static str,
        second_count: usize,
    },

    #[error("XML: root element is <{0}>, expected <wave-bank>")]
    BadRoot(String),

    #[error("XML: {0}")]
    Parse(#[from] roxmltree::Error),

    #[error(transparent)]
    Write(#[from] XmlWriteError),

    #[error("XFER: failed to transfer {0} wave(s)")]
    FailedTransfers(usize),

    #[error("XFER: wave #{id:04X} lies outside archive '{archive}'")]
    WaveOutOfBounds { id: u16, archive: String },

    #[error("'{}': {source}", path.display())]
    File { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Wave(#[from] WaveError),

    #[error("WSYS: {0}")]
    Io(#[from] io::Error),
}

impl WsysError {
    pub(crate) fn file(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| WsysError::File { path, source }
    }
}
