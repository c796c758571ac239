//! Instrument bank error types

use sms_audio_shared::xml::{AttributeError, XmlWriteError};
use std::io;

/// Fatal errors while reading or writing an instrument bank
///
/// Recoverable defects are reported through
/// [`Diagnostics`](sms_audio_shared::Diagnostics) instead.
#[derive(Debug, thiserror::Error)]
pub enum IbnkError {
    #[error("IBNK: could not find header")]
    MissingHeader,

    #[error("IBNK: could not find instrument table")]
    MissingTable,

    #[error("IBNK: bank is incompatible with the binary format ({0} problem(s))")]
    Incompatible(usize),

    #[error("XML: root element is <{0}>, expected <IBNK>")]
    BadRoot(String),

    #[error("XML: line #{line}: unknown oscillator table mode '{name}'")]
    UnknownTableMode { line: u32, name: String },

    #[error("XML: bad input xml ({0} warning(s))")]
    BadXml(usize),

    #[error("XML: {0}")]
    Attribute(#[from] AttributeError),

    #[error("XML: {0}")]
    Parse(#[from] roxmltree::Error),

    #[error(transparent)]
    Write(#[from] XmlWriteError),

    #[error("IBNK: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(IbnkError::MissingHeader.to_string(), "IBNK: could not find header");
        assert_eq!(
            IbnkError::Incompatible(3).to_string(),
            "IBNK: bank is incompatible with the binary format (3 problem(s))"
        );
        assert_eq!(
            IbnkError::UnknownTableMode {
                line: 7,
                name: "ramp".to_string()
            }
            .to_string(),
            "XML: line #7: unknown oscillator table mode 'ramp'"
        );
    }
}
