//! sms-wsys: wave banks for the SMS sound engine
//!
//! A wave bank lists every sampled wave the instrument banks can play. Waves
//! are grouped by the archive file that holds their sample data; the bank
//! itself only records where each wave lives and how it is encoded.
//!
//! # Key Features
//!
//! - **Binary codec**: big- or little-endian `WSYS` files ([`read_wsys`], [`write_wsys`])
//! - **XML codec**: editable text form ([`read_xml`], [`write_xml`])
//! - **Archives**: pack loose `.wav`/`.raw` files into archives and extract them again
//!   ([`pack_archives`], [`extract_archives`])
//! - **SoundFont**: dump every wave into a sample-only `.sf2` ([`write_soundfont`])
//!
//! # Usage
//!
//! ```ignore
//! use sms_audio_shared::{Diagnostics, Endian};
//! use sms_wsys::{read_xml, pack_archives, write_wsys};
//! use sms_wave::MixerMode;
//!
//! let mut diag = Diagnostics::new();
//! let text = std::fs::read_to_string("waves.xml")?;
//! let mut bank = read_xml(&text, "waves.xml", &mut diag)?;
//! pack_archives(&mut bank, "waves".as_ref(), "banks".as_ref(), MixerMode::Mix, &mut diag)?;
//! std::fs::write("waves.ws", write_wsys(&bank, Endian::Big, &mut diag)?)?;
//! ```
//!
//! # Binary layout
//!
//! ```text
//! 0x0000  header: "WSYS", total size, WINF offset, WBCT offset
//! 0x0020  WINF: group count, archive info offsets
//! ....    WBCT: scene count, scene offsets
//! ....    per group: archive info, wave records, C-DF, C-EX, C-ST, SCNE
//! ```

mod archive;
mod bank;
mod binary;
mod error;
mod soundfont;
mod xml;

pub use archive::{extract_archives, pack_archives};
pub use bank::{WaveBank, WaveGroup};
pub use binary::{read_wsys, write_wsys};
pub use error::WsysError;
pub use soundfont::write_soundfont;
pub use xml::{read_xml, write_xml};

// =============================================================================
// Format constants
// =============================================================================

const fn tag(bytes: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*bytes)
}

pub const WSYS_MAGIC: u32 = tag(b"WSYS");

/// Wave group table
pub const WINF_MAGIC: u32 = tag(b"WINF");

/// Scene table
pub const WBCT_MAGIC: u32 = tag(b"WBCT");

pub const SCNE_MAGIC: u32 = tag(b"SCNE");

/// Wave id table
pub const CDF_MAGIC: u32 = tag(b"C-DF");

pub const CEX_MAGIC: u32 = tag(b"C-EX");
pub const CST_MAGIC: u32 = tag(b"C-ST");

/// Size of the archive name field
pub const ARCHIVE_NAME_SIZE: usize = 112;

/// Size of one wave record
pub const WAVE_RECORD_SIZE: u32 = 48;

/// Default directory for loose wave files
pub const DEFAULT_WAVE_DIR: &str = "waves/";

/// Default directory for wave archives
pub const DEFAULT_BANK_DIR: &str = "banks/";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags() {
        assert_eq!(WSYS_MAGIC, 0x57535953);
        assert_eq!(CDF_MAGIC, 0x432D4446);
        assert_eq!(&SCNE_MAGIC.to_be_bytes(), b"SCNE");
    }
}
