//! sms-ibnk: instrument banks for the SMS sound engine
//!
//! An instrument bank maps program numbers to playable instruments. Melodic
//! instruments pick a wave by key and velocity and may carry envelope
//! oscillators and modulation effects; drum sets map each key to its own
//! percussion sound.
//!
//! Banks convert between three representations:
//!
//! - **Binary** - the console format, big- or little-endian ([`read_ibnk`],
//!   [`write_ibnk`])
//! - **XML** - an editable text form ([`read_xml`], [`write_xml`])
//! - **SoundFont** - a lossy, write-only preview ([`write_soundfont`])
//!
//! # Usage
//!
//! ```ignore
//! use sms_audio_shared::{Diagnostics, Endian};
//! use sms_ibnk::{read_ibnk, write_xml};
//!
//! let mut diag = Diagnostics::new();
//! let data = std::fs::read("bank.bnk")?;
//! let bank = read_ibnk(&data, Endian::Big, "bank.bnk", &mut diag)?;
//! std::fs::write("bank.xml", write_xml(&bank)?)?;
//! ```
//!
//! # Binary layout
//!
//! ```text
//! 0x0000  header: "IBNK", total size, virtual number
//! 0x0020  instrument table: "IBNK", 240 offsets (0 = empty)
//! 0x0400  oscillator table (identical oscillators stored once)
//! ....    instruments in program order ("INST" or "PER2")
//! ```
//!
//! All offsets are relative to the start of the bank.

mod bank;
mod binary;
mod compat;
mod error;
mod soundfont;
mod xml;

#[cfg(test)]
mod fixtures;

pub use bank::{
    BANK_CAPACITY, DRUM_SET_KEYS, DrumSet, Effect, EffectTarget, Instrument, InstrumentBank,
    KeyRegion, Melodic, Oscillator, OscillatorKey, Percussion, RandomEffect, SenseEffect,
    SenseTrigger, TableEntry, TableMode, VelocityRegion,
};
pub use binary::{read_ibnk, write_ibnk};
pub use compat::check_compatibility;
pub use error::IbnkError;
pub use soundfont::write_soundfont;
pub use xml::{read_xml, write_xml};

// =============================================================================
// Format constants
// =============================================================================

const fn tag(bytes: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*bytes)
}

/// Header and instrument table tag
pub const IBNK_MAGIC: u32 = tag(b"IBNK");

/// Alternate tag accepted when reading
pub const BANK_MAGIC: u32 = tag(b"BANK");

/// Melodic instrument
pub const INST_MAGIC: u32 = tag(b"INST");

/// Drum set without pan/release tables
pub const PERC_MAGIC: u32 = tag(b"PERC");

/// Drum set with pan/release tables
pub const PER2_MAGIC: u32 = tag(b"PER2");

/// Programs addressable by the binary instrument table
pub const PROGRAM_SLOTS: usize = 240;

/// Offset of the instrument table
pub const TABLE_OFFSET: u64 = 32;

/// Offset of the first oscillator or instrument
pub const DATA_START: u32 = 1024;

/// Padded size of a `PER2` header
pub const PER2_HEADER_SIZE: u32 = 1056;

pub const MAX_OSCILLATORS: usize = 2;
pub const MAX_RANDOM_EFFECTS: usize = 2;
pub const MAX_SENSE_EFFECTS: usize = 2;
