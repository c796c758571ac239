//! Shared building blocks for the SMS audio bank converters.
//!
//! Everything here is format-agnostic plumbing used by more than one codec
//! crate: endian-aware binary streams with anchored offsets, the warning
//! counter, MIDI key names, XML attribute helpers and a SoundFont builder.

pub mod binary;
pub mod diagnostics;
pub mod key;
pub mod soundfont;
pub mod xml;

pub use binary::{BinaryReader, BinaryWriter, Endian, align_up};
pub use diagnostics::Diagnostics;
