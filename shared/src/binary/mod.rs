//! Endian-aware binary streams
//!
//! Bank formats store every offset relative to the start of the block that
//! contains it. Both the reader and the writer keep an explicit stack of
//! anchors: `push_anchor` marks the current position as the new origin and
//! `pop_anchor` restores the previous one. Pushes and pops must nest.

mod reader;
mod writer;

pub use reader::BinaryReader;
pub use writer::BinaryWriter;

use std::fmt;
use std::str::FromStr;

/// Byte order of multi-byte fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endian::Big => write!(f, "big-endian"),
            Endian::Little => write!(f, "little-endian"),
        }
    }
}

impl FromStr for Endian {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "be" | "big" => Ok(Endian::Big),
            "le" | "little" => Ok(Endian::Little),
            _ => Err(format!("unknown byte order '{s}'")),
        }
    }
}

/// Round `value` up to the next multiple of `alignment` (a power of two)
#[inline]
pub const fn align_up(value: u32, alignment: u32) -> u32 {
    (value + alignment - 1) & !(alignment - 1)
}
