//! Binary bank writer
//!
//! Writes strictly sequentially. Serializers compute every offset up front,
//! so the writer only needs to track how many bytes it has emitted.

use super::{Endian, align_up};
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use std::io::{self, Write};

/// Writer for anchored, endian-aware binary data
pub struct BinaryWriter<W: Write> {
    writer: W,
    endian: Endian,
    written: u64,
    anchors: Vec<u64>,
}

macro_rules! write_ordered {
    ($name:ident, $ty:ty, $size:expr) => {
        pub fn $name(&mut self, value: $ty) -> io::Result<()> {
            match self.endian {
                Endian::Big => self.writer.$name::<BigEndian>(value)?,
                Endian::Little => self.writer.$name::<LittleEndian>(value)?,
            }
            self.written += $size;
            Ok(())
        }
    };
}

impl<W: Write> BinaryWriter<W> {
    /// Create a new binary writer
    pub fn new(writer: W, endian: Endian) -> Self {
        Self {
            writer,
            endian,
            written: 0,
            anchors: Vec::new(),
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Current position relative to the innermost anchor
    pub fn position(&self) -> u64 {
        self.written - self.anchors.last().copied().unwrap_or(0)
    }

    /// Make the current position the origin for subsequent offsets
    pub fn push_anchor(&mut self) {
        self.anchors.push(self.written);
    }

    /// Restore the previous origin
    pub fn pop_anchor(&mut self) {
        self.anchors.pop();
    }

    pub fn write_u8(&mut self, value: u8) -> io::Result<()> {
        self.writer.write_u8(value)?;
        self.written += 1;
        Ok(())
    }

    pub fn write_i8(&mut self, value: i8) -> io::Result<()> {
        self.writer.write_i8(value)?;
        self.written += 1;
        Ok(())
    }

    write_ordered!(write_u16, u16, 2);
    write_ordered!(write_i16, i16, 2);
    write_ordered!(write_u32, u32, 4);
    write_ordered!(write_i32, i32, 4);
    write_ordered!(write_f32, f32, 4);

    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    pub fn write_zeros(&mut self, count: usize) -> io::Result<()> {
        const ZEROS: [u8; 64] = [0; 64];
        let mut left = count;
        while left > 0 {
            let n = left.min(ZEROS.len());
            self.write_bytes(&ZEROS[..n])?;
            left -= n;
        }
        Ok(())
    }

    /// Write `text` into a null-padded field of exactly `len` bytes
    ///
    /// Longer text is truncated, keeping at least one terminating zero.
    pub fn write_fixed_string(&mut self, text: &str, len: usize) -> io::Result<()> {
        let bytes = text.as_bytes();
        let n = bytes.len().min(len.saturating_sub(1));
        self.write_bytes(&bytes[..n])?;
        self.write_zeros(len - n)
    }

    /// Zero-fill up to the next multiple of `alignment` (relative to the anchor)
    pub fn pad_to(&mut self, alignment: u32) -> io::Result<()> {
        let position = self.position() as u32;
        let padding = align_up(position, alignment) - position;
        self.write_zeros(padding as usize)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Consume the writer, returning the underlying sink
    pub fn into_inner(self) -> W {
        self.writer
    }
}
