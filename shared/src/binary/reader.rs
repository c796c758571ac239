//! Binary bank reader
//!
//! Reads from an in-memory buffer so that offset tables can be followed in
//! any order.

use super::Endian;
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::{self, Cursor, Read, Seek, SeekFrom};

/// Reader for anchored, endian-aware binary data
pub struct BinaryReader<'a> {
    cursor: Cursor<&'a [u8]>,
    endian: Endian,
    anchors: Vec<u64>,
}

macro_rules! read_ordered {
    ($(#[$doc:meta])* $name:ident, $ty:ty) => {
        $(#[$doc])*
        pub fn $name(&mut self) -> io::Result<$ty> {
            match self.endian {
                Endian::Big => self.cursor.$name::<BigEndian>(),
                Endian::Little => self.cursor.$name::<LittleEndian>(),
            }
        }
    };
}

impl<'a> BinaryReader<'a> {
    /// Create a reader positioned at the start of `data`
    pub fn new(data: &'a [u8], endian: Endian) -> Self {
        Self {
            cursor: Cursor::new(data),
            endian,
            anchors: Vec::new(),
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Total length of the underlying buffer
    pub fn len(&self) -> u64 {
        self.cursor.get_ref().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.get_ref().is_empty()
    }

    fn anchor(&self) -> u64 {
        self.anchors.last().copied().unwrap_or(0)
    }

    /// Current position relative to the innermost anchor
    pub fn position(&self) -> u64 {
        self.cursor.position() - self.anchor()
    }

    /// Make the current position the origin for subsequent offsets
    pub fn push_anchor(&mut self) {
        self.anchors.push(self.cursor.position());
    }

    /// Restore the previous origin
    pub fn pop_anchor(&mut self) {
        self.anchors.pop();
    }

    /// Seek to an offset relative to the innermost anchor
    pub fn goto(&mut self, offset: u64) -> io::Result<()> {
        let target = self.anchor() + offset;
        if target > self.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("offset 0x{offset:X} is past the end of the data"),
            ));
        }
        self.cursor.seek(SeekFrom::Start(target))?;
        Ok(())
    }

    pub fn skip(&mut self, count: u64) -> io::Result<()> {
        let position = self.position();
        self.goto(position + count)
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        self.cursor.read_u8()
    }

    pub fn read_i8(&mut self) -> io::Result<i8> {
        self.cursor.read_i8()
    }

    read_ordered!(read_u16, u16);
    read_ordered!(read_i16, i16);
    read_ordered!(read_u32, u32);
    read_ordered!(read_i32, i32);
    read_ordered!(read_f32, f32);

    pub fn read_bytes(&mut self, count: usize) -> io::Result<Vec<u8>> {
        let mut bytes = vec![0u8; count];
        self.cursor.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    /// Read a null-padded string field of exactly `len` bytes
    pub fn read_fixed_string(&mut self, len: usize) -> io::Result<String> {
        let bytes = self.read_bytes(len)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(len);
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }
}
