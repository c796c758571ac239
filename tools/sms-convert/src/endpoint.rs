//! Input and output files with their format tokens

use anyhow::{Context, Result, bail};
use sms_audio_shared::Endian;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Representation of an instrument or wave bank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankFormat {
    Xml,
    BigEndian,
    LittleEndian,
    /// Output only
    SoundFont,
}

impl BankFormat {
    /// Byte order of the binary formats
    pub fn endian(self) -> Option<Endian> {
        match self {
            BankFormat::BigEndian => Some(Endian::Big),
            BankFormat::LittleEndian => Some(Endian::Little),
            BankFormat::Xml | BankFormat::SoundFont => None,
        }
    }
}

impl fmt::Display for BankFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BankFormat::Xml => f.write_str("xml"),
            BankFormat::BigEndian => f.write_str("be"),
            BankFormat::LittleEndian => f.write_str("le"),
            BankFormat::SoundFont => f.write_str("sf2"),
        }
    }
}

impl FromStr for BankFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xml" => Ok(BankFormat::Xml),
            "be" => Ok(BankFormat::BigEndian),
            "le" => Ok(BankFormat::LittleEndian),
            "sf2" => Ok(BankFormat::SoundFont),
            _ => Err(format!("unknown bank format '{s}' (use xml, be, le or sf2)")),
        }
    }
}

/// A file paired with the format it is read or written in
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint<F> {
    pub path: PathBuf,
    pub format: F,
}

impl<F: FromStr<Err = String>> Endpoint<F> {
    /// Build from the `FILE FMT` value pair given on the command line
    pub fn parse(values: &[String]) -> Result<Self> {
        let [path, format] = values else {
            bail!("expected a file and a format, got {} value(s)", values.len());
        };
        let format = format
            .parse()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Bad format for {:?}", path))?;
        Ok(Self {
            path: PathBuf::from(path),
            format,
        })
    }
}

impl<F> Endpoint<F> {
    pub fn new(path: impl Into<PathBuf>, format: F) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// File name used as the model's display name
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Resolve `relative` against the directory holding this file
    pub fn sibling(&self, relative: &Path) -> PathBuf {
        match self.path.parent() {
            Some(parent) => parent.join(relative),
            None => relative.to_path_buf(),
        }
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.path).with_context(|| format!("Failed to read input: {:?}", self.path))
    }

    pub fn read_to_string(&self) -> Result<String> {
        std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read input: {:?}", self.path))
    }

    pub fn write(&self, data: impl AsRef<[u8]>) -> Result<()> {
        std::fs::write(&self.path, data)
            .with_context(|| format!("Failed to create output: {:?}", self.path))
    }
}
