//! Wave bank data structures

use sms_wave::Wave;
use std::path::Path;

/// Parsed wave bank
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaveBank {
    /// Display name (usually the source file name)
    pub name: String,
    pub groups: Vec<WaveGroup>,
}

impl WaveBank {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            groups: Vec::new(),
        }
    }

    /// Total waves across all groups
    pub fn wave_count(&self) -> usize {
        self.groups.iter().map(|group| group.waves.len()).sum()
    }

    pub fn waves(&self) -> impl Iterator<Item = &Wave> {
        self.groups.iter().flat_map(|group| group.waves.iter())
    }
}

/// Waves stored together in one archive file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaveGroup {
    /// Archive file name, relative to the bank directory
    pub archive: String,
    pub waves: Vec<Wave>,
}

impl WaveGroup {
    pub fn new(archive: impl Into<String>) -> Self {
        Self {
            archive: archive.into(),
            waves: Vec::new(),
        }
    }

    /// Archive name without its extension, used to name extracted waves
    pub fn archive_stem(&self) -> &str {
        Path::new(&self.archive)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.archive)
    }
}
