//! Sample-only SoundFont export of a wave bank

use crate::bank::WaveBank;
use crate::error::WsysError;
use sms_audio_shared::soundfont::{SampleHeader, SoundFont};
use sms_wave::WaveMixer;
use std::fs;
use std::path::Path;

/// Silent samples required after every sample in the pool
const SAMPLE_GAP: u32 = 46;

/// Longest archive stem that still leaves room for `_{id:05}` and the
/// terminator in the 20-byte name field
const NAME_STEM_LEN: usize = 13;

/// Decode every wave to PCM16 and dump it into a `.sf2` with no presets
///
/// Archives are read from `bank_dir`. Samples are named
/// `{archive stem}_{id:05}` and keep their loop points and root key.
pub fn write_soundfont(bank: &WaveBank, bank_dir: &Path) -> Result<Vec<u8>, WsysError> {
    let mut soundfont = SoundFont::new(&bank.name);

    for group in &bank.groups {
        let path = bank_dir.join(&group.archive);
        let archive = fs::read(&path).map_err(WsysError::file(path))?;
        let stem: String = group.archive_stem().chars().take(NAME_STEM_LEN).collect();

        for wave in &group.waves {
            let start = wave.wave_start as usize;
            let payload = start
                .checked_add(wave.wave_size as usize)
                .and_then(|end| archive.get(start..end))
                .ok_or_else(|| WsysError::WaveOutOfBounds {
                    id: wave.id,
                    archive: group.archive.clone(),
                })?;

            let samples = WaveMixer::raw(payload.to_vec(), wave.format).to_pcm16();
            let start = soundfont.sample_data.len() as u32;
            let count = samples.len() as u32;
            let (loop_start, loop_end) = if wave.looping {
                (start + wave.loop_start, start + wave.loop_end)
            } else {
                (start, start)
            };

            soundfont.samples.push(SampleHeader {
                name: format!("{}_{:05}", stem, wave.id),
                start,
                end: start + count,
                loop_start,
                loop_end,
                sample_rate: wave.sample_rate as u32,
                original_key: wave.root_key,
                correction: 0,
            });

            soundfont.sample_data.extend_from_slice(&samples);
            soundfont
                .sample_data
                .resize(soundfont.sample_data.len() + SAMPLE_GAP as usize, 0);
        }
    }

    tracing::info!(
        "SF2: {} sample(s), {} frames in the pool",
        soundfont.samples.len(),
        soundfont.sample_data.len()
    );
    Ok(soundfont.to_bytes()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::WaveGroup;
    use sms_wave::{Wave, WaveFormat};
    use tempfile::TempDir;

    fn find_chunk<'a>(data: &'a [u8], id: &[u8; 4]) -> &'a [u8] {
        let at = data.windows(4).position(|w| w == id).unwrap();
        let size = u32::from_le_bytes(data[at + 4..at + 8].try_into().unwrap()) as usize;
        &data[at + 8..at + 8 + size]
    }

    fn le_u32(data: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(data[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn test_sample_pool_layout() {
        let dir = TempDir::new().unwrap();
        let mut archive = vec![0u8; 64];
        archive[..4].copy_from_slice(&[10, 20, 30, 40]);
        archive[32..36].copy_from_slice(&[0x01, 0x00, 0xFF, 0xFE]);
        fs::write(dir.path().join("a_rather_long_archive.aw"), &archive).unwrap();

        let mut plain = Wave::new(1, WaveFormat::Pcm8);
        plain.wave_size = 4;
        plain.sample_rate = 16000.0;

        let mut looped = Wave::new(2, WaveFormat::Pcm16);
        looped.wave_start = 32;
        looped.wave_size = 4;
        looped.sample_rate = 32000.0;
        looped.root_key = 72;
        looped.looping = true;
        looped.loop_start = 0;
        looped.loop_end = 2;

        let mut group = WaveGroup::new("a_rather_long_archive.aw");
        group.waves = vec![plain, looped];
        let bank = WaveBank {
            name: "sf".to_string(),
            groups: vec![group],
        };

        let bytes = write_soundfont(&bank, dir.path()).unwrap();

        // 4 + 46 + 2 + 46 samples
        assert_eq!(find_chunk(&bytes, b"smpl").len(), 98 * 2);

        let shdr = find_chunk(&bytes, b"shdr");
        assert_eq!(shdr.len(), 46 * 3);
        assert_eq!(&shdr[..20], b"a_rather_long_00001\0");
        assert_eq!((le_u32(shdr, 20), le_u32(shdr, 24)), (0, 4));
        assert_eq!((le_u32(shdr, 28), le_u32(shdr, 32)), (0, 0));
        assert_eq!(le_u32(shdr, 36), 16000);

        let second = &shdr[46..];
        assert_eq!((le_u32(second, 20), le_u32(second, 24)), (50, 52));
        assert_eq!((le_u32(second, 28), le_u32(second, 32)), (50, 52));
        assert_eq!(second[40], 72);

        // No presets or instruments, only the terminal records
        assert_eq!(find_chunk(&bytes, b"phdr").len(), 38);
        assert_eq!(find_chunk(&bytes, b"inst").len(), 22);
    }

    #[test]
    fn test_missing_archive() {
        let dir = TempDir::new().unwrap();
        let mut bank = WaveBank::new("sf");
        bank.groups.push(WaveGroup::new("gone.aw"));
        assert!(matches!(
            write_soundfont(&bank, dir.path()),
            Err(WsysError::File { .. })
        ));
    }
}
