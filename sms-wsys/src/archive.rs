//! Moving sample data between loose wave files and wave archives
//!
//! Packing reads each wave's source file, mixes it to the wave's declared
//! format and appends it to the group's archive, recording where it landed.
//! Extraction does the inverse, writing one `.raw` or `.wav` file per wave.

use crate::bank::{WaveBank, WaveGroup};
use crate::error::WsysError;
use sms_audio_shared::key::key_name;
use sms_audio_shared::{BinaryWriter, Diagnostics, Endian};
use sms_wave::wav::{Sampler, encode_wav};
use sms_wave::{DEFAULT_ROOT_KEY, MixerMode, Wave, WaveMixer};
use std::fs;
use std::path::Path;

/// Waves start on 32-byte boundaries inside an archive
const WAVE_ALIGNMENT: u32 = 32;

/// Pack every group's loose wave files into its archive
///
/// Source files are looked up in `wave_dir`; archives are written to
/// `bank_dir`, which is created if needed. Each wave's start, size, sample
/// count and loop history are filled in. A missing or unsupported source
/// file is reported and packing carries on; the call then fails once every
/// wave has been attempted.
pub fn pack_archives(
    bank: &mut WaveBank,
    wave_dir: &Path,
    bank_dir: &Path,
    mode: MixerMode,
    diag: &mut Diagnostics,
) -> Result<(), WsysError> {
    fs::create_dir_all(bank_dir).map_err(WsysError::file(bank_dir))?;

    let mut failed = 0;
    for group in &mut bank.groups {
        tracing::info!("XFER: packing '{}'", group.archive);
        let archive = pack_group(group, wave_dir, mode, diag, &mut failed)?;
        let path = bank_dir.join(&group.archive);
        fs::write(&path, archive).map_err(WsysError::file(path))?;
    }

    if failed > 0 {
        return Err(WsysError::FailedTransfers(failed));
    }
    Ok(())
}

fn pack_group(
    group: &mut WaveGroup,
    wave_dir: &Path,
    mode: MixerMode,
    diag: &mut Diagnostics,
    failed: &mut usize,
) -> Result<Vec<u8>, WsysError> {
    let mut writer = BinaryWriter::new(Vec::new(), Endian::Big);

    for wave in &mut group.waves {
        let Some(mixer) = open_source(wave, wave_dir, mode, diag)? else {
            *failed += 1;
            continue;
        };

        wave.wave_start = writer.position() as u32;
        mixer.copy_wave_info(wave);

        if wave.looping && wave.loop_start > 0 {
            match mixer.calculate_history(wave.loop_start as usize, wave.format) {
                Ok(history) => wave.history = history,
                Err(err) => diag.warn(format!("XFER: wave #{:04X}: {err}", wave.id)),
            }
        }

        mixer.write(wave.format, &mut writer)?;
        wave.wave_size = writer.position() as u32 - wave.wave_start;
        writer.pad_to(WAVE_ALIGNMENT)?;

        tracing::debug!(
            " #{:04X} '{}' (0x{:06X} 0x{:06X})",
            wave.id,
            wave.file_name,
            wave.wave_start,
            wave.wave_size
        );
    }

    Ok(writer.into_inner())
}

/// Build a mixer over a wave's source file, `None` when it cannot be used
fn open_source(
    wave: &Wave,
    wave_dir: &Path,
    mode: MixerMode,
    diag: &mut Diagnostics,
) -> Result<Option<WaveMixer>, WsysError> {
    let path = wave_dir.join(&wave.file_name);
    let data = match fs::read(&path) {
        Ok(data) => data,
        Err(err) => {
            diag.warn(format!("XFER: could not open '{}': {err}", path.display()));
            return Ok(None);
        }
    };

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("wav") => Ok(Some(WaveMixer::microsoft(&data, mode)?)),
        Some("raw") => Ok(Some(WaveMixer::raw(data, wave.format))),
        _ => {
            diag.warn(format!("XFER: unsupported wave file '{}'", path.display()));
            Ok(None)
        }
    }
}

/// Extract every wave from its archive into `wave_dir`
///
/// Archives are read from `bank_dir`. Each wave's `file_name` is set to the
/// generated name of the file written for it.
pub fn extract_archives(
    bank: &mut WaveBank,
    bank_dir: &Path,
    wave_dir: &Path,
    extract_wav: bool,
    diag: &mut Diagnostics,
) -> Result<(), WsysError> {
    fs::create_dir_all(wave_dir).map_err(WsysError::file(wave_dir))?;
    let extension = if extract_wav { "wav" } else { "raw" };
    let mark = diag.warnings();

    for group in &mut bank.groups {
        let path = bank_dir.join(&group.archive);
        let archive = fs::read(&path).map_err(WsysError::file(path))?;
        tracing::info!("XFER: extracting '{}'", group.archive);

        let stem = group.archive_stem().to_string();
        for wave in &mut group.waves {
            let payload = wave_payload(&archive, wave, &group.archive)?;
            wave.file_name = wave.extracted_name(&stem, extension);

            let contents = if extract_wav {
                wave_file(wave, payload)?
            } else {
                payload.to_vec()
            };

            let path = wave_dir.join(&wave.file_name);
            fs::write(&path, contents).map_err(WsysError::file(path))?;

            tracing::debug!(
                " #{:04X} {} {} {}Hz {} samples",
                wave.id,
                key_name(wave.root_key),
                wave.format,
                wave.sample_rate,
                wave.sample_count
            );
        }
    }

    tracing::info!("XFER: extracted {} wave(s), {} warning(s)", bank.wave_count(), diag.since(mark));
    Ok(())
}

fn wave_payload<'a>(archive: &'a [u8], wave: &Wave, name: &str) -> Result<&'a [u8], WsysError> {
    let start = wave.wave_start as usize;
    start
        .checked_add(wave.wave_size as usize)
        .and_then(|end| archive.get(start..end))
        .ok_or_else(|| WsysError::WaveOutOfBounds {
            id: wave.id,
            archive: name.to_string(),
        })
}

/// Mono PCM16 WAV, with a `smpl` chunk when the wave loops or is pitched
fn wave_file(wave: &Wave, payload: &[u8]) -> Result<Vec<u8>, WsysError> {
    let samples = WaveMixer::raw(payload.to_vec(), wave.format).to_pcm16();

    let sampler = (wave.looping || wave.root_key != DEFAULT_ROOT_KEY).then(|| Sampler {
        root_key: wave.root_key,
        loop_range: wave
            .looping
            .then(|| (wave.loop_start, wave.loop_end.saturating_sub(1))),
    });

    Ok(encode_wav(&samples, 1, wave.sample_rate as u32, sampler.as_ref())?)
}
