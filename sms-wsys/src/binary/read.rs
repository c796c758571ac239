//! WSYS binary parsing

use crate::bank::{WaveBank, WaveGroup};
use crate::error::WsysError;
use crate::{ARCHIVE_NAME_SIZE, CDF_MAGIC, SCNE_MAGIC, WBCT_MAGIC, WINF_MAGIC, WSYS_MAGIC};
use sms_adpcm::History;
use sms_audio_shared::{BinaryReader, Diagnostics, Endian};
use sms_wave::{Wave, WaveFormat};
use std::io;

/// Parse a binary wave bank
///
/// Broken structure (missing sections, tables that disagree on their
/// counts) is fatal. Bad values inside a wave record are reported to `diag`;
/// the wave is dropped when its format or position cannot be trusted. The
/// stored sample count is ignored and recomputed from format and size.
pub fn read_wsys(
    data: &[u8],
    endian: Endian,
    name: &str,
    diag: &mut Diagnostics,
) -> Result<WaveBank, WsysError> {
    let mut reader = BinaryReader::new(data, endian);
    reader.push_anchor();
    let bank = read_bank(&mut reader, name, diag);
    reader.pop_anchor();
    bank
}

fn read_count(reader: &mut BinaryReader<'_>, what: &'static str) -> Result<usize, WsysError> {
    let count = reader.read_i32()?;
    usize::try_from(count).map_err(|_| WsysError::BadCount { what, count })
}

fn read_offsets(reader: &mut BinaryReader<'_>, count: usize) -> io::Result<Vec<u32>> {
    (0..count).map(|_| reader.read_u32()).collect()
}

/// Jump to `offset` and check the section tag found there
fn enter_section(
    reader: &mut BinaryReader<'_>,
    offset: u32,
    magic: u32,
    section: &'static str,
) -> Result<(), WsysError> {
    reader.goto(offset as u64)?;
    if reader.read_u32()? != magic {
        return Err(WsysError::MissingSection { section, offset });
    }
    Ok(())
}

fn read_bank(
    reader: &mut BinaryReader<'_>,
    name: &str,
    diag: &mut Diagnostics,
) -> Result<WaveBank, WsysError> {
    if reader.read_u32()? != WSYS_MAGIC {
        return Err(WsysError::MissingHeader);
    }

    let size = reader.read_u32()?;
    reader.skip(8)?; // unused
    let winf_offset = reader.read_u32()?;
    let wbct_offset = reader.read_u32()?;
    tracing::info!("WSYS: header found, size {:.1} KB", size as f64 / 1024.0);

    enter_section(reader, winf_offset, WINF_MAGIC, "WINF")?;
    let group_count = read_count(reader, "wave group")?;
    let group_offsets = read_offsets(reader, group_count)?;
    tracing::info!("WSYS: WINF found, {} wave group(s)", group_count);

    enter_section(reader, wbct_offset, WBCT_MAGIC, "WBCT")?;
    reader.skip(4)?; // unused
    let scene_count = read_count(reader, "scene")?;
    if scene_count != group_count {
        return Err(WsysError::CountMismatch {
            first: "WINF",
            first_count: group_count,
            second: "WBCT",
            second_count: scene_count,
        });
    }
    let scene_offsets = read_offsets(reader, scene_count)?;

    let mut bank = WaveBank::new(name);
    for (index, (&group_offset, &scene_offset)) in group_offsets.iter().zip(&scene_offsets).enumerate() {
        let group = read_group(reader, index, group_offset, scene_offset, diag)?;
        tracing::debug!("WSYS: group #{} '{}', {} wave(s)", index, group.archive, group.waves.len());
        bank.groups.push(group);
    }

    Ok(bank)
}

fn read_group(
    reader: &mut BinaryReader<'_>,
    index: usize,
    group_offset: u32,
    scene_offset: u32,
    diag: &mut Diagnostics,
) -> Result<WaveGroup, WsysError> {
    reader.goto(group_offset as u64)?;
    let mut group = WaveGroup::new(reader.read_fixed_string(ARCHIVE_NAME_SIZE)?);
    let wave_count = read_count(reader, "wave")?;
    let info_offsets = read_offsets(reader, wave_count)?;

    enter_section(reader, scene_offset, SCNE_MAGIC, "SCNE")?;
    reader.skip(8)?; // unused
    let cdf_offset = reader.read_u32()?;

    enter_section(reader, cdf_offset, CDF_MAGIC, "C-DF")?;
    let id_count = read_count(reader, "wave id")?;
    if id_count != wave_count {
        return Err(WsysError::CountMismatch {
            first: "C-DF",
            first_count: id_count,
            second: "wave info",
            second_count: wave_count,
        });
    }
    let id_offsets = read_offsets(reader, id_count)?;

    for (wave_index, (&id_offset, &info_offset)) in id_offsets.iter().zip(&info_offsets).enumerate() {
        reader.goto(id_offset as u64)?;
        let id = (reader.read_u32()? & 0xFFFF) as u16;

        reader.goto(info_offset as u64)?;
        let context = format!("WSYS: group #{index}: wave #{wave_index}");
        if let Some(wave) = read_wave(reader, id, &context, diag)? {
            group.waves.push(wave);
        }
    }

    Ok(group)
}

/// Read the wave record that follows the id field
fn read_wave(
    reader: &mut BinaryReader<'_>,
    id: u16,
    context: &str,
    diag: &mut Diagnostics,
) -> Result<Option<Wave>, WsysError> {
    reader.skip(1)?; // unknown
    let raw_format = reader.read_u8()?;
    let key = reader.read_u8()?;
    reader.skip(1)?; // alignment
    let sample_rate = reader.read_f32()?;
    let wave_start = reader.read_i32()?;
    let wave_size = reader.read_i32()?;
    let looping = reader.read_u32()? != 0;
    let loop_start = reader.read_i32()?;
    let loop_end = reader.read_i32()?;
    reader.skip(4)?; // stored sample count
    let history = History::new(reader.read_i16()?, reader.read_i16()?);

    let Some(format) = WaveFormat::from_raw(raw_format) else {
        diag.warn(format!("{context}: bad format '{raw_format}'"));
        return Ok(None);
    };
    let (Ok(wave_start), Ok(wave_size)) = (u32::try_from(wave_start), u32::try_from(wave_size)) else {
        diag.warn(format!("{context}: bad wave position {wave_start} size {wave_size}"));
        return Ok(None);
    };

    let mut wave = Wave::new(id, format);
    wave.wave_start = wave_start;
    wave.wave_size = wave_size;
    wave.sample_count = format.sample_count(wave_size);
    wave.looping = looping;
    wave.history = history;

    if key > 127 {
        diag.warn(format!("{context}: bad root key '{key}'"));
    } else {
        wave.root_key = key;
    }

    if sample_rate < 0.0 {
        diag.warn(format!("{context}: bad sample rate '{sample_rate:.1}'"));
    } else {
        wave.sample_rate = sample_rate;
    }

    match (u32::try_from(loop_start), u32::try_from(loop_end)) {
        (Ok(start), Ok(end)) => {
            wave.loop_start = start;
            wave.loop_end = end;
        }
        _ => diag.warn(format!("{context}: bad loop {loop_start}..{loop_end}")),
    }

    if wave.loop_start > wave.loop_end {
        diag.warn(format!(
            "{context}: loop start '{}' is greater than loop end '{}'",
            wave.loop_start, wave.loop_end
        ));
    }
    if wave.loop_start > wave.sample_count {
        diag.warn(format!(
            "{context}: loop start '{}' is greater than sample count '{}'",
            wave.loop_start, wave.sample_count
        ));
    }
    if wave.loop_end > wave.sample_count {
        diag.warn(format!(
            "{context}: loop end '{}' is greater than sample count '{}'",
            wave.loop_end, wave.sample_count
        ));
    }

    Ok(Some(wave))
}
