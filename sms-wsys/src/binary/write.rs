//! WSYS binary writing

use crate::bank::{WaveBank, WaveGroup};
use crate::error::WsysError;
use crate::{
    ARCHIVE_NAME_SIZE, CDF_MAGIC, CEX_MAGIC, CST_MAGIC, SCNE_MAGIC, WAVE_RECORD_SIZE, WBCT_MAGIC,
    WINF_MAGIC, WSYS_MAGIC,
};
use sms_audio_shared::{BinaryWriter, Diagnostics, Endian, align_up};
use sms_wave::Wave;
use std::io;

const HEADER_SIZE: u32 = 32;

/// C-EX, C-ST and SCNE, one padded block each
const SCENE_BLOCKS_SIZE: u32 = 96;

/// Unknown constant closing every wave record
const WAVE_RECORD_TAIL: u32 = 0x1D8;

type Writer = BinaryWriter<Vec<u8>>;

/// Serialize a bank to its binary form
///
/// Archive names longer than the 112-byte field are truncated with a
/// warning.
pub fn write_wsys(bank: &WaveBank, endian: Endian, diag: &mut Diagnostics) -> Result<Vec<u8>, WsysError> {
    let count = bank.groups.len() as u32;
    let winf_size = control_size(count);
    let wbct_size = scene_table_size(count);
    let data_start = HEADER_SIZE + winf_size + wbct_size;
    let total = data_start + bank.groups.iter().map(group_size).sum::<u32>();

    tracing::info!(
        "WSYS: writing {} group(s), {} wave(s), {:.1} KB",
        count,
        bank.wave_count(),
        total as f64 / 1024.0
    );

    let mut writer = BinaryWriter::new(Vec::with_capacity(total as usize), endian);
    writer.push_anchor();

    writer.write_u32(WSYS_MAGIC)?;
    writer.write_u32(total)?;
    writer.write_u32(0)?; // unused
    writer.write_u32(0)?; // unused
    writer.write_u32(HEADER_SIZE)?;
    writer.write_u32(HEADER_SIZE + winf_size)?;
    writer.pad_to(32)?;

    writer.write_u32(WINF_MAGIC)?;
    writer.write_u32(count)?;
    let mut offset = data_start;
    for group in &bank.groups {
        writer.write_u32(offset)?;
        offset += group_size(group);
    }
    writer.pad_to(32)?;

    writer.write_u32(WBCT_MAGIC)?;
    writer.write_u32(0)?; // unused
    writer.write_u32(count)?;
    let mut offset = data_start;
    for group in &bank.groups {
        writer.write_u32(offset + scene_offset(group.waves.len() as u32))?;
        offset += group_size(group);
    }
    writer.pad_to(32)?;

    for group in &bank.groups {
        write_group(&mut writer, group, diag)?;
    }

    writer.pop_anchor();
    Ok(writer.into_inner())
}

fn control_size(count: u32) -> u32 {
    align_up(8 + 4 * count, 32)
}

fn scene_table_size(count: u32) -> u32 {
    align_up(12 + 4 * count, 32)
}

fn archive_info_size(count: u32) -> u32 {
    align_up(116 + 4 * count, 32)
}

fn wave_records_size(count: u32) -> u32 {
    align_up(WAVE_RECORD_SIZE * count, 32)
}

/// Offset of a group's SCNE block from the start of the group
fn scene_offset(count: u32) -> u32 {
    archive_info_size(count) + wave_records_size(count) + control_size(count) + 64
}

fn group_size(group: &WaveGroup) -> u32 {
    let count = group.waves.len() as u32;
    archive_info_size(count) + wave_records_size(count) + control_size(count) + SCENE_BLOCKS_SIZE
}

fn write_group(writer: &mut Writer, group: &WaveGroup, diag: &mut Diagnostics) -> io::Result<()> {
    let count = group.waves.len() as u32;
    let records = writer.position() as u32 + archive_info_size(count);

    if group.archive.len() >= ARCHIVE_NAME_SIZE {
        diag.warn(format!("WSYS: wave archive name '{}' is too long", group.archive));
    }

    writer.write_fixed_string(&group.archive, ARCHIVE_NAME_SIZE)?;
    writer.write_u32(count)?;
    for i in 0..count {
        // Wave info starts after the id field
        writer.write_u32(records + WAVE_RECORD_SIZE * i + 4)?;
    }
    writer.pad_to(32)?;

    for wave in &group.waves {
        write_wave(writer, wave)?;
    }
    writer.pad_to(32)?;

    let cdf = writer.position() as u32;
    writer.write_u32(CDF_MAGIC)?;
    writer.write_u32(count)?;
    for i in 0..count {
        writer.write_u32(records + WAVE_RECORD_SIZE * i)?;
    }
    writer.pad_to(32)?;

    let cex = writer.position() as u32;
    writer.write_u32(CEX_MAGIC)?;
    writer.pad_to(32)?;

    let cst = writer.position() as u32;
    writer.write_u32(CST_MAGIC)?;
    writer.pad_to(32)?;

    // C-EX and C-ST are recorded where they were actually written. Older
    // tools assumed a 32-byte C-DF block, so banks whose groups hold more
    // than 6 waves differ from theirs here.
    writer.write_u32(SCNE_MAGIC)?;
    writer.write_u32(0)?; // unused
    writer.write_u32(0)?; // unused
    writer.write_u32(cdf)?;
    writer.write_u32(cex)?;
    writer.write_u32(cst)?;
    writer.pad_to(32)
}

fn write_wave(writer: &mut Writer, wave: &Wave) -> io::Result<()> {
    writer.write_u32(wave.id as u32)?;
    writer.write_u8(0xFF)?; // unknown
    writer.write_u8(wave.format as u8)?;
    writer.write_u8(wave.root_key)?;
    writer.write_u8(0)?; // alignment
    writer.write_f32(wave.sample_rate)?;
    writer.write_u32(wave.wave_start)?;
    writer.write_u32(wave.wave_size)?;

    if wave.looping {
        writer.write_i32(-1)?;
        writer.write_u32(wave.loop_start)?;
        writer.write_u32(wave.loop_end)?;
    } else {
        writer.write_zeros(12)?;
    }

    writer.write_u32(wave.sample_count)?;

    if wave.looping {
        writer.write_i16(wave.history.last)?;
        writer.write_i16(wave.history.penult)?;
    } else {
        writer.write_zeros(4)?;
    }

    writer.write_u32(0)?; // runtime
    writer.write_u32(WAVE_RECORD_TAIL)
}
