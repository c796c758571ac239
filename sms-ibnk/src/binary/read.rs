//! IBNK binary parsing

use crate::bank::{
    DrumSet, Effect, EffectTarget, Instrument, InstrumentBank, Melodic, Oscillator, Percussion,
    RandomEffect, SenseEffect, SenseTrigger, TableEntry, TableMode, VelocityRegion,
};
use crate::error::IbnkError;
use crate::{
    BANK_MAGIC, DRUM_SET_KEYS, IBNK_MAGIC, INST_MAGIC, MAX_OSCILLATORS, MAX_RANDOM_EFFECTS,
    MAX_SENSE_EFFECTS, PER2_MAGIC, PERC_MAGIC, PROGRAM_SLOTS, TABLE_OFFSET,
};
use sms_audio_shared::{BinaryReader, Diagnostics, Endian};
use std::io;

/// Parse a binary instrument bank
///
/// Defects inside individual entities (bad enum values, keys above 127) are
/// reported to `diag` and the entity is dropped. A missing header or
/// instrument table is fatal.
///
/// # Arguments
/// * `data` - Bank bytes, starting at the header
/// * `endian` - Byte order the bank was written in
/// * `name` - Display name for the bank
pub fn read_ibnk(
    data: &[u8],
    endian: Endian,
    name: &str,
    diag: &mut Diagnostics,
) -> Result<InstrumentBank, IbnkError> {
    let mut reader = BinaryReader::new(data, endian);
    reader.push_anchor();
    let bank = read_bank(&mut reader, name, diag);
    reader.pop_anchor();
    bank
}

fn is_bank_magic(magic: u32) -> bool {
    magic == IBNK_MAGIC || magic == BANK_MAGIC
}

fn read_offsets(reader: &mut BinaryReader<'_>, count: usize) -> io::Result<Vec<u32>> {
    (0..count).map(|_| reader.read_u32()).collect()
}

/// Byte position of the field that was just read
fn last(reader: &BinaryReader<'_>, size: u64) -> u64 {
    reader.position().saturating_sub(size)
}

fn read_bank(
    reader: &mut BinaryReader<'_>,
    name: &str,
    diag: &mut Diagnostics,
) -> Result<InstrumentBank, IbnkError> {
    if !is_bank_magic(reader.read_u32()?) {
        return Err(IbnkError::MissingHeader);
    }

    let size = reader.read_u32()?;
    let virtual_number = reader.read_u32()?;
    tracing::info!(
        "IBNK: header found, size {:.1} KB, virtual number {}",
        size as f64 / 1024.0,
        virtual_number
    );

    let mut bank = InstrumentBank::new(virtual_number, name);

    reader.goto(TABLE_OFFSET)?;
    if !is_bank_magic(reader.read_u32()?) {
        return Err(IbnkError::MissingTable);
    }

    let offsets = read_offsets(reader, PROGRAM_SLOTS)?;
    tracing::info!(
        "IBNK: instrument table found, {} instrument(s)",
        offsets.iter().filter(|&&o| o != 0).count()
    );

    for (program, &offset) in offsets.iter().enumerate() {
        if offset == 0 {
            continue;
        }

        reader.goto(offset as u64)?;
        let instrument = match reader.read_u32()? {
            INST_MAGIC => Some(Instrument::Melodic(read_melodic(reader, program, diag)?)),
            PERC_MAGIC => Some(Instrument::DrumSet(read_drum_set(reader, program, false, diag)?)),
            PER2_MAGIC => Some(Instrument::DrumSet(read_drum_set(reader, program, true, diag)?)),
            other => {
                diag.warn(format!(
                    "IBNK: #{program} unknown instrument type '{}' at 0x{:06X}",
                    String::from_utf8_lossy(&other.to_be_bytes()),
                    offset
                ));
                None
            }
        };

        if let Some(instrument) = instrument {
            bank.insert(program, instrument);
        }
    }

    Ok(bank)
}

fn read_melodic(
    reader: &mut BinaryReader<'_>,
    program: usize,
    diag: &mut Diagnostics,
) -> Result<Melodic, IbnkError> {
    let mut melodic = Melodic::default();

    reader.skip(4)?; // unused
    melodic.volume = reader.read_f32()?;
    melodic.pitch = reader.read_f32()?;

    let oscillator_offsets = read_offsets(reader, MAX_OSCILLATORS)?;
    let random_offsets = read_offsets(reader, MAX_RANDOM_EFFECTS)?;
    let sense_offsets = read_offsets(reader, MAX_SENSE_EFFECTS)?;
    let region_count = reader.read_u32()? as usize;
    let region_offsets = read_offsets(reader, region_count)?;

    tracing::debug!(
        "#{:<3} INST: volume {:.1} pitch {:.1} oscillators {} effects {} key regions {}",
        program,
        melodic.volume,
        melodic.pitch,
        oscillator_offsets.iter().filter(|&&o| o != 0).count(),
        random_offsets
            .iter()
            .chain(&sense_offsets)
            .filter(|&&o| o != 0)
            .count(),
        region_offsets.len()
    );

    for &offset in oscillator_offsets.iter().filter(|&&o| o != 0) {
        reader.goto(offset as u64)?;
        if let Some(oscillator) = read_oscillator(reader, diag)? {
            melodic.oscillators.push(oscillator);
        }
    }

    for &offset in random_offsets.iter().filter(|&&o| o != 0) {
        reader.goto(offset as u64)?;
        if let Some(effect) = read_random_effect(reader, diag)? {
            melodic.effects.push(Effect::Random(effect));
        }
    }

    for &offset in sense_offsets.iter().filter(|&&o| o != 0) {
        reader.goto(offset as u64)?;
        if let Some(effect) = read_sense_effect(reader, diag)? {
            melodic.effects.push(Effect::Sense(effect));
        }
    }

    for &offset in &region_offsets {
        reader.goto(offset as u64)?;

        let key = reader.read_u8()?;
        if key > 127 {
            diag.warn(format!(
                "IBNK: bad key region key number '{key}' at 0x{:06X}",
                last(reader, 1)
            ));
            continue;
        }

        reader.skip(3)?; // alignment
        let velocity_count = reader.read_u32()? as usize;
        let velocity_offsets = read_offsets(reader, velocity_count)?;

        let mut regions = Vec::with_capacity(velocity_offsets.len());
        for &velocity_offset in &velocity_offsets {
            reader.goto(velocity_offset as u64)?;
            if let Some(region) = read_velocity_region(reader, diag)? {
                regions.push(region);
            }
        }
        melodic.region_mut(key).velocity_regions.extend(regions);
    }

    Ok(melodic)
}

/// Read a `PERC` (legacy, `with_tables == false`) or `PER2` drum set
fn read_drum_set(
    reader: &mut BinaryReader<'_>,
    program: usize,
    with_tables: bool,
    diag: &mut Diagnostics,
) -> Result<DrumSet, IbnkError> {
    let mut drum_set = DrumSet::new();

    reader.skip(4)?; // unused
    reader.skip(128)?; // unused byte table

    let offsets = read_offsets(reader, DRUM_SET_KEYS)?;
    let mut pans = [0i8; DRUM_SET_KEYS];
    let mut releases = [0u16; DRUM_SET_KEYS];
    if with_tables {
        for pan in &mut pans {
            *pan = reader.read_i8()?;
        }
        for release in &mut releases {
            *release = reader.read_u16()?;
        }
    }

    tracing::debug!(
        "#{:<3} PER{}: {} percussion(s)",
        program,
        if with_tables { '2' } else { 'C' },
        offsets.iter().filter(|&&o| o != 0).count()
    );

    for (key, &offset) in offsets.iter().enumerate() {
        if offset == 0 {
            continue;
        }

        reader.goto(offset as u64)?;

        let mut percussion = Percussion {
            volume: reader.read_f32()?,
            pitch: reader.read_f32()?,
            ..Percussion::default()
        };
        if with_tables {
            percussion.pan = pans[key] as f32 / 127.0;
            percussion.release = releases[key];
        }

        let random_offsets = read_offsets(reader, MAX_RANDOM_EFFECTS)?;
        let velocity_count = reader.read_u32()? as usize;
        let velocity_offsets = read_offsets(reader, velocity_count)?;

        for &offset in random_offsets.iter().filter(|&&o| o != 0) {
            reader.goto(offset as u64)?;
            if let Some(effect) = read_random_effect(reader, diag)? {
                percussion.effects.push(Effect::Random(effect));
            }
        }

        for &offset in &velocity_offsets {
            reader.goto(offset as u64)?;
            if let Some(region) = read_velocity_region(reader, diag)? {
                percussion.velocity_regions.push(region);
            }
        }

        drum_set.insert(key as u8, percussion);
    }

    Ok(drum_set)
}

fn read_velocity_region(
    reader: &mut BinaryReader<'_>,
    diag: &mut Diagnostics,
) -> io::Result<Option<VelocityRegion>> {
    let velocity = reader.read_u8()?;
    if velocity > 127 {
        diag.warn(format!(
            "IBNK: bad velocity region velocity '{velocity}' at 0x{:06X}",
            last(reader, 1)
        ));
        return Ok(None);
    }

    reader.skip(3)?; // alignment
    let wave_id = (reader.read_u32()? & 0xFFFF) as u16;
    let volume = reader.read_f32()?;
    let pitch = reader.read_f32()?;

    Ok(Some(VelocityRegion {
        velocity,
        wave_id,
        volume,
        pitch,
    }))
}

fn read_target(
    reader: &mut BinaryReader<'_>,
    what: &str,
    diag: &mut Diagnostics,
) -> io::Result<Option<EffectTarget>> {
    let raw = reader.read_u8()?;
    let target = EffectTarget::from_raw(raw);
    if target.is_none() {
        diag.warn(format!(
            "IBNK: bad {what} target '{raw}' at 0x{:06X}",
            last(reader, 1)
        ));
    }
    Ok(target)
}

fn read_oscillator(
    reader: &mut BinaryReader<'_>,
    diag: &mut Diagnostics,
) -> io::Result<Option<Oscillator>> {
    let Some(target) = read_target(reader, "oscillator", diag)? else {
        return Ok(None);
    };

    reader.skip(3)?; // alignment
    let mut oscillator = Oscillator::new(target);
    oscillator.rate = reader.read_f32()?;
    let start_offset = reader.read_u32()?;
    let release_offset = reader.read_u32()?;
    oscillator.width = reader.read_f32()?;
    oscillator.base = reader.read_f32()?;

    if start_offset != 0 {
        reader.goto(start_offset as u64)?;
        oscillator.start_table = read_table(reader, diag)?;
    }
    if release_offset != 0 {
        reader.goto(release_offset as u64)?;
        oscillator.release_table = read_table(reader, diag)?;
    }

    Ok(Some(oscillator))
}

/// Read entries up to and including the first terminal mode
fn read_table(reader: &mut BinaryReader<'_>, diag: &mut Diagnostics) -> io::Result<Vec<TableEntry>> {
    let mut table = Vec::new();
    loop {
        let raw = reader.read_i16()?;
        let Some(mode) = TableMode::from_raw(raw) else {
            diag.warn(format!(
                "IBNK: bad oscillator table mode '{raw}' at 0x{:06X}",
                last(reader, 2)
            ));
            break;
        };

        let time = reader.read_i16()?;
        let amount = reader.read_i16()?;
        table.push(TableEntry::new(mode, time, amount));

        if mode.is_terminal() {
            break;
        }
    }
    Ok(table)
}

fn read_random_effect(
    reader: &mut BinaryReader<'_>,
    diag: &mut Diagnostics,
) -> io::Result<Option<RandomEffect>> {
    let Some(target) = read_target(reader, "random effect", diag)? else {
        return Ok(None);
    };

    reader.skip(3)?; // alignment
    let base = reader.read_f32()?;
    let distance = reader.read_f32()?;

    Ok(Some(RandomEffect {
        target,
        base,
        distance,
    }))
}

fn read_sense_effect(
    reader: &mut BinaryReader<'_>,
    diag: &mut Diagnostics,
) -> io::Result<Option<SenseEffect>> {
    let Some(target) = read_target(reader, "sense effect", diag)? else {
        return Ok(None);
    };

    let trigger = SenseTrigger::from_raw(reader.read_u8()?).unwrap_or(SenseTrigger::None);

    let center_key = reader.read_u8()?;
    if center_key > 127 {
        diag.warn(format!(
            "IBNK: bad sense effect center key '{center_key}' at 0x{:06X}",
            last(reader, 1)
        ));
        return Ok(None);
    }

    reader.skip(1)?; // alignment
    let range_lo = reader.read_f32()?;
    let range_hi = reader.read_f32()?;

    Ok(Some(SenseEffect {
        target,
        trigger,
        center_key,
        range_lo,
        range_hi,
    }))
}
