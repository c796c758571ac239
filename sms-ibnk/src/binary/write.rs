//! IBNK binary writing
//!
//! Layout is computed before anything is written: the oscillator table is
//! interned first so instruments can refer to shared records by offset, then
//! every instrument's size is known from its contents alone.

use crate::bank::{
    DrumSet, Instrument, InstrumentBank, KeyRegion, Melodic, Oscillator, OscillatorKey,
    Percussion, RandomEffect, SenseEffect, TableEntry, VelocityRegion,
};
use crate::compat::check_compatibility;
use crate::error::IbnkError;
use crate::{
    DATA_START, IBNK_MAGIC, INST_MAGIC, MAX_OSCILLATORS, MAX_RANDOM_EFFECTS, MAX_SENSE_EFFECTS,
    PER2_HEADER_SIZE, PER2_MAGIC, PROGRAM_SLOTS,
};
use hashbrown::HashMap;
use sms_audio_shared::{BinaryWriter, Diagnostics, Endian, align_up};
use std::io;

const EFFECT_SIZE: u32 = 16;
const VELOCITY_REGION_SIZE: u32 = 16;

type Writer = BinaryWriter<Vec<u8>>;

/// Serialize a bank to its binary form
///
/// The bank is checked against the format's limits first; if anything does
/// not fit, every problem is reported to `diag` and nothing is written.
pub fn write_ibnk(
    bank: &InstrumentBank,
    endian: Endian,
    diag: &mut Diagnostics,
) -> Result<Vec<u8>, IbnkError> {
    let problems = check_compatibility(bank, diag);
    if problems > 0 {
        return Err(IbnkError::Incompatible(problems));
    }

    let oscillators = OscillatorTable::new(bank);
    let total = DATA_START + oscillators.size + bank.iter().map(|(_, i)| instrument_size(i)).sum::<u32>();

    tracing::info!(
        "IBNK: writing {} instrument(s), {} unique oscillator(s), {:.1} KB",
        bank.len(),
        oscillators.records.len(),
        total as f64 / 1024.0
    );

    let mut writer = BinaryWriter::new(Vec::with_capacity(total as usize), endian);
    writer.push_anchor();

    write_header(&mut writer, bank, total)?;
    write_table(&mut writer, bank, &oscillators)?;
    write_oscillators(&mut writer, &oscillators)?;
    for (_, instrument) in bank.iter() {
        match instrument {
            Instrument::Melodic(melodic) => write_melodic(&mut writer, melodic, &oscillators)?,
            Instrument::DrumSet(drum_set) => write_drum_set(&mut writer, drum_set)?,
        }
    }

    writer.pop_anchor();
    Ok(writer.into_inner())
}

/// Unique oscillators in first-seen order with their bank offsets
struct OscillatorTable<'a> {
    records: Vec<&'a Oscillator>,
    offsets: HashMap<OscillatorKey, u32>,
    size: u32,
}

impl<'a> OscillatorTable<'a> {
    fn new(bank: &'a InstrumentBank) -> Self {
        let mut table = Self {
            records: Vec::new(),
            offsets: HashMap::new(),
            size: 0,
        };

        for (_, instrument) in bank.iter() {
            let Instrument::Melodic(melodic) = instrument else {
                continue;
            };
            for oscillator in melodic.oscillators.iter().take(MAX_OSCILLATORS) {
                let key = oscillator.canonical();
                if table.offsets.contains_key(&key) {
                    continue;
                }
                table.offsets.insert(key, DATA_START + table.size);
                table.records.push(oscillator);
                table.size += oscillator_size(oscillator);
            }
        }

        table
    }

    fn offset_of(&self, oscillator: &Oscillator) -> u32 {
        // Every oscillator in the bank was interned by `new`
        self.offsets.get(&oscillator.canonical()).copied().unwrap_or(0)
    }
}

fn oscillator_size(oscillator: &Oscillator) -> u32 {
    32 + align_up(6 * oscillator.start_table.len() as u32, 32)
        + align_up(6 * oscillator.release_table.len() as u32, 32)
}

fn key_region_size(region: &KeyRegion) -> u32 {
    let n = region.velocity_regions.len() as u32;
    align_up(8 + 4 * n, 16) + VELOCITY_REGION_SIZE * n
}

fn percussion_size(percussion: &Percussion) -> u32 {
    let n = percussion.velocity_regions.len() as u32;
    let effects = percussion.random_effects().take(MAX_RANDOM_EFFECTS).count() as u32;
    align_up(20 + 4 * n, 16) + EFFECT_SIZE * effects + VELOCITY_REGION_SIZE * n
}

fn effect_count(melodic: &Melodic) -> u32 {
    (melodic.random_effects().take(MAX_RANDOM_EFFECTS).count()
        + melodic.sense_effects().take(MAX_SENSE_EFFECTS).count()) as u32
}

fn instrument_size(instrument: &Instrument) -> u32 {
    match instrument {
        Instrument::Melodic(melodic) => align_up(
            align_up(44 + 4 * melodic.key_regions.len() as u32, 16)
                + EFFECT_SIZE * effect_count(melodic)
                + melodic.key_regions.iter().map(key_region_size).sum::<u32>(),
            32,
        ),
        Instrument::DrumSet(drum_set) => align_up(
            PER2_HEADER_SIZE + drum_set.iter().map(|(_, p)| percussion_size(p)).sum::<u32>(),
            32,
        ),
    }
}

fn position(writer: &Writer) -> u32 {
    writer.position() as u32
}

fn write_header(writer: &mut Writer, bank: &InstrumentBank, total: u32) -> io::Result<()> {
    writer.write_u32(IBNK_MAGIC)?;
    writer.write_u32(total)?;
    writer.write_u32(bank.virtual_number)?;
    writer.pad_to(32)
}

fn write_table(writer: &mut Writer, bank: &InstrumentBank, oscillators: &OscillatorTable<'_>) -> io::Result<()> {
    let mut offset = DATA_START + oscillators.size;

    writer.write_u32(IBNK_MAGIC)?;
    for program in 0..PROGRAM_SLOTS {
        match bank.get(program) {
            Some(instrument) => {
                writer.write_u32(offset)?;
                offset += instrument_size(instrument);
            }
            None => writer.write_u32(0)?,
        }
    }
    writer.pad_to(32)
}

fn write_oscillators(writer: &mut Writer, oscillators: &OscillatorTable<'_>) -> io::Result<()> {
    for oscillator in &oscillators.records {
        let mut offset = position(writer) + 32;

        writer.write_u8(oscillator.target as u8)?;
        writer.pad_to(4)?;
        writer.write_f32(oscillator.rate)?;

        for table in [&oscillator.start_table, &oscillator.release_table] {
            if table.is_empty() {
                writer.write_u32(0)?;
            } else {
                writer.write_u32(offset)?;
                offset += align_up(6 * table.len() as u32, 32);
            }
        }

        writer.write_f32(oscillator.width)?;
        writer.write_f32(oscillator.base)?;
        writer.pad_to(32)?;

        write_table_entries(writer, &oscillator.start_table)?;
        write_table_entries(writer, &oscillator.release_table)?;
    }
    writer.pad_to(32)
}

fn write_table_entries(writer: &mut Writer, entries: &[TableEntry]) -> io::Result<()> {
    for entry in entries {
        writer.write_i16(entry.mode as i16)?;
        writer.write_i16(entry.time)?;
        writer.write_i16(entry.amount)?;
    }
    writer.pad_to(32)
}

/// Fill a fixed-size effect offset array whose first `used` slots are taken
fn write_slots(writer: &mut Writer, slots: usize, used: usize, offset: &mut u32) -> io::Result<()> {
    for slot in 0..slots {
        if slot < used {
            writer.write_u32(*offset)?;
            *offset += EFFECT_SIZE;
        } else {
            writer.write_u32(0)?;
        }
    }
    Ok(())
}

fn write_melodic(writer: &mut Writer, melodic: &Melodic, oscillators: &OscillatorTable<'_>) -> io::Result<()> {
    let regions = melodic.key_regions.len() as u32;
    let mut offset = position(writer) + align_up(44 + 4 * regions, 16);

    let random: Vec<&RandomEffect> = melodic.random_effects().take(MAX_RANDOM_EFFECTS).collect();
    let sense: Vec<&SenseEffect> = melodic.sense_effects().take(MAX_SENSE_EFFECTS).collect();

    writer.write_u32(INST_MAGIC)?;
    writer.write_u32(0)?; // unused
    writer.write_f32(melodic.volume)?;
    writer.write_f32(melodic.pitch)?;

    for slot in 0..MAX_OSCILLATORS {
        match melodic.oscillators.get(slot) {
            Some(oscillator) => writer.write_u32(oscillators.offset_of(oscillator))?,
            None => writer.write_u32(0)?,
        }
    }

    write_slots(writer, MAX_RANDOM_EFFECTS, random.len(), &mut offset)?;
    write_slots(writer, MAX_SENSE_EFFECTS, sense.len(), &mut offset)?;

    writer.write_u32(regions)?;
    for region in &melodic.key_regions {
        writer.write_u32(offset)?;
        offset += key_region_size(region);
    }
    writer.pad_to(16)?;

    for effect in random {
        write_random_effect(writer, effect)?;
    }
    for effect in sense {
        write_sense_effect(writer, effect)?;
    }
    for region in &melodic.key_regions {
        write_key_region(writer, region)?;
    }

    writer.pad_to(32)
}

fn write_key_region(writer: &mut Writer, region: &KeyRegion) -> io::Result<()> {
    let count = region.velocity_regions.len() as u32;
    let mut offset = position(writer) + align_up(8 + 4 * count, 16);

    writer.write_u8(region.key)?;
    writer.pad_to(4)?;
    writer.write_u32(count)?;
    for _ in &region.velocity_regions {
        writer.write_u32(offset)?;
        offset += VELOCITY_REGION_SIZE;
    }
    writer.pad_to(16)?;

    for velocity_region in &region.velocity_regions {
        write_velocity_region(writer, velocity_region)?;
    }
    Ok(())
}

fn write_drum_set(writer: &mut Writer, drum_set: &DrumSet) -> io::Result<()> {
    let mut offset = position(writer) + PER2_HEADER_SIZE;

    writer.write_u32(PER2_MAGIC)?;
    writer.write_u32(0)?; // unused
    writer.write_zeros(128)?;

    for slot in drum_set.slots() {
        match slot {
            Some(percussion) => {
                writer.write_u32(offset)?;
                offset += percussion_size(percussion);
            }
            None => writer.write_u32(0)?,
        }
    }
    for slot in drum_set.slots() {
        writer.write_i8(slot.map_or(0, |p| (p.pan * 127.0) as i8))?;
    }
    for slot in drum_set.slots() {
        writer.write_u16(slot.map_or(0, |p| p.release))?;
    }
    writer.pad_to(32)?;

    for (_, percussion) in drum_set.iter() {
        write_percussion(writer, percussion)?;
    }
    writer.pad_to(32)
}

fn write_percussion(writer: &mut Writer, percussion: &Percussion) -> io::Result<()> {
    let count = percussion.velocity_regions.len() as u32;
    let mut offset = position(writer) + align_up(20 + 4 * count, 16);
    let random: Vec<&RandomEffect> = percussion.random_effects().take(MAX_RANDOM_EFFECTS).collect();

    writer.write_f32(percussion.volume)?;
    writer.write_f32(percussion.pitch)?;
    write_slots(writer, MAX_RANDOM_EFFECTS, random.len(), &mut offset)?;

    writer.write_u32(count)?;
    for _ in &percussion.velocity_regions {
        writer.write_u32(offset)?;
        offset += VELOCITY_REGION_SIZE;
    }
    writer.pad_to(16)?;

    for effect in random {
        write_random_effect(writer, effect)?;
    }
    for region in &percussion.velocity_regions {
        write_velocity_region(writer, region)?;
    }
    Ok(())
}

fn write_velocity_region(writer: &mut Writer, region: &VelocityRegion) -> io::Result<()> {
    writer.write_u8(region.velocity)?;
    writer.pad_to(4)?;
    writer.write_u32(region.wave_id as u32)?;
    writer.write_f32(region.volume)?;
    writer.write_f32(region.pitch)
}

fn write_random_effect(writer: &mut Writer, effect: &RandomEffect) -> io::Result<()> {
    writer.write_u8(effect.target as u8)?;
    writer.pad_to(4)?;
    writer.write_f32(effect.base)?;
    writer.write_f32(effect.distance)?;
    writer.pad_to(16)
}

fn write_sense_effect(writer: &mut Writer, effect: &SenseEffect) -> io::Result<()> {
    writer.write_u8(effect.target as u8)?;
    writer.write_u8(effect.trigger as u8)?;
    writer.write_u8(effect.center_key)?;
    writer.pad_to(4)?;
    writer.write_f32(effect.range_lo)?;
    writer.write_f32(effect.range_hi)?;
    writer.pad_to(16)
}
