//! IBNK XML output

use crate::bank::{
    DrumSet, Effect, Instrument, InstrumentBank, KeyRegion, Melodic, Oscillator, Percussion,
    SenseTrigger, TableEntry, TableMode, VelocityRegion,
};
use crate::error::IbnkError;
use crate::xml::names::*;
use sms_audio_shared::xml::{Attributes, XmlWriter};

/// Serialize a bank as XML
///
/// No compatibility check is made, so banks the binary writer would reject
/// (too many oscillators or effects) still round-trip through XML.
pub fn write_xml(bank: &InstrumentBank) -> Result<String, IbnkError> {
    let mut xml = XmlWriter::new()?;
    xml.open(IBNK, Attributes::new().with(VIRTUAL_NUMBER, bank.virtual_number))?;

    for (program, instrument) in bank.iter() {
        match instrument {
            Instrument::Melodic(melodic) => write_melodic(&mut xml, program, melodic)?,
            Instrument::DrumSet(drum_set) => write_drum_set(&mut xml, program, drum_set)?,
        }
    }

    Ok(xml.finish()?)
}

fn write_melodic(xml: &mut XmlWriter, program: usize, melodic: &Melodic) -> Result<(), IbnkError> {
    let attributes = Attributes::new()
        .with(PROGRAM, program)
        .with_unless(VOLUME, melodic.volume, 1.0)
        .with_unless(PITCH, melodic.pitch, 1.0);

    if melodic.oscillators.is_empty() && melodic.effects.is_empty() && melodic.key_regions.is_empty() {
        xml.empty(INSTRUMENT, attributes)?;
        return Ok(());
    }

    xml.open(INSTRUMENT, attributes)?;
    for oscillator in &melodic.oscillators {
        write_oscillator(xml, oscillator)?;
    }
    for effect in &melodic.effects {
        write_effect(xml, effect)?;
    }
    let single = melodic.key_regions.len() == 1;
    for region in &melodic.key_regions {
        write_key_region(xml, region, single)?;
    }
    xml.close()?;
    Ok(())
}

fn write_key_region(xml: &mut XmlWriter, region: &KeyRegion, single: bool) -> Result<(), IbnkError> {
    let attributes = if single && region.key == 127 {
        Attributes::new()
    } else {
        Attributes::new().with_key(KEY, region.key)
    };

    if region.velocity_regions.is_empty() {
        xml.empty(KEY_REGION, attributes)?;
        return Ok(());
    }

    xml.open(KEY_REGION, attributes)?;
    write_velocity_regions(xml, &region.velocity_regions)?;
    xml.close()?;
    Ok(())
}

fn write_velocity_regions(xml: &mut XmlWriter, regions: &[VelocityRegion]) -> Result<(), IbnkError> {
    let single = regions.len() == 1;
    for region in regions {
        let mut attributes = Attributes::new();
        if !single || region.velocity != 127 {
            attributes = attributes.with(VELOCITY, region.velocity);
        }
        let attributes = attributes
            .with(WAVE_ID, region.wave_id)
            .with_unless(VOLUME, region.volume, 1.0)
            .with_unless(PITCH, region.pitch, 1.0);
        xml.empty(VELOCITY_REGION, attributes)?;
    }
    Ok(())
}

fn write_drum_set(xml: &mut XmlWriter, program: usize, drum_set: &DrumSet) -> Result<(), IbnkError> {
    let attributes = Attributes::new().with(PROGRAM, program);
    if drum_set.is_empty() {
        xml.empty(DRUM_SET, attributes)?;
        return Ok(());
    }

    xml.open(DRUM_SET, attributes)?;
    for (key, percussion) in drum_set.iter() {
        write_percussion(xml, key, percussion)?;
    }
    xml.close()?;
    Ok(())
}

fn write_percussion(xml: &mut XmlWriter, key: u8, percussion: &Percussion) -> Result<(), IbnkError> {
    let attributes = Attributes::new()
        .with_key(KEY, key)
        .with_unless(VOLUME, percussion.volume, 1.0)
        .with_unless(PITCH, percussion.pitch, 1.0)
        .with_unless(PAN, percussion.pan, 0.5)
        .with_unless(RELEASE, percussion.release, 0);

    if percussion.effects.is_empty() && percussion.velocity_regions.is_empty() {
        xml.empty(PERCUSSION, attributes)?;
        return Ok(());
    }

    xml.open(PERCUSSION, attributes)?;
    for effect in &percussion.effects {
        write_effect(xml, effect)?;
    }
    write_velocity_regions(xml, &percussion.velocity_regions)?;
    xml.close()?;
    Ok(())
}

fn write_oscillator(xml: &mut XmlWriter, oscillator: &Oscillator) -> Result<(), IbnkError> {
    let attributes = Attributes::new()
        .with(TARGET, oscillator.target)
        .with_unless(RATE, oscillator.rate, 1.0)
        .with_unless(WIDTH, oscillator.width, 1.0)
        .with_unless(BASE, oscillator.base, 0.0);

    if oscillator.start_table.is_empty() && oscillator.release_table.is_empty() {
        xml.empty(OSCILLATOR, attributes)?;
        return Ok(());
    }

    xml.open(OSCILLATOR, attributes)?;
    write_table(xml, START_TABLE, &oscillator.start_table)?;
    write_table(xml, RELEASE_TABLE, &oscillator.release_table)?;
    xml.close()?;
    Ok(())
}

fn write_table(xml: &mut XmlWriter, name: &'static str, table: &[TableEntry]) -> Result<(), IbnkError> {
    if table.is_empty() {
        return Ok(());
    }

    xml.open(name, Attributes::new())?;
    for entry in table {
        let attributes = match entry.mode {
            TableMode::Loop => Attributes::new().with(DEST, entry.time),
            TableMode::Hold | TableMode::Stop => Attributes::new(),
            _ => Attributes::new()
                .with(TIME, entry.time)
                .with(OFFSET, entry.amount),
        };
        xml.empty(entry.mode.name(), attributes)?;
    }
    xml.close()?;
    Ok(())
}

fn write_effect(xml: &mut XmlWriter, effect: &Effect) -> Result<(), IbnkError> {
    match effect {
        Effect::Random(random) => xml.empty(
            RANDOM_EFFECT,
            Attributes::new()
                .with(TARGET, random.target)
                .with_unless(BASE, random.base, 1.0)
                .with_unless(DISTANCE, random.distance, 0.0),
        )?,
        Effect::Sense(sense) => {
            let mut attributes = Attributes::new()
                .with(TARGET, sense.target)
                .with_unless(TRIGGER, sense.trigger, SenseTrigger::Key);
            if sense.center_key != 127 {
                attributes = attributes.with_key(CENTER_KEY, sense.center_key);
            }
            xml.empty(
                SENSE_EFFECT,
                attributes
                    .with_unless(RANGE_LO, sense.range_lo, 0.0)
                    .with_unless(RANGE_HI, sense.range_hi, 1.0),
            )?
        }
    }
    Ok(())
}
