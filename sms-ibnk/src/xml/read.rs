//! IBNK XML parsing

use crate::bank::{
    DrumSet, Effect, EffectTarget, Instrument, InstrumentBank, KeyRegion, Melodic, Oscillator,
    Percussion, RandomEffect, SenseEffect, SenseTrigger, TableEntry, TableMode, VelocityRegion,
};
use crate::error::IbnkError;
use crate::xml::names::*;
use roxmltree::{Document, Node};
use sms_audio_shared::Diagnostics;
use sms_audio_shared::xml::{AttributeError, ElementExt};

/// Parse an XML instrument bank
///
/// Bad or missing attributes on individual entities are reported to `diag`
/// and the entity is skipped. Because a partially read bank is not worth
/// converting, any such warning makes the whole read fail once the document
/// has been scanned.
pub fn read_xml(text: &str, name: &str, diag: &mut Diagnostics) -> Result<InstrumentBank, IbnkError> {
    let document = Document::parse(text)?;
    let root = document.root_element();
    if root.tag_name().name() != IBNK {
        return Err(IbnkError::BadRoot(root.tag_name().name().to_string()));
    }

    let virtual_number: u32 = root.required(VIRTUAL_NUMBER)?;
    let mut bank = InstrumentBank::new(virtual_number, name);
    let mark = diag.warnings();

    for element in root.elements() {
        match element.tag_name().name() {
            INSTRUMENT => {
                if let Some(program) = program_number(&bank, element, diag) {
                    let melodic = read_melodic(element, diag)?;
                    tracing::debug!(
                        "#{:<3} INST: volume {:.1} pitch {:.1} oscillators {} effects {} key regions {}",
                        program,
                        melodic.volume,
                        melodic.pitch,
                        melodic.oscillators.len(),
                        melodic.effects.len(),
                        melodic.key_regions.len()
                    );
                    bank.insert(program, Instrument::Melodic(melodic));
                }
            }
            DRUM_SET => {
                if let Some(program) = program_number(&bank, element, diag) {
                    let drum_set = read_drum_set(element, diag)?;
                    tracing::debug!("#{:<3} PER2: {} percussion(s)", program, drum_set.len());
                    bank.insert(program, Instrument::DrumSet(drum_set));
                }
            }
            other => tracing::debug!("XML: line #{}: ignoring <{}>", element.line(), other),
        }
    }

    let warnings = diag.since(mark);
    if warnings > 0 {
        return Err(IbnkError::BadXml(warnings));
    }

    tracing::info!("XML: {} instrument(s), virtual number {}", bank.len(), virtual_number);
    Ok(bank)
}

/// Attribute value, or `default` with a warning when it does not parse
fn value<T>(result: Result<T, AttributeError>, default: T, diag: &mut Diagnostics) -> T {
    result.unwrap_or_else(|err| {
        diag.warn(err);
        default
    })
}

fn program_number(bank: &InstrumentBank, element: Node<'_, '_>, diag: &mut Diagnostics) -> Option<usize> {
    let program: usize = match element.required(PROGRAM) {
        Ok(program) => program,
        Err(err) => {
            diag.warn(err);
            return None;
        }
    };

    if program >= bank.capacity() {
        diag.warn(element.invalid(PROGRAM, &program.to_string()));
        return None;
    }
    if bank.get(program).is_some() {
        diag.warn(format!(
            "XML: line #{}: duplicate program number '{}'",
            element.line(),
            program
        ));
        return None;
    }

    Some(program)
}

fn read_melodic(element: Node<'_, '_>, diag: &mut Diagnostics) -> Result<Melodic, IbnkError> {
    let mut melodic = Melodic {
        volume: value(element.or(VOLUME, 1.0), 1.0, diag),
        pitch: value(element.or(PITCH, 1.0), 1.0, diag),
        ..Melodic::default()
    };

    for child in element.elements() {
        match child.tag_name().name() {
            OSCILLATOR => melodic.oscillators.push(read_oscillator(child, diag)?),
            KEY_REGION => {
                let key = match child.key(KEY) {
                    Ok(key) => key.unwrap_or(127),
                    Err(err) => {
                        diag.warn(err);
                        continue;
                    }
                };
                let regions: Vec<VelocityRegion> = child
                    .elements()
                    .filter(|e| e.tag_name().name() == VELOCITY_REGION)
                    .filter_map(|e| read_velocity_region(e, diag))
                    .collect();
                let region: &mut KeyRegion = melodic.region_mut(key);
                region.velocity_regions.extend(regions);
            }
            name => {
                if let Some(effect) = read_effect(child, name, diag) {
                    melodic.effects.push(effect);
                }
            }
        }
    }

    Ok(melodic)
}

fn read_drum_set(element: Node<'_, '_>, diag: &mut Diagnostics) -> Result<DrumSet, IbnkError> {
    let mut drum_set = DrumSet::new();

    for child in element.elements().filter(|e| e.tag_name().name() == PERCUSSION) {
        let key = match child.key(KEY) {
            Ok(Some(key)) => key,
            Ok(None) => {
                diag.warn(format!("XML: line #{}: missing key number", child.line()));
                continue;
            }
            Err(err) => {
                diag.warn(err);
                continue;
            }
        };
        if drum_set.get(key).is_some() {
            diag.warn(format!(
                "XML: line #{}: duplicate percussion key '{}'",
                child.line(),
                key
            ));
            continue;
        }

        let mut percussion = Percussion {
            volume: value(child.or(VOLUME, 1.0), 1.0, diag),
            pitch: value(child.or(PITCH, 1.0), 1.0, diag),
            pan: value(child.or(PAN, 0.5), 0.5, diag),
            release: value(child.or(RELEASE, 0), 0, diag),
            ..Percussion::default()
        };

        for grandchild in child.elements() {
            match grandchild.tag_name().name() {
                VELOCITY_REGION => {
                    if let Some(region) = read_velocity_region(grandchild, diag) {
                        percussion.velocity_regions.push(region);
                    }
                }
                name => {
                    if let Some(effect) = read_effect(grandchild, name, diag) {
                        percussion.effects.push(effect);
                    }
                }
            }
        }

        drum_set.insert(key, percussion);
    }

    Ok(drum_set)
}

fn read_velocity_region(element: Node<'_, '_>, diag: &mut Diagnostics) -> Option<VelocityRegion> {
    let velocity = match element.or::<u8>(VELOCITY, 127) {
        Ok(velocity) if velocity <= 127 => velocity,
        Ok(velocity) => {
            diag.warn(element.invalid(VELOCITY, &velocity.to_string()));
            return None;
        }
        Err(err) => {
            diag.warn(err);
            return None;
        }
    };

    let wave_id = match element.required(WAVE_ID) {
        Ok(wave_id) => wave_id,
        Err(err) => {
            diag.warn(err);
            return None;
        }
    };

    Some(VelocityRegion {
        velocity,
        wave_id,
        volume: value(element.or(VOLUME, 1.0), 1.0, diag),
        pitch: value(element.or(PITCH, 1.0), 1.0, diag),
    })
}

fn read_oscillator(element: Node<'_, '_>, diag: &mut Diagnostics) -> Result<Oscillator, IbnkError> {
    let target: EffectTarget = element.required(TARGET)?;

    let mut oscillator = Oscillator::new(target);
    oscillator.rate = value(element.or(RATE, 1.0), 1.0, diag);
    oscillator.width = value(element.or(WIDTH, 1.0), 1.0, diag);
    oscillator.base = value(element.or(BASE, 0.0), 0.0, diag);

    for child in element.elements() {
        match child.tag_name().name() {
            START_TABLE => oscillator.start_table = read_table(child, diag)?,
            RELEASE_TABLE => oscillator.release_table = read_table(child, diag)?,
            _ => {}
        }
    }

    Ok(oscillator)
}

fn read_table(element: Node<'_, '_>, diag: &mut Diagnostics) -> Result<Vec<TableEntry>, IbnkError> {
    let mut table = Vec::new();

    for child in element.elements() {
        let name = child.tag_name().name();
        let mode = TableMode::from_name(name).ok_or_else(|| IbnkError::UnknownTableMode {
            line: child.line(),
            name: name.to_string(),
        })?;

        let entry = match mode {
            TableMode::Loop => TableEntry::new(mode, value(child.or(DEST, 0), 0, diag), 0),
            TableMode::Hold | TableMode::Stop => TableEntry::new(mode, 0, 0),
            _ => TableEntry::new(
                mode,
                value(child.or(TIME, 0), 0, diag),
                value(child.or(OFFSET, 0), 0, diag),
            ),
        };
        table.push(entry);
    }

    Ok(table)
}

fn read_effect(element: Node<'_, '_>, name: &str, diag: &mut Diagnostics) -> Option<Effect> {
    match name {
        RANDOM_EFFECT => Some(Effect::Random(RandomEffect {
            target: value(element.or(TARGET, EffectTarget::Volume), EffectTarget::Volume, diag),
            base: value(element.or(BASE, 1.0), 1.0, diag),
            distance: value(element.or(DISTANCE, 0.0), 0.0, diag),
        })),
        SENSE_EFFECT => {
            let center_key = match element.key(CENTER_KEY) {
                Ok(key) => key.unwrap_or(127),
                Err(err) => {
                    diag.warn(err);
                    127
                }
            };
            Some(Effect::Sense(SenseEffect {
                target: value(element.or(TARGET, EffectTarget::Volume), EffectTarget::Volume, diag),
                trigger: value(element.or(TRIGGER, SenseTrigger::Key), SenseTrigger::Key, diag),
                center_key,
                range_lo: value(element.or(RANGE_LO, 0.0), 0.0, diag),
                range_hi: value(element.or(RANGE_HI, 1.0), 1.0, diag),
            }))
        }
        _ => None,
    }
}
