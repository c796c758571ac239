//! SoundFont preview of an instrument bank
//!
//! The mapping is approximate. Only volume oscillators contribute to the
//! envelope, and only through their first two start-table entries and first
//! release entry. Samples are referenced by wave id and are not included, so
//! the output is meant to be merged with the wave bank's SoundFont.

use crate::bank::{DrumSet, EffectTarget, Instrument, InstrumentBank, Melodic, Oscillator};
use crate::error::IbnkError;
use sms_audio_shared::soundfont::{self as sf, Generator, GeneratorKind, Preset, SoundFont, Zone};

/// Bank number SoundFont players reserve for percussion
const PERCUSSION_BANK: u16 = 128;

/// Envelope table ticks per second at rate 1
const TICKS_PER_SECOND: f64 = 600.0;

/// Export a bank as a SoundFont without sample data
pub fn write_soundfont(bank: &InstrumentBank) -> Result<Vec<u8>, IbnkError> {
    let mut font = SoundFont::new(bank.name.as_str());

    for (program, instrument) in bank.iter() {
        let name = format!("{:05}-{:05}", bank.virtual_number, program);
        let zones = match instrument {
            Instrument::Melodic(melodic) => melodic_zones(melodic),
            Instrument::DrumSet(drum_set) => drum_set_zones(drum_set),
        };
        let preset_bank = match instrument {
            Instrument::Melodic(_) => bank.virtual_number as u16,
            Instrument::DrumSet(_) => PERCUSSION_BANK,
        };

        font.presets.push(Preset {
            name: name.clone(),
            program: program as u16,
            bank: preset_bank,
            zones: vec![Zone::new(vec![
                Generator::range(GeneratorKind::KeyRange, 0, 127),
                Generator::unsigned(GeneratorKind::Instrument, font.instruments.len() as u16),
            ])],
        });
        font.instruments.push(sf::Instrument { name, zones });
    }

    tracing::info!(
        "SF2: {} preset(s), {} zone(s)",
        font.presets.len(),
        font.instruments.iter().map(|i| i.zones.len()).sum::<usize>()
    );
    Ok(font.to_bytes()?)
}

/// Attenuation in centibels for a linear amplitude
fn centibels(amplitude: f64) -> i16 {
    (10.0 * (amplitude * amplitude).log10() * -10.0) as i16
}

/// Cents for a frequency ratio, or timecents for a duration in seconds
fn cents(ratio: f64) -> i16 {
    (1200.0 * ratio.log2()) as i16
}

fn melodic_zones(melodic: &Melodic) -> Vec<Zone> {
    let mut global = vec![
        Generator::signed(GeneratorKind::InitialAttenuation, centibels(melodic.volume as f64)),
        Generator::signed(GeneratorKind::FineTune, cents(melodic.pitch as f64)),
        Generator::unsigned(GeneratorKind::SampleModes, 1),
    ];
    for oscillator in melodic
        .oscillators
        .iter()
        .filter(|osc| osc.target == EffectTarget::Volume)
    {
        global.extend(envelope(oscillator));
    }

    let mut zones = vec![Zone::new(global)];
    let mut low_key = 0u8;
    for region in &melodic.key_regions {
        let mut low_velocity = 0u8;
        for velocity_region in &region.velocity_regions {
            zones.push(Zone::new(vec![
                Generator::range(GeneratorKind::KeyRange, low_key, region.key),
                Generator::range(GeneratorKind::VelRange, low_velocity, velocity_region.velocity),
                Generator::signed(
                    GeneratorKind::InitialAttenuation,
                    centibels(velocity_region.volume as f64),
                ),
                Generator::signed(GeneratorKind::FineTune, cents(velocity_region.pitch as f64)),
                Generator::unsigned(GeneratorKind::SampleId, velocity_region.wave_id),
            ]));
            low_velocity = velocity_region.velocity.saturating_add(1);
        }
        low_key = region.key.saturating_add(1);
    }
    zones
}

/// Volume envelope generators from the first attack, decay and release steps
fn envelope(oscillator: &Oscillator) -> Vec<Generator> {
    let seconds = |time: i16| time as f64 * oscillator.rate as f64 / TICKS_PER_SECOND;
    let mut generators = Vec::new();

    if let Some(attack) = oscillator.start_table.first().filter(|e| e.time > 0) {
        generators.push(Generator::signed(GeneratorKind::AttackVolEnv, cents(seconds(attack.time))));
    }
    if let Some(decay) = oscillator.start_table.get(1) {
        if decay.time > 0 {
            generators.push(Generator::signed(GeneratorKind::DecayVolEnv, cents(seconds(decay.time))));
        }
        if decay.amount as f32 + oscillator.base > 0.0 {
            let sustain =
                decay.amount as f64 / 32767.0 * oscillator.width as f64 + oscillator.base as f64;
            generators.push(Generator::signed(GeneratorKind::SustainVolEnv, centibels(sustain)));
        }
    }
    if let Some(release) = oscillator.release_table.first().filter(|e| e.time > 0) {
        generators.push(Generator::signed(
            GeneratorKind::ReleaseVolEnv,
            cents(seconds(release.time)),
        ));
    }
    generators
}

fn drum_set_zones(drum_set: &DrumSet) -> Vec<Zone> {
    let mut zones = Vec::new();
    for (key, percussion) in drum_set.iter() {
        let mut low_velocity = 0u8;
        for velocity_region in &percussion.velocity_regions {
            let mut generators = vec![
                Generator::range(GeneratorKind::KeyRange, key, key),
                Generator::range(GeneratorKind::VelRange, low_velocity, velocity_region.velocity),
                Generator::signed(
                    GeneratorKind::InitialAttenuation,
                    centibels((velocity_region.volume * percussion.volume) as f64),
                ),
                Generator::signed(
                    GeneratorKind::FineTune,
                    cents((velocity_region.pitch * percussion.pitch) as f64),
                ),
                Generator::signed(GeneratorKind::Pan, ((percussion.pan - 0.5) * 1000.0) as i16),
            ];
            if percussion.release > 0 {
                generators.push(Generator::signed(
                    GeneratorKind::ReleaseVolEnv,
                    cents(percussion.release as f64 / 32767.0),
                ));
            }
            generators.push(Generator::unsigned(GeneratorKind::OverridingRootKey, key as u16));
            generators.push(Generator::unsigned(GeneratorKind::SampleId, velocity_region.wave_id));
            zones.push(Zone::new(generators));
            low_velocity = velocity_region.velocity.saturating_add(1);
        }
    }
    zones
}
