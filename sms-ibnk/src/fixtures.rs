//! Banks shared by the codec tests

use crate::bank::*;

/// Volume envelope with a two-step attack and a release
pub fn envelope() -> Oscillator {
    Oscillator {
        target: EffectTarget::Volume,
        rate: 1.5,
        width: 1.0,
        base: 0.0,
        start_table: vec![
            TableEntry::new(TableMode::Linear, 10, 32767),
            TableEntry::new(TableMode::Hold, 0, 0),
        ],
        release_table: vec![
            TableEntry::new(TableMode::Square, 20, 0),
            TableEntry::new(TableMode::Stop, 0, 0),
        ],
    }
}

pub fn melodic() -> Melodic {
    let mut melodic = Melodic {
        volume: 0.8,
        pitch: 1.0,
        oscillators: vec![envelope()],
        effects: vec![
            Effect::Random(RandomEffect {
                target: EffectTarget::Pitch,
                base: 1.0,
                distance: 0.05,
            }),
            Effect::Sense(SenseEffect {
                target: EffectTarget::Volume,
                trigger: SenseTrigger::Velocity,
                center_key: 60,
                range_lo: 0.5,
                range_hi: 1.0,
            }),
        ],
        key_regions: Vec::new(),
    };

    let region = melodic.region_mut(127);
    region.velocity_regions.push(VelocityRegion {
        velocity: 64,
        wave_id: 1,
        volume: 0.9,
        pitch: 1.0,
    });
    region.velocity_regions.push(VelocityRegion {
        velocity: 127,
        wave_id: 2,
        volume: 1.0,
        pitch: 1.02,
    });
    melodic
}

/// One kick drum on key 36 playing wave 5
pub fn drum_set() -> DrumSet {
    let mut drums = DrumSet::new();
    drums.insert(
        36,
        Percussion {
            velocity_regions: vec![VelocityRegion::new(127, 5)],
            ..Percussion::default()
        },
    );
    drums
}

pub fn bank() -> InstrumentBank {
    let mut bank = InstrumentBank::new(7, "test.bnk");
    bank.insert(0, Instrument::Melodic(melodic()));
    bank.insert(5, Instrument::DrumSet(drum_set()));
    bank
}
