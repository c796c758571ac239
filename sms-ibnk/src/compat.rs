//! Binary format limits
//!
//! XML banks can describe more than the console loader understands. Every
//! violation is reported before the binary writer gives up, so one run shows
//! all of them.

use crate::bank::{Instrument, InstrumentBank};
use crate::{MAX_OSCILLATORS, MAX_RANDOM_EFFECTS, MAX_SENSE_EFFECTS, PROGRAM_SLOTS};
use sms_audio_shared::Diagnostics;
use sms_audio_shared::key::key_name;

/// Report every binary format violation, returning how many were found
pub fn check_compatibility(bank: &InstrumentBank, diag: &mut Diagnostics) -> usize {
    let mut problems = 0;
    let mut problem = |diag: &mut Diagnostics, message: String| {
        diag.warn(message);
        problems += 1;
    };

    for (program, instrument) in bank.iter() {
        if program >= PROGRAM_SLOTS {
            problem(
                diag,
                format!("IBNK: #{program} program number is outside the {PROGRAM_SLOTS}-slot table"),
            );
        }

        match instrument {
            Instrument::Melodic(melodic) => {
                if melodic.oscillators.len() > MAX_OSCILLATORS {
                    problem(diag, format!("IBNK: #{program} instrument has more than two oscillators"));
                }
                if melodic.random_effects().count() > MAX_RANDOM_EFFECTS {
                    problem(diag, format!("IBNK: #{program} instrument has more than two random effects"));
                }
                if melodic.sense_effects().count() > MAX_SENSE_EFFECTS {
                    problem(diag, format!("IBNK: #{program} instrument has more than two sense effects"));
                }
            }
            Instrument::DrumSet(drum_set) => {
                for (key, percussion) in drum_set.iter() {
                    if percussion.random_effects().count() > MAX_RANDOM_EFFECTS {
                        problem(
                            diag,
                            format!(
                                "IBNK: #{program} {} percussion has more than two random effects",
                                key_name(key)
                            ),
                        );
                    }
                    if percussion.sense_effects().count() > 0 {
                        problem(
                            diag,
                            format!("IBNK: #{program} {} percussion has sense effects", key_name(key)),
                        );
                    }
                }
            }
        }
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::*;

    fn random() -> Effect {
        Effect::Random(RandomEffect {
            target: EffectTarget::Volume,
            base: 1.0,
            distance: 0.0,
        })
    }

    #[test]
    fn test_reports_every_violation() {
        let mut melodic = Melodic::default();
        melodic.oscillators = vec![Oscillator::new(EffectTarget::Volume); 3];
        melodic.effects = vec![random(); 3];

        let mut drums = DrumSet::new();
        drums.insert(
            36,
            Percussion {
                effects: vec![Effect::Sense(SenseEffect {
                    target: EffectTarget::Pan,
                    trigger: SenseTrigger::Key,
                    center_key: 60,
                    range_lo: 0.0,
                    range_hi: 1.0,
                })],
                ..Percussion::default()
            },
        );

        let mut bank = InstrumentBank::new(0, "bad");
        bank.insert(0, Instrument::Melodic(melodic));
        bank.insert(1, Instrument::DrumSet(drums));
        bank.insert(250, Instrument::Melodic(Melodic::default()));

        let mut diag = Diagnostics::new();
        assert_eq!(check_compatibility(&bank, &mut diag), 4);
        assert_eq!(diag.warnings(), 4);
    }

    #[test]
    fn test_accepts_limits() {
        let mut melodic = Melodic::default();
        melodic.oscillators = vec![Oscillator::new(EffectTarget::Pitch); 2];
        melodic.effects = vec![random(); 2];

        let mut bank = InstrumentBank::new(0, "ok");
        bank.insert(239, Instrument::Melodic(melodic));

        let mut diag = Diagnostics::new();
        assert_eq!(check_compatibility(&bank, &mut diag), 0);
    }
}
