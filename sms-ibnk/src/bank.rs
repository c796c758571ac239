//! Instrument bank data structures

use std::fmt;
use std::str::FromStr;

/// Number of program slots held by an [`InstrumentBank`]
pub const BANK_CAPACITY: usize = 256;

/// Number of keys in a drum set
pub const DRUM_SET_KEYS: usize = 128;

/// Parsed instrument bank
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentBank {
    /// Bank id the sound engine refers to this bank by
    pub virtual_number: u32,
    /// Display name (usually the source file name)
    pub name: String,
    slots: Vec<Option<Instrument>>,
}

impl InstrumentBank {
    pub fn new(virtual_number: u32, name: impl Into<String>) -> Self {
        Self {
            virtual_number,
            name: name.into(),
            slots: vec![None; BANK_CAPACITY],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied program slots
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, program: usize) -> Option<&Instrument> {
        self.slots.get(program)?.as_ref()
    }

    pub fn get_mut(&mut self, program: usize) -> Option<&mut Instrument> {
        self.slots.get_mut(program)?.as_mut()
    }

    /// Place an instrument at `program`, returning whatever was there
    ///
    /// # Panics
    /// Panics if `program` is not below [`InstrumentBank::capacity`].
    pub fn insert(&mut self, program: usize, instrument: Instrument) -> Option<Instrument> {
        self.slots[program].replace(instrument)
    }

    /// Occupied slots in program order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Instrument)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(program, slot)| slot.as_ref().map(|instrument| (program, instrument)))
    }
}

/// A playable program
#[derive(Debug, Clone, PartialEq)]
pub enum Instrument {
    Melodic(Melodic),
    DrumSet(DrumSet),
}

impl Instrument {
    pub fn kind(&self) -> &'static str {
        match self {
            Instrument::Melodic(_) => "instrument",
            Instrument::DrumSet(_) => "drum set",
        }
    }
}

/// Instrument whose samples are chosen by key and velocity
#[derive(Debug, Clone, PartialEq)]
pub struct Melodic {
    pub volume: f32,
    pub pitch: f32,
    pub oscillators: Vec<Oscillator>,
    pub effects: Vec<Effect>,
    /// Key regions in ascending key order, one per key
    pub key_regions: Vec<KeyRegion>,
}

impl Default for Melodic {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pitch: 1.0,
            oscillators: Vec::new(),
            effects: Vec::new(),
            key_regions: Vec::new(),
        }
    }
}

impl Melodic {
    /// Region for `key`, created in key order if it does not exist yet
    pub fn region_mut(&mut self, key: u8) -> &mut KeyRegion {
        let index = match self.key_regions.binary_search_by_key(&key, |region| region.key) {
            Ok(index) => index,
            Err(index) => {
                self.key_regions.insert(index, KeyRegion::new(key));
                index
            }
        };
        &mut self.key_regions[index]
    }

    pub fn random_effects(&self) -> impl Iterator<Item = &RandomEffect> {
        random_effects(&self.effects)
    }

    pub fn sense_effects(&self) -> impl Iterator<Item = &SenseEffect> {
        sense_effects(&self.effects)
    }
}

/// Range of keys sharing the same velocity regions
#[derive(Debug, Clone, PartialEq)]
pub struct KeyRegion {
    /// Highest key covered by the region
    pub key: u8,
    pub velocity_regions: Vec<VelocityRegion>,
}

impl KeyRegion {
    pub fn new(key: u8) -> Self {
        Self {
            key,
            velocity_regions: Vec::new(),
        }
    }
}

/// Wave selection for velocities up to `velocity`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityRegion {
    pub velocity: u8,
    pub wave_id: u16,
    pub volume: f32,
    pub pitch: f32,
}

impl VelocityRegion {
    pub fn new(velocity: u8, wave_id: u16) -> Self {
        Self {
            velocity,
            wave_id,
            volume: 1.0,
            pitch: 1.0,
        }
    }
}

/// Program that maps every key to its own percussion sound
#[derive(Debug, Clone, PartialEq)]
pub struct DrumSet {
    percussions: Vec<Option<Percussion>>,
}

impl Default for DrumSet {
    fn default() -> Self {
        Self {
            percussions: vec![None; DRUM_SET_KEYS],
        }
    }
}

impl DrumSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: u8) -> Option<&Percussion> {
        self.percussions.get(key as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, key: u8) -> Option<&mut Percussion> {
        self.percussions.get_mut(key as usize)?.as_mut()
    }

    /// # Panics
    /// Panics if `key` is above 127.
    pub fn insert(&mut self, key: u8, percussion: Percussion) -> Option<Percussion> {
        self.percussions[key as usize].replace(percussion)
    }

    pub fn len(&self) -> usize {
        self.percussions.iter().filter(|p| p.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Occupied keys in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Percussion)> {
        self.percussions
            .iter()
            .enumerate()
            .filter_map(|(key, slot)| slot.as_ref().map(|p| (key as u8, p)))
    }

    /// Every key slot, empty or not
    pub fn slots(&self) -> impl Iterator<Item = Option<&Percussion>> {
        self.percussions.iter().map(Option::as_ref)
    }
}

/// A single drum set key
#[derive(Debug, Clone, PartialEq)]
pub struct Percussion {
    pub volume: f32,
    pub pitch: f32,
    /// 0.0 is hard left, 1.0 hard right
    pub pan: f32,
    pub release: u16,
    pub effects: Vec<Effect>,
    pub velocity_regions: Vec<VelocityRegion>,
}

impl Default for Percussion {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pitch: 1.0,
            pan: 0.5,
            release: 0,
            effects: Vec::new(),
            velocity_regions: Vec::new(),
        }
    }
}

impl Percussion {
    pub fn random_effects(&self) -> impl Iterator<Item = &RandomEffect> {
        random_effects(&self.effects)
    }

    pub fn sense_effects(&self) -> impl Iterator<Item = &SenseEffect> {
        sense_effects(&self.effects)
    }
}

fn random_effects(effects: &[Effect]) -> impl Iterator<Item = &RandomEffect> {
    effects.iter().filter_map(|effect| match effect {
        Effect::Random(random) => Some(random),
        Effect::Sense(_) => None,
    })
}

fn sense_effects(effects: &[Effect]) -> impl Iterator<Item = &SenseEffect> {
    effects.iter().filter_map(|effect| match effect {
        Effect::Sense(sense) => Some(sense),
        Effect::Random(_) => None,
    })
}

/// Parameter an oscillator or effect acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EffectTarget {
    Volume = 0,
    Pitch = 1,
    Pan = 2,
    FxMix = 3,
    Dolby = 4,
}

impl EffectTarget {
    pub fn from_raw(value: u8) -> Option<Self> {
        match value {
            0 => Some(EffectTarget::Volume),
            1 => Some(EffectTarget::Pitch),
            2 => Some(EffectTarget::Pan),
            3 => Some(EffectTarget::FxMix),
            4 => Some(EffectTarget::Dolby),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EffectTarget::Volume => "volume",
            EffectTarget::Pitch => "pitch",
            EffectTarget::Pan => "pan",
            EffectTarget::FxMix => "fxmix",
            EffectTarget::Dolby => "dolby",
        }
    }
}

impl fmt::Display for EffectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectTarget {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "volume" => Ok(EffectTarget::Volume),
            "pitch" => Ok(EffectTarget::Pitch),
            "pan" => Ok(EffectTarget::Pan),
            "fxmix" => Ok(EffectTarget::FxMix),
            "dolby" => Ok(EffectTarget::Dolby),
            _ => Err(()),
        }
    }
}

/// Instrument modulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    Random(RandomEffect),
    Sense(SenseEffect),
}

/// Random variation of `target` around `base`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomEffect {
    pub target: EffectTarget,
    pub base: f32,
    pub distance: f32,
}

/// Scaling of `target` by key or velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SenseEffect {
    pub target: EffectTarget,
    pub trigger: SenseTrigger,
    pub center_key: u8,
    pub range_lo: f32,
    pub range_hi: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SenseTrigger {
    None = 0,
    Key = 1,
    Velocity = 2,
}

impl SenseTrigger {
    pub fn from_raw(value: u8) -> Option<Self> {
        match value {
            0 => Some(SenseTrigger::None),
            1 => Some(SenseTrigger::Key),
            2 => Some(SenseTrigger::Velocity),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SenseTrigger::None => "none",
            SenseTrigger::Key => "key",
            SenseTrigger::Velocity => "velocity",
        }
    }
}

impl fmt::Display for SenseTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SenseTrigger {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(SenseTrigger::None),
            "key" => Ok(SenseTrigger::Key),
            "velocity" => Ok(SenseTrigger::Velocity),
            _ => Err(()),
        }
    }
}

/// Envelope generator driving `target`
#[derive(Debug, Clone, PartialEq)]
pub struct Oscillator {
    pub target: EffectTarget,
    pub rate: f32,
    pub width: f32,
    pub base: f32,
    pub start_table: Vec<TableEntry>,
    pub release_table: Vec<TableEntry>,
}

impl Oscillator {
    pub fn new(target: EffectTarget) -> Self {
        Self {
            target,
            rate: 1.0,
            width: 1.0,
            base: 0.0,
            start_table: Vec::new(),
            release_table: Vec::new(),
        }
    }

    /// Exact structural identity, comparing floats by bit pattern
    pub fn canonical(&self) -> OscillatorKey {
        let entries = |table: &[TableEntry]| {
            table
                .iter()
                .map(|e| (e.mode as i16, e.time, e.amount))
                .collect::<Vec<_>>()
        };
        OscillatorKey {
            target: self.target as u8,
            rate: self.rate.to_bits(),
            width: self.width.to_bits(),
            base: self.base.to_bits(),
            start: entries(&self.start_table),
            release: entries(&self.release_table),
        }
    }
}

/// Hashable form of an [`Oscillator`] used to share identical records
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OscillatorKey {
    target: u8,
    rate: u32,
    width: u32,
    base: u32,
    start: Vec<(i16, i16, i16)>,
    release: Vec<(i16, i16, i16)>,
}

/// One envelope segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableEntry {
    pub mode: TableMode,
    /// Segment length, or the destination index for [`TableMode::Loop`]
    pub time: i16,
    pub amount: i16,
}

impl TableEntry {
    pub fn new(mode: TableMode, time: i16, amount: i16) -> Self {
        Self { mode, time, amount }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum TableMode {
    Linear = 0,
    Square = 1,
    SquareRoot = 2,
    SampleCell = 3,
    Loop = 10,
    Hold = 11,
    Stop = 12,
}

impl TableMode {
    pub fn from_raw(value: i16) -> Option<Self> {
        match value {
            0 => Some(TableMode::Linear),
            1 => Some(TableMode::Square),
            2 => Some(TableMode::SquareRoot),
            3 => Some(TableMode::SampleCell),
            10 => Some(TableMode::Loop),
            11 => Some(TableMode::Hold),
            12 => Some(TableMode::Stop),
            _ => None,
        }
    }

    /// Element name used in XML tables
    pub fn name(self) -> &'static str {
        match self {
            TableMode::Linear => "linear",
            TableMode::Square => "square",
            TableMode::SquareRoot => "square-root",
            TableMode::SampleCell => "sample-cell",
            TableMode::Loop => "loop",
            TableMode::Hold => "hold",
            TableMode::Stop => "stop",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "linear" => Some(TableMode::Linear),
            "square" => Some(TableMode::Square),
            "square-root" => Some(TableMode::SquareRoot),
            "sample-cell" => Some(TableMode::SampleCell),
            "loop" => Some(TableMode::Loop),
            "hold" => Some(TableMode::Hold),
            "stop" => Some(TableMode::Stop),
            _ => None,
        }
    }

    /// Whether this entry ends a table
    pub fn is_terminal(self) -> bool {
        matches!(self, TableMode::Loop | TableMode::Hold | TableMode::Stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_slots() {
        let mut bank = InstrumentBank::new(3, "test");
        assert_eq!(bank.capacity(), 256);
        assert!(bank.is_empty());

        bank.insert(10, Instrument::Melodic(Melodic::default()));
        bank.insert(2, Instrument::DrumSet(DrumSet::new()));
        assert_eq!(bank.len(), 2);

        let programs: Vec<usize> = bank.iter().map(|(p, _)| p).collect();
        assert_eq!(programs, vec![2, 10]);
        assert!(bank.get(300).is_none());
    }

    #[test]
    fn test_key_regions_stay_sorted() {
        let mut melodic = Melodic::default();
        melodic.region_mut(64);
        melodic.region_mut(20);
        melodic.region_mut(127);
        melodic.region_mut(64).velocity_regions.push(VelocityRegion::new(127, 1));

        let keys: Vec<u8> = melodic.key_regions.iter().map(|r| r.key).collect();
        assert_eq!(keys, vec![20, 64, 127]);
        assert_eq!(melodic.key_regions[1].velocity_regions.len(), 1);
    }

    #[test]
    fn test_effect_partition() {
        let random = RandomEffect {
            target: EffectTarget::Pitch,
            base: 1.0,
            distance: 0.1,
        };
        let sense = SenseEffect {
            target: EffectTarget::Volume,
            trigger: SenseTrigger::Velocity,
            center_key: 60,
            range_lo: 0.0,
            range_hi: 1.0,
        };
        let percussion = Percussion {
            effects: vec![Effect::Sense(sense), Effect::Random(random), Effect::Random(random)],
            ..Percussion::default()
        };
        assert_eq!(percussion.random_effects().count(), 2);
        assert_eq!(percussion.sense_effects().count(), 1);
    }

    #[test]
    fn test_canonical_compares_bits() {
        let mut a = Oscillator::new(EffectTarget::Volume);
        a.start_table.push(TableEntry::new(TableMode::Linear, 10, 32767));
        let mut b = a.clone();
        assert_eq!(a.canonical(), b.canonical());

        b.base = -0.0;
        assert_ne!(a.canonical(), b.canonical());
    }

    #[test]
    fn test_table_modes() {
        assert_eq!(TableMode::from_raw(10), Some(TableMode::Loop));
        assert_eq!(TableMode::from_raw(4), None);
        assert!(TableMode::Stop.is_terminal());
        assert!(!TableMode::SampleCell.is_terminal());
        assert_eq!(TableMode::from_name("square-root"), Some(TableMode::SquareRoot));
        assert_eq!("FxMix".parse::<EffectTarget>(), Ok(EffectTarget::FxMix));
    }
}
