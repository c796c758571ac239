//! SoundFont 2 (`sfbk`) builder
//!
//! Collects presets, instruments and sample headers in memory, then lays out
//! the RIFF tree with all the terminal records the format requires.

use crate::binary::{BinaryWriter, Endian};
use std::io;

/// Generator operators used by the bank exporters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum GeneratorKind {
    Pan = 17,
    AttackVolEnv = 34,
    HoldVolEnv = 35,
    DecayVolEnv = 36,
    SustainVolEnv = 37,
    ReleaseVolEnv = 38,
    Instrument = 41,
    KeyRange = 43,
    VelRange = 44,
    InitialAttenuation = 48,
    FineTune = 52,
    SampleId = 53,
    SampleModes = 54,
    OverridingRootKey = 58,
}

/// One generator with its raw 16-bit amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generator {
    pub kind: GeneratorKind,
    pub amount: u16,
}

impl Generator {
    pub fn signed(kind: GeneratorKind, amount: i16) -> Self {
        Self {
            kind,
            amount: amount as u16,
        }
    }

    pub fn unsigned(kind: GeneratorKind, amount: u16) -> Self {
        Self { kind, amount }
    }

    /// Key or velocity range, low byte first
    pub fn range(kind: GeneratorKind, low: u8, high: u8) -> Self {
        Self {
            kind,
            amount: u16::from_le_bytes([low, high]),
        }
    }
}

/// A preset or instrument zone
#[derive(Debug, Clone, Default)]
pub struct Zone {
    pub generators: Vec<Generator>,
}

impl Zone {
    pub fn new(generators: Vec<Generator>) -> Self {
        Self { generators }
    }
}

#[derive(Debug, Clone)]
pub struct Preset {
    pub name: String,
    pub program: u16,
    pub bank: u16,
    pub zones: Vec<Zone>,
}

#[derive(Debug, Clone)]
pub struct Instrument {
    pub name: String,
    pub zones: Vec<Zone>,
}

/// Sample header; positions are in samples from the start of the pool
#[derive(Debug, Clone)]
pub struct SampleHeader {
    pub name: String,
    pub start: u32,
    pub end: u32,
    pub loop_start: u32,
    pub loop_end: u32,
    pub sample_rate: u32,
    pub original_key: u8,
    pub correction: i8,
}

/// Mono sample type in `shdr`
const MONO_SAMPLE: u16 = 1;

/// An in-memory SoundFont
#[derive(Debug, Clone, Default)]
pub struct SoundFont {
    pub name: String,
    pub presets: Vec<Preset>,
    pub instruments: Vec<Instrument>,
    pub samples: Vec<SampleHeader>,
    pub sample_data: Vec<i16>,
}

type Body = BinaryWriter<Vec<u8>>;

fn body() -> Body {
    BinaryWriter::new(Vec::new(), Endian::Little)
}

fn chunk(id: &[u8; 4], data: &[u8]) -> io::Result<Vec<u8>> {
    let mut out = body();
    out.write_bytes(id)?;
    out.write_u32(data.len() as u32)?;
    out.write_bytes(data)?;
    out.pad_to(2)?;
    Ok(out.into_inner())
}

fn list(kind: &[u8; 4], chunks: &[Vec<u8>]) -> io::Result<Vec<u8>> {
    let mut data = kind.to_vec();
    for c in chunks {
        data.extend_from_slice(c);
    }
    chunk(b"LIST", &data)
}

/// Zero-terminated string padded to an even length
fn zstr(text: &str) -> Vec<u8> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.push(0);
    if bytes.len() % 2 != 0 {
        bytes.push(0);
    }
    bytes
}

impl SoundFont {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Serialize to a complete `.sf2` file
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut ifil = body();
        ifil.write_u16(2)?;
        ifil.write_u16(1)?;

        let info = list(
            b"INFO",
            &[
                chunk(b"ifil", &ifil.into_inner())?,
                chunk(b"isng", &zstr("EMU8000"))?,
                chunk(b"INAM", &zstr(&self.name))?,
            ],
        )?;

        let mut smpl = body();
        for &sample in &self.sample_data {
            smpl.write_i16(sample)?;
        }
        let sdta = list(b"sdta", &[chunk(b"smpl", &smpl.into_inner())?])?;

        let pdta = list(b"pdta", &self.hydra()?)?;

        let mut riff = b"sfbk".to_vec();
        riff.extend_from_slice(&info);
        riff.extend_from_slice(&sdta);
        riff.extend_from_slice(&pdta);
        chunk(b"RIFF", &riff)
    }

    /// The nine `pdta` sub-chunks
    fn hydra(&self) -> io::Result<Vec<Vec<u8>>> {
        let mut phdr = body();
        let mut pbag = body();
        let mut pgen = body();
        let mut bag_index = 0u16;
        let mut gen_index = 0u16;

        for preset in &self.presets {
            phdr.write_fixed_string(&preset.name, 20)?;
            phdr.write_u16(preset.program)?;
            phdr.write_u16(preset.bank)?;
            phdr.write_u16(bag_index)?;
            phdr.write_zeros(12)?;
            write_zones(&preset.zones, &mut pbag, &mut pgen, &mut bag_index, &mut gen_index)?;
        }
        phdr.write_fixed_string("EOP", 20)?;
        phdr.write_zeros(4)?;
        phdr.write_u16(bag_index)?;
        phdr.write_zeros(12)?;
        pbag.write_u16(gen_index)?;
        pbag.write_u16(0)?;
        pgen.write_zeros(4)?;

        let mut inst = body();
        let mut ibag = body();
        let mut igen = body();
        let mut bag_index = 0u16;
        let mut gen_index = 0u16;

        for instrument in &self.instruments {
            inst.write_fixed_string(&instrument.name, 20)?;
            inst.write_u16(bag_index)?;
            write_zones(&instrument.zones, &mut ibag, &mut igen, &mut bag_index, &mut gen_index)?;
        }
        inst.write_fixed_string("EOI", 20)?;
        inst.write_u16(bag_index)?;
        ibag.write_u16(gen_index)?;
        ibag.write_u16(0)?;
        igen.write_zeros(4)?;

        let mut shdr = body();
        for sample in &self.samples {
            shdr.write_fixed_string(&sample.name, 20)?;
            shdr.write_u32(sample.start)?;
            shdr.write_u32(sample.end)?;
            shdr.write_u32(sample.loop_start)?;
            shdr.write_u32(sample.loop_end)?;
            shdr.write_u32(sample.sample_rate)?;
            shdr.write_u8(sample.original_key)?;
            shdr.write_i8(sample.correction)?;
            shdr.write_u16(0)?;
            shdr.write_u16(MONO_SAMPLE)?;
        }
        shdr.write_fixed_string("EOS", 20)?;
        shdr.write_zeros(26)?;

        // Modulator lists hold only their terminal record
        let terminal_mod = [0u8; 10];

        Ok(vec![
            chunk(b"phdr", &phdr.into_inner())?,
            chunk(b"pbag", &pbag.into_inner())?,
            chunk(b"pmod", &terminal_mod)?,
            chunk(b"pgen", &pgen.into_inner())?,
            chunk(b"inst", &inst.into_inner())?,
            chunk(b"ibag", &ibag.into_inner())?,
            chunk(b"imod", &terminal_mod)?,
            chunk(b"igen", &igen.into_inner())?,
            chunk(b"shdr", &shdr.into_inner())?,
        ])
    }
}

fn write_zones(
    zones: &[Zone],
    bags: &mut Body,
    gens: &mut Body,
    bag_index: &mut u16,
    gen_index: &mut u16,
) -> io::Result<()> {
    for zone in zones {
        bags.write_u16(*gen_index)?;
        bags.write_u16(0)?;
        *bag_index += 1;
        for generator in &zone.generators {
            gens.write_u16(generator.kind as u16)?;
            gens.write_u16(generator.amount)?;
            *gen_index += 1;
        }
    }
    Ok(())
}
