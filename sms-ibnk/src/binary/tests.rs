//! Tests for the IBNK binary codec

use super::*;
use crate::bank::*;
use crate::error::IbnkError;
use crate::fixtures;
use sms_audio_shared::{Diagnostics, Endian};

fn be_u32(data: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

fn write(bank: &InstrumentBank, endian: Endian) -> Vec<u8> {
    write_ibnk(bank, endian, &mut Diagnostics::new()).unwrap()
}

fn read(data: &[u8], endian: Endian) -> (InstrumentBank, usize) {
    let mut diag = Diagnostics::new();
    let bank = read_ibnk(data, endian, "test.bnk", &mut diag).unwrap();
    (bank, diag.warnings())
}

#[test]
fn test_drum_set_round_trip() {
    let mut bank = InstrumentBank::new(1, "drums");
    bank.insert(0, Instrument::DrumSet(fixtures::drum_set()));

    let data = write(&bank, Endian::Big);
    let (parsed, warnings) = read(&data, Endian::Big);
    assert_eq!(warnings, 0);

    let Some(Instrument::DrumSet(drums)) = parsed.get(0) else {
        panic!("expected a drum set in slot 0");
    };
    assert_eq!(drums.len(), 1);

    let kick = drums.get(36).unwrap();
    assert!(kick.effects.is_empty());
    assert_eq!(kick.velocity_regions.len(), 1);
    assert_eq!(kick.velocity_regions[0].wave_id, 5);
    assert_eq!(kick.velocity_regions[0].velocity, 127);
    assert_eq!(kick.volume, 1.0);
    assert!((kick.pan - 0.5).abs() < 0.01);
}

#[test]
fn test_melodic_round_trip_both_endians() {
    let bank = fixtures::bank();

    for endian in [Endian::Big, Endian::Little] {
        let data = write(&bank, endian);
        let (parsed, warnings) = read(&data, endian);
        assert_eq!(warnings, 0);
        assert_eq!(parsed.virtual_number, 7);
        assert_eq!(parsed.len(), 2);

        let Some(Instrument::Melodic(melodic)) = parsed.get(0) else {
            panic!("expected a melodic instrument in slot 0");
        };
        assert_eq!(melodic, &fixtures::melodic());
    }
}

#[test]
fn test_layout_sizes() {
    let mut bank = InstrumentBank::new(3, "one");
    bank.insert(0, Instrument::Melodic(fixtures::melodic()));

    // oscillator: 32 + 32 + 32, instrument: 48 header + 32 effects + 48 region
    let data = write(&bank, Endian::Big);
    assert_eq!(data.len(), 1024 + 96 + 128);
    assert_eq!(be_u32(&data, 4), data.len() as u32);
    assert_eq!(be_u32(&data, 8), 3);

    // Table slot 0 points past the oscillator table
    assert_eq!(be_u32(&data, 36), 1120);
    assert_eq!(&data[1120..1124], b"INST");
    // First oscillator slot points at the start of the data block
    assert_eq!(be_u32(&data, 1120 + 16), 1024);
    assert_eq!(be_u32(&data, 1120 + 20), 0);
}

#[test]
fn test_identical_oscillators_are_shared() {
    let mut bank = InstrumentBank::new(0, "shared");
    bank.insert(0, Instrument::Melodic(fixtures::melodic()));
    bank.insert(1, Instrument::Melodic(fixtures::melodic()));

    let mut other = fixtures::melodic();
    other.oscillators[0].rate = 2.0;
    bank.insert(2, Instrument::Melodic(other));

    let data = write(&bank, Endian::Big);
    assert_eq!(data.len(), 1024 + 2 * 96 + 3 * 128);

    let first = be_u32(&data, 36) as usize;
    let second = be_u32(&data, 40) as usize;
    let third = be_u32(&data, 44) as usize;
    assert_eq!(be_u32(&data, first + 16), 1024);
    assert_eq!(be_u32(&data, second + 16), 1024);
    assert_eq!(be_u32(&data, third + 16), 1024 + 96);
}

#[test]
fn test_empty_bank() {
    let bank = InstrumentBank::new(9, "empty");

    let data = write(&bank, Endian::Big);
    assert_eq!(data.len(), 1024);
    assert_eq!(&data[0..4], b"IBNK");
    assert_eq!(&data[32..36], b"IBNK");
    assert!(data[36..1024].iter().all(|&b| b == 0));

    // Tags are written as numbers, so little-endian banks store them reversed
    let data = write(&bank, Endian::Little);
    assert_eq!(&data[0..4], b"KNBI");
    let (parsed, _) = read(&data, Endian::Little);
    assert_eq!(parsed.virtual_number, 9);
    assert!(parsed.is_empty());
}

#[test]
fn test_drum_set_size() {
    let mut bank = InstrumentBank::new(0, "drums");
    bank.insert(5, Instrument::DrumSet(fixtures::drum_set()));

    // 1056 header + 32 percussion header + 16 velocity region, padded to 32
    let data = write(&bank, Endian::Big);
    assert_eq!(data.len(), 1024 + 1120);
    assert_eq!(be_u32(&data, 36 + 5 * 4), 1024);
    assert_eq!(&data[1024..1028], b"PER2");
    // Percussion offset for key 36
    assert_eq!(be_u32(&data, 1024 + 136 + 36 * 4), 1024 + 1056);
    // Pan table stores 0.5 as 63
    assert_eq!(data[1024 + 136 + 512 + 36], 63);
}

#[test]
fn test_legacy_drum_set() {
    let mut bank = InstrumentBank::new(0, "drums");
    let mut drums = fixtures::drum_set();
    drums.get_mut(36).unwrap().pan = 1.0;
    bank.insert(0, Instrument::DrumSet(drums));

    let mut data = write(&bank, Endian::Big);
    data[1024..1028].copy_from_slice(b"PERC");

    let (parsed, warnings) = read(&data, Endian::Big);
    assert_eq!(warnings, 0);
    let Some(Instrument::DrumSet(drums)) = parsed.get(0) else {
        panic!("expected a drum set");
    };
    // PERC has no pan table
    assert_eq!(drums.get(36).unwrap().pan, 0.5);
    assert_eq!(drums.get(36).unwrap().velocity_regions[0].wave_id, 5);
}

#[test]
fn test_incompatible_bank_is_rejected() {
    let mut melodic = fixtures::melodic();
    melodic.oscillators = vec![fixtures::envelope(); 3];

    let mut bank = InstrumentBank::new(0, "bad");
    bank.insert(0, Instrument::Melodic(melodic));

    let mut diag = Diagnostics::new();
    let result = write_ibnk(&bank, Endian::Big, &mut diag);
    assert!(matches!(result, Err(IbnkError::Incompatible(1))));
    assert_eq!(diag.warnings(), 1);
}

#[test]
fn test_magic_checks() {
    let data = write(&fixtures::bank(), Endian::Big);

    let mut bank_tag = data.clone();
    bank_tag[0..4].copy_from_slice(b"BANK");
    bank_tag[32..36].copy_from_slice(b"BANK");
    let (parsed, _) = read(&bank_tag, Endian::Big);
    assert_eq!(parsed.len(), 2);

    let mut bad_header = data.clone();
    bad_header[0..4].copy_from_slice(b"WSYS");
    let result = read_ibnk(&bad_header, Endian::Big, "x", &mut Diagnostics::new());
    assert!(matches!(result, Err(IbnkError::MissingHeader)));

    let mut bad_table = data.clone();
    bad_table[32..36].copy_from_slice(b"\0\0\0\0");
    let result = read_ibnk(&bad_table, Endian::Big, "x", &mut Diagnostics::new());
    assert!(matches!(result, Err(IbnkError::MissingTable)));

    // Reading a big-endian bank as little-endian finds no header
    let result = read_ibnk(&data, Endian::Little, "x", &mut Diagnostics::new());
    assert!(matches!(result, Err(IbnkError::MissingHeader)));
}

#[test]
fn test_bad_values_are_warnings() {
    let mut data = write(&fixtures::bank(), Endian::Big);
    // Oscillator target
    data[1024] = 9;

    let (parsed, warnings) = read(&data, Endian::Big);
    assert_eq!(warnings, 1);
    let Some(Instrument::Melodic(melodic)) = parsed.get(0) else {
        panic!("expected a melodic instrument");
    };
    assert!(melodic.oscillators.is_empty());
    assert_eq!(melodic.effects.len(), 2);
    assert_eq!(parsed.len(), 2);
}

#[test]
fn test_truncated_bank_is_fatal() {
    let data = write(&fixtures::bank(), Endian::Big);
    let result = read_ibnk(&data[..1100], Endian::Big, "x", &mut Diagnostics::new());
    assert!(matches!(result, Err(IbnkError::Io(_))));
}
