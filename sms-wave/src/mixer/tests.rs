use super::*;
use sms_audio_shared::Endian;
use std::io::Cursor;

fn wav_bytes(channels: u16, bits: u16, rate: u32, samples: &[i16]) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate: rate,
        bits_per_sample: bits,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            if bits == 8 {
                writer.write_sample(s as i8).unwrap();
            } else {
                writer.write_sample(s).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

fn write_to_vec(mixer: &WaveMixer, format: WaveFormat) -> Vec<u8> {
    let mut writer = BinaryWriter::new(Vec::new(), Endian::Big);
    mixer.write(format, &mut writer).unwrap();
    writer.into_inner()
}

fn ramp(len: usize) -> Vec<i16> {
    (0..len).map(|i| (i as i16 * 37) - 600).collect()
}

#[test]
fn test_left_mix_mode_yields_left_channel() {
    let left = ramp(40);
    let right: Vec<i16> = left.iter().map(|s| s.wrapping_mul(-3)).collect();
    let interleaved: Vec<i16> = left.iter().zip(&right).flat_map(|(&l, &r)| [l, r]).collect();

    let data = wav_bytes(2, 16, 22050, &interleaved);
    let mixer = WaveMixer::microsoft(&data, MixerMode::Left).unwrap();
    assert_eq!(mixer.sample_count(), 40);

    let out = write_to_vec(&mixer, WaveFormat::Pcm16);
    let samples: Vec<i16> = out
        .chunks_exact(2)
        .map(|b| i16::from_be_bytes([b[0], b[1]]))
        .collect();
    assert_eq!(samples, left);
}

#[test]
fn test_right_and_mix_modes() {
    let data = wav_bytes(2, 16, 8000, &[100, -301, 3, 3]);

    let right = WaveMixer::microsoft(&data, MixerMode::Right).unwrap();
    assert_eq!(right.read_pcm16(0), -301);

    let mix = WaveMixer::microsoft(&data, MixerMode::Mix).unwrap();
    assert_eq!(mix.read_pcm16(0), (100 >> 1) + (-301 >> 1));
    assert_eq!(mix.read_pcm16(1), 2);
    assert_eq!(mix.read_pcm16_stereo(0), (100, -301));
}

#[test]
fn test_pcm8_and_pcm16_mixing_differ() {
    // Halving before the sum loses the low bit twice
    assert_eq!(MixerMode::Mix.mix_pcm16(3, 3), 2);
    assert_eq!(MixerMode::Mix.mix_pcm8(3, 3), 3);
    assert_eq!(MixerMode::Mix.mix_pcm8(127, 127), 127);
    assert_eq!(MixerMode::Mix.mix_pcm8(-128, -127), -128);
    assert_eq!(MixerMode::Left.mix_pcm8(1, 2), 1);
    assert_eq!(MixerMode::Right.mix_pcm16(1, 2), 2);
}

#[test]
fn test_eight_bit_stereo_source() {
    let data = wav_bytes(2, 8, 11025, &[10, -20, 127, -128]);
    let mixer = WaveMixer::microsoft(&data, MixerMode::Mix).unwrap();

    assert_eq!(mixer.sample_count(), 2);
    assert_eq!(mixer.read_pcm8(0), -5);
    assert_eq!(mixer.read_pcm8_stereo(1), (127, -128));
    assert_eq!(mixer.read_pcm16(0), -5 << 8);
    assert_eq!(mixer.read_pcm16_stereo(0), (10 << 8, -20 << 8));
}

#[test]
fn test_rejects_unsupported_wav() {
    let data = wav_bytes(1, 24, 8000, &[]);
    assert!(matches!(
        WaveMixer::microsoft(&data, MixerMode::Mix),
        Err(WaveError::UnsupportedBitDepth(24))
    ));
    assert!(WaveMixer::microsoft(b"not a wave", MixerMode::Mix).is_err());
}

#[test]
fn test_adpcm_write_pads_last_frame() {
    let mixer = WaveMixer::raw(
        ramp(20).iter().flat_map(|s| s.to_be_bytes()).collect(),
        WaveFormat::Pcm16,
    );
    assert_eq!(write_to_vec(&mixer, WaveFormat::Adpcm4).len(), 18);
    assert_eq!(write_to_vec(&mixer, WaveFormat::Adpcm2).len(), 10);
    assert_eq!(write_to_vec(&mixer, WaveFormat::Pcm8).len(), 20);
    assert_eq!(write_to_vec(&mixer, WaveFormat::Pcm16).len(), 40);
}

#[test]
fn test_raw_adpcm_is_copied_verbatim() {
    let source = WaveMixer::raw(
        ramp(64).iter().flat_map(|s| s.to_be_bytes()).collect(),
        WaveFormat::Pcm16,
    );
    let adpcm = write_to_vec(&source, WaveFormat::Adpcm4);
    let mixer = WaveMixer::raw(adpcm.clone(), WaveFormat::Adpcm4);
    assert_eq!(write_to_vec(&mixer, WaveFormat::Adpcm4), adpcm);

    // History from stored frames matches the encoder's own history
    let from_frames = mixer.calculate_history(40, WaveFormat::Adpcm4).unwrap();
    let from_pcm = source.calculate_history(40, WaveFormat::Adpcm4).unwrap();
    assert_eq!(from_frames, from_pcm);
}

#[test]
fn test_history_replays_whole_frames() {
    let samples = ramp(64);
    let mixer = WaveMixer::raw(
        samples.iter().flat_map(|s| s.to_be_bytes()).collect(),
        WaveFormat::Pcm16,
    );

    assert_eq!(
        mixer.calculate_history(15, WaveFormat::Adpcm4).unwrap(),
        History::default()
    );
    assert_eq!(
        mixer.calculate_history(40, WaveFormat::Pcm16).unwrap(),
        History::default()
    );

    let mut encoder = History::default();
    for frame in samples.chunks_exact(16).take(2) {
        encode_adpcm2(frame.try_into().unwrap(), &mut encoder);
    }
    assert_eq!(mixer.calculate_history(47, WaveFormat::Adpcm2).unwrap(), encoder);

    assert!(matches!(
        mixer.calculate_history(64, WaveFormat::Adpcm2),
        Err(WaveError::SampleOutOfRange { sample: 64, count: 64 })
    ));
}

#[test]
fn test_copy_wave_info() {
    let data = wav_bytes(1, 16, 32000, &ramp(10));
    let mixer = WaveMixer::microsoft(&data, MixerMode::Mix).unwrap();

    let mut wave = Wave::new(1, WaveFormat::Adpcm4);
    mixer.copy_wave_info(&mut wave);
    assert_eq!(wave.sample_count, 10);
    assert_eq!(wave.sample_rate, 32000.0);

    let mut preset = Wave::new(2, WaveFormat::Adpcm4);
    preset.sample_rate = 16000.0;
    preset.sample_count = 4;
    mixer.copy_wave_info(&mut preset);
    assert_eq!(preset.sample_rate, 16000.0);
    assert_eq!(preset.sample_count, 4);

    let raw = WaveMixer::raw(vec![0; 8], WaveFormat::Pcm8);
    let mut wave = Wave::new(3, WaveFormat::Pcm8);
    raw.copy_wave_info(&mut wave);
    assert_eq!(wave.sample_count, 8);
    assert_eq!(wave.sample_rate, 0.0);
}
