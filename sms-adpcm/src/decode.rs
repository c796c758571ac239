//! ADPCM decoder implementation
//!
//! Each call expands exactly one frame into 16 PCM16 samples and advances
//! the caller's history.

use crate::{ADPCM2_FRAME_SIZE, ADPCM4_FRAME_SIZE, COEFFICIENTS, FRAME_SAMPLES, History};
use crate::{clamp_i16, split_header};

/// Sign-extend the low `bits` bits of `code`
#[inline]
pub(crate) fn sign_extend(code: u8, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((code as i32) << shift) >> shift
}

/// Reconstruct one sample from its quantized delta
///
/// `step_shift` is 11 for 4-bit codes and 13 for 2-bit codes.
#[inline]
pub(crate) fn reconstruct(delta: i32, exponent: u32, step_shift: u32, predicted: i32) -> i16 {
    clamp_i16((((delta << exponent) << step_shift) + predicted) >> 11)
}

/// Decode one 9-byte ADPCM4 frame
pub fn decode_adpcm4(frame: &[u8; ADPCM4_FRAME_SIZE], history: &mut History) -> [i16; 16] {
    let (exponent, index) = split_header(frame[0]);
    let coefficients = COEFFICIENTS[index];
    let mut out = [0i16; FRAME_SAMPLES];

    for (i, sample) in out.iter_mut().enumerate() {
        let byte = frame[1 + i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0xF };
        let delta = sign_extend(nibble, 4);

        *sample = reconstruct(delta, exponent, 11, history.predict(coefficients));
        history.push(*sample);
    }

    out
}

/// Decode one 5-byte ADPCM2 frame
pub fn decode_adpcm2(frame: &[u8; ADPCM2_FRAME_SIZE], history: &mut History) -> [i16; 16] {
    let (exponent, index) = split_header(frame[0]);
    let coefficients = COEFFICIENTS[index];
    let mut out = [0i16; FRAME_SAMPLES];

    for (i, sample) in out.iter_mut().enumerate() {
        let byte = frame[1 + i / 4];
        let code = (byte >> (6 - 2 * (i % 4))) & 0x3;
        let delta = sign_extend(code, 2);

        *sample = reconstruct(delta, exponent, 13, history.predict(coefficients));
        history.push(*sample);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0x7, 4), 7);
        assert_eq!(sign_extend(0x8, 4), -8);
        assert_eq!(sign_extend(0xF, 4), -1);
        assert_eq!(sign_extend(0x1, 2), 1);
        assert_eq!(sign_extend(0x2, 2), -2);
        assert_eq!(sign_extend(0x3, 2), -1);
    }

    #[test]
    fn test_decode_silent_frame() {
        let mut history = History::default();
        assert_eq!(decode_adpcm4(&[0; 9], &mut history), [0; 16]);
        assert_eq!(decode_adpcm2(&[0; 5], &mut history), [0; 16]);
        assert_eq!(history, History::default());
    }

    #[test]
    fn test_decode_adpcm4_without_prediction() {
        // Coefficient set 0 ignores history, exponent 0 gives unit steps
        let frame = [0x00, 0x12, 0x34, 0x56, 0x70, 0x89, 0xAB, 0xCD, 0xEF];
        let mut history = History::new(1000, -1000);
        let out = decode_adpcm4(&frame, &mut history);
        assert_eq!(out, [1, 2, 3, 4, 5, 6, 7, 0, -8, -7, -6, -5, -4, -3, -2, -1]);
        assert_eq!(history, History::new(-1, -2));
    }

    #[test]
    fn test_decode_adpcm2_step_size() {
        // 2-bit codes are four times the 4-bit step at the same exponent
        let frame = [0x20, 0b01_11_10_00, 0, 0, 0];
        let mut history = History::default();
        let out = decode_adpcm2(&frame, &mut history);
        assert_eq!(&out[..4], &[16, -16, -32, 0]);
    }

    #[test]
    fn test_decode_adpcm4_uses_history() {
        // Coefficient set 1 repeats the previous sample
        let frame = [0x01, 0, 0, 0, 0, 0, 0, 0, 0];
        let mut history = History::new(1234, 0);
        let out = decode_adpcm4(&frame, &mut history);
        assert!(out.iter().all(|&s| s == 1234));
    }

    #[test]
    fn test_decode_clamps() {
        // Max exponent with coefficient set 1 and a positive history saturates
        let frame = [0xF1, 0x77, 0x77, 0x77, 0x77, 0x77, 0x77, 0x77, 0x77];
        let mut history = History::new(30000, 0);
        let out = decode_adpcm4(&frame, &mut history);
        assert!(out.iter().all(|&s| s == i16::MAX));
    }
}
