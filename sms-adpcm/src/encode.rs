//! ADPCM encoder implementation
//!
//! Every coefficient set and scale exponent is tried against a simulated
//! decoder, and the candidate with the lowest squared error wins. The
//! caller's history therefore always ends up equal to what the decoder will
//! hold after the frame.

use crate::decode::reconstruct;
use crate::{ADPCM2_FRAME_SIZE, ADPCM4_FRAME_SIZE, COEFFICIENTS, FRAME_SAMPLES, History};

/// Quantizer parameters for one code width
struct CodeWidth {
    step_shift: u32,
    min: i32,
    max: i32,
}

const NIBBLE: CodeWidth = CodeWidth {
    step_shift: 11,
    min: -8,
    max: 7,
};

const CRUMB: CodeWidth = CodeWidth {
    step_shift: 13,
    min: -2,
    max: 1,
};

/// Winning candidate of the search
struct Candidate {
    header: u8,
    codes: [i32; FRAME_SAMPLES],
    history: History,
    error: i64,
}

/// Closed-loop search for the best (coefficient, exponent) pair
fn search(samples: &[i16; 16], history: &History, width: &CodeWidth) -> Candidate {
    let mut best = Candidate {
        header: 0,
        codes: [0; FRAME_SAMPLES],
        history: *history,
        error: i64::MAX,
    };

    'search: for (index, &coefficients) in COEFFICIENTS.iter().enumerate() {
        for exponent in 0..16u32 {
            let step = 1i32 << (exponent + width.step_shift);
            let mut sim = *history;
            let mut codes = [0i32; FRAME_SAMPLES];
            let mut error = 0i64;

            for (code, &sample) in codes.iter_mut().zip(samples) {
                let predicted = sim.predict(coefficients);
                let residual = ((sample as i32) << 11) - predicted;
                let quantized = (residual + step / 2)
                    .div_euclid(step)
                    .clamp(width.min, width.max);

                let decoded = reconstruct(quantized, exponent, width.step_shift, predicted);
                let diff = sample as i64 - decoded as i64;
                error += diff * diff;

                *code = quantized;
                sim.push(decoded);
            }

            if error < best.error {
                best = Candidate {
                    header: ((exponent as u8) << 4) | index as u8,
                    codes,
                    history: sim,
                    error,
                };
                if error == 0 {
                    break 'search;
                }
            }
        }
    }

    best
}

/// Encode 16 samples into one 9-byte ADPCM4 frame
pub fn encode_adpcm4(samples: &[i16; 16], history: &mut History) -> [u8; ADPCM4_FRAME_SIZE] {
    let best = search(samples, history, &NIBBLE);
    *history = best.history;

    let mut frame = [0u8; ADPCM4_FRAME_SIZE];
    frame[0] = best.header;
    for (i, pair) in best.codes.chunks_exact(2).enumerate() {
        frame[1 + i] = (((pair[0] & 0xF) << 4) | (pair[1] & 0xF)) as u8;
    }
    frame
}

/// Encode 16 samples into one 5-byte ADPCM2 frame
pub fn encode_adpcm2(samples: &[i16; 16], history: &mut History) -> [u8; ADPCM2_FRAME_SIZE] {
    let best = search(samples, history, &CRUMB);
    *history = best.history;

    let mut frame = [0u8; ADPCM2_FRAME_SIZE];
    frame[0] = best.header;
    for (i, quad) in best.codes.chunks_exact(4).enumerate() {
        frame[1 + i] = quad
            .iter()
            .enumerate()
            .fold(0u8, |acc, (j, &code)| acc | (((code & 0x3) as u8) << (6 - 2 * j)));
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode_adpcm2, decode_adpcm4};

    /// Integer triangle wave, 64 samples
    fn triangle() -> Vec<i16> {
        (0..64)
            .map(|i: i32| {
                let p = (i * 700) % 16384;
                ((if p < 8192 { p } else { 16384 - p }) * 3 - 12288) as i16
            })
            .collect()
    }

    fn frame(samples: &[i16], index: usize) -> [i16; 16] {
        samples[index * 16..index * 16 + 16].try_into().unwrap()
    }

    #[test]
    fn test_encode_adpcm4_pinned() {
        let input = triangle();
        let mut history = History::default();
        let first = encode_adpcm4(&frame(&input, 0), &mut history);
        let second = encode_adpcm4(&frame(&input, 1), &mut history);

        assert_eq!(
            first,
            [0xB0, 0xAB, 0xCD, 0xEF, 0x01, 0x23, 0x45, 0x65, 0x43]
        );
        assert_eq!(
            second,
            [0x86, 0x9D, 0xCC, 0xCC, 0xCB, 0x67, 0x54, 0x44, 0x44]
        );
        assert_eq!(history, History::new(3571, 1517));
    }

    #[test]
    fn test_encode_adpcm2_pinned() {
        let input = triangle();
        let mut history = History::default();
        let first = encode_adpcm2(&frame(&input, 0), &mut history);
        let second = encode_adpcm2(&frame(&input, 1), &mut history);

        assert_eq!(first, [0xA5, 0x94, 0x07, 0x40, 0x30]);
        assert_eq!(second, [0x91, 0xFF, 0xFF, 0x15, 0x55]);
        assert_eq!(history, History::new(3340, 1292));
    }

    #[test]
    fn test_encode_silence_is_zero_frame() {
        let mut history = History::default();
        assert_eq!(encode_adpcm4(&[0; 16], &mut history), [0; 9]);
        assert_eq!(encode_adpcm2(&[0; 16], &mut history), [0; 5]);
        assert_eq!(history, History::default());
    }

    #[test]
    fn test_encoder_history_matches_decoder() {
        let input = triangle();
        let mut enc4 = History::default();
        let mut dec4 = History::default();
        let mut enc2 = History::new(-300, 200);
        let mut dec2 = History::new(-300, 200);

        for i in 0..4 {
            let samples = frame(&input, i);
            decode_adpcm4(&encode_adpcm4(&samples, &mut enc4), &mut dec4);
            decode_adpcm2(&encode_adpcm2(&samples, &mut enc2), &mut dec2);
            assert_eq!(enc4, dec4);
            assert_eq!(enc2, dec2);
        }
    }

    #[test]
    fn test_encode_extremes() {
        let mut samples = [i16::MAX; 16];
        for s in samples.iter_mut().skip(8) {
            *s = i16::MIN;
        }
        let mut history = History::default();
        let mut decoder = History::default();
        let bytes = encode_adpcm4(&samples, &mut history);
        let decoded = decode_adpcm4(&bytes, &mut decoder);
        assert_eq!(history, decoder);
        assert!(decoded[0] > 16000);
        assert!(decoded[15] < -16000);
    }
}
