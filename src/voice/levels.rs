use std::time::Duration;

/// Sample rate of the PCM stream returned by the speech endpoint.
pub const SAMPLE_RATE: u32 = 24_000;

/// Samples per level frame (50 ms at 24 kHz).
pub const FRAME_SAMPLES: usize = 1_200;

const BYTES_PER_SAMPLE: usize = 2;

/// Bytes of 16-bit mono PCM covering one level frame.
pub const FRAME_BYTES: usize = FRAME_SAMPLES * BYTES_PER_SAMPLE;

/// Wall-clock length of one level frame.
#[must_use]
pub fn frame_duration() -> Duration {
    Duration::from_micros(FRAME_SAMPLES as u64 * 1_000_000 / u64::from(SAMPLE_RATE))
}

/// Root-mean-square amplitude of little-endian signed 16-bit samples,
/// normalised to `0.0..=1.0`. A trailing odd byte is ignored.
#[must_use]
pub fn rms(pcm: &[u8]) -> f32 {
    let samples = pcm.chunks_exact(BYTES_PER_SAMPLE);
    let count = samples.len();
    if count == 0 {
        return 0.0;
    }

    let sum: f64 = samples
        .map(|pair| {
            let sample = f64::from(i16::from_le_bytes([pair[0], pair[1]])) / f64::from(i16::MAX);
            sample * sample
        })
        .sum();

    #[allow(clippy::cast_precision_loss)]
    let mean = sum / count as f64;
    (mean.sqrt() as f32).min(1.0)
}

/// One amplitude per [`FRAME_BYTES`] chunk of audio; the last frame may be short.
#[must_use]
pub fn frame_levels(pcm: &[u8]) -> Vec<f32> {
    pcm.chunks(FRAME_BYTES).map(rms).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn test_silence_is_zero() {
        assert_eq!(rms(&pcm(&[0; 64])), 0.0);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn test_full_scale_is_one() {
        let level = rms(&pcm(&[i16::MAX, i16::MIN + 1, i16::MAX, i16::MIN + 1]));
        assert!((level - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_half_scale() {
        let half = i16::MAX / 2;
        let level = rms(&pcm(&[half, -half, half, -half]));
        assert!((level - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_odd_trailing_byte_ignored() {
        let mut bytes = pcm(&[0, 0]);
        bytes.push(0x7f);
        assert_eq!(rms(&bytes), 0.0);
    }

    #[test]
    fn test_frame_levels_splits_by_frame() {
        let mut samples = vec![0i16; FRAME_SAMPLES];
        samples.extend(std::iter::repeat_n(i16::MAX, FRAME_SAMPLES / 2));

        let levels = frame_levels(&pcm(&samples));
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0], 0.0);
        assert!(levels[1] > 0.99);
    }

    #[test]
    fn test_frame_duration() {
        assert_eq!(frame_duration(), Duration::from_millis(50));
    }
}
