//! Whole-buffer drivers for the streaming components.
//!
//! Feeds recorded audio through a session in device-sized chunks, the same
//! way a live audio callback would, and collects the output.

use crate::audio::resampler::Resampled;
use crate::config::ProcessorConfig;
use crate::defaults;
use crate::error::Result;
use crate::pipeline::inference::InferenceEngine;
use crate::pipeline::stats::ProcessingStats;
use crate::session::ProcessingSession;
use crate::spectral::stft::{HOP_SIZE, ShortTimeFourierEngine};

/// Result of [`enhance`].
#[derive(Debug, Clone)]
pub struct Enhanced {
    /// Output at the requested output rate, covering the whole input.
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub stats: ProcessingStats,
}

/// Upper bound on trailing silent chunks fed to drain the resamplers.
const MAX_FLUSH_CHUNKS: usize = 16;

/// Number of device-rate samples making up one 10 ms frame.
pub fn device_chunk_len(sample_rate: u32) -> usize {
    let len = defaults::FRAME_SIZE as u64 * sample_rate as u64 / defaults::SAMPLE_RATE as u64;
    (len as usize).max(1)
}

/// Number of samples at `output_rate` covering `input_len` samples at `input_rate`.
pub fn output_len(input_len: usize, input_rate: u32, output_rate: u32) -> usize {
    (input_len as u64 * output_rate as u64 / input_rate.max(1) as u64) as usize
}

/// Runs `samples` recorded at `sample_rate` through one processing session,
/// producing output at the same rate.
pub fn enhance<E>(
    samples: &[f32],
    sample_rate: u32,
    config: ProcessorConfig,
    engine: &mut E,
) -> Result<Enhanced>
where
    E: InferenceEngine + ?Sized,
{
    enhance_to(samples, sample_rate, sample_rate, config, engine)
}

/// Runs `samples` recorded at `input_rate` through one processing session
/// and delivers the result at `output_rate`.
///
/// Non-48 kHz rates are resampled on the way in and out. Trailing silence
/// drains the resamplers until the whole input has come out the other side.
pub fn enhance_to<E>(
    samples: &[f32],
    input_rate: u32,
    output_rate: u32,
    config: ProcessorConfig,
    engine: &mut E,
) -> Result<Enhanced>
where
    E: InferenceEngine + ?Sized,
{
    let mut session = ProcessingSession::new(config);
    session.set_input_resampler(input_rate, defaults::SAMPLE_RATE)?;
    session.set_output_resampler(defaults::SAMPLE_RATE, output_rate)?;

    let chunk_len = device_chunk_len(input_rate);
    let target = output_len(samples.len(), input_rate, output_rate);
    let mut output = Vec::with_capacity(target + device_chunk_len(output_rate));

    for chunk in samples.chunks(chunk_len) {
        if let Resampled::Ready(out) = session.process(chunk, engine) {
            output.extend_from_slice(&out.samples);
        }
    }

    let flush = vec![0.0; chunk_len];
    let mut flushed = 0;
    while output.len() < target && flushed < MAX_FLUSH_CHUNKS {
        if let Resampled::Ready(out) = session.process(&flush, engine) {
            output.extend_from_slice(&out.samples);
        }
        flushed += 1;
    }
    if output.len() < target {
        log::warn!(
            "Resamplers still short by {} samples after {} flush chunks",
            target - output.len(),
            flushed
        );
    }
    output.resize(target, 0.0);

    log::debug!(
        "Enhanced {} samples at {} Hz -> {} Hz in {}-sample chunks ({} flush)",
        samples.len(),
        input_rate,
        output_rate,
        chunk_len,
        flushed
    );

    Ok(Enhanced {
        samples: output,
        sample_rate: output_rate,
        stats: session.processor().stats(),
    })
}

/// STFT then ISTFT over the whole buffer, compensating the one-hop delay.
pub fn spectral_round_trip(samples: &[f32]) -> Vec<f32> {
    let mut engine = ShortTimeFourierEngine::new();
    let mut output = Vec::with_capacity(samples.len() + 2 * HOP_SIZE);
    let mut hop = [0.0; HOP_SIZE];

    let hops = samples.len().div_ceil(HOP_SIZE) + 1;
    for k in 0..hops {
        hop.fill(0.0);
        let start = (k * HOP_SIZE).min(samples.len());
        let end = (start + HOP_SIZE).min(samples.len());
        hop[..end - start].copy_from_slice(&samples[start..end]);

        let spectrum = engine.compute_stft(&hop);
        output.extend_from_slice(&engine.reconstruct_audio(&spectrum));
    }

    output.drain(..HOP_SIZE.min(output.len()));
    output.truncate(samples.len());
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::inference::{MockEngine, PassthroughEngine};
    use std::f32::consts::PI;

    fn tone(freq: f32, sample_rate: u32, secs: f32, amplitude: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * secs) as usize;
        (0..n)
            .map(|i| amplitude * (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_device_chunk_len() {
        assert_eq!(device_chunk_len(48000), 480);
        assert_eq!(device_chunk_len(44100), 441);
        assert_eq!(device_chunk_len(16000), 160);
        assert_eq!(device_chunk_len(1), 1);
    }

    #[test]
    fn test_enhance_native_rate_passthrough_keeps_length_and_shape() {
        let input = tone(500.0, 48000, 0.5, 0.3);
        let result = enhance(&input, 48000, ProcessorConfig::default(), &mut PassthroughEngine)
            .unwrap();

        assert_eq!(result.samples.len(), input.len());
        // 500 Hz completes five whole cycles per frame, so DC removal is a no-op.
        for (a, b) in result.samples.iter().zip(&input) {
            assert!((a - b).abs() < 1e-3);
        }
        assert_eq!(result.stats.vad_active, 50);
    }

    #[test]
    fn test_enhance_silence_bypasses_engine() {
        let input = vec![0.0; 4800];
        let mut engine = MockEngine::new();
        let result = enhance(&input, 48000, ProcessorConfig::default(), &mut engine).unwrap();

        assert_eq!(engine.calls(), 0);
        assert_eq!(result.stats.frame_count, 0);
        assert!(result.samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_enhance_resampled_rate_keeps_length() {
        let input = tone(300.0, 16000, 0.5, 0.3);
        let result = enhance(&input, 16000, ProcessorConfig::default(), &mut PassthroughEngine)
            .unwrap();
        assert_eq!(result.samples.len(), input.len());
        assert!(result.stats.frame_count > 40);
    }

    #[test]
    fn test_enhance_rejects_zero_rate() {
        assert!(enhance(&[0.0; 10], 0, ProcessorConfig::default(), &mut PassthroughEngine).is_err());
        assert!(
            enhance_to(&[0.0; 10], 48000, 0, ProcessorConfig::default(), &mut PassthroughEngine)
                .is_err()
        );
    }

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    #[test]
    fn test_enhance_fractional_rate_keeps_tail() {
        // 22.05 kHz frames are 220.5 samples long.
        let input = tone(300.0, 22050, 20.0, 0.3);
        let result = enhance(&input, 22050, ProcessorConfig::default(), &mut PassthroughEngine)
            .unwrap();

        assert_eq!(result.samples.len(), input.len());
        let trailing_zeros = result.samples.iter().rev().take_while(|&&s| s == 0.0).count();
        assert_eq!(trailing_zeros, 0);

        let tail = &result.samples[result.samples.len() - 2205..];
        assert!(rms(tail) > 0.15, "tail rms {}", rms(tail));
    }

    #[test]
    fn test_enhance_to_other_output_rate() {
        let input = tone(500.0, 48000, 1.0, 0.3);
        let result = enhance_to(
            &input,
            48000,
            16000,
            ProcessorConfig::default(),
            &mut PassthroughEngine,
        )
        .unwrap();

        assert_eq!(result.sample_rate, 16000);
        assert_eq!(result.samples.len(), 16000);
        let tail = &result.samples[16000 - 1600..];
        assert!(rms(tail) > 0.15, "tail rms {}", rms(tail));
    }

    #[test]
    fn test_output_len() {
        assert_eq!(output_len(48000, 48000, 22050), 22050);
        assert_eq!(output_len(441, 44100, 48000), 480);
        assert_eq!(output_len(0, 16000, 48000), 0);
    }

    #[test]
    fn test_spectral_round_trip_reconstructs_input() {
        let input = tone(1000.0, 48000, 0.1, 0.4);
        let output = spectral_round_trip(&input);

        assert_eq!(output.len(), input.len());
        for (a, b) in output.iter().zip(&input) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn test_spectral_round_trip_short_and_empty_input() {
        assert!(spectral_round_trip(&[]).is_empty());
        let output = spectral_round_trip(&[0.25; 10]);
        assert_eq!(output.len(), 10);
        for &s in &output {
            assert!((s - 0.25).abs() < 1e-3);
        }
    }
}
