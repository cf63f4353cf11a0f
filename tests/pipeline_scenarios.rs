//! End-to-end scenarios through the session surface.

use poise::audio::wav;
use poise::config::ResamplingConfig;
use poise::pipeline::inference::MockEngine;
use poise::session::{SessionOutput, SessionStore};
use poise::{FrameOutcome, FrameProcessor, PassthroughEngine, ProcessorConfig, Resampled};
use std::f32::consts::PI;

/// Zero-mean frame at -20 dBFS (RMS 0.1).
fn minus_20_db_frame() -> Vec<f32> {
    (0..480).map(|i| if i % 2 == 0 { 0.1 } else { -0.1 }).collect()
}

fn ready(result: Option<Resampled<SessionOutput>>) -> SessionOutput {
    match result {
        Some(Resampled::Ready(out)) => out,
        other => panic!("expected ready output, got {:?}", other),
    }
}

#[test]
fn silent_frame_then_speech_frame() {
    let mut store = SessionStore::new();
    let id = store.create(-40.0, -60.0);
    let mut engine = PassthroughEngine;

    let silent = ready(store.process(id, &[0.0; 480], &mut engine));
    assert_eq!(silent.outcome, FrameOutcome::Passthrough);
    assert_eq!(silent.samples, vec![0.0; 480]);
    assert_eq!(store.stats(id).map(|s| s.vad_bypassed), Some(1));

    let input = minus_20_db_frame();
    let speech = ready(store.process(id, &input, &mut engine));
    assert_eq!(speech.outcome, FrameOutcome::Enhanced);
    for (out, inp) in speech.samples.iter().zip(&input) {
        assert!((out - inp).abs() < 1e-6);
    }
    assert_eq!(store.stats(id).map(|s| s.vad_active), Some(1));
}

#[test]
fn host_driven_split_path_matches_full_path() {
    // Host runs inference itself between pre-inference and post-process.
    let mut store = SessionStore::new();
    let split = store.create(-40.0, -60.0);
    let full = store.create(-40.0, -60.0);
    let input = minus_20_db_frame();

    let frame = match store.process_pre_inference(split, &input) {
        Some(Resampled::Ready(frame)) => frame,
        other => panic!("unexpected {:?}", other.map(|r| r.is_pending())),
    };
    assert!(store.check_vad(split, &frame));
    let enhanced: Vec<f32> = frame.iter().map(|s| s * 0.5).collect();
    let split_out = match store.post_process(split, &enhanced) {
        Some(Resampled::Ready(samples)) => samples,
        _ => panic!("post-process should be ready without resampler"),
    };

    let mut engine = MockEngine::new().with_gain(0.5);
    let full_out = ready(store.process(full, &input, &mut engine));

    assert_eq!(split_out, full_out.samples);
}

#[test]
fn unknown_session_reports_absence() {
    let mut store = SessionStore::new();
    let id = store.create(-40.0, -60.0);
    assert!(store.destroy(id));

    assert!(store.process(id, &[0.1; 480], &mut PassthroughEngine).is_none());
    assert!(store.stats(id).is_none());
    assert!(store.check_vad(id, &[0.0; 480]));
}

#[test]
fn empty_engine_output_falls_back_to_safe_input() {
    let mut processor = FrameProcessor::new(ProcessorConfig::default());
    let mut engine = MockEngine::new().with_response(Vec::new());

    let loud: Vec<f32> = (0..480).map(|i| if i % 2 == 0 { 1.5 } else { -1.5 }).collect();
    let out = processor.process_frame(&loud, &mut engine);

    assert_eq!(out.outcome, FrameOutcome::Fallback);
    assert!(out.samples.iter().all(|s| s.abs() <= 0.98 + 1e-6));
}

#[test]
fn outputs_stay_bounded_and_zero_mean_for_hot_engine() {
    let mut processor = FrameProcessor::new(ProcessorConfig::default());
    let mut engine = MockEngine::new().with_gain(40.0);

    for k in 0..20 {
        let frame: Vec<f32> = (0..480)
            .map(|i| 0.05 + 0.2 * (2.0 * PI * 440.0 * (k * 480 + i) as f32 / 48000.0).sin())
            .collect();
        let out = processor.process_frame(&frame, &mut engine);
        assert_eq!(out.outcome, FrameOutcome::Enhanced);

        let mean = out.samples.iter().sum::<f32>() / 480.0;
        assert!(mean.abs() < 1e-5, "frame {} mean {}", k, mean);
        assert!(out.samples.iter().all(|s| s.abs() <= 1.0 + 1e-6));
    }
    assert_eq!(processor.stats().frame_count, 20);
}

#[test]
fn resampled_session_delivers_output_rate_chunks() {
    let mut store = SessionStore::new();
    let id = store.create(-40.0, -60.0);
    store.configure_input_resampler(id, 44100, 48000).unwrap();
    store.configure_output_resampler(id, 48000, 44100).unwrap();

    let mut produced = 0;
    let mut pending = 0;
    for k in 0..100 {
        let chunk: Vec<f32> = (0..441)
            .map(|i| 0.3 * (2.0 * PI * 300.0 * (k * 441 + i) as f32 / 44100.0).sin())
            .collect();
        match store.process(id, &chunk, &mut PassthroughEngine) {
            Some(Resampled::Ready(out)) => {
                assert_eq!(out.samples.len(), 441);
                produced += 1;
            }
            Some(Resampled::Pending) => pending += 1,
            None => panic!("session vanished"),
        }
    }

    assert!(produced >= 95, "produced {} pending {}", produced, pending);
}

#[test]
fn wav_file_round_trip_through_offline_driver() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("in.wav");
    let output_path = dir.path().join("out.wav");

    let samples: Vec<f32> = (0..16000)
        .map(|i| 0.25 * (2.0 * PI * 200.0 * i as f32 / 16000.0).sin())
        .collect();
    wav::write_mono(&input_path, &samples, 16000).unwrap();

    let audio = wav::read_mono(&input_path).unwrap();
    let result = poise::offline::enhance(
        &audio.samples,
        audio.sample_rate,
        ProcessorConfig::default(),
        &mut PassthroughEngine,
    )
    .unwrap();
    wav::write_mono(&output_path, &result.samples, audio.sample_rate).unwrap();

    let written = wav::read_mono(&output_path).unwrap();
    assert_eq!(written.sample_rate, 16000);
    assert_eq!(written.samples.len(), samples.len());
    assert!(result.stats.frame_count > 90);
}

#[test]
fn configured_output_rate_sets_written_wav_rate() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("out.wav");
    let samples: Vec<f32> = (0..44100)
        .map(|i| 0.25 * (2.0 * PI * 300.0 * i as f32 / 44100.0).sin())
        .collect();

    let resampling = ResamplingConfig {
        input_rate: Some(44100),
        output_rate: Some(22050),
    };
    let (input_rate, output_rate) = resampling.rates_for(44100).unwrap();
    let result = poise::offline::enhance_to(
        &samples,
        input_rate,
        output_rate,
        ProcessorConfig::default(),
        &mut PassthroughEngine,
    )
    .unwrap();
    wav::write_mono(&output_path, &result.samples, result.sample_rate).unwrap();

    let written = wav::read_mono(&output_path).unwrap();
    assert_eq!(written.sample_rate, 22050);
    assert_eq!(written.samples.len(), 22050);
    assert!(written.samples[22050 - 100..].iter().any(|&s| s.abs() > 0.1));

    assert!(resampling.rates_for(48000).is_err());
}
