//! Frame orchestrator: VAD gate, inference, output normalization and safety.

use crate::audio::vad::{self, VadConfig, VoiceActivityDetector};
use crate::config::ProcessorConfig;
use crate::defaults;
use crate::pipeline::Frame;
use crate::pipeline::inference::InferenceEngine;
use crate::pipeline::post_processor::{PostProcessorChain, normalize_frame, normalize_output};
use crate::pipeline::stats::{Clock, LatencyTracker, ProcessingStats, SystemClock};

/// How a frame was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Inference ran and its output was used.
    Enhanced,
    /// Inference ran but returned nothing usable; the input frame was
    /// post-processed instead.
    Fallback,
    /// VAD classified the frame as silence; returned unmodified.
    Passthrough,
}

/// Output of [`FrameProcessor::process_frame`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedFrame {
    pub samples: Frame,
    pub outcome: FrameOutcome,
}

/// Sequences VAD, inference and post-processing for one audio session.
///
/// Owns the model's recurrent state; frames must arrive in order.
pub struct FrameProcessor<C: Clock = SystemClock> {
    config: ProcessorConfig,
    vad: VoiceActivityDetector,
    states: Box<[f32]>,
    latency: LatencyTracker,
    post: PostProcessorChain,
    clock: C,
}

impl FrameProcessor<SystemClock> {
    /// Creates a processor using the system clock.
    pub fn new(config: ProcessorConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    /// Creates a processor with default hang time.
    pub fn with_thresholds(vad_threshold_db: f32, atten_lim_db: f32) -> Self {
        Self::new(ProcessorConfig {
            vad_threshold_db,
            atten_lim_db,
            ..ProcessorConfig::default()
        })
    }
}

impl<C: Clock> FrameProcessor<C> {
    /// Creates a processor with an injectable clock.
    pub fn with_clock(config: ProcessorConfig, clock: C) -> Self {
        let vad = VoiceActivityDetector::new(VadConfig {
            threshold_db: config.vad_threshold_db,
            hang_time_ms: config.hang_time_ms,
            sample_rate: defaults::SAMPLE_RATE,
            frame_size: defaults::FRAME_SIZE,
        });
        log::info!(
            "Frame processor initialized: VAD threshold={:.1} dB, atten limit={:.1} dB",
            config.vad_threshold_db,
            config.atten_lim_db
        );

        Self {
            config,
            vad,
            states: vec![0.0; defaults::MODEL_STATE_SIZE].into_boxed_slice(),
            latency: LatencyTracker::new(),
            post: PostProcessorChain::standard(),
            clock,
        }
    }

    /// Processes one frame.
    ///
    /// Input is zero-padded or truncated to 480 samples. Silent frames are
    /// returned unmodified; speech frames go through `engine` and the safety
    /// chain.
    pub fn process_frame<E>(&mut self, input: &[f32], engine: &mut E) -> ProcessedFrame
    where
        E: InferenceEngine + ?Sized,
    {
        let frame = normalize_frame(input);

        if !self.vad.is_speech(&frame) {
            return ProcessedFrame {
                samples: frame,
                outcome: FrameOutcome::Passthrough,
            };
        }

        let start = self.clock.now();
        let result = engine.infer(&frame, &mut self.states, self.config.atten_lim_db);
        self.latency
            .record(self.clock.now().saturating_duration_since(start));

        let enhanced = match result {
            Ok(output) => {
                if !output.is_empty() && output.len() != defaults::FRAME_SIZE {
                    log::warn!(
                        "{} returned {} samples, expected {}",
                        engine.name(),
                        output.len(),
                        defaults::FRAME_SIZE
                    );
                }
                normalize_output(&output)
            }
            Err(e) => {
                log::warn!("{} failed: {}", engine.name(), e);
                None
            }
        };

        let (mut samples, outcome) = match enhanced {
            Some(samples) => (samples, FrameOutcome::Enhanced),
            None => (frame, FrameOutcome::Fallback),
        };
        self.post.process(&mut samples);

        ProcessedFrame { samples, outcome }
    }

    /// Applies the safety chain (limiter, clip, DC removal) in place.
    pub fn post_process(&mut self, samples: &mut [f32]) {
        self.post.process(samples);
    }

    /// Stateless energy gate against the configured threshold.
    ///
    /// Unlike [`process_frame`](Self::process_frame) this does not touch the
    /// hang timer or VAD counters.
    pub fn check_energy(&self, frame: &[f32]) -> bool {
        vad::energy_db(frame) > self.config.vad_threshold_db
    }

    /// Zeroes model state, VAD counters and latency statistics.
    pub fn reset(&mut self) {
        self.states.fill(0.0);
        self.vad.reset();
        self.latency.reset();
        log::info!("Frame processor state reset");
    }

    pub fn stats(&self) -> ProcessingStats {
        ProcessingStats::from_parts(
            &self.latency,
            self.vad.stats(),
            defaults::FRAME_SIZE,
            defaults::SAMPLE_RATE,
        )
    }

    /// Replaces the model state when `new_states` has the expected length.
    ///
    /// Returns false (leaving state untouched) on a length mismatch.
    pub fn update_states(&mut self, new_states: &[f32]) -> bool {
        if new_states.len() != self.states.len() {
            log::warn!(
                "Ignoring state update of {} elements, expected {}",
                new_states.len(),
                self.states.len()
            );
            return false;
        }
        self.states.copy_from_slice(new_states);
        true
    }

    pub fn states(&self) -> &[f32] {
        &self.states
    }

    pub fn frame_size(&self) -> usize {
        defaults::FRAME_SIZE
    }

    pub fn sample_rate(&self) -> u32 {
        defaults::SAMPLE_RATE
    }

    pub fn vad_threshold_db(&self) -> f32 {
        self.config.vad_threshold_db
    }

    pub fn atten_lim_db(&self) -> f32 {
        self.config.atten_lim_db
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }
}

impl<C: Clock> Drop for FrameProcessor<C> {
    fn drop(&mut self) {
        log::info!(
            "Frame processor dropped. Processed {} frames, avg time: {:.2} ms",
            self.latency.count(),
            self.latency.average_ms()
        );
    }
}
