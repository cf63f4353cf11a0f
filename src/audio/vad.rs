//! Voice Activity Detection (VAD) module.
//!
//! Classifies frames as speech or silence using RMS thresholding, with a
//! hang-time counter that holds the speech decision for a while after the
//! last active frame so trailing syllables are not chopped.

use crate::defaults;
use serde::Serialize;

/// Configuration for Voice Activity Detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VadConfig {
    /// Speech threshold in dBFS.
    pub threshold_db: f32,
    /// How long speech is held after the last active frame (milliseconds).
    pub hang_time_ms: f32,
    /// Sample rate of the analysed frames in Hz.
    pub sample_rate: u32,
    /// Number of samples per analysed frame.
    pub frame_size: usize,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            threshold_db: defaults::VAD_THRESHOLD_DB,
            hang_time_ms: defaults::HANG_TIME_MS,
            sample_rate: defaults::SAMPLE_RATE,
            frame_size: defaults::FRAME_SIZE,
        }
    }
}

impl VadConfig {
    /// Number of frames covered by the hang time.
    pub fn hang_frames(&self) -> u32 {
        if self.frame_size == 0 || !self.hang_time_ms.is_finite() || self.hang_time_ms <= 0.0 {
            return 0;
        }
        (self.hang_time_ms * self.sample_rate as f32 / 1000.0 / self.frame_size as f32) as u32
    }
}

/// Cumulative detector counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct VadStats {
    /// Frames seen since the last reset.
    pub total: u64,
    /// Frames classified as speech (including hang-time holds).
    pub active: u64,
    /// Frames classified as silence and skipped downstream.
    pub bypassed: u64,
    /// `bypassed / total`, or 0 when no frames were seen.
    pub bypass_ratio: f32,
}

/// Energy-based voice activity detector with hang-time smoothing.
#[derive(Debug, Clone)]
pub struct VoiceActivityDetector {
    config: VadConfig,
    threshold_linear: f32,
    hang_frames: u32,
    frames_since_active: u32,
    total_frames: u64,
    active_frames: u64,
    bypassed_frames: u64,
}

impl VoiceActivityDetector {
    /// Creates a detector with the given configuration.
    pub fn new(config: VadConfig) -> Self {
        let hang_frames = config.hang_frames();
        Self {
            config,
            threshold_linear: db_to_linear(config.threshold_db),
            hang_frames,
            // Start outside the hang window so leading silence is bypassed.
            frames_since_active: hang_frames.saturating_add(1),
            total_frames: 0,
            active_frames: 0,
            bypassed_frames: 0,
        }
    }

    /// Creates a detector with default hang time and frame geometry.
    pub fn with_threshold_db(threshold_db: f32) -> Self {
        Self::new(VadConfig {
            threshold_db,
            ..VadConfig::default()
        })
    }

    /// Returns true if the frame should be treated as speech.
    pub fn is_speech(&mut self, frame: &[f32]) -> bool {
        self.total_frames += 1;

        if calculate_rms(frame) > self.threshold_linear {
            self.frames_since_active = 0;
            self.active_frames += 1;
            return true;
        }

        self.frames_since_active = self.frames_since_active.saturating_add(1);
        if self.frames_since_active < self.hang_frames {
            self.active_frames += 1;
            true
        } else {
            self.bypassed_frames += 1;
            false
        }
    }

    /// Snapshot of the cumulative counters.
    pub fn stats(&self) -> VadStats {
        let bypass_ratio = if self.total_frames > 0 {
            self.bypassed_frames as f32 / self.total_frames as f32
        } else {
            0.0
        };
        VadStats {
            total: self.total_frames,
            active: self.active_frames,
            bypassed: self.bypassed_frames,
            bypass_ratio,
        }
    }

    /// Zeroes the counters and disarms the hang timer.
    pub fn reset(&mut self) {
        self.frames_since_active = self.hang_frames.saturating_add(1);
        self.total_frames = 0;
        self.active_frames = 0;
        self.bypassed_frames = 0;
    }

    pub fn threshold_db(&self) -> f32 {
        self.config.threshold_db
    }

    pub fn threshold_linear(&self) -> f32 {
        self.threshold_linear
    }

    pub fn hang_frames(&self) -> u32 {
        self.hang_frames
    }

    pub fn config(&self) -> &VadConfig {
        &self.config
    }
}

/// Converts a level in dB to linear amplitude.
pub fn db_to_linear(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Calculates the Root Mean Square (RMS) of f32 audio samples.
///
/// Returns 0.0 for an empty slice.
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|&s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Frame energy in dBFS, floored at [`defaults::SILENCE_FLOOR_DB`].
pub fn energy_db(samples: &[f32]) -> f32 {
    let rms = calculate_rms(samples);
    if rms > defaults::SILENCE_RMS_EPSILON {
        20.0 * rms.log10()
    } else {
        defaults::SILENCE_FLOOR_DB
    }
}
