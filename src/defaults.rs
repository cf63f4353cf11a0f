//! Default configuration constants for poise.
//!
//! Shared by the processor, the session stores and the configuration layer
//! so every entry point agrees on frame geometry and thresholds.

/// Pipeline sample rate in Hz.
///
/// The denoising model operates on 48 kHz audio; any other device rate is
/// bridged by a pair of streaming resamplers.
pub const SAMPLE_RATE: u32 = 48000;

/// Time-domain frame length in samples (10 ms at 48 kHz).
pub const FRAME_SIZE: usize = 480;

/// Number of elements in the model's recurrent state buffer.
pub const MODEL_STATE_SIZE: usize = 45304;

/// Default VAD threshold in dBFS.
///
/// Frames whose RMS sits below -40 dB are treated as silence and bypass
/// inference entirely.
pub const VAD_THRESHOLD_DB: f32 = -40.0;

/// Default attenuation limit handed to the inference engine, in dB.
pub const ATTEN_LIM_DB: f32 = -60.0;

/// Default VAD hang time in milliseconds.
///
/// Keeps trailing voiced segments (word endings, soft consonants) from being
/// clipped when energy dips below the threshold.
pub const HANG_TIME_MS: f32 = 300.0;

/// Peak amplitude above which the soft limiter rescales a frame.
pub const SOFT_LIMIT: f32 = 0.98;

/// Energy reported for frames whose RMS is effectively zero.
pub const SILENCE_FLOOR_DB: f32 = -100.0;

/// RMS at or below which a frame is reported at [`SILENCE_FLOOR_DB`].
pub const SILENCE_RMS_EPSILON: f32 = 1e-10;

/// Frame duration in milliseconds for a frame of `frame_size` samples.
pub fn frame_duration_ms(frame_size: usize, sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }
    frame_size as f64 / sample_rate as f64 * 1000.0
}
