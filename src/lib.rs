//! poise - real-time streaming audio enhancement
//!
//! VAD gating, streaming resampling, STFT/ISTFT and a frame orchestrator
//! around a pluggable denoising model.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod offline;
pub mod pipeline;
pub mod session;
pub mod spectral;

// Core components
pub use audio::resampler::{Resampled, StreamingResampler};
pub use audio::vad::{VadConfig, VoiceActivityDetector};
pub use pipeline::inference::{InferenceEngine, PassthroughEngine};
pub use pipeline::processor::{FrameOutcome, FrameProcessor, ProcessedFrame};
pub use pipeline::stats::ProcessingStats;
pub use spectral::stft::{ShortTimeFourierEngine, Spectrum};

// Sessions
pub use session::{SessionId, SessionStore, SpectralStore};

// Error handling
pub use error::{PoiseError, Result};

// Config
pub use config::{Config, ProcessorConfig};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
