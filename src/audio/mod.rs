//! Time-domain audio building blocks: voice activity detection, streaming
//! resampling and WAV I/O.

pub mod resampler;
pub mod vad;
pub mod wav;

pub use resampler::{Resampled, StreamingResampler};
pub use vad::{VadConfig, VadStats, VoiceActivityDetector};
