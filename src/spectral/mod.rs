//! Frequency-domain transform path used by spectral-mask models.
//!
//! Independent of the time-domain frame processor; shares only the
//! requirement that chunks arrive in order with no gaps.

pub mod fft;
pub mod stft;

pub use stft::{FFT_SIZE, HOP_SIZE, NUM_BINS, PACKED_LEN, ShortTimeFourierEngine, Spectrum};
