//! Streaming STFT / ISTFT with overlap-add reconstruction.
//!
//! 512-point FFT, 256-sample hop and a square-root Hann window on both the
//! analysis and synthesis side. Because the squared window is a periodic
//! Hann, the 50% overlap-add sums to unity and the round trip is exact up
//! to a one-hop delay.
//!
//! All state lives in fixed-size arrays allocated once at construction;
//! [`ShortTimeFourierEngine::analyze_into`] and
//! [`ShortTimeFourierEngine::synthesize_into`] perform no heap allocation.

use crate::spectral::fft::{Direction, fft_in_place};
use num_complex::Complex32;
use std::f32::consts::PI;

/// FFT length in samples.
pub const FFT_SIZE: usize = 512;
/// Hop between successive frames in samples.
pub const HOP_SIZE: usize = 256;
/// Number of non-redundant frequency bins: FFT_SIZE / 2 + 1.
pub const NUM_BINS: usize = FFT_SIZE / 2 + 1;
/// Length of a packed spectrum: real parts followed by imaginary parts.
pub const PACKED_LEN: usize = 2 * NUM_BINS;

/// Half spectrum of one analysis frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    pub re: [f32; NUM_BINS],
    pub im: [f32; NUM_BINS],
}

impl Spectrum {
    pub fn zeroed() -> Self {
        Self {
            re: [0.0; NUM_BINS],
            im: [0.0; NUM_BINS],
        }
    }

    /// Packs as `[re_0 .. re_256, im_0 .. im_256]`.
    pub fn to_packed(&self) -> [f32; PACKED_LEN] {
        let mut packed = [0.0; PACKED_LEN];
        packed[..NUM_BINS].copy_from_slice(&self.re);
        packed[NUM_BINS..].copy_from_slice(&self.im);
        packed
    }

    /// Unpacks a `[re.., im..]` buffer. Missing values read as zero and
    /// anything past [`PACKED_LEN`] is ignored.
    pub fn from_packed(packed: &[f32]) -> Self {
        let mut spectrum = Self::zeroed();
        let re_len = packed.len().min(NUM_BINS);
        spectrum.re[..re_len].copy_from_slice(&packed[..re_len]);
        if packed.len() > NUM_BINS {
            let im = &packed[NUM_BINS..packed.len().min(PACKED_LEN)];
            spectrum.im[..im.len()].copy_from_slice(im);
        }
        spectrum
    }

    /// Magnitude of bin `k`.
    pub fn magnitude(&self, k: usize) -> f32 {
        self.re[k].hypot(self.im[k])
    }
}

/// Windowed forward/inverse transform with persistent overlap state.
pub struct ShortTimeFourierEngine {
    window: [f32; FFT_SIZE],
    /// Sliding analysis window holding the last FFT_SIZE input samples.
    analysis: [f32; FFT_SIZE],
    /// Overlap-add accumulator of reconstructed samples not yet emitted.
    overlap: [f32; FFT_SIZE],
    fft_buf: [Complex32; FFT_SIZE],
}

impl ShortTimeFourierEngine {
    pub fn new() -> Self {
        log::debug!("STFT engine initialized: FFT={}, hop={}", FFT_SIZE, HOP_SIZE);
        Self {
            window: sqrt_hann_window(),
            analysis: [0.0; FFT_SIZE],
            overlap: [0.0; FFT_SIZE],
            fft_buf: [Complex32::new(0.0, 0.0); FFT_SIZE],
        }
    }

    /// Pushes one hop of audio and returns the spectrum of the current window.
    pub fn compute_stft(&mut self, chunk: &[f32; HOP_SIZE]) -> Spectrum {
        let mut spectrum = Spectrum::zeroed();
        self.analyze_into(chunk, &mut spectrum);
        spectrum
    }

    /// Allocation-free form of [`compute_stft`](Self::compute_stft).
    pub fn analyze_into(&mut self, chunk: &[f32; HOP_SIZE], out: &mut Spectrum) {
        self.analysis.copy_within(HOP_SIZE.., 0);
        self.analysis[FFT_SIZE - HOP_SIZE..].copy_from_slice(chunk);

        for ((slot, &sample), &w) in self
            .fft_buf
            .iter_mut()
            .zip(&self.analysis)
            .zip(&self.window)
        {
            *slot = Complex32::new(sample * w, 0.0);
        }

        fft_in_place(&mut self.fft_buf, Direction::Forward);

        for (k, bin) in self.fft_buf.iter().take(NUM_BINS).enumerate() {
            out.re[k] = bin.re;
            out.im[k] = bin.im;
        }
    }

    /// Inverse-transforms one spectrum, overlap-adds it and returns the next
    /// hop of reconstructed audio.
    pub fn reconstruct_audio(&mut self, spectrum: &Spectrum) -> [f32; HOP_SIZE] {
        let mut out = [0.0; HOP_SIZE];
        self.synthesize_into(spectrum, &mut out);
        out
    }

    /// Allocation-free form of [`reconstruct_audio`](Self::reconstruct_audio).
    pub fn synthesize_into(&mut self, spectrum: &Spectrum, out: &mut [f32; HOP_SIZE]) {
        for k in 0..NUM_BINS {
            self.fft_buf[k] = Complex32::new(spectrum.re[k], spectrum.im[k]);
        }
        // Negative frequencies mirror the positive ones for a real signal.
        for k in 1..NUM_BINS - 1 {
            self.fft_buf[FFT_SIZE - k] = self.fft_buf[k].conj();
        }

        fft_in_place(&mut self.fft_buf, Direction::Inverse);

        for ((acc, bin), &w) in self
            .overlap
            .iter_mut()
            .zip(&self.fft_buf)
            .zip(&self.window)
        {
            *acc += bin.re * w;
        }

        out.copy_from_slice(&self.overlap[..HOP_SIZE]);

        self.overlap.copy_within(HOP_SIZE.., 0);
        self.overlap[FFT_SIZE - HOP_SIZE..].fill(0.0);
    }

    /// Zeroes the analysis window and the overlap accumulator.
    pub fn reset(&mut self) {
        self.analysis.fill(0.0);
        self.overlap.fill(0.0);
    }

    pub fn window(&self) -> &[f32; FFT_SIZE] {
        &self.window
    }
}

impl Default for ShortTimeFourierEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Periodic square-root Hann window of length [`FFT_SIZE`].
fn sqrt_hann_window() -> [f32; FFT_SIZE] {
    let mut window = [0.0; FFT_SIZE];
    for (i, w) in window.iter_mut().enumerate() {
        let hann = 0.5 * (1.0 - (2.0 * PI * i as f32 / FFT_SIZE as f32).cos());
        *w = hann.sqrt();
    }
    window
}
