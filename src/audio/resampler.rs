//! Streaming linear-interpolation resampler.
//!
//! Input chunks of arbitrary size are appended to an accumulator; output is
//! produced in caller-sized blocks once enough input has arrived. A
//! fractional read position is carried between calls so that chunked
//! resampling matches a single pass over the whole stream.

use crate::error::{PoiseError, Result};

/// Outcome of a resampling step.
#[derive(Debug, Clone, PartialEq)]
pub enum Resampled<T> {
    /// A full block of output is available.
    Ready(T),
    /// Not enough input has been buffered yet; nothing was consumed.
    Pending,
}

impl<T> Resampled<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Resampled::Pending)
    }

    /// Returns the output if ready.
    pub fn ready(self) -> Option<T> {
        match self {
            Resampled::Ready(value) => Some(value),
            Resampled::Pending => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resampled<U> {
        match self {
            Resampled::Ready(value) => Resampled::Ready(f(value)),
            Resampled::Pending => Resampled::Pending,
        }
    }
}

/// Phase-continuous linear-interpolation resampler for one stream.
#[derive(Debug, Clone)]
pub struct StreamingResampler {
    input_rate: u32,
    output_rate: u32,
    /// Output samples per input sample.
    ratio: f64,
    /// Input samples per output sample.
    step: f64,
    /// Fractional read position into `accumulator`, in input samples, in [0, 1).
    phase: f64,
    accumulator: Vec<f32>,
}

impl StreamingResampler {
    /// Creates a resampler converting `input_rate` Hz to `output_rate` Hz.
    pub fn new(input_rate: u32, output_rate: u32) -> Result<Self> {
        if input_rate == 0 || output_rate == 0 {
            return Err(PoiseError::InvalidSampleRate {
                input_rate,
                output_rate,
            });
        }

        let ratio = output_rate as f64 / input_rate as f64;
        log::debug!(
            "Resampler created: {} Hz -> {} Hz (ratio: {:.4})",
            input_rate,
            output_rate,
            ratio
        );

        Ok(Self {
            input_rate,
            output_rate,
            ratio,
            step: input_rate as f64 / output_rate as f64,
            phase: 0.0,
            accumulator: Vec::new(),
        })
    }

    /// Feeds `input` and tries to produce exactly `output_len` samples.
    ///
    /// When input and output rates are equal the input is returned as-is and
    /// nothing is buffered. Otherwise returns [`Resampled::Pending`] until
    /// the accumulator holds enough samples, keeping all buffered input.
    pub fn process(&mut self, input: &[f32], output_len: usize) -> Resampled<Vec<f32>> {
        if self.is_passthrough() {
            return Resampled::Ready(input.to_vec());
        }

        self.accumulator.extend_from_slice(input);

        if output_len == 0 {
            return Resampled::Ready(Vec::new());
        }
        if self.available_output() < output_len {
            return Resampled::Pending;
        }

        let len = self.accumulator.len();
        let mut output = Vec::with_capacity(output_len);
        for i in 0..output_len {
            let src_pos = self.phase + i as f64 * self.step;
            let src_index = src_pos as usize;
            let frac = (src_pos - src_index as f64) as f32;

            let sample = if src_index + 1 < len {
                self.accumulator[src_index] * (1.0 - frac) + self.accumulator[src_index + 1] * frac
            } else if src_index < len {
                self.accumulator[src_index]
            } else {
                0.0
            };
            output.push(sample);
        }

        // Advance the read position and drop whole consumed samples; the
        // fractional part carries into the next call.
        let consumed = self.phase + output_len as f64 * self.step;
        let whole = (consumed.floor() as usize).min(len);
        self.phase = (consumed - whole as f64).clamp(0.0, 1.0 - f64::EPSILON);
        self.accumulator.drain(..whole);

        Resampled::Ready(output)
    }

    /// Number of output samples derivable from the current accumulator.
    ///
    /// Every interpolation pair, and the read position after the block,
    /// must lie inside the buffered input.
    pub fn available_output(&self) -> usize {
        let span = self.accumulator.len() as f64 - 1.0 - self.phase;
        if span <= 0.0 {
            return 0;
        }
        (span * self.ratio).floor() as usize
    }

    /// Output block size matching `input_len` samples at the input rate.
    ///
    /// Rounds down. Use [`output_total_for`](Self::output_total_for) when
    /// sizing a sequence of blocks.
    pub fn output_len_for(&self, input_len: usize) -> usize {
        self.output_total_for(input_len as u64) as usize
    }

    /// Output samples owed for `input_total` input samples since the start
    /// of the stream.
    ///
    /// The difference between consecutive totals gives block sizes whose sum
    /// never falls behind the input (220, 221, 220, 221, ... for 48 kHz ->
    /// 22.05 kHz in 480-sample blocks).
    pub fn output_total_for(&self, input_total: u64) -> u64 {
        input_total * self.output_rate as u64 / self.input_rate as u64
    }

    /// Clears buffered input and rewinds the phase.
    pub fn reset(&mut self) {
        self.accumulator.clear();
        self.phase = 0.0;
    }

    pub fn is_passthrough(&self) -> bool {
        self.input_rate == self.output_rate
    }

    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }

    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Number of input samples currently buffered.
    pub fn buffered(&self) -> usize {
        self.accumulator.len()
    }
}
