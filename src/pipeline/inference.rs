//! The seam between the frame processor and the denoising model.
//!
//! Any `FnMut(&[f32], &mut [f32], f32) -> Vec<f32>` closure is an engine.
//! [`PassthroughEngine`] and [`MockEngine`] cover the CLI and tests.

use crate::error::{PoiseError, Result};

/// Trait for the denoising model invoked on speech frames.
///
/// This trait allows swapping implementations (ONNX session, remote model,
/// test doubles) without the processor knowing which one runs.
pub trait InferenceEngine {
    /// Enhance one frame.
    ///
    /// # Arguments
    /// * `frame` - 480 samples at 48 kHz
    /// * `state` - recurrent model state; may be rewritten in place
    /// * `atten_lim_db` - attenuation limit in dB
    ///
    /// # Returns
    /// Up to 480 enhanced samples. An empty result (or an error) makes the
    /// processor fall back to the unenhanced frame.
    fn infer(&mut self, frame: &[f32], state: &mut [f32], atten_lim_db: f32) -> Result<Vec<f32>>;

    /// Name for logging/diagnostics.
    fn name(&self) -> &str {
        "inference"
    }
}

/// Any `FnMut(frame, state, atten_lim_db) -> samples` closure is an engine.
impl<F> InferenceEngine for F
where
    F: FnMut(&[f32], &mut [f32], f32) -> Vec<f32>,
{
    fn infer(&mut self, frame: &[f32], state: &mut [f32], atten_lim_db: f32) -> Result<Vec<f32>> {
        Ok(self(frame, state, atten_lim_db))
    }

    fn name(&self) -> &str {
        "closure"
    }
}

/// Engine that returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughEngine;

impl InferenceEngine for PassthroughEngine {
    fn infer(&mut self, frame: &[f32], _state: &mut [f32], _atten_lim_db: f32) -> Result<Vec<f32>> {
        Ok(frame.to_vec())
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}

/// Scripted engine for tests and benchmarks.
#[derive(Debug, Clone)]
pub struct MockEngine {
    response: Option<Vec<f32>>,
    gain: f32,
    should_fail: bool,
    state_marker: Option<f32>,
    calls: usize,
}

impl MockEngine {
    /// Creates a mock that echoes its input.
    pub fn new() -> Self {
        Self {
            response: None,
            gain: 1.0,
            should_fail: false,
            state_marker: None,
            calls: 0,
        }
    }

    /// Always return `response` regardless of input.
    pub fn with_response(mut self, response: Vec<f32>) -> Self {
        self.response = Some(response);
        self
    }

    /// Scale echoed input by `gain`.
    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    /// Fail every call.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Write `marker` into `state[0]` on each call.
    pub fn with_state_marker(mut self, marker: f32) -> Self {
        self.state_marker = Some(marker);
        self
    }

    /// Number of times `infer` has been called.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceEngine for MockEngine {
    fn infer(&mut self, frame: &[f32], state: &mut [f32], _atten_lim_db: f32) -> Result<Vec<f32>> {
        self.calls += 1;
        if self.should_fail {
            return Err(PoiseError::Inference {
                message: "mock inference failure".to_string(),
            });
        }
        if let (Some(marker), Some(first)) = (self.state_marker, state.first_mut()) {
            *first = marker;
        }
        Ok(match &self.response {
            Some(response) => response.clone(),
            None => frame.iter().map(|&s| s * self.gain).collect(),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
