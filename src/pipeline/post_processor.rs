//! Output safety stages applied to every enhanced frame.
//!
//! The standard chain runs, in order: soft limiter, hard clip to [-1, 1],
//! DC-offset removal. Frame-size normalization helpers live here too since
//! they bracket the inference call.

use crate::defaults;
use crate::pipeline::Frame;

/// Trait for in-place frame post-processing.
pub trait PostProcessor: Send + 'static {
    /// Transforms the frame in place.
    fn process(&mut self, frame: &mut [f32]);

    /// Name for logging/diagnostics.
    fn name(&self) -> &'static str;
}

/// Rescales the whole frame when its peak exceeds `threshold`, keeping the
/// waveform shape.
#[derive(Debug, Clone, Copy)]
pub struct SoftLimiter {
    threshold: f32,
}

impl SoftLimiter {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl Default for SoftLimiter {
    fn default() -> Self {
        Self::new(defaults::SOFT_LIMIT)
    }
}

impl PostProcessor for SoftLimiter {
    fn process(&mut self, frame: &mut [f32]) {
        let peak = peak_amplitude(frame);
        if peak > self.threshold && peak > 0.0 {
            let scale = self.threshold / peak;
            for sample in frame.iter_mut() {
                *sample *= scale;
            }
        }
    }

    fn name(&self) -> &'static str {
        "soft-limiter"
    }
}

/// Clamps every sample to [-1, 1].
#[derive(Debug, Clone, Copy, Default)]
pub struct HardClip;

impl PostProcessor for HardClip {
    fn process(&mut self, frame: &mut [f32]) {
        for sample in frame.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }
    }

    fn name(&self) -> &'static str {
        "hard-clip"
    }
}

/// Subtracts the frame mean.
#[derive(Debug, Clone, Copy, Default)]
pub struct DcRemover;

impl PostProcessor for DcRemover {
    fn process(&mut self, frame: &mut [f32]) {
        if frame.is_empty() {
            return;
        }
        let mean = frame.iter().sum::<f32>() / frame.len() as f32;
        for sample in frame.iter_mut() {
            *sample -= mean;
        }
    }

    fn name(&self) -> &'static str {
        "dc-remover"
    }
}

/// Ordered chain of post-processors.
pub struct PostProcessorChain {
    processors: Vec<Box<dyn PostProcessor>>,
}

impl PostProcessorChain {
    pub fn new(processors: Vec<Box<dyn PostProcessor>>) -> Self {
        Self { processors }
    }

    /// Limiter, clip, DC removal.
    pub fn standard() -> Self {
        Self::new(build_post_processors(defaults::SOFT_LIMIT))
    }

    pub fn process(&mut self, frame: &mut [f32]) {
        if frame.is_empty() {
            return;
        }
        for processor in &mut self.processors {
            processor.process(frame);
        }
    }

    /// Stage names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.processors.iter().map(|p| p.name()).collect()
    }
}

impl Default for PostProcessorChain {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builds the standard safety chain with the given limiter threshold.
pub fn build_post_processors(limit: f32) -> Vec<Box<dyn PostProcessor>> {
    vec![
        Box::new(SoftLimiter::new(limit)),
        Box::new(HardClip),
        Box::new(DcRemover),
    ]
}

/// Peak absolute amplitude of the frame.
pub fn peak_amplitude(frame: &[f32]) -> f32 {
    frame.iter().fold(0.0f32, |peak, &s| peak.max(s.abs()))
}

/// Copies `input` into a frame, zero-padding short input and truncating long input.
pub fn normalize_frame(input: &[f32]) -> Frame {
    let mut frame = [0.0; defaults::FRAME_SIZE];
    let len = input.len().min(defaults::FRAME_SIZE);
    frame[..len].copy_from_slice(&input[..len]);
    frame
}

/// Normalizes inference output, or returns `None` when it is empty.
pub fn normalize_output(output: &[f32]) -> Option<Frame> {
    if output.is_empty() {
        None
    } else {
        Some(normalize_frame(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mean(frame: &[f32]) -> f32 {
        frame.iter().sum::<f32>() / frame.len() as f32
    }

    #[test]
    fn test_limiter_scales_peak_to_threshold() {
        let mut frame = vec![0.0, 1.5, -0.75, 0.3];
        SoftLimiter::default().process(&mut frame);

        assert!((peak_amplitude(&frame) - 0.98).abs() < 1e-6);
        // Shape is preserved.
        assert!((frame[2] / frame[1] + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_limiter_leaves_quiet_frames_alone() {
        let mut frame = vec![0.5, -0.97, 0.2];
        let original = frame.clone();
        SoftLimiter::default().process(&mut frame);
        assert_eq!(frame, original);
    }

    #[test]
    fn test_limiter_on_negative_peak() {
        let mut frame = vec![-2.0, 0.5];
        SoftLimiter::default().process(&mut frame);
        assert!((frame[0] + 0.98).abs() < 1e-6);
        assert!((frame[1] - 0.245).abs() < 1e-6);
    }

    #[test]
    fn test_hard_clip() {
        let mut frame = vec![1.5, -3.0, 0.25];
        HardClip.process(&mut frame);
        assert_eq!(frame, vec![1.0, -1.0, 0.25]);
    }

    #[test]
    fn test_dc_remover_zeroes_mean() {
        let mut frame: Vec<f32> = (0..480).map(|i| 0.3 + 0.1 * (i as f32 * 0.1).sin()).collect();
        DcRemover.process(&mut frame);
        assert!(mean(&frame).abs() < 1e-6);
    }

    #[test]
    fn test_dc_remover_empty_frame() {
        let mut frame: Vec<f32> = vec![];
        DcRemover.process(&mut frame);
        assert!(frame.is_empty());
    }

    #[test]
    fn test_standard_chain_order() {
        let chain = PostProcessorChain::standard();
        assert_eq!(chain.names(), vec!["soft-limiter", "hard-clip", "dc-remover"]);
    }

    #[test]
    fn test_standard_chain_limits_then_removes_dc() {
        let mut frame = vec![0.0; 480];
        frame[0] = 1.5;
        frame[1] = 0.5;
        PostProcessorChain::standard().process(&mut frame);

        assert!(mean(&frame).abs() < 1e-6);
        // After limiting: 0.98 and 0.3267; mean = 1.3067 / 480.
        let dc = (0.98 + 0.5 * 0.98 / 1.5) / 480.0;
        assert!((frame[0] - (0.98 - dc)).abs() < 1e-6);
        assert!((frame[2] + dc).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_pads_short_input() {
        let frame = normalize_frame(&[0.1, 0.2]);
        assert_eq!(frame.len(), 480);
        assert_eq!(frame[0], 0.1);
        assert_eq!(frame[1], 0.2);
        assert!(frame[2..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_normalize_truncates_long_input() {
        let input: Vec<f32> = (0..600).map(|i| i as f32).collect();
        let frame = normalize_frame(&input);
        assert_eq!(frame[479], 479.0);
    }

    #[test]
    fn test_normalize_output_empty_is_none() {
        assert!(normalize_output(&[]).is_none());
        assert_eq!(normalize_output(&[0.5]).map(|f| f[0]), Some(0.5));
    }
}
