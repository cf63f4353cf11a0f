//! Time-domain enhancement pipeline.
//!
//! A [`FrameProcessor`] takes 480-sample frames at 48 kHz through the VAD
//! gate, an injected [`InferenceEngine`] and the output safety chain.

pub mod inference;
pub mod post_processor;
pub mod processor;
pub mod stats;

use crate::defaults;

/// One 10 ms frame at the pipeline rate.
pub type Frame = [f32; defaults::FRAME_SIZE];

pub use inference::{InferenceEngine, MockEngine, PassthroughEngine};
pub use post_processor::{
    DcRemover, HardClip, PostProcessor, PostProcessorChain, SoftLimiter, build_post_processors,
};
pub use processor::{FrameOutcome, FrameProcessor, ProcessedFrame};
pub use stats::{Clock, LatencyTracker, ProcessingStats, SystemClock};
