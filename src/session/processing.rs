//! Time-domain processing sessions: optional device-rate resamplers around
//! a [`FrameProcessor`].

use super::{Registry, SessionId};
use crate::audio::resampler::{Resampled, StreamingResampler};
use crate::config::ProcessorConfig;
use crate::defaults;
use crate::error::Result;
use crate::pipeline::inference::InferenceEngine;
use crate::pipeline::post_processor::normalize_frame;
use crate::pipeline::processor::{FrameOutcome, FrameProcessor};
use crate::pipeline::stats::ProcessingStats;
use crate::pipeline::Frame;

/// Processor plus the resamplers bridging device rates to 48 kHz.
pub struct ProcessingSession {
    processor: FrameProcessor,
    input: Option<StreamingResampler>,
    output: Option<StreamingResampler>,
    /// Frames delivered through the output resampler since it was installed.
    output_frames: u64,
}

impl ProcessingSession {
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            processor: FrameProcessor::new(config),
            input: None,
            output: None,
            output_frames: 0,
        }
    }

    pub fn processor(&self) -> &FrameProcessor {
        &self.processor
    }

    pub fn processor_mut(&mut self) -> &mut FrameProcessor {
        &mut self.processor
    }

    pub fn input_resampler(&self) -> Option<&StreamingResampler> {
        self.input.as_ref()
    }

    pub fn output_resampler(&self) -> Option<&StreamingResampler> {
        self.output.as_ref()
    }

    /// Bridges device input at `input_rate` to `target_rate`.
    ///
    /// Equal rates remove any existing input resampler.
    pub fn set_input_resampler(&mut self, input_rate: u32, target_rate: u32) -> Result<()> {
        self.input = build_resampler(input_rate, target_rate)?;
        Ok(())
    }

    /// Bridges `target_rate` to device output at `output_rate`.
    ///
    /// Equal rates remove any existing output resampler.
    pub fn set_output_resampler(&mut self, target_rate: u32, output_rate: u32) -> Result<()> {
        self.output = build_resampler(target_rate, output_rate)?;
        self.output_frames = 0;
        Ok(())
    }

    /// Resamples a device chunk to one 480-sample frame at 48 kHz.
    pub fn pre_inference(&mut self, chunk: &[f32]) -> Resampled<Frame> {
        match self.input.as_mut() {
            Some(resampler) => resampler
                .process(chunk, defaults::FRAME_SIZE)
                .map(|samples| normalize_frame(&samples)),
            None => Resampled::Ready(normalize_frame(chunk)),
        }
    }

    /// Runs the safety chain on `enhanced`, then resamples to the output rate.
    pub fn post_process(&mut self, enhanced: &[f32]) -> Resampled<Vec<f32>> {
        let mut samples = enhanced.to_vec();
        self.processor.post_process(&mut samples);
        self.to_output_rate(samples)
    }

    /// Full path: input resampling, VAD, inference, safety chain, output
    /// resampling.
    pub fn process<E>(&mut self, chunk: &[f32], engine: &mut E) -> Resampled<SessionOutput>
    where
        E: InferenceEngine + ?Sized,
    {
        let frame = match self.pre_inference(chunk) {
            Resampled::Ready(frame) => frame,
            Resampled::Pending => return Resampled::Pending,
        };
        let processed = self.processor.process_frame(&frame, engine);
        let outcome = processed.outcome;
        self.to_output_rate(processed.samples.to_vec())
            .map(|samples| SessionOutput { samples, outcome })
    }

    /// Clears processor state and both resampler buffers.
    pub fn reset(&mut self) {
        self.processor.reset();
        if let Some(resampler) = self.input.as_mut() {
            resampler.reset();
        }
        if let Some(resampler) = self.output.as_mut() {
            resampler.reset();
        }
        self.output_frames = 0;
    }

    /// Block size for the next output frame, carrying the fractional
    /// remainder of earlier frames.
    fn next_output_len(resampler: &StreamingResampler, frames: u64) -> usize {
        let frame = defaults::FRAME_SIZE as u64;
        let done = resampler.output_total_for(frames * frame);
        (resampler.output_total_for((frames + 1) * frame) - done) as usize
    }

    fn to_output_rate(&mut self, samples: Vec<f32>) -> Resampled<Vec<f32>> {
        match self.output.as_mut() {
            Some(resampler) => {
                let len = Self::next_output_len(resampler, self.output_frames);
                let result = resampler.process(&samples, len);
                if !result.is_pending() {
                    self.output_frames += 1;
                }
                result
            }
            None => Resampled::Ready(samples),
        }
    }
}

/// One chunk of enhanced audio at the output rate.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutput {
    pub samples: Vec<f32>,
    pub outcome: FrameOutcome,
}

/// Registry of [`ProcessingSession`]s keyed by [`SessionId`].
///
/// Operations on an unknown id log a warning and return `None` (or `false`).
pub struct SessionStore {
    sessions: Registry<ProcessingSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Registry::new(),
        }
    }

    /// Creates a session with the default hang time.
    pub fn create(&mut self, vad_threshold_db: f32, atten_lim_db: f32) -> SessionId {
        self.create_with_config(ProcessorConfig {
            vad_threshold_db,
            atten_lim_db,
            ..ProcessorConfig::default()
        })
    }

    pub fn create_with_config(&mut self, config: ProcessorConfig) -> SessionId {
        let id = self.sessions.insert(ProcessingSession::new(config));
        log::info!("Created processing session {}", id);
        id
    }

    /// See [`ProcessingSession::set_input_resampler`]. Returns `Ok(false)`
    /// for an unknown session.
    pub fn configure_input_resampler(
        &mut self,
        id: SessionId,
        input_rate: u32,
        target_rate: u32,
    ) -> Result<bool> {
        let Some(session) = self.sessions.get_mut(id) else {
            return Ok(false);
        };
        session.set_input_resampler(input_rate, target_rate)?;
        Ok(true)
    }

    /// See [`ProcessingSession::set_output_resampler`]. Returns `Ok(false)`
    /// for an unknown session.
    pub fn configure_output_resampler(
        &mut self,
        id: SessionId,
        target_rate: u32,
        output_rate: u32,
    ) -> Result<bool> {
        let Some(session) = self.sessions.get_mut(id) else {
            return Ok(false);
        };
        session.set_output_resampler(target_rate, output_rate)?;
        Ok(true)
    }

    /// Resamples (if configured) and normalizes a raw chunk to one frame.
    pub fn process_pre_inference(&mut self, id: SessionId, chunk: &[f32]) -> Option<Resampled<Frame>> {
        self.sessions
            .get_mut(id)
            .map(|session| session.pre_inference(chunk))
    }

    /// Stateless energy gate. Unknown sessions report speech so the host
    /// keeps processing.
    pub fn check_vad(&self, id: SessionId, frame: &[f32]) -> bool {
        self.sessions
            .get(id)
            .is_none_or(|session| session.processor.check_energy(frame))
    }

    /// Applies the safety chain and output resampling to enhanced audio.
    pub fn post_process(&mut self, id: SessionId, enhanced: &[f32]) -> Option<Resampled<Vec<f32>>> {
        self.sessions
            .get_mut(id)
            .map(|session| session.post_process(enhanced))
    }

    /// Runs one raw chunk through the whole session with `engine`.
    pub fn process<E>(
        &mut self,
        id: SessionId,
        chunk: &[f32],
        engine: &mut E,
    ) -> Option<Resampled<SessionOutput>>
    where
        E: InferenceEngine + ?Sized,
    {
        self.sessions
            .get_mut(id)
            .map(|session| session.process(chunk, engine))
    }

    pub fn stats(&self, id: SessionId) -> Option<ProcessingStats> {
        self.sessions.get(id).map(|session| session.processor.stats())
    }

    /// Resets processor state and resampler buffers.
    pub fn reset(&mut self, id: SessionId) -> bool {
        match self.sessions.get_mut(id) {
            Some(session) => {
                session.reset();
                log::info!("Reset processing session {}", id);
                true
            }
            None => false,
        }
    }

    pub fn destroy(&mut self, id: SessionId) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            log::info!("Destroyed processing session {}", id);
        }
        removed
    }

    pub fn session(&self, id: SessionId) -> Option<&ProcessingSession> {
        self.sessions.get(id)
    }

    pub fn session_mut(&mut self, id: SessionId) -> Option<&mut ProcessingSession> {
        self.sessions.get_mut(id)
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn build_resampler(from: u32, to: u32) -> Result<Option<StreamingResampler>> {
    if from == to {
        return Ok(None);
    }
    let resampler = StreamingResampler::new(from, to)?;
    log::info!("Resampler configured: {} Hz -> {} Hz", from, to);
    Ok(Some(resampler))
}
