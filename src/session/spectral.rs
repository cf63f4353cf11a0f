//! Transform sessions exposing the STFT engine over packed float buffers.

use super::{Registry, SessionId};
use crate::spectral::stft::{HOP_SIZE, PACKED_LEN, ShortTimeFourierEngine, Spectrum};

/// Registry of [`ShortTimeFourierEngine`]s keyed by [`SessionId`].
pub struct SpectralStore {
    engines: Registry<Box<ShortTimeFourierEngine>>,
}

impl SpectralStore {
    pub fn new() -> Self {
        Self {
            engines: Registry::new(),
        }
    }

    pub fn init(&mut self) -> SessionId {
        let id = self.engines.insert(Box::default());
        log::info!("Created spectral session {}", id);
        id
    }

    /// Analyzes one hop and returns `[re_0..re_256, im_0..im_256]`.
    ///
    /// Short chunks are zero-padded and long ones truncated to 256 samples.
    pub fn compute_stft(&mut self, id: SessionId, chunk: &[f32]) -> Option<[f32; PACKED_LEN]> {
        let engine = self.engines.get_mut(id)?;
        let mut hop = [0.0; HOP_SIZE];
        let len = chunk.len().min(HOP_SIZE);
        hop[..len].copy_from_slice(&chunk[..len]);
        Some(engine.compute_stft(&hop).to_packed())
    }

    /// Synthesizes one hop from a packed spectrum.
    pub fn reconstruct(&mut self, id: SessionId, packed: &[f32]) -> Option<[f32; HOP_SIZE]> {
        let engine = self.engines.get_mut(id)?;
        Some(engine.reconstruct_audio(&Spectrum::from_packed(packed)))
    }

    pub fn reset(&mut self, id: SessionId) -> bool {
        match self.engines.get_mut(id) {
            Some(engine) => {
                engine.reset();
                log::info!("Reset spectral session {}", id);
                true
            }
            None => false,
        }
    }

    pub fn destroy(&mut self, id: SessionId) -> bool {
        let removed = self.engines.remove(id).is_some();
        if removed {
            log::info!("Destroyed spectral session {}", id);
        }
        removed
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.engines.contains(id)
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.len() == 0
    }
}

impl Default for SpectralStore {
    fn default() -> Self {
        Self::new()
    }
}
