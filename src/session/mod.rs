//! Host-facing session stores.
//!
//! Each store maps generated [`SessionId`]s to exclusively owned pipeline
//! state. Stores hold no locks; a host sharing one across threads wraps it
//! in its own `Mutex`.

pub mod processing;
pub mod spectral;

pub use processing::{ProcessingSession, SessionOutput, SessionStore};
pub use spectral::SpectralStore;

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Opaque session handle. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SessionId(u64);

impl SessionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Id allocator plus owned entries.
#[derive(Debug)]
pub(crate) struct Registry<T> {
    next_id: u64,
    entries: HashMap<SessionId, T>,
}

impl<T> Registry<T> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 1,
            entries: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, value: T) -> SessionId {
        let id = SessionId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, value);
        id
    }

    pub(crate) fn get(&self, id: SessionId) -> Option<&T> {
        let entry = self.entries.get(&id);
        if entry.is_none() {
            log::warn!("Unknown session {}", id);
        }
        entry
    }

    pub(crate) fn get_mut(&mut self, id: SessionId) -> Option<&mut T> {
        let entry = self.entries.get_mut(&id);
        if entry.is_none() {
            log::warn!("Unknown session {}", id);
        }
        entry
    }

    pub(crate) fn remove(&mut self, id: SessionId) -> Option<T> {
        let entry = self.entries.remove(&id);
        if entry.is_none() {
            log::warn!("Unknown session {}", id);
        }
        entry
    }

    pub(crate) fn contains(&self, id: SessionId) -> bool {
        self.entries.contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
