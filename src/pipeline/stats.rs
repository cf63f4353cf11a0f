//! Latency measurement and statistics snapshots for the frame processor.

use crate::audio::vad::VadStats;
use crate::defaults;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Trait for time operations, allowing mock time in tests.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Real system clock using `std::time::Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Running average of inference latency.
#[derive(Debug, Clone, Default)]
pub struct LatencyTracker {
    count: u64,
    total: Duration,
}

impl LatencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one measured inference call.
    pub fn record(&mut self, elapsed: Duration) {
        self.count += 1;
        self.total += elapsed;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Average latency in milliseconds, or 0 when nothing was recorded.
    pub fn average_ms(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.total.as_secs_f64() * 1000.0 / self.count as f64
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.total = Duration::ZERO;
    }
}

/// Read-only snapshot of processor and VAD counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProcessingStats {
    /// Frames that went through inference.
    pub frame_count: u64,
    /// Average inference latency per frame in milliseconds.
    pub avg_time_ms: f64,
    /// Real-time factor: average latency / frame duration. < 1.0 keeps up.
    pub rtf: f64,
    pub vad_total: u64,
    pub vad_active: u64,
    pub vad_bypassed: u64,
    pub vad_bypass_ratio: f32,
}

impl ProcessingStats {
    /// Builds a snapshot from latency and VAD counters.
    pub fn from_parts(
        latency: &LatencyTracker,
        vad: VadStats,
        frame_size: usize,
        sample_rate: u32,
    ) -> Self {
        let avg_time_ms = latency.average_ms();
        let frame_ms = defaults::frame_duration_ms(frame_size, sample_rate);
        let rtf = if frame_ms > 0.0 {
            avg_time_ms / frame_ms
        } else {
            0.0
        };

        Self {
            frame_count: latency.count(),
            avg_time_ms,
            rtf,
            vad_total: vad.total,
            vad_active: vad.active,
            vad_bypassed: vad.bypassed,
            vad_bypass_ratio: vad.bypass_ratio,
        }
    }
}

impl fmt::Display for ProcessingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Frames enhanced:   {}", self.frame_count)?;
        writeln!(
            f,
            "Avg inference:     {} ({:.2}x real-time)",
            format_ms(self.avg_time_ms),
            self.rtf
        )?;
        write!(
            f,
            "VAD:               {} total, {} active, {} bypassed ({:.1}%)",
            self.vad_total,
            self.vad_active,
            self.vad_bypassed,
            self.vad_bypass_ratio * 100.0
        )
    }
}

/// Formats milliseconds as a human-friendly string.
/// Under 1ms: "450µs", at or above 1ms: "1.25ms".
fn format_ms(ms: f64) -> String {
    if ms < 1.0 {
        format!("{:.0}µs", ms * 1000.0)
    } else {
        format!("{:.2}ms", ms)
    }
}
