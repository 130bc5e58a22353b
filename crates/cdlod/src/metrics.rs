//! Engine-agnostic metrics collection for terrain selection statistics.
//!
//! Feature-gated and runtime-toggled to ensure zero overhead when disabled.
//!
//! # Usage
//!
//! ```ignore
//! use cdlod::metrics::{SelectionMetrics, COLLECT_METRICS};
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! // Time a selection and record its output:
//! let result = metrics.time_select(|| terrain.select(&mut selection));
//! metrics.update_from_selection(&selection);
//! ```

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;

use web_time::Instant;

use crate::selection::Selection;
use crate::settings::MAX_LEVEL_COUNT;

/// Runtime toggle for metrics collection.
/// Set to false to disable metrics gathering at runtime.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
    #[cfg(feature = "metrics")]
    {
        COLLECT_METRICS.load(Ordering::Relaxed)
    }
    #[cfg(not(feature = "metrics"))]
    {
        false
    }
}

/// Rolling window for storing recent values (e.g., timing history).
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    buffer: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    /// Create a new rolling window with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new value, evicting the oldest if at capacity.
    pub fn push(&mut self, value: T) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Iterate over values (oldest to newest).
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }

    /// Get the most recent value.
    pub fn last(&self) -> Option<&T> {
        self.buffer.back()
    }
}

impl RollingWindow<u64> {
    /// Compute the average of all values.
    pub fn average(&self) -> f64 {
        if self.buffer.is_empty() {
            0.0
        } else {
            self.buffer.iter().sum::<u64>() as f64 / self.buffer.len() as f64
        }
    }

    /// Get min and max values.
    pub fn min_max(&self) -> Option<(u64, u64)> {
        let min = *self.buffer.iter().min()?;
        let max = *self.buffer.iter().max()?;
        Some((min, max))
    }
}

impl Default for RollingWindow<u64> {
    fn default() -> Self {
        Self::new(128) // ~2 seconds at 60fps
    }
}

/// Selection statistics updated each frame.
#[derive(Debug, Clone, Default)]
pub struct SelectionMetrics {
    /// Selected patch count at each level (index = level).
    pub nodes_per_level: [u32; MAX_LEVEL_COUNT as usize],
    /// Patches in the last selection.
    pub selected_nodes: u32,
    /// Patches the last selection dropped past capacity.
    pub dropped_nodes: u32,
    /// Frames whose selection overflowed, cumulative.
    pub overflowed_frames: u64,
    /// Rolling window of selection times in microseconds.
    pub select_timings: RollingWindow<u64>,
    /// Last selection time in microseconds.
    pub last_select_us: u64,
}

impl SelectionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset per-frame values and timings.
    pub fn reset(&mut self) {
        self.nodes_per_level.fill(0);
        self.selected_nodes = 0;
        self.dropped_nodes = 0;
        self.select_timings.clear();
        self.last_select_us = 0;
        // Don't reset overflowed_frames - it's cumulative
    }

    /// Snapshot the output of the last selection.
    pub fn update_from_selection(&mut self, selection: &Selection) {
        if !is_enabled() {
            return;
        }

        self.nodes_per_level.fill(0);
        for node in selection.selected_nodes() {
            let level = (node.level as usize).min(MAX_LEVEL_COUNT as usize - 1);
            self.nodes_per_level[level] += 1;
        }
        self.selected_nodes = selection.selected_node_count() as u32;
        self.dropped_nodes = selection.dropped_node_count() as u32;
        if selection.is_overflowed() {
            self.overflowed_frames += 1;
        }
    }

    /// Record a selection timing.
    pub fn record_select_timing(&mut self, timing_us: u64) {
        if is_enabled() {
            self.select_timings.push(timing_us);
            self.last_select_us = timing_us;
        }
    }

    /// Run `select` and record how long it took.
    pub fn time_select<R>(&mut self, select: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let result = select();
        self.record_select_timing(start.elapsed().as_micros() as u64);
        result
    }

    /// Average selection timing in microseconds.
    pub fn avg_select_timing_us(&self) -> f64 {
        self.select_timings.average()
    }
}
