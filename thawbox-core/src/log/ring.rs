//! Fixed-capacity ring buffer of measurement points
//!
//! Storage is a plain array plus a write cursor and a stored count. Logical
//! index 0 is always the oldest stored point; once the log is full each
//! append overwrites the oldest one.
//!
//! Logical index `i` lives in physical slot
//! `(write_cursor + C - stored + i) % C`.

use super::point::{MeasurementPoint, TemperatureAverages};

/// Default log capacity (points)
pub const LOG_CAPACITY: usize = 100;

/// Bounded, oldest-first log of measurement points
#[derive(Debug, Clone)]
pub struct MeasurementLog<const C: usize = LOG_CAPACITY> {
    slots: [MeasurementPoint; C],
    /// Physical slot the next append writes to
    write_cursor: usize,
    /// Number of admitted points (<= C)
    stored: usize,
}

impl<const C: usize> Default for MeasurementLog<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const C: usize> MeasurementLog<C> {
    /// Create an empty log
    pub const fn new() -> Self {
        Self {
            slots: [MeasurementPoint::EMPTY; C],
            write_cursor: 0,
            stored: 0,
        }
    }

    /// Append a point, evicting the oldest when full
    pub fn append(&mut self, point: MeasurementPoint) {
        if C == 0 {
            return;
        }

        self.slots[self.write_cursor] = point;
        self.write_cursor = (self.write_cursor + 1) % C;
        if self.stored < C {
            self.stored += 1;
        }
    }

    /// Point at logical index `index` (0 = oldest)
    pub fn get(&self, index: usize) -> Option<&MeasurementPoint> {
        if index >= self.stored {
            return None;
        }
        Some(&self.slots[self.physical(index)])
    }

    /// Number of stored points
    pub fn count(&self) -> usize {
        self.stored
    }

    /// Maximum number of points held
    pub const fn capacity(&self) -> usize {
        C
    }

    pub fn is_empty(&self) -> bool {
        self.stored == 0
    }

    pub fn is_full(&self) -> bool {
        self.stored == C
    }

    /// Most recently appended point
    pub fn latest(&self) -> Option<&MeasurementPoint> {
        self.stored.checked_sub(1).and_then(|i| self.get(i))
    }

    /// The newest `min(n, count())` points, oldest first
    pub fn last_n(&self, n: usize) -> impl Iterator<Item = &MeasurementPoint> + '_ {
        let take = n.min(self.stored);
        (self.stored - take..self.stored).map(move |i| &self.slots[self.physical(i)])
    }

    /// Every stored point, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &MeasurementPoint> + '_ {
        self.last_n(self.stored)
    }

    /// Mean of each probe over the newest `n` points
    ///
    /// An empty window gives zeroed means with `samples == 0`.
    ///
    /// Every point in the window counts, invalid ones included: a probe
    /// that was disconnected contributes its -127 °C placeholder. Callers
    /// that need clean means should inspect `is_valid` through
    /// [`MeasurementLog::last_n`].
    pub fn average_over_last_n(&self, n: usize) -> TemperatureAverages {
        let mut avg = TemperatureAverages::default();

        for point in self.last_n(n) {
            avg.ambient_c += point.ambient_c;
            avg.surface_c += point.surface_c;
            avg.inner_c += point.inner_c;
            avg.base_c += point.base_c;
            avg.samples += 1;
        }

        if avg.samples > 0 {
            let count = avg.samples as f32;
            avg.ambient_c /= count;
            avg.surface_c /= count;
            avg.inner_c /= count;
            avg.base_c /= count;
        }

        avg
    }

    /// Drop every stored point
    pub fn clear(&mut self) {
        self.write_cursor = 0;
        self.stored = 0;
    }

    fn physical(&self, index: usize) -> usize {
        (self.write_cursor + C - self.stored + index) % C
    }
}
