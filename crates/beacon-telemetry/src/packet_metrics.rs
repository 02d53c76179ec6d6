// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Rolling-window packet aggregation.

use crate::report::MetricsReport;
use beacon_core::telemetry::{MetricsSnapshot, PacketRecord, TrackedWindow, WindowedMetrics};
use beacon_core::{Clock, SystemClock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Minimum wall-clock time between two trims of the history.
pub const TRIM_INTERVAL_MILLIS: u64 = 30_000;

/// Period floor used for lifetime rates while the history is (nearly) empty.
pub const LIFETIME_FLOOR_MILLIS: u64 = 1_000;

/// Thread-safe recorder of packet events with rolling-window queries.
///
/// This aggregator provides:
/// - Append-only history ordered by timestamp, trimmed from the head
/// - Lifetime totals that trimming never decrements
/// - Concurrent producers and scanners (one writer at a time, many readers)
/// - Single-pass snapshots of the 1, 5 and 10 minute windows
///
/// Memory is bounded by the trim policy: at least every
/// [`TRIM_INTERVAL_MILLIS`], records older than the longest tracked window are
/// dropped inline by [`record_event`](Self::record_event).
#[derive(Debug)]
pub struct PacketMetrics {
    clock: Arc<dyn Clock>,
    /// Retained records, oldest at the front.
    history: RwLock<VecDeque<PacketRecord>>,
    total_packets: AtomicU64,
    total_bytes: AtomicU64,
    last_trim_millis: AtomicU64,
}

impl PacketMetrics {
    /// Creates an empty aggregator on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty aggregator reading time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let now = clock.now_millis();
        Self {
            clock,
            history: RwLock::new(VecDeque::new()),
            total_packets: AtomicU64::new(0),
            total_bytes: AtomicU64::new(0),
            last_trim_millis: AtomicU64::new(now),
        }
    }

    /// Records one packet of `size_bytes`, stamped with the current time.
    pub fn record_event(&self, size_bytes: u64) {
        let mut history = self.write_history();
        // Stamping under the lock keeps the history in timestamp order even
        // with several producers.
        let now = self.clock.now_millis();

        Self::saturating_add(&self.total_packets, 1);
        Self::saturating_add(&self.total_bytes, size_bytes);
        history.push_back(PacketRecord::new(now, size_bytes));

        let last_trim = self.last_trim_millis.load(Ordering::Relaxed);
        if now.saturating_sub(last_trim) > TRIM_INTERVAL_MILLIS {
            let removed = Self::trim(&mut history, now);
            self.last_trim_millis.store(now, Ordering::Relaxed);
            if removed > 0 {
                log::trace!(
                    "[PacketMetrics] Trimmed {removed} expired records, {} retained",
                    history.len()
                );
            }
        }
    }

    /// Totals for records stamped within the last `window_millis`.
    pub fn snapshot(&self, window_millis: u64) -> MetricsSnapshot {
        let history = self.read_history();
        let cutoff = self.clock.now_millis().saturating_sub(window_millis);

        let (count, bytes) = history
            .iter()
            .filter(|record| record.timestamp_millis >= cutoff)
            .fold((0u64, 0u64), |(count, bytes), record| {
                (count + 1, bytes.saturating_add(record.size_bytes))
            });
        MetricsSnapshot::new(count, bytes, window_millis)
    }

    /// Totals for one of the tracked windows.
    pub fn snapshot_window(&self, window: TrackedWindow) -> MetricsSnapshot {
        self.snapshot(window.millis())
    }

    /// Totals over the last minute.
    pub fn one_minute(&self) -> MetricsSnapshot {
        self.snapshot_window(TrackedWindow::OneMinute)
    }

    /// Totals over the last five minutes.
    pub fn five_minutes(&self) -> MetricsSnapshot {
        self.snapshot_window(TrackedWindow::FiveMinutes)
    }

    /// Totals over the last ten minutes.
    pub fn ten_minutes(&self) -> MetricsSnapshot {
        self.snapshot_window(TrackedWindow::TenMinutes)
    }

    /// Lifetime totals, averaged over the age of the oldest retained record.
    pub fn lifetime(&self) -> MetricsSnapshot {
        let history = self.read_history();
        self.lifetime_locked(&history, self.clock.now_millis())
    }

    /// Every tracked window plus lifetime totals, from one pass and one instant.
    pub fn snapshot_all(&self) -> WindowedMetrics {
        let history = self.read_history();
        let now = self.clock.now_millis();

        let cutoffs = TrackedWindow::ALL.map(|window| now.saturating_sub(window.millis()));
        let mut counts = [0u64; 3];
        let mut bytes = [0u64; 3];

        for record in history.iter() {
            for (i, cutoff) in cutoffs.iter().enumerate() {
                if record.timestamp_millis >= *cutoff {
                    counts[i] += 1;
                    bytes[i] = bytes[i].saturating_add(record.size_bytes);
                }
            }
        }

        let [one, five, ten] = TrackedWindow::ALL;
        WindowedMetrics {
            one_minute: MetricsSnapshot::new(counts[0], bytes[0], one.millis()),
            five_minutes: MetricsSnapshot::new(counts[1], bytes[1], five.millis()),
            ten_minutes: MetricsSnapshot::new(counts[2], bytes[2], ten.millis()),
            lifetime: self.lifetime_locked(&history, now),
        }
    }

    /// Captures every window and the history size for the periodic report.
    pub fn report(&self) -> MetricsReport {
        let metrics = self.snapshot_all();
        MetricsReport::new(metrics, self.history_size())
    }

    /// Clears the history and zeroes lifetime totals.
    pub fn reset(&self) {
        let mut history = self.write_history();
        history.clear();
        self.total_packets.store(0, Ordering::Relaxed);
        self.total_bytes.store(0, Ordering::Relaxed);
        self.last_trim_millis
            .store(self.clock.now_millis(), Ordering::Relaxed);
        log::debug!("[PacketMetrics] Reset");
    }

    /// Number of records currently retained.
    pub fn history_size(&self) -> usize {
        self.read_history().len()
    }

    /// Packets recorded since creation or the last reset.
    pub fn total_packets(&self) -> u64 {
        self.total_packets.load(Ordering::Relaxed)
    }

    /// Bytes recorded since creation or the last reset.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes.load(Ordering::Relaxed)
    }

    fn lifetime_locked(&self, history: &VecDeque<PacketRecord>, now: u64) -> MetricsSnapshot {
        let oldest = history.front().map_or(now, |r| r.timestamp_millis);
        let period = now.saturating_sub(oldest).max(LIFETIME_FLOOR_MILLIS);
        MetricsSnapshot::new(self.total_packets(), self.total_bytes(), period)
    }

    /// Totals stick at `u64::MAX` instead of wrapping.
    fn saturating_add(total: &AtomicU64, amount: u64) {
        // The closure always returns Some, so the update cannot fail.
        let _ = total.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
            Some(current.saturating_add(amount))
        });
    }

    /// Drops head records older than the longest window. Returns how many.
    fn trim(history: &mut VecDeque<PacketRecord>, now: u64) -> usize {
        let cutoff = now.saturating_sub(TrackedWindow::LONGEST.millis());
        let mut removed = 0;
        while history
            .front()
            .is_some_and(|oldest| oldest.timestamp_millis < cutoff)
        {
            history.pop_front();
            removed += 1;
        }
        removed
    }

    fn read_history(&self) -> RwLockReadGuard<'_, VecDeque<PacketRecord>> {
        self.history.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_history(&self) -> RwLockWriteGuard<'_, VecDeque<PacketRecord>> {
        self.history.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PacketMetrics {
    fn default() -> Self {
        Self::new()
    }
}
