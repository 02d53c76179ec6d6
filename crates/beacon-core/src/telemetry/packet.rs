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

//! Packet records, tracked windows and derived snapshots.

use std::fmt::{self, Display};

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;

/// One recorded packet. Written once at append time, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketRecord {
    /// Wall-clock milliseconds at which the packet was recorded.
    pub timestamp_millis: u64,
    /// Size of the packet in bytes.
    pub size_bytes: u64,
}

impl PacketRecord {
    /// Creates a new record.
    pub fn new(timestamp_millis: u64, size_bytes: u64) -> Self {
        Self {
            timestamp_millis,
            size_bytes,
        }
    }
}

/// The fixed trailing windows reported by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedWindow {
    /// The last 60 seconds.
    OneMinute,
    /// The last 5 minutes.
    FiveMinutes,
    /// The last 10 minutes. Also the retention horizon of the history.
    TenMinutes,
}

impl TrackedWindow {
    /// All tracked windows, shortest first.
    pub const ALL: [TrackedWindow; 3] = [
        TrackedWindow::OneMinute,
        TrackedWindow::FiveMinutes,
        TrackedWindow::TenMinutes,
    ];

    /// The longest tracked window; records older than this are trimmed.
    pub const LONGEST: TrackedWindow = TrackedWindow::TenMinutes;

    /// Window length in milliseconds.
    pub const fn millis(self) -> u64 {
        match self {
            TrackedWindow::OneMinute => 60_000,
            TrackedWindow::FiveMinutes => 300_000,
            TrackedWindow::TenMinutes => 600_000,
        }
    }

    /// Label used in reports.
    pub const fn label(self) -> &'static str {
        match self {
            TrackedWindow::OneMinute => "1 Minute",
            TrackedWindow::FiveMinutes => "5 Minute",
            TrackedWindow::TenMinutes => "10 Minute",
        }
    }
}

/// Point-in-time totals for one window.
///
/// Rates and averages are derived on read so the snapshot stays a plain
/// `(count, bytes, period)` triple. A zero period or zero count yields zero,
/// never a division error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Number of packets in the window.
    pub packet_count: u64,
    /// Sum of packet sizes in the window.
    pub total_bytes: u64,
    /// Length of the window the totals were taken over.
    pub period_millis: u64,
}

impl MetricsSnapshot {
    /// Creates a snapshot from raw totals.
    pub fn new(packet_count: u64, total_bytes: u64, period_millis: u64) -> Self {
        Self {
            packet_count,
            total_bytes,
            period_millis,
        }
    }

    /// Mean packet size in bytes, or `0.0` for an empty window.
    pub fn average_packet_size(&self) -> f64 {
        if self.packet_count == 0 {
            return 0.0;
        }
        self.total_bytes as f64 / self.packet_count as f64
    }

    /// Packets per second over the window period.
    pub fn packets_per_second(&self) -> f64 {
        self.per_second(self.packet_count)
    }

    /// Bytes per second over the window period.
    pub fn bytes_per_second(&self) -> f64 {
        self.per_second(self.total_bytes)
    }

    /// Returns `true` when every field is zero.
    pub fn is_zero(&self) -> bool {
        self.packet_count == 0 && self.total_bytes == 0
    }

    fn per_second(&self, value: u64) -> f64 {
        let seconds = self.period_millis as f64 / 1000.0;
        if seconds > 0.0 {
            value as f64 / seconds
        } else {
            0.0
        }
    }
}

impl Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Packets: {} | Bytes: {} ({}) | Avg Size: {:.1} bytes | Rate: {:.2} pkt/s, {}/s",
            group_thousands(self.packet_count),
            group_thousands(self.total_bytes),
            format_bytes(self.total_bytes),
            self.average_packet_size(),
            self.packets_per_second(),
            format_bytes(self.bytes_per_second() as u64),
        )
    }
}

/// Snapshots of every tracked window plus lifetime totals, taken from the
/// same instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowedMetrics {
    /// Totals over the last minute.
    pub one_minute: MetricsSnapshot,
    /// Totals over the last five minutes.
    pub five_minutes: MetricsSnapshot,
    /// Totals over the last ten minutes.
    pub ten_minutes: MetricsSnapshot,
    /// Running totals since creation or the last reset.
    pub lifetime: MetricsSnapshot,
}

impl WindowedMetrics {
    /// Returns the snapshot of a tracked window.
    pub fn window(&self, window: TrackedWindow) -> &MetricsSnapshot {
        match window {
            TrackedWindow::OneMinute => &self.one_minute,
            TrackedWindow::FiveMinutes => &self.five_minutes,
            TrackedWindow::TenMinutes => &self.ten_minutes,
        }
    }
}

/// Renders a byte count with a binary (1024-based) suffix.
///
/// Values below one KiB print as whole bytes (`"512 B"`), larger values use two
/// decimals (`"1.50 KB"`, `"3.00 MB"`, `"1.25 GB"`).
pub fn format_bytes(bytes: u64) -> String {
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < MIB {
        format!("{:.2} KB", bytes as f64 / KIB as f64)
    } else if bytes < GIB {
        format!("{:.2} MB", bytes as f64 / MIB as f64)
    } else {
        format!("{:.2} GB", bytes as f64 / GIB as f64)
    }
}

/// Renders an integer with `,` thousands separators (`1234567` → `"1,234,567"`).
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
