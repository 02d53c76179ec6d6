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


//! Human-readable rendering of the periodic packet metrics report.

use beacon_core::telemetry::{TrackedWindow, WindowedMetrics};
use std::fmt::{self, Display};

const RULE: &str = "==================================================";

/// A fully captured report, ready to be logged line by line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsReport {
    /// Window and lifetime snapshots taken at report time.
    pub metrics: WindowedMetrics,
    /// Records retained in the history when the report was captured.
    pub history_size: usize,
}

impl MetricsReport {
    /// Creates a report from already captured metrics.
    pub fn new(metrics: WindowedMetrics, history_size: usize) -> Self {
        Self {
            metrics,
            history_size,
        }
    }

    /// The report as separate lines, in print order.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            RULE.to_string(),
            "PACKET METRICS REPORT".to_string(),
            RULE.to_string(),
        ];
        for window in TrackedWindow::ALL {
            lines.push(format!("{} Window:", window.label()));
            lines.push(format!("   {}", self.metrics.window(window)));
        }
        lines.push("Lifetime Stats:".to_string());
        lines.push(format!("   {}", self.metrics.lifetime));
        lines.push(RULE.to_string());
        lines.push(format!("History Queue Size: {} records", self.history_size));
        lines.push(RULE.to_string());
        lines
    }

    /// Writes every line at info level.
    pub fn log(&self) {
        for line in self.lines() {
            log::info!("{line}");
        }
    }
}

impl Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
