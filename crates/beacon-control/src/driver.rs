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


//! One tick of the telemetry pipeline: capture, finalize, measure, report.

use beacon_core::{PayloadEncoder, StateSource, SystemClock};
use beacon_io::ConfigStore;
use beacon_telemetry::{PacketMetrics, ReportScheduler};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

/// What a single tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Size of the finalized payload that was recorded, if any.
    pub recorded_bytes: Option<u64>,
    /// Whether the periodic report was emitted on this tick.
    pub reported: bool,
}

/// Per-tick work run by the scheduler loop.
///
/// Collaborator failures, returned errors and panics alike, are logged and the
/// tick is skipped; the loop itself never sees them.
pub struct TickDriver {
    source: Box<dyn StateSource>,
    encoder: Arc<dyn PayloadEncoder>,
    metrics: Arc<PacketMetrics>,
    config: Arc<ConfigStore>,
    reports: ReportScheduler,
    consecutive_failures: u64,
}

impl TickDriver {
    /// Creates a driver reporting every 60 seconds of wall-clock time.
    pub fn new(
        source: Box<dyn StateSource>,
        encoder: Arc<dyn PayloadEncoder>,
        metrics: Arc<PacketMetrics>,
        config: Arc<ConfigStore>,
    ) -> Self {
        Self {
            source,
            encoder,
            metrics,
            config,
            reports: ReportScheduler::with_default_interval(Arc::new(SystemClock)),
            consecutive_failures: 0,
        }
    }

    /// Replaces the report scheduler.
    pub fn with_report_scheduler(mut self, reports: ReportScheduler) -> Self {
        self.reports = reports;
        self
    }

    /// Restarts the report interval from now and returns its length.
    pub fn restart_reports(&mut self) -> Duration {
        self.reports.reset();
        self.reports.interval()
    }

    /// Runs one tick.
    pub fn tick(&mut self) -> TickOutcome {
        let recorded_bytes = match self.finalized_payload() {
            Ok(payload) => {
                let size = payload.len() as u64;
                self.metrics.record_event(size);
                self.recovered();
                Some(size)
            }
            Err(reason) => {
                self.failed(&reason);
                None
            }
        };

        let reported = self.reports.poll();
        if reported {
            self.metrics.report().log();
        }

        if self.config.packet_debugger() {
            log::debug!("[TickDriver] Last minute: {}", self.metrics.one_minute());
        }

        TickOutcome {
            recorded_bytes,
            reported,
        }
    }

    fn finalized_payload(&mut self) -> Result<Vec<u8>, String> {
        let source = &mut self.source;
        let state = guarded("state capture", || source.capture())?;
        let encoder = &self.encoder;
        guarded(encoder.name(), || encoder.encode(&state))
    }

    fn failed(&mut self, reason: &str) {
        self.consecutive_failures += 1;
        if self.consecutive_failures == 1 {
            log::warn!("[TickDriver] Tick skipped: {reason}");
        } else {
            log::debug!(
                "[TickDriver] Tick skipped ({} in a row): {reason}",
                self.consecutive_failures
            );
        }
    }

    fn recovered(&mut self) {
        if self.consecutive_failures > 0 {
            log::info!(
                "[TickDriver] Recovered after {} failed ticks",
                self.consecutive_failures
            );
            self.consecutive_failures = 0;
        }
    }
}

impl std::fmt::Debug for TickDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickDriver")
            .field("encoder", &self.encoder.name())
            .field("reports", &self.reports)
            .field("consecutive_failures", &self.consecutive_failures)
            .finish_non_exhaustive()
    }
}

/// Runs a collaborator call, turning both errors and panics into a message.
fn guarded<T>(
    stage: &str,
    call: impl FnOnce() -> anyhow::Result<T>,
) -> Result<T, String> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(format!("{stage} failed: {err:#}")),
        Err(payload) => Err(format!("{stage} panicked: {}", panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
