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

//! Timing of the periodic packet metrics report.

use beacon_core::Clock;
use std::sync::Arc;
use std::time::Duration;

/// Default time between two packet metrics reports.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(60);

/// Scheduler for the periodic packet metrics report.
#[derive(Debug)]
pub struct ReportScheduler {
    clock: Arc<dyn Clock>,
    last_report_millis: u64,
    interval: Duration,
}

impl ReportScheduler {
    /// Creates a scheduler whose first report is due one `interval` from now.
    pub fn new(clock: Arc<dyn Clock>, interval: Duration) -> Self {
        let last_report_millis = clock.now_millis();
        Self {
            clock,
            last_report_millis,
            interval,
        }
    }

    /// Creates a scheduler reporting every 60 seconds.
    pub fn with_default_interval(clock: Arc<dyn Clock>) -> Self {
        Self::new(clock, DEFAULT_REPORT_INTERVAL)
    }

    /// Returns true once the interval has elapsed since the last report.
    pub fn should_report(&self) -> bool {
        let since_last = self
            .clock
            .now_millis()
            .saturating_sub(self.last_report_millis);
        u128::from(since_last) >= self.interval.as_millis()
    }

    /// Marks that a report has been emitted, restarting the interval.
    pub fn mark_reported(&mut self) {
        self.last_report_millis = self.clock.now_millis();
    }

    /// Checks and marks in one step. Returns true when a report is due.
    pub fn poll(&mut self) -> bool {
        if self.should_report() {
            self.mark_reported();
            true
        } else {
            false
        }
    }

    /// Gets the current interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Restarts the interval from now.
    pub fn reset(&mut self) {
        self.mark_reported();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_core::ManualClock;

    fn manual() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(10_000))
    }

    #[test]
    fn scheduler_creation() {
        let scheduler = ReportScheduler::with_default_interval(manual());
        assert_eq!(scheduler.interval(), Duration::from_secs(60));
        assert!(!scheduler.should_report());
    }

    #[test]
    fn scheduler_reset_restarts_interval() {
        let clock = manual();
        let mut scheduler = ReportScheduler::new(clock.clone(), Duration::from_secs(5));

        clock.advance(Duration::from_secs(4));
        scheduler.reset();
        clock.advance(Duration::from_secs(4));
        assert!(!scheduler.should_report());

        clock.advance(Duration::from_secs(1));
        assert!(scheduler.should_report());
    }

    #[test]
    fn scheduler_timing_logic() {
        let clock = manual();
        let mut scheduler = ReportScheduler::new(clock.clone(), Duration::from_secs(60));

        clock.advance(Duration::from_millis(59_999));
        assert!(!scheduler.should_report());

        clock.advance(Duration::from_millis(1));
        assert!(scheduler.should_report());

        scheduler.mark_reported();
        assert!(!scheduler.should_report());
    }

    #[test]
    fn scheduler_poll_fires_once_per_interval() {
        let clock = manual();
        let mut scheduler = ReportScheduler::new(clock.clone(), Duration::from_secs(1));

        let mut fired = 0;
        for _ in 0..30 {
            clock.advance(Duration::from_millis(100));
            if scheduler.poll() {
                fired += 1;
            }
        }
        assert_eq!(fired, 3);
    }
}
