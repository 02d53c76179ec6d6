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

//! Monotonic time measurement.

use std::time::{Duration, Instant};

/// Measures elapsed monotonic time from a start point.
///
/// Unlike a [`Clock`](crate::Clock), a stopwatch is immune to wall-clock
/// adjustments, which makes it the right tool for timing tick work.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started_at: Instant,
}

impl Stopwatch {
    /// Creates a stopwatch started now.
    #[inline]
    pub fn start() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }

    /// The instant the stopwatch was started.
    #[inline]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Time elapsed since the start point.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const SLEEP_DURATION_MS: u64 = 50;
    const SLEEP_MARGIN_MS: u64 = 200;

    #[test]
    fn stopwatch_starts_near_zero() {
        let watch = Stopwatch::start();
        assert!(
            watch.elapsed() < Duration::from_millis(15),
            "Initial elapsed duration ({:?}) should be very small",
            watch.elapsed()
        );
    }

    #[test]
    fn stopwatch_elapsed_time_after_delay() {
        let watch = Stopwatch::start();
        thread::sleep(Duration::from_millis(SLEEP_DURATION_MS));

        let elapsed = watch.elapsed();
        assert!(elapsed >= Duration::from_millis(SLEEP_DURATION_MS));
        assert!(
            elapsed < Duration::from_millis(SLEEP_DURATION_MS + SLEEP_MARGIN_MS),
            "Elapsed duration ({elapsed:?}) exceeded the sleep margin"
        );
    }
}
