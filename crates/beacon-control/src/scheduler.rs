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


//! Drift-compensated periodic execution on a dedicated worker thread.

use crate::cancel::CancellationToken;
use beacon_core::Stopwatch;
use beacon_io::ConfigStore;
use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Lowest accepted tick frequency.
pub const MIN_FREQUENCY_HZ: u64 = 1;
/// Highest accepted tick frequency.
pub const MAX_FREQUENCY_HZ: u64 = 1000;

/// Tail of each rest spent in a plain sleep rather than a channel wait, to
/// land close to the deadline.
const FINE_REST: Duration = Duration::from_millis(1);

/// Counters reported by a loop when it exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Completed work iterations.
    pub iterations: u64,
    /// Iterations whose work took at least a full period.
    pub overruns: u64,
}

/// Runs a unit of work at a fixed frequency, subtracting the work's own
/// duration from each rest so the cadence does not drift.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicScheduler {
    frequency_hz: u64,
    period: Duration,
}

impl PeriodicScheduler {
    /// Creates a scheduler ticking `frequency_hz` times per second.
    ///
    /// Out-of-range frequencies are clamped to
    /// [`MIN_FREQUENCY_HZ`]..=[`MAX_FREQUENCY_HZ`] with a warning.
    pub fn new(frequency_hz: u64) -> Self {
        let clamped = frequency_hz.clamp(MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ);
        if clamped != frequency_hz {
            log::warn!(
                "[PeriodicScheduler] Tick frequency {frequency_hz} Hz is out of range, using {clamped} Hz"
            );
        }
        Self {
            frequency_hz: clamped,
            period: Duration::from_secs(1) / clamped as u32,
        }
    }

    /// Creates a scheduler from the store's current tick frequency.
    pub fn from_config(config: &ConfigStore) -> Self {
        Self::new(config.tick_frequency())
    }

    /// Effective frequency after clamping.
    pub fn frequency_hz(&self) -> u64 {
        self.frequency_hz
    }

    /// Target time between the starts of two iterations.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Runs `work` on the calling thread until `token` is cancelled.
    pub fn run<F>(&self, token: &CancellationToken, mut work: F) -> LoopStats
    where
        F: FnMut(),
    {
        let mut stats = LoopStats::default();
        log::debug!(
            "[PeriodicScheduler] Loop started at {} Hz ({:?} period)",
            self.frequency_hz,
            self.period
        );

        while !token.is_cancelled() {
            let tick = Stopwatch::start();
            work();
            stats.iterations += 1;

            let elapsed = tick.elapsed();
            if elapsed < self.period {
                if self.rest(token, tick.started_at() + self.period) {
                    break;
                }
            } else {
                stats.overruns += 1;
                log::trace!(
                    "[PeriodicScheduler] Overrun: work took {elapsed:?} of a {:?} period",
                    self.period
                );
                thread::yield_now();
            }
        }

        log::debug!(
            "[PeriodicScheduler] Loop stopped after {} iterations ({} overruns)",
            stats.iterations,
            stats.overruns
        );
        stats
    }

    /// Spawns a named worker thread running `work` until the returned handle
    /// is stopped or dropped.
    pub fn spawn<F>(self, name: impl Into<String>, work: F) -> io::Result<SchedulerHandle>
    where
        F: FnMut() + Send + 'static,
    {
        let token = CancellationToken::new();
        let worker_token = token.clone();
        let handle = thread::Builder::new()
            .name(name.into())
            .spawn(move || self.run(&worker_token, work))?;

        Ok(SchedulerHandle {
            token,
            handle: Some(handle),
        })
    }

    /// Blocks until `deadline`. Returns true if cancelled meanwhile.
    ///
    /// The bulk of the rest is an interruptible wait on the token; the last
    /// [`FINE_REST`] is a plain sleep so the wake-up lands on the deadline.
    /// Neither phase spins.
    fn rest(&self, token: &CancellationToken, deadline: Instant) -> bool {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining > FINE_REST && token.wait(remaining - FINE_REST) {
            return true;
        }
        let tail = deadline.saturating_duration_since(Instant::now());
        if !tail.is_zero() {
            thread::sleep(tail);
        }
        token.is_cancelled()
    }
}

/// Owner side of a spawned scheduler loop.
///
/// Dropping the handle cancels the loop and joins the worker.
#[derive(Debug)]
pub struct SchedulerHandle {
    token: CancellationToken,
    handle: Option<JoinHandle<LoopStats>>,
}

impl SchedulerHandle {
    /// Returns true once the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Cancels the loop, waits for the current iteration to finish and
    /// returns the loop's counters.
    pub fn stop(mut self) -> LoopStats {
        self.shutdown()
    }

    fn shutdown(&mut self) -> LoopStats {
        self.token.cancel();
        let Some(handle) = self.handle.take() else {
            return LoopStats::default();
        };
        handle.join().unwrap_or_else(|_| {
            log::error!("[PeriodicScheduler] Worker thread panicked");
            LoopStats::default()
        })
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
