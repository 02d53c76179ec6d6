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


//! Background service running the tick pipeline on its own thread.

use crate::driver::TickDriver;
use crate::scheduler::{LoopStats, PeriodicScheduler, SchedulerHandle};
use anyhow::Context as _;
use beacon_core::{Clock, PayloadEncoder, StateSource, SystemClock};
use beacon_io::ConfigStore;
use beacon_telemetry::{PacketMetrics, ReportScheduler, DEFAULT_REPORT_INTERVAL};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Configuration for the telemetry service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Time between two packet metrics reports.
    pub report_interval: Duration,
    /// Name given to the worker thread.
    pub thread_name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            report_interval: DEFAULT_REPORT_INTERVAL,
            thread_name: "beacon-tick".to_string(),
        }
    }
}

/// Owns the tick driver and the worker that runs it.
///
/// The tick frequency is read from the [`ConfigStore`] each time the service
/// starts; later edits to the file apply on the next start.
pub struct TelemetryService {
    settings: ServiceConfig,
    config: Arc<ConfigStore>,
    metrics: Arc<PacketMetrics>,
    driver: Arc<Mutex<TickDriver>>,
    handle: Option<SchedulerHandle>,
}

impl TelemetryService {
    /// Creates a stopped service on the system clock.
    pub fn new(
        settings: ServiceConfig,
        config: Arc<ConfigStore>,
        source: Box<dyn StateSource>,
        encoder: Arc<dyn PayloadEncoder>,
    ) -> Self {
        Self::with_clock(settings, config, source, encoder, Arc::new(SystemClock))
    }

    /// Creates a stopped service whose aggregator and report timer read `clock`.
    pub fn with_clock(
        settings: ServiceConfig,
        config: Arc<ConfigStore>,
        source: Box<dyn StateSource>,
        encoder: Arc<dyn PayloadEncoder>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let metrics = Arc::new(PacketMetrics::with_clock(clock.clone()));
        let reports = ReportScheduler::new(clock, settings.report_interval);
        let driver = TickDriver::new(source, encoder, metrics.clone(), config.clone())
            .with_report_scheduler(reports);

        Self {
            settings,
            config,
            metrics,
            driver: Arc::new(Mutex::new(driver)),
            handle: None,
        }
    }

    /// Starts the worker thread. Does nothing if already running.
    ///
    /// Fails only when the operating system refuses to spawn the thread.
    pub fn start(&mut self) -> anyhow::Result<()> {
        if self.is_running() {
            return Ok(());
        }

        let scheduler = PeriodicScheduler::from_config(&self.config);
        let report_interval = self
            .driver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .restart_reports();
        let driver = Arc::clone(&self.driver);
        let handle = scheduler
            .spawn(self.settings.thread_name.clone(), move || {
                driver.lock().unwrap_or_else(PoisonError::into_inner).tick();
            })
            .with_context(|| {
                format!(
                    "failed to spawn telemetry worker '{}'",
                    self.settings.thread_name
                )
            })?;

        log::info!(
            "[TelemetryService] Started at {} Hz, reporting every {:?} (settings: {})",
            scheduler.frequency_hz(),
            report_interval,
            self.config.location().display()
        );
        self.handle = Some(handle);
        Ok(())
    }

    /// Stops the worker and returns its loop counters, or `None` if it was not
    /// running.
    pub fn stop(&mut self) -> Option<LoopStats> {
        let stats = self.handle.take()?.stop();
        log::info!(
            "[TelemetryService] Stopped after {} ticks ({} overruns)",
            stats.iterations,
            stats.overruns
        );
        Some(stats)
    }

    /// Returns true while the worker thread is alive.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// The aggregator fed by this service.
    pub fn metrics(&self) -> Arc<PacketMetrics> {
        Arc::clone(&self.metrics)
    }

    /// The settings store this service reads.
    pub fn config(&self) -> Arc<ConfigStore> {
        Arc::clone(&self.config)
    }
}

impl Drop for TelemetryService {
    fn drop(&mut self) {
        self.stop();
    }
}
