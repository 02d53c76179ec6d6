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


//! # Beacon Control
//!
//! The control plane of the telemetry pipeline: cooperative cancellation, the
//! drift-compensated periodic scheduler, the per-tick driver and the service
//! that ties them to a worker thread.

#![warn(missing_docs)]

pub mod cancel;
pub mod driver;
pub mod scheduler;
pub mod service;

pub use cancel::CancellationToken;
pub use driver::{TickDriver, TickOutcome};
pub use scheduler::{
    LoopStats, PeriodicScheduler, SchedulerHandle, MAX_FREQUENCY_HZ, MIN_FREQUENCY_HZ,
};
pub use service::{ServiceConfig, TelemetryService};
