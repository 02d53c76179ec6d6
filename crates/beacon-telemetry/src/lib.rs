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


//! # Beacon Telemetry
//!
//! Rolling-window aggregation of outbound packet events and the periodic
//! human-readable report built on top of it.

#![warn(missing_docs)]

pub mod packet_metrics;
pub mod report;
pub mod scheduler;

pub use packet_metrics::PacketMetrics;
pub use report::MetricsReport;
pub use scheduler::{ReportScheduler, DEFAULT_REPORT_INTERVAL};

