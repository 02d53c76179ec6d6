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

//! # Beacon Core
//!
//! Foundational crate containing the traits, core types and interface contracts
//! shared by the tick telemetry pipeline.
//!
//! Nothing in here performs I/O or spawns threads. Higher-level crates
//! (`beacon-io`, `beacon-telemetry`, `beacon-control`) provide the concrete
//! behaviour on top of these contracts.

#![warn(missing_docs)]

pub mod clock;
pub mod source;
pub mod telemetry;
pub mod utils;

pub use clock::{Clock, ManualClock, SystemClock};
pub use source::{PayloadEncoder, StateSource};
pub use utils::timer::Stopwatch;
