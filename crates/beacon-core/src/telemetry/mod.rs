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

//! Provides the data structures shared by everything that records or reads
//! packet telemetry.
//!
//! This module defines the "common language" of the pipeline: what a recorded
//! packet looks like, which windows are tracked, and the immutable snapshot
//! values derived from them. `beacon-telemetry` owns the live aggregate state
//! and produces these values on demand.

pub mod packet;

pub use self::packet::{
    format_bytes, group_thousands, MetricsSnapshot, PacketRecord, TrackedWindow, WindowedMetrics,
};
