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


//! # Beacon I/O
//!
//! I/O services of the telemetry pipeline: the hot-reloadable settings store
//! and the encoders that finalize captured payloads before they are measured.

#![warn(missing_docs)]

pub mod codec;
pub mod config;
pub mod error;

pub use codec::{IdentityEncoder, Lz4Encoder};
pub use config::{ConfigKey, ConfigStore, ConfigValue, LoadOutcome, Settings};
pub use error::{CodecError, ConfigError, ConfigResult};
