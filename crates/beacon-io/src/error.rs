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

//! Error types for the I/O crate.

use crate::config::settings::{ConfigKey, ValueKind};
use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for settings operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// An error raised while reading, parsing, writing or updating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file exists but could not be read.
    #[error("failed to read settings from {path}: {source}")]
    Read {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The settings file was read but is not a valid settings document.
    #[error("malformed settings document in {path}: {source}")]
    Parse {
        /// The file that was being parsed.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory settings could not be serialized.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The parent directory of the settings file could not be created.
    #[error("failed to create settings directory {path}: {source}")]
    CreateDir {
        /// The directory that was being created.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing or atomically replacing the settings file failed.
    #[error("failed to write settings to {path}: {source}")]
    Write {
        /// The file that was being written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A value of the wrong kind was supplied for a key.
    #[error("setting `{key}` expects a {expected} value, got a {found} value")]
    TypeMismatch {
        /// The key being set.
        key: ConfigKey,
        /// The kind of value the key stores.
        expected: ValueKind,
        /// The kind of value that was supplied.
        found: ValueKind,
    },
}

/// An error raised by a payload encoder.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The payload exceeds what the codec can frame.
    #[error("payload of {len} bytes exceeds the {codec} frame limit of {limit} bytes")]
    PayloadTooLarge {
        /// The codec that rejected the payload.
        codec: &'static str,
        /// The payload length.
        len: usize,
        /// The largest accepted payload length.
        limit: usize,
    },
}
