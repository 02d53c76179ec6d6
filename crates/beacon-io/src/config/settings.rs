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

//! The settings document and its typed keys.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display};

/// Default tick frequency, in ticks per second.
pub const DEFAULT_TICK_FREQUENCY_HZ: u64 = 30;

/// Runtime-tunable settings.
///
/// This is both the in-memory state of the store and the exact shape written
/// to disk: saving emits these two fields and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Logs the one-minute packet snapshot after every tick when enabled.
    pub packet_debugger: bool,
    /// Target frequency of the tick loop.
    pub tick_frequency_hz: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            packet_debugger: false,
            tick_frequency_hz: DEFAULT_TICK_FREQUENCY_HZ,
        }
    }
}

impl Settings {
    /// Reads the value stored under `key`.
    pub fn get(&self, key: ConfigKey) -> ConfigValue {
        match key {
            ConfigKey::PacketDebugger => ConfigValue::Bool(self.packet_debugger),
            ConfigKey::TickFrequency => ConfigValue::Integer(self.tick_frequency_hz),
        }
    }

    /// Overwrites the fields present in `patch`, keeping the others.
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(enabled) = patch.packet_debugger {
            self.packet_debugger = enabled;
        }
        if let Some(hz) = patch.tick_frequency_hz {
            self.tick_frequency_hz = hz;
        }
    }
}

/// The fields recovered from a settings document.
///
/// A field that is absent, or present with the wrong JSON type, is `None` and
/// leaves the corresponding in-memory value alone. Unknown fields are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    /// Value of `packet_debugger`, if usable.
    pub packet_debugger: Option<bool>,
    /// Value of `tick_frequency_hz`, if usable.
    pub tick_frequency_hz: Option<u64>,
}

impl SettingsPatch {
    /// Parses a settings document.
    ///
    /// Fails only when the text is not JSON or the top level is not an object.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let root: Value = serde_json::from_str(text)?;
        let Value::Object(fields) = root else {
            return Err(<serde_json::Error as serde::de::Error>::custom(
                "settings document must be a JSON object",
            ));
        };

        let mut patch = SettingsPatch::default();
        if let Some(value) = fields.get(ConfigKey::PacketDebugger.field_name()) {
            patch.packet_debugger = value.as_bool();
            if patch.packet_debugger.is_none() {
                log::warn!("[Settings] Ignoring non-boolean `packet_debugger`: {value}");
            }
        }
        if let Some(value) = fields.get(ConfigKey::TickFrequency.field_name()) {
            patch.tick_frequency_hz = value.as_u64();
            if patch.tick_frequency_hz.is_none() {
                log::warn!("[Settings] Ignoring non-integer `tick_frequency_hz`: {value}");
            }
        }
        Ok(patch)
    }

    /// Returns `true` if the document carried no usable field.
    pub fn is_empty(&self) -> bool {
        self.packet_debugger.is_none() && self.tick_frequency_hz.is_none()
    }
}

/// A named setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    /// Boolean: per-tick packet debug logging.
    PacketDebugger,
    /// Integer: tick loop frequency in Hz.
    TickFrequency,
}

impl ConfigKey {
    /// The JSON field this key is stored under.
    pub const fn field_name(self) -> &'static str {
        match self {
            ConfigKey::PacketDebugger => "packet_debugger",
            ConfigKey::TickFrequency => "tick_frequency_hz",
        }
    }

    /// The kind of value this key stores.
    pub const fn kind(self) -> ValueKind {
        match self {
            ConfigKey::PacketDebugger => ValueKind::Bool,
            ConfigKey::TickFrequency => ValueKind::Integer,
        }
    }
}

impl Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// A typed setting value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigValue {
    /// A flag.
    Bool(bool),
    /// A non-negative integer.
    Integer(u64),
}

impl ConfigValue {
    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            ConfigValue::Bool(_) => ValueKind::Bool,
            ConfigValue::Integer(_) => ValueKind::Integer,
        }
    }
}

/// The kind of a [`ConfigValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// `true` / `false`.
    Bool,
    /// Unsigned integer.
    Integer,
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Bool => f.write_str("boolean"),
            ValueKind::Integer => f.write_str("integer"),
        }
    }
}
