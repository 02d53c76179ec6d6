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


//! Runtime settings: the document shape, where it lives, and the cached,
//! hot-reloadable store serving it.

pub mod backend;
pub mod path;
pub mod settings;
pub mod store;

pub use backend::{FileBackend, SettingsBackend};
pub use path::{default_settings_path, settings_path_in, SETTINGS_RELATIVE_PATH};
pub use settings::{
    ConfigKey, ConfigValue, Settings, SettingsPatch, ValueKind, DEFAULT_TICK_FREQUENCY_HZ,
};
pub use store::{ConfigStore, LoadOutcome};
