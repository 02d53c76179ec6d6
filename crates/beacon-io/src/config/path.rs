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

//! Resolution of the default settings file location.

use std::path::{Path, PathBuf};

/// Path of the settings file relative to the installation directory.
pub const SETTINGS_RELATIVE_PATH: &str = "config/beacon/settings.json";

/// Returns `<install dir>/config/beacon/settings.json`.
///
/// The installation directory is the directory holding the running
/// executable. When it cannot be determined the current working directory is
/// used instead.
pub fn default_settings_path() -> PathBuf {
    let base = install_dir().unwrap_or_else(|| {
        log::warn!(
            "[Settings] Could not resolve the executable location, falling back to the working directory"
        );
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    });
    settings_path_in(&base)
}

/// Returns the settings path under an explicit installation directory.
pub fn settings_path_in(base: &Path) -> PathBuf {
    base.join(SETTINGS_RELATIVE_PATH)
}

fn install_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    exe.parent().map(Path::to_path_buf)
}
