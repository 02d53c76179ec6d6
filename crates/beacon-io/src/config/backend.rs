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

//! Storage seam for the settings document.

use crate::error::{ConfigError, ConfigResult};
use std::fmt::Debug;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::NamedTempFile;

/// Trait defining where the settings document lives.
///
/// The store only ever talks to its backend, so tests can wrap a real backend
/// to observe or fault-inject disk access.
pub trait SettingsBackend: Send + Sync + Debug + 'static {
    /// Human-readable location, used in errors and logs.
    fn location(&self) -> &Path;

    /// Last-modified time of the document.
    ///
    /// A missing document is reported as an error of kind
    /// [`io::ErrorKind::NotFound`].
    fn modified(&self) -> io::Result<SystemTime>;

    /// Reads the whole document.
    fn read(&self) -> io::Result<String>;

    /// Replaces the whole document with `contents`, returning the new
    /// last-modified time.
    ///
    /// Readers must never observe a partially written document.
    fn write(&self, contents: &str) -> ConfigResult<SystemTime>;
}

/// Settings stored in a single file on the local filesystem.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so the replacement is atomic on every platform where a
/// same-directory rename is.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Creates a backend for the file at `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl SettingsBackend for FileBackend {
    fn location(&self) -> &Path {
        &self.path
    }

    fn modified(&self) -> io::Result<SystemTime> {
        fs::metadata(&self.path)?.modified()
    }

    fn read(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }

    fn write(&self, contents: &str) -> ConfigResult<SystemTime> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir).map_err(|source| ConfigError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let write_err = |source: io::Error| ConfigError::Write {
            path: self.path.clone(),
            source,
        };

        let mut staged = NamedTempFile::new_in(dir).map_err(write_err)?;
        staged.write_all(contents.as_bytes()).map_err(write_err)?;
        staged.as_file().sync_all().map_err(write_err)?;
        staged
            .persist(&self.path)
            .map_err(|persist| write_err(persist.error))?;

        // Some filesystems cannot report mtimes; fall back to the write instant.
        Ok(self.modified().unwrap_or_else(|_| SystemTime::now()))
    }
}
