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

//! The hot-reloadable settings store.

use super::backend::{FileBackend, SettingsBackend};
use super::path::default_settings_path;
use super::settings::{ConfigKey, ConfigValue, Settings, SettingsPatch};
use crate::error::{ConfigError, ConfigResult};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

/// Cached modification stamp meaning "never successfully read".
const NEVER_READ: u64 = 0;

/// Identifies a reported load failure: the document stamp, if one could be
/// read, and the error text.
type FailureKey = (Option<u64>, String);

/// What a call to [`ConfigStore::load`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The document has not changed since the last read; nothing was read.
    Unchanged,
    /// The document was read and applied.
    Reloaded,
    /// There is no document; in-memory values were kept.
    Missing,
    /// The document could not be read or parsed; in-memory values were kept.
    Failed,
}

/// Process-scoped settings backed by a document, reloaded when it changes.
///
/// Reads check the document's modification time against a cached stamp and
/// only touch its contents when the stamp differs, so [`get`](Self::get) is
/// cheap on the hot path. Reloads and saves are serialized by a single lock;
/// the cached stamp itself is an atomic read without that lock.
///
/// The store never fails a reader: I/O and parse errors are logged once per
/// observed document version and the last-known values keep being served.
#[derive(Debug)]
pub struct ConfigStore {
    backend: Arc<dyn SettingsBackend>,
    values: RwLock<Settings>,
    /// Serializes saves and reloads; holds the last load failure reported.
    io_lock: Mutex<Option<FailureKey>>,
    last_modified: AtomicU64,
}

impl ConfigStore {
    /// Creates a store over the file at `path`, starting from defaults.
    ///
    /// Nothing is read until the first access.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_backend(Arc::new(FileBackend::new(path)))
    }

    /// Creates a store over the default settings file of the installation.
    pub fn open_default() -> Self {
        Self::open(default_settings_path())
    }

    /// Creates a store with a custom backend.
    pub fn with_backend(backend: Arc<dyn SettingsBackend>) -> Self {
        Self {
            backend,
            values: RwLock::new(Settings::default()),
            io_lock: Mutex::new(None),
            last_modified: AtomicU64::new(NEVER_READ),
        }
    }

    /// Returns the current value of `key`, reloading first if the document
    /// changed.
    pub fn get(&self, key: ConfigKey) -> ConfigValue {
        self.settings().get(key)
    }

    /// Returns a copy of all current values, reloading first if the document
    /// changed.
    pub fn settings(&self) -> Settings {
        self.load(false);
        *self.values.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether per-tick packet debug logging is enabled.
    pub fn packet_debugger(&self) -> bool {
        self.settings().packet_debugger
    }

    /// Target tick loop frequency in Hz.
    pub fn tick_frequency(&self) -> u64 {
        self.settings().tick_frequency_hz
    }

    /// Updates the in-memory value of `key`. Nothing is persisted.
    pub fn set(&self, key: ConfigKey, value: ConfigValue) -> ConfigResult<()> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        match (key, value) {
            (ConfigKey::PacketDebugger, ConfigValue::Bool(enabled)) => {
                values.packet_debugger = enabled;
            }
            (ConfigKey::TickFrequency, ConfigValue::Integer(hz)) => {
                values.tick_frequency_hz = hz;
            }
            (key, value) => {
                return Err(ConfigError::TypeMismatch {
                    key,
                    expected: key.kind(),
                    found: value.kind(),
                });
            }
        }
        Ok(())
    }

    /// Enables or disables per-tick packet debug logging in memory.
    pub fn set_packet_debugger(&self, enabled: bool) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .packet_debugger = enabled;
    }

    /// Sets the tick loop frequency in memory.
    pub fn set_tick_frequency(&self, hz: u64) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .tick_frequency_hz = hz;
    }

    /// Writes the current in-memory values to the backend.
    ///
    /// The document is replaced atomically and the cached modification stamp
    /// is taken from the written file, so the next read does not reload our
    /// own write. On failure the error is logged and returned; in-memory
    /// values are untouched either way.
    pub fn save(&self) -> ConfigResult<()> {
        let _guard = self.io_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let settings = *self.values.read().unwrap_or_else(PoisonError::into_inner);

        let result = serde_json::to_string_pretty(&settings)
            .map_err(ConfigError::Serialize)
            .and_then(|json| self.backend.write(&json));

        match result {
            Ok(modified) => {
                self.last_modified.store(stamp(modified), Ordering::Release);
                log::debug!(
                    "[ConfigStore] Saved settings to {}",
                    self.backend.location().display()
                );
                Ok(())
            }
            Err(e) => {
                log::error!("[ConfigStore] Failed to save settings: {e}");
                Err(e)
            }
        }
    }

    /// Reloads the document if it changed, or unconditionally when `force`.
    ///
    /// An unforced call whose document stamp matches the cached one returns
    /// without taking the lock or reading anything.
    pub fn load(&self, force: bool) -> LoadOutcome {
        if !force {
            if let Ok(modified) = self.backend.modified() {
                if stamp(modified) == self.last_modified.load(Ordering::Acquire) {
                    return LoadOutcome::Unchanged;
                }
            }
        }

        let mut last_failure = self.io_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.reload_locked(force, &mut last_failure)
    }

    /// The location of the backing document.
    pub fn location(&self) -> PathBuf {
        self.backend.location().to_path_buf()
    }

    fn reload_locked(&self, force: bool, last_failure: &mut Option<FailureKey>) -> LoadOutcome {
        let modified = match self.backend.modified() {
            Ok(modified) => Some(stamp(modified)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return self.mark_missing(force),
            Err(e) => {
                log::debug!(
                    "[ConfigStore] Cannot read modification time of {}: {e}",
                    self.backend.location().display()
                );
                None
            }
        };

        // Another thread may have reloaded while we waited for the lock.
        if !force && modified == Some(self.last_modified.load(Ordering::Acquire)) {
            return LoadOutcome::Unchanged;
        }

        let text = match self.backend.read() {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return self.mark_missing(force),
            Err(source) => {
                let err = ConfigError::Read {
                    path: self.location(),
                    source,
                };
                return self.mark_failed(err, modified, last_failure);
            }
        };

        let patch = match SettingsPatch::from_json(&text) {
            Ok(patch) => patch,
            Err(source) => {
                let err = ConfigError::Parse {
                    path: self.location(),
                    source,
                };
                return self.mark_failed(err, modified, last_failure);
            }
        };
        if patch.is_empty() {
            log::debug!(
                "[ConfigStore] {} has no recognised settings, keeping current values",
                self.backend.location().display()
            );
        }

        let applied = {
            let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
            values.apply(&patch);
            *values
        };
        let observed = modified.unwrap_or_else(|| stamp(SystemTime::now()));
        self.last_modified.store(observed, Ordering::Release);
        *last_failure = None;

        log::info!(
            "[ConfigStore] Loaded settings from {} (packet_debugger={}, tick_frequency_hz={})",
            self.backend.location().display(),
            applied.packet_debugger,
            applied.tick_frequency_hz
        );
        LoadOutcome::Reloaded
    }

    fn mark_missing(&self, force: bool) -> LoadOutcome {
        if force {
            // Forget the last version so a newly created file is picked up.
            self.last_modified.store(NEVER_READ, Ordering::Release);
            log::debug!(
                "[ConfigStore] No settings at {}, keeping current values",
                self.backend.location().display()
            );
        }
        LoadOutcome::Missing
    }

    fn mark_failed(
        &self,
        err: ConfigError,
        modified: Option<u64>,
        last_failure: &mut Option<FailureKey>,
    ) -> LoadOutcome {
        if first_report(last_failure, (modified, err.to_string())) {
            log::warn!("[ConfigStore] {err}; keeping last known settings");
        } else {
            log::trace!("[ConfigStore] {err} (already reported)");
        }
        // Remember the broken version so unforced reads skip it entirely.
        if let Some(modified) = modified {
            self.last_modified.store(modified, Ordering::Release);
        }
        LoadOutcome::Failed
    }
}

/// Records `key` as the last reported failure. Returns false if it was
/// already the last one reported.
fn first_report(last_failure: &mut Option<FailureKey>, key: FailureKey) -> bool {
    if last_failure.as_ref() == Some(&key) {
        return false;
    }
    *last_failure = Some(key);
    true
}

/// Encodes a modification time as nanoseconds since the epoch, never equal to
/// [`NEVER_READ`].
fn stamp(time: SystemTime) -> u64 {
    let nanos = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    nanos.max(NEVER_READ + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn store_in(dir: &tempfile::TempDir) -> (ConfigStore, PathBuf) {
        let path = dir.path().join("settings.json");
        (ConfigStore::open(&path), path)
    }

    #[test]
    fn test_defaults_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = store_in(&dir);

        assert_eq!(store.load(true), LoadOutcome::Missing);
        assert!(!store.packet_debugger());
        assert_eq!(store.tick_frequency(), 30);
    }

    #[test]
    fn test_set_is_memory_only() {
        let dir = tempfile::tempdir().unwrap();
        let (store, path) = store_in(&dir);

        store
            .set(ConfigKey::TickFrequency, ConfigValue::Integer(90))
            .unwrap();
        assert_eq!(store.get(ConfigKey::TickFrequency), ConfigValue::Integer(90));
        assert!(!path.exists(), "set() must not persist");
    }

    #[test]
    fn test_set_rejects_wrong_kind() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = store_in(&dir);

        let err = store
            .set(ConfigKey::PacketDebugger, ConfigValue::Integer(1))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TypeMismatch {
                key: ConfigKey::PacketDebugger,
                ..
            }
        ));
        assert_eq!(store.get(ConfigKey::PacketDebugger), ConfigValue::Bool(false));
    }

    #[test]
    fn test_save_does_not_trigger_reload_of_own_write() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = store_in(&dir);

        store.set_tick_frequency(12);
        store.save().unwrap();
        assert_eq!(store.load(false), LoadOutcome::Unchanged);
    }

    #[test]
    fn test_malformed_file_keeps_values_and_reports_once() {
        let dir = tempfile::tempdir().unwrap();
        let (store, path) = store_in(&dir);
        fs::write(&path, r#"{ "tick_frequency_hz": 15 }"#).unwrap();
        assert_eq!(store.tick_frequency(), 15);

        // Make sure the rewrite gets a distinct mtime on coarse filesystems.
        std::thread::sleep(std::time::Duration::from_millis(20));
        fs::write(&path, "{ broken").unwrap();
        let outcome = store.load(false);
        if outcome != LoadOutcome::Unchanged {
            assert_eq!(outcome, LoadOutcome::Failed);
            assert_eq!(store.load(false), LoadOutcome::Unchanged);
        }
        assert_eq!(store.tick_frequency(), 15);
    }

    #[test]
    fn test_forced_load_of_missing_file_resets_stamp() {
        let dir = tempfile::tempdir().unwrap();
        let (store, path) = store_in(&dir);
        fs::write(&path, r#"{ "packet_debugger": true }"#).unwrap();
        assert_eq!(store.load(false), LoadOutcome::Reloaded);

        fs::remove_file(&path).unwrap();
        assert_eq!(store.load(true), LoadOutcome::Missing);
        assert_eq!(store.last_modified.load(Ordering::Acquire), NEVER_READ);
        assert!(store.packet_debugger(), "Values survive a missing file");
    }

    /// A backend that can neither stat nor read its document.
    #[derive(Debug)]
    struct UnreadableBackend {
        path: PathBuf,
    }

    impl SettingsBackend for UnreadableBackend {
        fn location(&self) -> &std::path::Path {
            &self.path
        }

        fn modified(&self) -> io::Result<SystemTime> {
            Err(io::Error::new(io::ErrorKind::Unsupported, "no mtime"))
        }

        fn read(&self) -> io::Result<String> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }

        fn write(&self, _contents: &str) -> ConfigResult<SystemTime> {
            Ok(SystemTime::now())
        }
    }

    #[test]
    fn test_unstamped_failure_is_reported_once() {
        let store = ConfigStore::with_backend(Arc::new(UnreadableBackend {
            path: PathBuf::from("settings.json"),
        }));

        for _ in 0..3 {
            assert_eq!(store.load(false), LoadOutcome::Failed);
            assert_eq!(store.tick_frequency(), 30);
        }

        let last = store.io_lock.lock().unwrap().clone();
        let (modified, message) = last.expect("failure should be remembered");
        assert_eq!(modified, None);
        assert!(message.contains("denied"));

        // Same failure again: not a new report.
        let key = (None, message);
        let mut remembered = Some(key.clone());
        assert!(!first_report(&mut remembered, key));
    }

    #[test]
    fn test_failure_reports_follow_version_and_message() {
        let mut last = None;
        assert!(first_report(&mut last, (Some(1), "bad".to_string())));
        assert!(!first_report(&mut last, (Some(1), "bad".to_string())));
        assert!(first_report(&mut last, (Some(2), "bad".to_string())));
        assert!(first_report(&mut last, (Some(2), "worse".to_string())));
        assert!(first_report(&mut last, (None, "worse".to_string())));
        assert!(!first_report(&mut last, (None, "worse".to_string())));
    }

    #[test]
    fn test_successful_reload_clears_remembered_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (store, path) = store_in(&dir);
        fs::write(&path, "{ broken").unwrap();
        assert_eq!(store.load(true), LoadOutcome::Failed);
        assert!(store.io_lock.lock().unwrap().is_some());

        fs::write(&path, r#"{ "tick_frequency_hz": 40 }"#).unwrap();
        assert_eq!(store.load(true), LoadOutcome::Reloaded);
        assert!(store.io_lock.lock().unwrap().is_none());
        assert_eq!(store.tick_frequency(), 40);
    }

    #[test]
    fn test_document_without_known_fields_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let (store, path) = store_in(&dir);
        store.set_tick_frequency(75);
        fs::write(&path, r#"{ "volume": 3 }"#).unwrap();

        assert_eq!(store.load(true), LoadOutcome::Reloaded);
        assert_eq!(store.tick_frequency(), 75);
    }

    #[test]
    fn test_stamp_never_collides_with_sentinel() {
        assert_ne!(stamp(UNIX_EPOCH), NEVER_READ);
    }
}
