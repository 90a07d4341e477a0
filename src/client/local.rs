//! On-device storage: one JSON record per domain namespace.
//!
//! Daily domains (mood, meals, hydration) hold a map from day key to that
//! day's record, mirroring the remote key layout. Reads that find nothing or
//! cannot decode what they find return the caller's default; failed writes
//! are logged and dropped.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::error::LocalStorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Mood,
    Meals,
    Hydration,
    Stats,
    Achievements,
}

impl Namespace {
    pub fn storage_key(self) -> &'static str {
        match self {
            Namespace::Mood => "wellness_mood",
            Namespace::Meals => "wellness_meals",
            Namespace::Hydration => "wellness_hydration",
            Namespace::Stats => "wellness_stats",
            Namespace::Achievements => "wellness_achievements",
        }
    }
}

enum Backend {
    Directory(PathBuf),
    Memory(Mutex<HashMap<Namespace, String>>),
}

pub struct LocalStore {
    backend: Backend,
}

impl LocalStore {
    /// Persists each namespace as `<dir>/<storage_key>.json`.
    pub fn in_directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::Directory(dir.into()),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Mutex::new(HashMap::new())),
        }
    }

    pub fn read<T: DeserializeOwned>(&self, namespace: Namespace, default: T) -> T {
        let raw = match self.load(namespace) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                tracing::error!(error = %e, namespace = namespace.storage_key(), "Error reading local store");
                return default;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(error = %e, namespace = namespace.storage_key(), "Discarding unreadable local record");
                default
            }
        }
    }

    pub fn write<T: Serialize>(&self, namespace: Namespace, value: &T) {
        if let Err(e) = self.store(namespace, value) {
            tracing::error!(error = %e, namespace = namespace.storage_key(), "Error writing local store");
        }
    }

    pub fn read_day<T: DeserializeOwned>(&self, namespace: Namespace, day: &str) -> Option<T> {
        let mut days = self.read_days(namespace);
        decode_day(namespace, day, days.remove(day)?)
    }

    /// Read-modify-write of one day's record, returning the updated record.
    /// Other days are written back exactly as they were read.
    pub fn update_day<T, F>(&self, namespace: Namespace, day: &str, update: F) -> T
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(&mut T),
    {
        let mut days = self.read_days(namespace);
        let mut record: T = days
            .remove(day)
            .and_then(|raw| decode_day(namespace, day, raw))
            .unwrap_or_default();
        update(&mut record);
        self.put_encoded(namespace, days, day, &record);
        record
    }

    /// Replaces one day's record outright.
    pub fn put_day<T: Serialize>(&self, namespace: Namespace, day: &str, value: T) {
        let days = self.read_days(namespace);
        self.put_encoded(namespace, days, day, &value);
    }

    /// Days stay as raw JSON so one undecodable day cannot take the rest with it.
    fn read_days(&self, namespace: Namespace) -> BTreeMap<String, Value> {
        self.read(namespace, BTreeMap::new())
    }

    fn put_encoded<T: Serialize>(
        &self,
        namespace: Namespace,
        mut days: BTreeMap<String, Value>,
        day: &str,
        value: &T,
    ) {
        match serde_json::to_value(value) {
            Ok(encoded) => {
                days.insert(day.to_string(), encoded);
                self.write(namespace, &days);
            }
            Err(e) => {
                tracing::error!(error = %e, namespace = namespace.storage_key(), day, "Error encoding local record");
            }
        }
    }

    fn load(&self, namespace: Namespace) -> Result<Option<String>, LocalStorageError> {
        match &self.backend {
            Backend::Directory(dir) => {
                let path = record_path(dir, namespace);
                match fs::read_to_string(&path) {
                    Ok(raw) => Ok(Some(raw)),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                    Err(e) => Err(e.into()),
                }
            }
            Backend::Memory(map) => Ok(map
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .get(&namespace)
                .cloned()),
        }
    }

    fn store<T: Serialize>(&self, namespace: Namespace, value: &T) -> Result<(), LocalStorageError> {
        let raw = serde_json::to_string(value)?;
        match &self.backend {
            Backend::Directory(dir) => {
                fs::create_dir_all(dir)?;
                let path = record_path(dir, namespace);
                let tmp = path.with_extension("json.tmp");
                fs::write(&tmp, raw)?;
                fs::rename(&tmp, &path)?;
            }
            Backend::Memory(map) => {
                map.lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .insert(namespace, raw);
            }
        }
        Ok(())
    }
}

fn decode_day<T: DeserializeOwned>(namespace: Namespace, day: &str, raw: Value) -> Option<T> {
    match serde_json::from_value(raw) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::error!(error = %e, namespace = namespace.storage_key(), day, "Discarding unreadable local day");
            None
        }
    }
}

fn record_path(dir: &Path, namespace: Namespace) -> PathBuf {
    dir.join(format!("{}.json", namespace.storage_key()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::hydration::HydrationLog;
    use crate::models::stats::StatsSnapshot;
    use chrono::Utc;

    #[test]
    fn test_missing_namespace_returns_default() {
        let store = LocalStore::in_memory();
        let stats = store.read(Namespace::Stats, StatsSnapshot::default());
        assert_eq!(stats, StatsSnapshot::default());
        assert!(store.read_day::<HydrationLog>(Namespace::Hydration, "2026-02-10").is_none());
    }

    #[test]
    fn test_update_day_is_per_day() {
        let store = LocalStore::in_memory();
        store.update_day(Namespace::Hydration, "2026-02-10", |log: &mut HydrationLog| {
            log.record(250.0, Utc::now())
        });
        let updated = store.update_day(Namespace::Hydration, "2026-02-10", |log: &mut HydrationLog| {
            log.record(500.0, Utc::now())
        });
        store.update_day(Namespace::Hydration, "2026-02-11", |log: &mut HydrationLog| {
            log.record(100.0, Utc::now())
        });

        assert_eq!(updated.total, 750.0);
        let other: HydrationLog = store.read_day(Namespace::Hydration, "2026-02-11").unwrap();
        assert_eq!(other.total, 100.0);
    }

    #[test]
    fn test_directory_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let stats = StatsSnapshot {
            days_active: 3,
            current_streak: 2,
            avg_calories: 1650.0,
        };
        LocalStore::in_directory(dir.path()).write(Namespace::Stats, &stats);

        let reopened = LocalStore::in_directory(dir.path());
        assert_eq!(reopened.read(Namespace::Stats, StatsSnapshot::default()), stats);
        assert!(dir.path().join("wellness_stats.json").exists());
    }

    #[test]
    fn test_corrupt_record_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("wellness_stats.json"), "{not json").unwrap();

        let store = LocalStore::in_directory(dir.path());
        assert_eq!(store.read(Namespace::Stats, StatsSnapshot::default()), StatsSnapshot::default());
    }

    #[test]
    fn test_unreadable_day_leaves_other_days_intact() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::in_directory(dir.path());
        store.update_day(Namespace::Hydration, "2026-02-09", |log: &mut HydrationLog| {
            log.record(250.0, Utc::now())
        });

        let path = dir.path().join("wellness_hydration.json");
        let mut days: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        days["2026-02-01"] = serde_json::json!({
            "entries": [{ "amount": "100", "timestamp": "2026-02-01T09:00:00Z" }],
            "total": 100
        });
        fs::write(&path, days.to_string()).unwrap();

        assert!(store.read_day::<HydrationLog>(Namespace::Hydration, "2026-02-01").is_none());
        let updated = store.update_day(Namespace::Hydration, "2026-02-10", |log: &mut HydrationLog| {
            log.record(500.0, Utc::now())
        });
        assert_eq!(updated.total, 500.0);

        let kept: HydrationLog = store.read_day(Namespace::Hydration, "2026-02-09").unwrap();
        assert_eq!(kept.total, 250.0);
        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["2026-02-01"]["entries"][0]["amount"], "100");
    }

    #[test]
    fn test_unreadable_day_is_replaced_on_update() {
        let store = LocalStore::in_memory();
        store.write(
            Namespace::Hydration,
            &serde_json::json!({ "2026-02-10": { "entries": "oops" } }),
        );

        let updated = store.update_day(Namespace::Hydration, "2026-02-10", |log: &mut HydrationLog| {
            log.record(250.0, Utc::now())
        });
        assert_eq!(updated.total, 250.0);
        assert_eq!(updated.entries.len(), 1);
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "file in the way").unwrap();

        let store = LocalStore::in_directory(&blocker);
        store.write(Namespace::Stats, &StatsSnapshot::default());
        assert_eq!(store.read(Namespace::Stats, StatsSnapshot::default()), StatsSnapshot::default());
    }
}
