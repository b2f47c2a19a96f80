// src/store.rs
//! Storage capability for digest items and feed health records. Two
//! conforming implementations: in-memory (tests, ephemeral runs) and a
//! JSON-file store (one file per digest date, written via tmp-file +
//! rename so a rebuild replaces the date's set atomically). Selected at
//! construction from configuration presence, never at call sites.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::model::{DigestItem, FeedHealthRecord};

pub trait DigestStore: Send + Sync {
    /// Delete any existing items for `date_iso` and insert `items` in one
    /// step. Returns the number inserted.
    fn replace_for_date(&self, date_iso: &str, items: Vec<DigestItem>) -> Result<usize>;
    fn items_for_date(&self, date_iso: &str) -> Result<Vec<DigestItem>>;
}

pub trait HealthStore: Send + Sync {
    fn upsert(&self, record: FeedHealthRecord) -> Result<()>;
    fn get(&self, feed_url: &str) -> Result<Option<FeedHealthRecord>>;
    fn all(&self) -> Result<Vec<FeedHealthRecord>>;
}

/// The pair of handles the rest of the system is constructed with.
#[derive(Clone)]
pub struct AppStores {
    pub digests: Arc<dyn DigestStore>,
    pub health: Arc<dyn HealthStore>,
}

impl AppStores {
    /// File-backed when a data dir is configured, in-memory otherwise.
    pub fn from_data_dir(data_dir: Option<&Path>) -> Result<Self> {
        match data_dir {
            Some(dir) => {
                let store = Arc::new(JsonFileStore::open(dir)?);
                Ok(Self {
                    digests: store.clone(),
                    health: store,
                })
            }
            None => {
                let store = Arc::new(MemoryStore::new());
                Ok(Self {
                    digests: store.clone(),
                    health: store,
                })
            }
        }
    }
}

/// In-memory store; also the per-test isolation vehicle.
#[derive(Debug, Default)]
pub struct MemoryStore {
    digests: Mutex<HashMap<String, Vec<DigestItem>>>,
    health: Mutex<HashMap<String, FeedHealthRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DigestStore for MemoryStore {
    fn replace_for_date(&self, date_iso: &str, items: Vec<DigestItem>) -> Result<usize> {
        let count = items.len();
        let mut map = self.digests.lock().expect("digest mutex poisoned");
        map.insert(date_iso.to_string(), items);
        Ok(count)
    }

    fn items_for_date(&self, date_iso: &str) -> Result<Vec<DigestItem>> {
        let map = self.digests.lock().expect("digest mutex poisoned");
        Ok(map.get(date_iso).cloned().unwrap_or_default())
    }
}

impl HealthStore for MemoryStore {
    fn upsert(&self, record: FeedHealthRecord) -> Result<()> {
        let mut map = self.health.lock().expect("health mutex poisoned");
        map.insert(record.feed_url.clone(), record);
        Ok(())
    }

    fn get(&self, feed_url: &str) -> Result<Option<FeedHealthRecord>> {
        let map = self.health.lock().expect("health mutex poisoned");
        Ok(map.get(feed_url).cloned())
    }

    fn all(&self) -> Result<Vec<FeedHealthRecord>> {
        let map = self.health.lock().expect("health mutex poisoned");
        let mut out: Vec<FeedHealthRecord> = map.values().cloned().collect();
        out.sort_by(|a, b| a.feed_url.cmp(&b.feed_url));
        Ok(out)
    }
}

/// File-backed store: `digest-<date>.json` per date plus `feed_health.json`.
/// Writes go to a sibling tmp file first and are renamed into place, so
/// readers only ever see a complete file.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating data dir {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    fn digest_path(&self, date_iso: &str) -> PathBuf {
        self.dir.join(format!("digest-{date_iso}.json"))
    }

    fn health_path(&self) -> PathBuf {
        self.dir.join("feed_health.json")
    }

    fn write_atomic(&self, path: &Path, json: &str) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("renaming {} into place", tmp.display()))?;
        Ok(())
    }

    fn read_health_map(&self) -> Result<HashMap<String, FeedHealthRecord>> {
        let path = self.health_path();
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }
}

impl DigestStore for JsonFileStore {
    fn replace_for_date(&self, date_iso: &str, items: Vec<DigestItem>) -> Result<usize> {
        let _guard = self.write_lock.lock().expect("store lock poisoned");
        let json = serde_json::to_string_pretty(&items).context("serializing digest items")?;
        self.write_atomic(&self.digest_path(date_iso), &json)?;
        Ok(items.len())
    }

    fn items_for_date(&self, date_iso: &str) -> Result<Vec<DigestItem>> {
        let path = self.digest_path(date_iso);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }
}

impl HealthStore for JsonFileStore {
    fn upsert(&self, record: FeedHealthRecord) -> Result<()> {
        let _guard = self.write_lock.lock().expect("store lock poisoned");
        let mut map = self.read_health_map()?;
        map.insert(record.feed_url.clone(), record);
        let json = serde_json::to_string_pretty(&map).context("serializing health records")?;
        self.write_atomic(&self.health_path(), &json)
    }

    fn get(&self, feed_url: &str) -> Result<Option<FeedHealthRecord>> {
        Ok(self.read_health_map()?.remove(feed_url))
    }

    fn all(&self) -> Result<Vec<FeedHealthRecord>> {
        let mut out: Vec<FeedHealthRecord> = self.read_health_map()?.into_values().collect();
        out.sort_by(|a, b| a.feed_url.cmp(&b.feed_url));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Genre, Mood};
    use chrono::Utc;

    fn item(id: &str, date: &str) -> DigestItem {
        DigestItem {
            id: id.to_string(),
            date_iso: date.to_string(),
            genre: Genre::General,
            mood: Mood::Uplift,
            title: format!("Item {id}"),
            summary: String::new(),
            bullets: vec![],
            sources: vec![],
            score: 3.0,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn memory_replace_overwrites_not_appends() {
        let store = MemoryStore::new();
        store
            .replace_for_date("2026-08-25", vec![item("a", "2026-08-25"), item("b", "2026-08-25")])
            .unwrap();
        let n = store
            .replace_for_date("2026-08-25", vec![item("c", "2026-08-25")])
            .unwrap();
        assert_eq!(n, 1);
        let items = store.items_for_date("2026-08-25").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "c");
    }

    #[test]
    fn memory_dates_are_independent() {
        let store = MemoryStore::new();
        store
            .replace_for_date("2026-08-24", vec![item("a", "2026-08-24")])
            .unwrap();
        store
            .replace_for_date("2026-08-25", vec![item("b", "2026-08-25")])
            .unwrap();
        assert_eq!(store.items_for_date("2026-08-24").unwrap().len(), 1);
        assert_eq!(store.items_for_date("2026-08-25").unwrap().len(), 1);
        assert!(store.items_for_date("2026-08-23").unwrap().is_empty());
    }

    #[test]
    fn file_store_round_trips_and_replaces() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(tmp.path()).unwrap();
        store
            .replace_for_date("2026-08-25", vec![item("a", "2026-08-25"), item("b", "2026-08-25")])
            .unwrap();
        store
            .replace_for_date("2026-08-25", vec![item("c", "2026-08-25")])
            .unwrap();
        let items = store.items_for_date("2026-08-25").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "c");
        // No tmp file left behind after the rename.
        let leftovers: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn file_store_health_upsert_overwrites_by_url() {
        use crate::model::{FeedHealthRecord, FeedStatus};
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(tmp.path()).unwrap();
        let mut rec = FeedHealthRecord {
            feed_url: "https://example.com/feed".into(),
            feed_label: "Example".into(),
            status: FeedStatus::Broken,
            last_checked_at: Utc::now(),
            last_success_at: None,
            consecutive_failures: 1,
            last_error_message: Some("timeout".into()),
            last_response_time_ms: 10_000,
            last_item_count: 0,
        };
        store.upsert(rec.clone()).unwrap();
        rec.status = FeedStatus::Healthy;
        rec.consecutive_failures = 0;
        store.upsert(rec.clone()).unwrap();
        let got = store.get("https://example.com/feed").unwrap().unwrap();
        assert_eq!(got.status, FeedStatus::Healthy);
        assert_eq!(store.all().unwrap().len(), 1);
    }
}
