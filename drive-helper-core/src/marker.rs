//! User markers for listed items
//!
//! A marker is a small status tag a user pins on a file or folder. Markers
//! are the only durable state: the whole map is serialized as one JSON
//! document and written through a [`SnapshotStore`] after every change.
//!
//! Unmarked items are simply absent from the map. Setting [`Marker::None`]
//! removes the entry.

use crate::{HelperError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Storage key the snapshot lives under
pub const STORAGE_KEY: &str = "drivehelper_marks";

/// Fixed set of markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    /// Sentinel meaning "unmarked"; never stored
    None,
    Done,
    Wait,
    Star,
    Warn,
    No,
}

impl Marker {
    pub const ALL: [Marker; 6] = [
        Marker::None,
        Marker::Done,
        Marker::Wait,
        Marker::Star,
        Marker::Warn,
        Marker::No,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Marker::None => "none",
            Marker::Done => "done",
            Marker::Wait => "wait",
            Marker::Star => "star",
            Marker::Warn => "warn",
            Marker::No => "no",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Marker::None => "⚪",
            Marker::Done => "✅",
            Marker::Wait => "⏳",
            Marker::Star => "⭐",
            Marker::Warn => "⚠️",
            Marker::No => "❌",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Marker::None => "Clear",
            Marker::Done => "Completed",
            Marker::Wait => "Pending",
            Marker::Star => "Important",
            Marker::Warn => "Attention",
            Marker::No => "Cancelled",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Marker {
    type Err = HelperError;

    fn from_str(s: &str) -> Result<Self> {
        Marker::ALL
            .into_iter()
            .find(|m| m.id() == s)
            .ok_or_else(|| HelperError::InvalidMarker(s.to_string()))
    }
}

/// Durable single-blob storage for the marker snapshot
pub trait SnapshotStore: Send + Sync {
    /// `Ok(None)` when nothing was saved yet
    fn read_snapshot(&self) -> Result<Option<String>>;

    fn write_snapshot(&self, snapshot: &str) -> Result<()>;
}

/// Snapshot kept in `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_key(dir, STORAGE_KEY)
    }

    pub fn with_key(dir: impl Into<PathBuf>, key: &str) -> Self {
        Self {
            path: dir.into().join(format!("{key}.json")),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn read_snapshot(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(HelperError::Persistence(format!(
                "{}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn write_snapshot(&self, snapshot: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, snapshot)?;
        Ok(())
    }
}

/// Snapshot held in memory
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshot: Mutex<Option<String>>,
    read_only: bool,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: impl Into<String>) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot.into())),
            read_only: false,
        }
    }

    /// Reject every write
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn snapshot(&self) -> Option<String> {
        self.snapshot.lock().ok().and_then(|s| s.clone())
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn read_snapshot(&self) -> Result<Option<String>> {
        Ok(self.snapshot())
    }

    fn write_snapshot(&self, snapshot: &str) -> Result<()> {
        if self.read_only {
            return Err(HelperError::Persistence("snapshot store is read-only".into()));
        }
        let mut slot = self
            .snapshot
            .lock()
            .map_err(|_| HelperError::Persistence("Lock poisoned".into()))?;
        *slot = Some(snapshot.to_string());
        Ok(())
    }
}

/// Marker totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerStats {
    pub total: usize,
    pub done: usize,
}

/// Item id → marker map with write-through persistence
#[derive(Debug)]
pub struct MarkerStore<S> {
    store: S,
    markers: BTreeMap<String, Marker>,
}

impl<S: SnapshotStore> MarkerStore<S> {
    /// Empty store; call [`MarkerStore::load`] to read the snapshot
    pub fn new(store: S) -> Self {
        Self {
            store,
            markers: BTreeMap::new(),
        }
    }

    /// New store with the persisted snapshot already loaded
    pub fn open(store: S) -> Self {
        let mut markers = Self::new(store);
        markers.load();
        markers
    }

    /// Replace the in-memory map with the persisted snapshot.
    ///
    /// A missing, unreadable or corrupt snapshot leaves the store empty.
    /// Entries that are not known marker ids are dropped one by one.
    pub fn load(&mut self) {
        self.markers.clear();

        let snapshot = match self.store.read_snapshot() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "Marker snapshot read failed");
                return;
            }
        };

        let raw: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&snapshot) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Marker snapshot is corrupt, starting empty");
                return;
            }
        };

        for (item_id, value) in raw {
            let Some(marker_id) = value.as_str() else {
                warn!(item_id = %item_id, %value, "Skipping non-string marker");
                continue;
            };
            match marker_id.parse::<Marker>() {
                Ok(Marker::None) => {}
                Ok(marker) => {
                    self.markers.insert(item_id, marker);
                }
                Err(e) => warn!(item_id = %item_id, error = %e, "Skipping marker"),
            }
        }
        debug!(count = self.markers.len(), "Markers loaded");
    }

    /// Write the whole map through; failures are logged and dropped
    pub fn save(&self) {
        let snapshot = match serde_json::to_string(&self.markers) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Marker snapshot serialization failed");
                return;
            }
        };

        if let Err(e) = self.store.write_snapshot(&snapshot) {
            warn!(error = %e, "Marker snapshot write failed");
        }
    }

    /// Set or clear the marker of one item, then save
    pub fn set(&mut self, item_id: impl Into<String>, marker: Marker) {
        let item_id = item_id.into();
        if marker == Marker::None {
            self.markers.remove(&item_id);
        } else {
            self.markers.insert(item_id, marker);
        }
        self.save();
    }

    /// Remove every marker, then save
    pub fn clear_all(&mut self) {
        self.markers.clear();
        self.save();
    }

    /// Marker of an item; `Marker::None` when unmarked
    pub fn get(&self, item_id: &str) -> Marker {
        self.markers.get(item_id).copied().unwrap_or(Marker::None)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Marker)> {
        self.markers.iter().map(|(id, marker)| (id.as_str(), *marker))
    }

    pub fn stats(&self) -> MarkerStats {
        MarkerStats {
            total: self.markers.len(),
            done: self.markers.values().filter(|m| **m == Marker::Done).count(),
        }
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn snapshot_store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_marker_set_matches_ids() {
        let ids: Vec<&str> = Marker::ALL.iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec!["none", "done", "wait", "star", "warn", "no"]);
        assert_eq!(Marker::Star.glyph(), "⭐");
        assert_eq!(Marker::None.label(), "Clear");
    }

    #[test]
    fn test_marker_from_str() {
        assert_eq!("done".parse::<Marker>().unwrap(), Marker::Done);
        assert!(matches!(
            "maybe".parse::<Marker>(),
            Err(HelperError::InvalidMarker(_))
        ));
    }

    #[test]
    fn test_set_star_round_trips() {
        let mut store = MarkerStore::new(MemorySnapshotStore::new());
        store.set("item-1", Marker::Star);

        let snapshot = store.snapshot_store().snapshot().unwrap();
        let reloaded = MarkerStore::open(MemorySnapshotStore::with_snapshot(snapshot));

        assert_eq!(reloaded.get("item-1"), Marker::Star);
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_set_none_removes_key() {
        let mut store = MarkerStore::new(MemorySnapshotStore::new());
        store.set("item-1", Marker::Done);
        store.set("item-1", Marker::None);

        assert!(store.is_empty());
        assert_eq!(store.snapshot_store().snapshot().as_deref(), Some("{}"));
    }

    #[test]
    fn test_snapshot_is_plain_id_map() {
        let mut store = MarkerStore::new(MemorySnapshotStore::new());
        store.set("b", Marker::No);
        store.set("a", Marker::Wait);

        assert_eq!(
            store.snapshot_store().snapshot().as_deref(),
            Some(r#"{"a":"wait","b":"no"}"#)
        );
    }

    #[test]
    fn test_corrupt_snapshot_loads_empty() {
        let store = MarkerStore::open(MemorySnapshotStore::with_snapshot("{not json"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_unknown_marker_ids_dropped() {
        let snapshot = r#"{"a":"done","b":"sparkles","c":"none"}"#;
        let store = MarkerStore::open(MemorySnapshotStore::with_snapshot(snapshot));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a"), Marker::Done);
    }

    #[test]
    fn test_non_string_entries_dropped() {
        let snapshot = r#"{"a":"done","b":null,"c":3,"d":{"id":"star"}}"#;
        let store = MarkerStore::open(MemorySnapshotStore::with_snapshot(snapshot));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a"), Marker::Done);
        assert_eq!(store.get("b"), Marker::None);
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let mut store = MarkerStore::new(MemorySnapshotStore::new().read_only());
        store.set("item-1", Marker::Warn);

        assert_eq!(store.get("item-1"), Marker::Warn);
        assert_eq!(store.snapshot_store().snapshot(), None);
    }

    #[test]
    fn test_stats_and_clear_all() {
        let mut store = MarkerStore::new(MemorySnapshotStore::new());
        store.set("a", Marker::Done);
        store.set("b", Marker::Done);
        store.set("c", Marker::Star);

        assert_eq!(store.stats(), MarkerStats { total: 3, done: 2 });

        store.clear_all();
        assert_eq!(store.stats(), MarkerStats::default());
        assert_eq!(store.snapshot_store().snapshot().as_deref(), Some("{}"));
    }

    #[test]
    fn test_file_snapshot_store() {
        let dir = TempDir::new().unwrap();
        let files = FileSnapshotStore::new(dir.path().join("nested"));
        assert_eq!(files.read_snapshot().unwrap(), None);

        let mut store = MarkerStore::open(files.clone());
        store.set("x", Marker::Done);

        assert!(files.path().ends_with("drivehelper_marks.json"));
        let reloaded = MarkerStore::open(files);
        assert_eq!(reloaded.get("x"), Marker::Done);
    }
}
