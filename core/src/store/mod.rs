//! Durable change records: merge semantics and file-backed persistence.
//!
//! The store accumulates every content hash ever observed for a changed
//! function, across repeated comparisons. Merging is a set union per
//! identity — commutative and idempotent — so re-running a comparison
//! never loses or duplicates information.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const STORE_FILE: &str = "changed-functions.json";

/// Every content hash observed for one function identity.
///
/// Serializes as a plain array of hash strings. Ordering carries no
/// meaning — two records are equal when their hash sets are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeRecord {
    hashes: BTreeSet<String>,
}

impl ChangeRecord {
    pub fn new<I, S>(hashes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hashes: hashes.into_iter().map(Into::into).collect(),
        }
    }

    /// Add one observed hash. Re-observing a known hash changes nothing.
    pub fn observe(&mut self, hash: &str) {
        self.hashes.insert(hash.to_owned());
    }

    /// Union the other record's hashes into this one.
    pub fn absorb(&mut self, other: ChangeRecord) {
        self.hashes.extend(other.hashes);
    }

    pub fn hashes(&self) -> impl Iterator<Item = &str> {
        self.hashes.iter().map(String::as_str)
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.hashes.contains(hash)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

/// Durable mapping from function identity to its accumulated hash set.
///
/// Serializes as a flat JSON object (identity -> array of hash strings),
/// so stores written by older runs keep loading as the crate evolves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeStore {
    records: BTreeMap<String, ChangeRecord>,
}

impl ChangeStore {
    pub fn get(&self, identity: &str) -> Option<&ChangeRecord> {
        self.records.get(identity)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ChangeRecord)> {
        self.records.iter()
    }

    /// Merge `records` in: new identities insert verbatim, existing ones
    /// grow by set union. Hash sets only ever grow; nothing is overwritten
    /// or removed. Merging the same records twice equals merging once, and
    /// merge order does not affect the result.
    pub fn merge(mut self, records: BTreeMap<String, ChangeRecord>) -> Self {
        for (identity, record) in records {
            self.records.entry(identity).or_default().absorb(record);
        }
        self
    }

    /// Load a store from `path`. A missing file is an empty store (created
    /// on first save); content that does not parse as record data is
    /// `Error::StoreCorrupt` — surfaced to the caller, never repaired or
    /// overwritten here.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content)
            .map_err(|e| Error::store_corrupt(path.display().to_string(), e.to_string()))
    }

    /// Save atomically: the JSON is written to a temp file in the target
    /// directory, then renamed over `path`. Readers see the old store or
    /// the new one, never a torn write.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let content =
            serde_json::to_string_pretty(self).map_err(|e| Error::Io(io::Error::other(e)))?;
        let tmp = tempfile::NamedTempFile::new_in(&dir)?;
        fs::write(tmp.path(), content)?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;

        Ok(())
    }

    /// Read-merge-write in one step, returning the merged store.
    ///
    /// Because the merge is commutative and idempotent, re-running an
    /// update converges rather than drifting. The read and the write are
    /// still two operations: writers racing on the same path should keep a
    /// single-writer discipline, or re-run their comparison after losing a
    /// race.
    pub fn update(path: &Path, records: BTreeMap<String, ChangeRecord>) -> Result<Self> {
        let merged = Self::load(path)?.merge(records);
        merged.save(path)?;
        Ok(merged)
    }
}

/// Default store location: `$FUNCDIFF_HOME/changed-functions.json` if set,
/// otherwise `~/.funcdiff/changed-functions.json`.
pub fn default_store_path() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("FUNCDIFF_HOME") {
        return Ok(PathBuf::from(home).join(STORE_FILE));
    }
    let home = dirs::home_dir().ok_or_else(|| Error::not_found("home directory"))?;
    Ok(home.join(".funcdiff").join(STORE_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn records(entries: &[(&str, &[&str])]) -> BTreeMap<String, ChangeRecord> {
        entries
            .iter()
            .map(|(identity, hashes)| {
                ((*identity).to_owned(), ChangeRecord::new(hashes.iter().copied()))
            })
            .collect()
    }

    #[test]
    fn test_merge_inserts_new_identities() {
        let store = ChangeStore::default().merge(records(&[("a.c/add", &["h1", "h2"])]));
        assert_eq!(store.len(), 1);
        let record = store.get("a.c/add").unwrap();
        assert!(record.contains("h1"));
        assert!(record.contains("h2"));
        assert_eq!(record.hashes().collect::<Vec<_>>(), vec!["h1", "h2"]);
    }

    #[test]
    fn test_merge_unions_existing_identities() {
        let store = ChangeStore::default()
            .merge(records(&[("a.c/add", &["h1", "h2"])]))
            .merge(records(&[("a.c/add", &["h2", "h3"])]));

        let record = store.get("a.c/add").unwrap();
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let incoming = records(&[("a.c/add", &["h1", "h2"]), ("a.c/sub", &["h3"])]);
        let once = ChangeStore::default().merge(incoming.clone());
        let twice = once.clone().merge(incoming);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_is_commutative() {
        let r1 = records(&[("a.c/add", &["h1"]), ("a.c/sub", &["h2"])]);
        let r2 = records(&[("a.c/add", &["h3"]), ("a.c/mul", &["h4"])]);

        let forward = ChangeStore::default().merge(r1.clone()).merge(r2.clone());
        let backward = ChangeStore::default().merge(r2).merge(r1);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_load_missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = ChangeStore::load(&dir.path().join("absent.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let store = ChangeStore::default().merge(records(&[("a.c/add", &["h1", "h2"])]));
        store.save(&path).unwrap();

        let loaded = ChangeStore::load(&path).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn test_serialized_shape_is_flat() {
        let store = ChangeStore::default().merge(records(&[("a.c/add", &["h2", "h1"])]));
        let json = serde_json::to_string(&store).unwrap();
        assert_eq!(json, r#"{"a.c/add":["h1","h2"]}"#);
    }

    #[test]
    fn test_load_corrupt_store_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{\"a.c/add\": 42}").unwrap();

        let err = ChangeStore::load(&path).unwrap_err();
        assert!(matches!(err, Error::StoreCorrupt { .. }));
        // The corrupt content must survive untouched.
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"a.c/add\": 42}");
    }

    #[test]
    fn test_update_merges_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        ChangeStore::update(&path, records(&[("a.c/add", &["h1"])])).unwrap();
        let merged = ChangeStore::update(&path, records(&[("a.c/add", &["h2"])])).unwrap();

        assert_eq!(merged.get("a.c/add").unwrap().len(), 2);
        assert_eq!(ChangeStore::load(&path).unwrap(), merged);
    }

    #[test]
    fn test_update_twice_with_same_records_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let incoming = records(&[("a.c/add", &["h1", "h2"])]);

        let first = ChangeStore::update(&path, incoming.clone()).unwrap();
        let second = ChangeStore::update(&path, incoming).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_default_store_path_honors_env_override() {
        std::env::set_var("FUNCDIFF_HOME", "/tmp/funcdiff-test-home");
        let path = default_store_path().unwrap();
        std::env::remove_var("FUNCDIFF_HOME");

        assert_eq!(
            path,
            PathBuf::from("/tmp/funcdiff-test-home").join("changed-functions.json")
        );
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("store.json");

        ChangeStore::default()
            .merge(records(&[("a.c/add", &["h1"])]))
            .save(&path)
            .unwrap();
        assert!(ChangeStore::load(&path).unwrap().get("a.c/add").is_some());
    }
}
