//! This is the store module.
//! Holds every record in memory and mirrors it to a JSON snapshot.

use crate::error::{PersistenceError, Result, RosterError};
use crate::knn::{self, Neighbor};
use crate::record::{normalize_identity, NewRecord, Record};
use crate::sort::sort_by_identity;
use chrono::Utc;
use serde_json::{Map, Value};
use std::{
    collections::HashSet,
    fs::{self, File},
    io::BufReader,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// In-memory registry bound to a snapshot file.
///
/// Records keep insertion order; re-adding an identity replaces the record in
/// its existing slot. Every successful [`add`](Store::add) rewrites the whole
/// snapshot.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    records: Vec<Record>,
}

impl Store {
    /// Creates an empty store that will save to `path`.
    ///
    /// Nothing is read or written until the first [`add`](Store::add) or
    /// [`save`](Store::save).
    ///
    /// # Examples
    ///
    /// ```
    /// use roster::Store;
    ///
    /// let store = Store::new("roster.json");
    /// assert_eq!(store.count(), 0);
    /// ```
    pub fn new(path: impl Into<PathBuf>) -> Store {
        Store { path: path.into(), records: Vec::new() }
    }

    /// Loads a store from a snapshot previously written by [`save`](Store::save).
    ///
    /// A missing file is not an error: the result is an empty store bound to
    /// `path`. Loaded records go through the same normalization as
    /// [`add`](Store::add), so a hand-edited lower-case entry is stored
    /// upper-cased. Anything else that prevents a full, typed reconstruction of
    /// every record fails the whole load.
    ///
    /// # Arguments
    ///
    /// * `path` - Snapshot file to read and later save to
    ///
    /// # Returns
    ///
    /// * `Ok(Store)` - The loaded store
    /// * `Err(RosterError::Persistence)` - File unreadable, not JSON, a record
    ///   with missing, unknown or non-finite fields, a key that differs from its
    ///   record's identity, or two keys naming the same identity
    ///
    /// # Examples
    ///
    /// ```
    /// use roster::{NewRecord, Store};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let path = dir.path().join("roster.json");
    ///
    /// let mut store = Store::load(&path).unwrap();
    /// assert!(store.is_empty());
    ///
    /// store.add(NewRecord { identity: "ana".to_string(), ..NewRecord::default() }).unwrap();
    ///
    /// let reloaded = Store::load(&path).unwrap();
    /// assert_eq!(reloaded.get("Ana").unwrap().identity(), "ANA");
    /// ```
    pub fn load(path: impl AsRef<Path>) -> Result<Store> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            info!(path = %path.display(), "no snapshot found, starting empty");
            return Ok(Store::new(path));
        }

        let file = File::open(&path)
            .map_err(|source| PersistenceError::Read { path: path.clone(), source })?;
        let reader = BufReader::new(file);

        let entries: Map<String, Value> = serde_json::from_reader(reader)
            .map_err(|source| PersistenceError::Malformed { path: path.clone(), source })?;

        let mut records = Vec::with_capacity(entries.len());
        let mut seen = HashSet::with_capacity(entries.len());
        for (key, value) in entries {
            let record = serde_json::from_value::<Record>(value)
                .map_err(|source| PersistenceError::Malformed { path: path.clone(), source })?
                .normalized()
                .map_err(|source| PersistenceError::InvalidEntry { key: key.clone(), source })?;

            if normalize_identity(&key) != record.identity() {
                return Err(PersistenceError::KeyMismatch {
                    key,
                    identity: record.identity().to_string(),
                }
                .into());
            }
            if !seen.insert(record.identity().to_string()) {
                return Err(PersistenceError::DuplicateIdentity {
                    identity: record.identity().to_string(),
                }
                .into());
            }
            records.push(record);
        }

        info!(path = %path.display(), count = records.len(), "snapshot loaded");
        Ok(Store { path, records })
    }

    /// Writes every record to the snapshot, replacing the previous file.
    ///
    /// Only stored fields are written; tenure is derived and never persisted.
    /// There is no locking or atomic rename, so concurrent writers from other
    /// processes can interleave.
    pub fn save(&self) -> Result<()> {
        let mut entries = Map::with_capacity(self.records.len());
        for record in &self.records {
            let value = serde_json::to_value(record).map_err(PersistenceError::Encode)?;
            entries.insert(record.identity().to_string(), value);
        }

        let json = serde_json::to_string_pretty(&entries).map_err(PersistenceError::Encode)?;

        fs::write(&self.path, json)
            .map_err(|source| PersistenceError::Write { path: self.path.clone(), source })?;

        debug!(path = %self.path.display(), count = self.records.len(), "snapshot saved");
        Ok(())
    }

    /// Inserts or replaces a record, then saves the snapshot.
    ///
    /// String fields are upper-cased and `start_date` defaults to now. When the
    /// normalized identity already exists every field of the old record is
    /// replaced, `start_date` included.
    ///
    /// # Arguments
    ///
    /// * `new` - Caller-supplied fields
    ///
    /// # Returns
    ///
    /// * `Ok(&Record)` - The stored record, for confirming identity and role
    /// * `Err(RosterError::Validation)` - Blank identity or a non-finite number;
    ///   the store is untouched
    /// * `Err(RosterError::Persistence)` - The record was stored in memory but
    ///   the snapshot could not be written
    ///
    /// # Examples
    ///
    /// ```
    /// use roster::{NewRecord, RosterError, Store};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let mut store = Store::new(dir.path().join("roster.json"));
    ///
    /// let added = store.add(NewRecord {
    ///     identity: "bea".to_string(),
    ///     role: "nurse".to_string(),
    ///     ..NewRecord::default()
    /// }).unwrap();
    /// assert_eq!(added.role(), "NURSE");
    ///
    /// let result = store.add(NewRecord::default());
    /// assert!(matches!(result, Err(RosterError::Validation(_))));
    /// assert_eq!(store.count(), 1);
    /// ```
    pub fn add(&mut self, new: NewRecord) -> Result<&Record> {
        let record = Record::from_new(new, Utc::now())?;

        let index = match self.position(record.identity()) {
            Some(index) => {
                warn!(identity = record.identity(), "identity already present, replacing record");
                self.records[index] = record;
                index
            }
            None => {
                self.records.push(record);
                self.records.len() - 1
            }
        };

        self.save()?;

        let record = &self.records[index];
        info!(identity = record.identity(), role = record.role(), "record added");
        Ok(record)
    }

    /// Case-insensitive lookup by identity.
    pub fn get(&self, identity: &str) -> Result<&Record> {
        let identity = normalize_identity(identity);
        match self.position(&identity) {
            Some(index) => Ok(&self.records[index]),
            None => Err(RosterError::NotFound { identity }),
        }
    }

    /// All records in insertion order.
    pub fn all(&self) -> Vec<&Record> {
        self.records.iter().collect()
    }

    /// All records ordered by identity.
    pub fn sorted_by_identity(&self) -> Vec<&Record> {
        sort_by_identity(self.all())
    }

    /// Resolves `identity` and returns its `k` nearest neighbors.
    ///
    /// An unknown identity fails before any distance is computed.
    ///
    /// # Examples
    ///
    /// ```
    /// use roster::{NewRecord, Store};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let mut store = Store::new(dir.path().join("roster.json"));
    /// for (name, pay) in [("ana", 1000.0), ("bea", 1100.0), ("cia", 5000.0)] {
    ///     store.add(NewRecord { identity: name.to_string(), compensation: pay, ..NewRecord::default() }).unwrap();
    /// }
    ///
    /// let neighbors = store.find_nearest("ana", 1).unwrap();
    /// assert_eq!(neighbors[0].record.identity(), "BEA");
    /// assert!(store.find_nearest("nobody", 1).is_err());
    /// ```
    pub fn find_nearest(&self, identity: &str, k: usize) -> Result<Vec<Neighbor<'_>>> {
        let target = self.get(identity)?;
        Ok(knn::nearest(target, k, &self.all()))
    }

    /// `(identity, compensation)` pairs in insertion order, for charting.
    pub fn compensation_series(&self) -> Vec<(&str, f64)> {
        self.records
            .iter()
            .map(|r| (r.identity(), r.compensation()))
            .collect()
    }

    /// Returns the number of records in the store.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Snapshot file this store saves to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Index of an already-normalized identity.
    fn position(&self, identity: &str) -> Option<usize> {
        self.records.iter().position(|r| r.identity() == identity)
    }
}
