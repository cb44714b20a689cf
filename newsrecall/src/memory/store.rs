//! Durable JSON store for one memory category.
//!
//! On-disk layout is a single document keyed by the category's collection
//! name:
//! ```text
//! memory/
//! ├── used_news_urls.json        {"urls": [ ... ]}
//! ├── used_news_urls.json.lock   advisory lock held while saving
//! └── used_news_urls.json.bak    last unreadable document, if any
//! ```
//!
//! Reads never fail: a missing file is created empty, an unreadable one is
//! moved aside to `.bak` and treated as empty. Writes go to a temporary file
//! in the same directory which then replaces the document, so a crash
//! mid-write leaves the previous document intact.

use super::error::{Result, StoreError};
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// What `inspect` found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreHealth {
    Missing,
    Healthy(usize),
    Corrupted(String),
}

enum Parsed {
    Records(Vec<Value>),
    Malformed(serde_json::Error),
    WrongShape(String),
}

/// `{"<collection>": [records...]}`
struct Document<'a, R> {
    collection: &'static str,
    records: &'a [R],
}

impl<R: Serialize> Serialize for Document<'_, R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.collection, self.records)?;
        map.end()
    }
}

/// One category document on disk
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
    collection: &'static str,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>, collection: &'static str) -> Self {
        Self {
            path: path.into(),
            collection,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }

    /// Where an unreadable document is moved (`used_facts.json.bak`)
    pub fn backup_path(&self) -> PathBuf {
        sibling_with_suffix(&self.path, ".bak")
    }

    pub fn lock_path(&self) -> PathBuf {
        sibling_with_suffix(&self.path, ".lock")
    }

    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Load every record, creating an empty document first if none exists.
    pub fn load<R: DeserializeOwned>(&self) -> Vec<R> {
        self.load_entries()
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| self.decode(index, entry))
            .collect()
    }

    /// Object entries exactly as stored, with fields this version does not
    /// know about and timestamps it cannot parse left untouched. Non-object
    /// entries are dropped.
    pub fn load_entries(&self) -> Vec<Value> {
        if !self.path.exists() {
            match self.write::<Value>(&[], false) {
                Ok(()) => debug!(path = %self.path.display(), "created empty memory file"),
                // another writer got there first
                Err(StoreError::Persist { source, .. })
                    if source.kind() == std::io::ErrorKind::AlreadyExists => {}
                Err(e) => {
                    error!(path = %self.path.display(), error = %e, "failed to create memory file");
                    return Vec::new();
                }
            }
        }

        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "failed to read memory file");
                return Vec::new();
            }
        };

        match self.parse(&data) {
            Parsed::Records(values) => values
                .into_iter()
                .enumerate()
                .filter(|(index, value)| {
                    let keep = value.is_object();
                    if !keep {
                        warn!(path = %self.path.display(), index = *index, "skipping non-object memory entry");
                    }
                    keep
                })
                .map(|(_, value)| value)
                .collect(),
            Parsed::Malformed(e) => {
                error!(path = %self.path.display(), error = %e, "failed to parse memory file, resetting");
                self.quarantine();
                Vec::new()
            }
            Parsed::WrongShape(reason) => {
                warn!(path = %self.path.display(), %reason, "invalid memory file structure, resetting");
                self.quarantine();
                Vec::new()
            }
        }
    }

    /// Atomically replace the document with `records`.
    pub fn save<R: Serialize>(&self, records: &[R]) -> Result<()> {
        self.write(records, true)
    }

    /// Write to a temporary file, then move it over the document. With
    /// `replace` unset an existing document is left alone.
    fn write<R: Serialize>(&self, records: &[R], replace: bool) -> Result<()> {
        let dir = self.dir();
        fs::create_dir_all(&dir).map_err(|source| StoreError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(self.collection);
        let prefix = format!("{}_", stem);
        // Dropping `tmp` on any early return removes the temporary file.
        let mut tmp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(|source| StoreError::TempFile {
                dir: dir.clone(),
                source,
            })?;

        let document = Document {
            collection: self.collection,
            records,
        };
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, &document).map_err(|source| {
                StoreError::Serialize {
                    collection: self.collection,
                    source,
                }
            })?;
            writer
                .write_all(b"\n")
                .and_then(|_| writer.flush())
                .map_err(|source| StoreError::Write {
                    path: self.path.clone(),
                    source,
                })?;
        }
        tmp.as_file().sync_all().map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;

        let persisted = if replace {
            tmp.persist(&self.path)
        } else {
            tmp.persist_noclobber(&self.path)
        };
        persisted.map_err(|e| StoreError::Persist {
            path: self.path.clone(),
            source: e.error,
        })?;
        debug!(path = %self.path.display(), count = records.len(), "memory file written");
        Ok(())
    }

    /// Exclusive advisory lock on the sibling `.lock` file, released when the guard drops.
    pub fn lock(&self) -> Result<StoreLock> {
        let dir = self.dir();
        fs::create_dir_all(&dir).map_err(|source| StoreError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| StoreError::Lock {
                path: path.clone(),
                source,
            })?;
        file.lock().map_err(|source| StoreError::Lock {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "memory lock acquired");
        Ok(StoreLock { file, path })
    }

    /// Read-only health check; never creates, renames or rewrites anything.
    pub fn inspect(&self) -> StoreHealth {
        if !self.path.exists() {
            return StoreHealth::Missing;
        }
        match fs::read_to_string(&self.path) {
            Ok(data) => match self.parse(&data) {
                Parsed::Records(values) => StoreHealth::Healthy(values.len()),
                Parsed::Malformed(e) => StoreHealth::Corrupted(e.to_string()),
                Parsed::WrongShape(reason) => StoreHealth::Corrupted(reason),
            },
            Err(e) => StoreHealth::Corrupted(e.to_string()),
        }
    }

    fn parse(&self, data: &str) -> Parsed {
        let value: Value = match serde_json::from_str(data) {
            Ok(v) => v,
            Err(e) => return Parsed::Malformed(e),
        };
        let Value::Object(mut map) = value else {
            return Parsed::WrongShape("document is not an object".to_string());
        };
        match map.remove(self.collection) {
            Some(Value::Array(values)) => Parsed::Records(values),
            Some(_) => Parsed::WrongShape(format!("\"{}\" is not a list", self.collection)),
            None => Parsed::WrongShape(format!("missing \"{}\" key", self.collection)),
        }
    }

    /// Typed view of one stored entry; `None` (logged) when it does not fit `R`.
    pub fn decode<R: DeserializeOwned>(&self, index: usize, entry: &Value) -> Option<R> {
        match R::deserialize(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(path = %self.path.display(), index, error = %e, "skipping unreadable memory entry");
                None
            }
        }
    }

    fn quarantine(&self) {
        let backup = self.backup_path();
        match fs::rename(&self.path, &backup) {
            Ok(()) => warn!(
                path = %self.path.display(),
                backup = %backup.display(),
                "moved unreadable memory file aside"
            ),
            Err(e) => error!(
                path = %self.path.display(),
                error = %e,
                "failed to back up unreadable memory file"
            ),
        }
    }
}

/// Held for the duration of a read-modify-write
#[derive(Debug)]
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            warn!(path = %self.path.display(), error = %e, "failed to release memory lock");
        }
    }
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}
