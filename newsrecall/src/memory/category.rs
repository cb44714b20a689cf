//! Generic per-category memory over a `JsonStore`.

use super::error::{Result, StoreError};
use super::store::JsonStore;
use super::verdict::{MatchedOn, SaveOutcome};
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing::{debug, info};

/// The three kinds of content the newsletter must not repeat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    News,
    Tools,
    Facts,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::News, Category::Tools, Category::Facts];

    /// Top-level key of the category's JSON document
    pub fn collection(self) -> &'static str {
        match self {
            Category::News => "urls",
            Category::Tools => "tools",
            Category::Facts => "facts",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::News => "News URLs",
            Category::Tools => "Tools",
            Category::Facts => "Facts",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// A persisted entry of one category
pub trait Record: Serialize + DeserializeOwned + Clone + fmt::Debug {
    const CATEGORY: Category;

    fn date_used(&self) -> Option<NaiveDateTime>;
}

/// Bounded, insertion-ordered list of records backed by one file.
///
/// Nothing is cached: every call reads the file again.
#[derive(Debug, Clone)]
pub struct CategoryMemory<R> {
    store: JsonStore,
    max_entries: usize,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> CategoryMemory<R> {
    /// `max_entries` below 1 is raised to 1.
    pub fn new(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        Self {
            store: JsonStore::new(path, R::CATEGORY.collection()),
            max_entries: max_entries.max(1),
            _record: PhantomData,
        }
    }

    pub fn store(&self) -> &JsonStore {
        &self.store
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// All records, oldest first
    pub fn records(&self) -> Vec<R> {
        self.store.load()
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First stored record for which `matches` reports a key.
    pub fn find_exact<F>(&self, matches: F) -> Option<MatchedOn>
    where
        F: Fn(&R) -> Option<MatchedOn>,
    {
        self.records().iter().find_map(matches)
    }

    /// Append `record` unless a stored record conflicts with it, then evict
    /// the oldest entries beyond the bound. Runs under the store lock.
    ///
    /// Entries already on disk are written back as they were read, so fields
    /// and timestamps this version cannot interpret survive the rewrite.
    pub fn insert_unless<F>(&self, record: R, conflict: F) -> Result<SaveOutcome>
    where
        F: Fn(&R) -> Option<MatchedOn>,
    {
        let _lock = self.store.lock()?;
        let mut entries = self.store.load_entries();

        let existing = entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| self.store.decode::<R>(index, entry))
            .find_map(|stored| conflict(&stored));
        if let Some(matched_on) = existing {
            debug!(category = %R::CATEGORY, %matched_on, "entry already in memory, not saving");
            return Ok(SaveOutcome::AlreadySaved { matched_on });
        }

        let entry = serde_json::to_value(&record).map_err(|source| StoreError::Serialize {
            collection: R::CATEGORY.collection(),
            source,
        })?;
        entries.push(entry);
        let overflow = entries.len().saturating_sub(self.max_entries);
        if overflow > 0 {
            entries.drain(..overflow);
            debug!(category = %R::CATEGORY, evicted = overflow, "evicted oldest entries");
        }

        self.store.save(&entries)?;
        info!(
            category = %R::CATEGORY,
            count = entries.len(),
            max = self.max_entries,
            "saved memory entry"
        );
        Ok(SaveOutcome::Saved)
    }

    /// Most recent first, at most `limit` records.
    pub fn list_recent(&self, limit: usize) -> Vec<R> {
        self.recent_with_total(limit).1
    }

    /// Stored count alongside the `limit` most recent records, from one read.
    pub fn recent_with_total(&self, limit: usize) -> (usize, Vec<R>) {
        let mut records = self.records();
        let total = records.len();
        records.reverse();
        records.truncate(limit);
        (total, records)
    }
}
