//! News memory: articles already linked, keyed by normalized URL.

use super::category::{Category, CategoryMemory, Record};
use super::error::Result;
use super::normalize::normalize_url;
use super::timestamp;
use super::verdict::{MatchedOn, SaveOutcome, Verdict};
use chrono::NaiveDateTime;
use common::MemoryConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, with = "timestamp")]
    pub date_used: Option<NaiveDateTime>,
}

impl Record for NewsRecord {
    const CATEGORY: Category = Category::News;

    fn date_used(&self) -> Option<NaiveDateTime> {
        self.date_used
    }
}

fn same_url(stored: &str, wanted: &str) -> Option<MatchedOn> {
    (normalize_url(stored) == wanted).then_some(MatchedOn::Url)
}

#[derive(Debug, Clone)]
pub struct NewsMemory {
    inner: CategoryMemory<NewsRecord>,
}

impl NewsMemory {
    pub fn new(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        Self {
            inner: CategoryMemory::new(path, max_entries),
        }
    }

    pub fn from_config(config: &MemoryConfig) -> Self {
        Self::new(config.news_path(), config.max_entries())
    }

    pub fn memory(&self) -> &CategoryMemory<NewsRecord> {
        &self.inner
    }

    /// Has this article already been used?
    pub fn check(&self, url: &str) -> Verdict {
        let wanted = normalize_url(url);
        match self.inner.find_exact(|r| same_url(&r.url, &wanted)) {
            Some(matched_on) => Verdict::Duplicate { matched_on },
            None => Verdict::New,
        }
    }

    /// Record an article. The URL is stored as given; only comparisons normalize.
    pub fn save(&self, url: &str, title: &str) -> Result<SaveOutcome> {
        let wanted = normalize_url(url);
        let record = NewsRecord {
            url: url.to_string(),
            title: title.to_string(),
            date_used: Some(timestamp::now()),
        };
        self.inner
            .insert_unless(record, |r| same_url(&r.url, &wanted))
    }

    pub fn list_recent(&self, limit: usize) -> Vec<NewsRecord> {
        self.inner.list_recent(limit)
    }
}
