//! Fact memory: fun facts already told, matched exactly or by keyword overlap.

use super::category::{Category, CategoryMemory, Record};
use super::error::Result;
use super::normalize::normalize_name;
use super::similarity::SimilarityEngine;
use super::timestamp;
use super::verdict::{MatchedOn, SaveOutcome, Verdict};
use chrono::NaiveDateTime;
use common::MemoryConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRecord {
    /// A few keywords identifying the fact
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub full: String,
    #[serde(default, with = "timestamp")]
    pub date_used: Option<NaiveDateTime>,
}

impl Record for FactRecord {
    const CATEGORY: Category = Category::Facts;

    fn date_used(&self) -> Option<NaiveDateTime> {
        self.date_used
    }
}

fn same_summary(stored: &str, wanted: &str) -> Option<MatchedOn> {
    (normalize_name(stored) == wanted).then_some(MatchedOn::Summary)
}

#[derive(Debug, Clone)]
pub struct FactMemory {
    inner: CategoryMemory<FactRecord>,
    engine: SimilarityEngine,
}

impl FactMemory {
    pub fn new(path: impl Into<PathBuf>, max_entries: usize, engine: SimilarityEngine) -> Self {
        Self {
            inner: CategoryMemory::new(path, max_entries),
            engine,
        }
    }

    pub fn from_config(config: &MemoryConfig) -> Self {
        Self::new(
            config.facts_path(),
            config.max_entries(),
            SimilarityEngine::new(config.similarity_threshold()),
        )
    }

    pub fn memory(&self) -> &CategoryMemory<FactRecord> {
        &self.inner
    }

    pub fn engine(&self) -> &SimilarityEngine {
        &self.engine
    }

    /// Exact summary match first, then the closest similar summary.
    pub fn check(&self, summary: &str) -> Verdict {
        let wanted = normalize_name(summary);
        let records = self.inner.records();
        if let Some(matched_on) = records.iter().find_map(|r| same_summary(&r.summary, &wanted)) {
            return Verdict::Duplicate { matched_on };
        }

        let stored = records.iter().map(|r| r.summary.as_str());
        match self.engine.best_match(&wanted, stored) {
            Some((index, score)) => {
                let matched = records[index].summary.clone();
                debug!(%matched, score, "similar fact found");
                Verdict::Similar { matched, score }
            }
            None => Verdict::New,
        }
    }

    /// Only exact summaries are rejected; a similar fact can still be saved.
    pub fn save(&self, summary: &str, full: Option<&str>) -> Result<SaveOutcome> {
        let wanted = normalize_name(summary);
        let record = FactRecord {
            summary: summary.to_string(),
            full: full.unwrap_or_default().to_string(),
            date_used: Some(timestamp::now()),
        };
        self.inner
            .insert_unless(record, |r| same_summary(&r.summary, &wanted))
    }

    pub fn list_recent(&self, limit: usize) -> Vec<FactRecord> {
        self.inner.list_recent(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory(dir: &std::path::Path) -> FactMemory {
        let facts = FactMemory::new(dir.join("used_facts.json"), 90, SimilarityEngine::default());
        facts.save("first bug moth harvard 1947", None).unwrap();
        facts
            .save("python name monty python", Some("Python tire son nom des Monty Python."))
            .unwrap();
        facts
    }

    #[test]
    fn exact_summary_is_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let facts = memory(dir.path());

        assert_eq!(
            facts.check("  First Bug Moth Harvard 1947 "),
            Verdict::Duplicate { matched_on: MatchedOn::Summary }
        );
    }

    #[test]
    fn reworded_fact_is_similar() {
        let dir = tempfile::tempdir().unwrap();
        let facts = memory(dir.path());

        match facts.check("bug moth harvard mark computer 1947") {
            Verdict::Similar { matched, score } => {
                assert_eq!(matched, "first bug moth harvard 1947");
                assert_eq!(score, 1.0);
            }
            other => panic!("expected a similar fact, got {:?}", other),
        }
    }

    #[test]
    fn unrelated_fact_is_new() {
        let dir = tempfile::tempdir().unwrap();
        let facts = memory(dir.path());

        assert!(facts.check("apollo guidance computer rope memory").is_new());
        assert!(facts.check("").is_new());
    }

    #[test]
    fn empty_summary_is_matched_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let facts = memory(dir.path());

        assert!(facts.save(" ", Some("no summary")).unwrap().is_saved());
        assert_eq!(
            facts.check(""),
            Verdict::Duplicate { matched_on: MatchedOn::Summary }
        );
        assert_eq!(
            facts.save("", None).unwrap(),
            SaveOutcome::AlreadySaved { matched_on: MatchedOn::Summary }
        );
        assert_eq!(facts.memory().len(), 3);
    }

    #[test]
    fn similar_fact_can_still_be_saved() {
        let dir = tempfile::tempdir().unwrap();
        let facts = memory(dir.path());

        assert!(facts
            .save("bug moth harvard mark computer 1947", None)
            .unwrap()
            .is_saved());
        assert_eq!(
            facts.save("PYTHON NAME MONTY PYTHON", None).unwrap(),
            SaveOutcome::AlreadySaved { matched_on: MatchedOn::Summary }
        );
        assert_eq!(facts.memory().len(), 3);
    }

    #[test]
    fn configured_threshold_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = MemoryConfig::with_dir(dir.path());
        config.similarity_threshold = Some(0.99);
        let facts = FactMemory::from_config(&config);
        facts.save("grace hopper harvard", None).unwrap();

        // shares one tag out of two: 0.5
        assert!(facts.check("grace hopper cobol").is_new());
        assert_eq!(facts.engine().threshold(), 0.99);
    }
}
