//! Tool memory: tools already presented, keyed by name and by URL.

use super::category::{Category, CategoryMemory, Record};
use super::error::Result;
use super::normalize::{normalize_name, normalize_url};
use super::timestamp;
use super::verdict::{MatchedOn, SaveOutcome, Verdict};
use chrono::NaiveDateTime;
use common::MemoryConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRecord {
    #[serde(default)]
    pub name: String,
    /// Empty when the tool was saved without a link
    #[serde(default)]
    pub url: String,
    #[serde(default, with = "timestamp")]
    pub date_used: Option<NaiveDateTime>,
}

impl Record for ToolRecord {
    const CATEGORY: Category = Category::Tools;

    fn date_used(&self) -> Option<NaiveDateTime> {
        self.date_used
    }
}

/// Normalized lookup keys of one candidate; `None` means the key is not compared.
struct Keys {
    name: Option<String>,
    url: Option<String>,
}

impl Keys {
    fn new(name: Option<&str>, url: Option<&str>) -> Self {
        Self {
            name: name.map(normalize_name),
            url: url.map(normalize_url).filter(|u| !u.is_empty()),
        }
    }

    /// Name is checked first, then URL. A missing link never matches another.
    fn matches(&self, record: &ToolRecord) -> Option<MatchedOn> {
        if let Some(name) = &self.name {
            if normalize_name(&record.name) == *name {
                return Some(MatchedOn::Name);
            }
        }
        if let Some(url) = &self.url {
            if normalize_url(&record.url) == *url {
                return Some(MatchedOn::Url);
            }
        }
        None
    }
}

#[derive(Debug, Clone)]
pub struct ToolMemory {
    inner: CategoryMemory<ToolRecord>,
}

impl ToolMemory {
    pub fn new(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        Self {
            inner: CategoryMemory::new(path, max_entries),
        }
    }

    pub fn from_config(config: &MemoryConfig) -> Self {
        Self::new(config.tools_path(), config.max_entries())
    }

    pub fn memory(&self) -> &CategoryMemory<ToolRecord> {
        &self.inner
    }

    pub fn check_name(&self, name: &str) -> Verdict {
        self.check_keys(&Keys::new(Some(name), None))
    }

    pub fn check_url(&self, url: &str) -> Verdict {
        self.check_keys(&Keys::new(None, Some(url)))
    }

    /// Either key can flag the tool as already presented.
    pub fn check(&self, name: &str, url: Option<&str>) -> Verdict {
        self.check_keys(&Keys::new(Some(name), url))
    }

    fn check_keys(&self, keys: &Keys) -> Verdict {
        match self.inner.find_exact(|r| keys.matches(r)) {
            Some(matched_on) => Verdict::Duplicate { matched_on },
            None => Verdict::New,
        }
    }

    /// Rejected when the name, or a non-empty URL, is already stored.
    pub fn save(&self, name: &str, url: Option<&str>) -> Result<SaveOutcome> {
        let keys = Keys::new(Some(name), url);
        let record = ToolRecord {
            name: name.to_string(),
            url: url.unwrap_or_default().to_string(),
            date_used: Some(timestamp::now()),
        };
        self.inner.insert_unless(record, |r| keys.matches(r))
    }

    pub fn list_recent(&self, limit: usize) -> Vec<ToolRecord> {
        self.inner.list_recent(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory(dir: &std::path::Path) -> ToolMemory {
        let tools = ToolMemory::new(dir.join("used_tools.json"), 90);
        tools.save("TestTool", Some("https://testtool.com")).unwrap();
        tools.save("AnotherTool", Some("https://anothertool.io")).unwrap();
        tools
    }

    #[test]
    fn check_by_name_ignores_case_and_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let tools = memory(dir.path());

        assert_eq!(
            tools.check_name("  testtool "),
            Verdict::Duplicate { matched_on: MatchedOn::Name }
        );
        assert!(tools.check_name("NewTool").is_new());
    }

    #[test]
    fn check_by_url() {
        let dir = tempfile::tempdir().unwrap();
        let tools = memory(dir.path());

        assert_eq!(
            tools.check_url("https://AnotherTool.io/"),
            Verdict::Duplicate { matched_on: MatchedOn::Url }
        );
        assert!(tools.check_url("https://newtool.dev").is_new());
        assert!(tools.check_url("").is_new());
    }

    #[test]
    fn combined_check_uses_either_key() {
        let dir = tempfile::tempdir().unwrap();
        let tools = memory(dir.path());

        assert_eq!(
            tools.check("Renamed", Some("https://testtool.com")),
            Verdict::Duplicate { matched_on: MatchedOn::Url }
        );
        assert_eq!(
            tools.check("TestTool", Some("https://elsewhere.dev")),
            Verdict::Duplicate { matched_on: MatchedOn::Name }
        );
        assert!(tools.check("Fresh", None).is_new());
    }

    #[test]
    fn save_rejects_same_name_or_same_url() {
        let dir = tempfile::tempdir().unwrap();
        let tools = memory(dir.path());

        assert_eq!(
            tools.save("testtool", Some("https://other.dev")).unwrap(),
            SaveOutcome::AlreadySaved { matched_on: MatchedOn::Name }
        );
        assert_eq!(
            tools.save("Clone", Some("https://testtool.com/")).unwrap(),
            SaveOutcome::AlreadySaved { matched_on: MatchedOn::Url }
        );
        assert_eq!(tools.memory().len(), 2);
    }

    #[test]
    fn tools_without_url_do_not_collide_on_url() {
        let dir = tempfile::tempdir().unwrap();
        let tools = ToolMemory::new(dir.path().join("used_tools.json"), 90);

        assert!(tools.save("First", None).unwrap().is_saved());
        assert!(tools.save("Second", Some("")).unwrap().is_saved());
        assert!(tools.check_url("").is_new());
        assert_eq!(tools.list_recent(1)[0].url, "");
    }

    #[test]
    fn empty_name_is_still_a_name() {
        let dir = tempfile::tempdir().unwrap();
        let tools = ToolMemory::new(dir.path().join("used_tools.json"), 90);

        assert!(tools.save("", Some("https://a.dev")).unwrap().is_saved());
        assert_eq!(
            tools.check_name("  "),
            Verdict::Duplicate { matched_on: MatchedOn::Name }
        );
        assert_eq!(
            tools.save(" ", Some("https://b.dev")).unwrap(),
            SaveOutcome::AlreadySaved { matched_on: MatchedOn::Name }
        );
        assert_eq!(tools.memory().len(), 1);
    }
}
