//! The three category memories built from one configuration.

use super::category::Category;
use super::fact::FactMemory;
use super::news::NewsMemory;
use super::store::{JsonStore, StoreHealth};
use super::tool::ToolMemory;
use common::MemoryConfig;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct MemoryBank {
    pub news: NewsMemory,
    pub tools: ToolMemory,
    pub facts: FactMemory,
}

/// One line of the status report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStatus {
    pub category: Category,
    pub path: PathBuf,
    #[serde(serialize_with = "health_label")]
    pub health: StoreHealth,
    pub capacity: usize,
}

fn health_label<S: serde::Serializer>(health: &StoreHealth, s: S) -> Result<S::Ok, S::Error> {
    match health {
        StoreHealth::Missing => s.serialize_str("not initialized"),
        StoreHealth::Healthy(count) => s.serialize_u64(*count as u64),
        StoreHealth::Corrupted(_) => s.serialize_str("corrupted"),
    }
}

impl fmt::Display for CategoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.category.display_name();
        match &self.health {
            StoreHealth::Healthy(count) => {
                write!(f, "{}: {}/{} entries", name, count, self.capacity)
            }
            StoreHealth::Missing => write!(f, "{}: not initialized", name),
            StoreHealth::Corrupted(reason) => write!(f, "{}: corrupted ({})", name, reason),
        }
    }
}

impl MemoryBank {
    pub fn from_config(config: &MemoryConfig) -> Self {
        Self {
            news: NewsMemory::from_config(config),
            tools: ToolMemory::from_config(config),
            facts: FactMemory::from_config(config),
        }
    }

    fn store(&self, category: Category) -> (&JsonStore, usize) {
        match category {
            Category::News => (self.news.memory().store(), self.news.memory().max_entries()),
            Category::Tools => (self.tools.memory().store(), self.tools.memory().max_entries()),
            Category::Facts => (self.facts.memory().store(), self.facts.memory().max_entries()),
        }
    }

    /// Health of every category file. Does not create or repair anything.
    pub fn status(&self) -> Vec<CategoryStatus> {
        Category::ALL
            .into_iter()
            .map(|category| {
                let (store, capacity) = self.store(category);
                CategoryStatus {
                    category,
                    path: store.path().to_path_buf(),
                    health: store.inspect(),
                    capacity,
                }
            })
            .collect()
    }
}
