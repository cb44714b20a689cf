//! Content-deduplication memory.
//!
//! One file per category under the memory directory:
//! - `used_news_urls.json`: articles, keyed by URL
//! - `used_tools.json`: tools, keyed by name and by URL
//! - `used_facts.json`: fun facts, keyed by summary with keyword similarity
//!
//! `check` never writes. `save` reloads the file under an exclusive lock,
//! re-checks for an exact duplicate, appends and persists atomically.

pub mod bank;
pub mod category;
pub mod error;
pub mod fact;
pub mod news;
pub mod normalize;
pub mod similarity;
pub mod store;
pub mod timestamp;
pub mod tool;
pub mod verdict;

pub use bank::{CategoryStatus, MemoryBank};
pub use category::{Category, CategoryMemory, Record};
pub use error::StoreError;
pub use fact::{FactMemory, FactRecord};
pub use news::{NewsMemory, NewsRecord};
pub use similarity::{similarity, KeywordSet, SimilarityEngine};
pub use store::{JsonStore, StoreHealth};
pub use tool::{ToolMemory, ToolRecord};
pub use verdict::{MatchedOn, SaveOutcome, Verdict};
