//! Record an already published newsletter into memory.
//!
//! Used to backfill the memory from archived newsletters so the next edition
//! does not repeat them.

use crate::extraction::{first_sentence, NewsletterContent};
use crate::memory::{Category, MemoryBank, SaveOutcome, Verdict};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Longest fact summary derived from a fun fact
pub const MAX_FACT_SUMMARY_CHARS: usize = 120;

/// What happened to one section of the newsletter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionReport {
    pub category: Category,
    /// Key that was checked; `None` when the section was not found
    pub key: Option<String>,
    pub verdict: Option<Verdict>,
    /// `None` on a dry run or when the entry was already known
    pub outcome: Option<SaveOutcome>,
}

impl SectionReport {
    fn missing(category: Category) -> Self {
        Self {
            category,
            key: None,
            verdict: None,
            outcome: None,
        }
    }
}

impl fmt::Display for SectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(key) = &self.key else {
            return write!(f, "{}: section not found", self.category);
        };
        write!(f, "{}: {}", self.category, key)?;
        if let Some(Verdict::Similar { matched, score }) = &self.verdict {
            write!(f, " (similar to \"{}\", score {:.2})", matched, score)?;
        }
        match (&self.verdict, &self.outcome) {
            (Some(Verdict::Duplicate { matched_on }), _)
            | (_, Some(SaveOutcome::AlreadySaved { matched_on })) => {
                write!(f, " already in memory (same {})", matched_on)
            }
            (_, Some(SaveOutcome::Saved)) => write!(f, " saved"),
            (_, None) => write!(f, " would be saved"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    pub sections: Vec<SectionReport>,
}

impl IngestReport {
    pub fn saved(&self) -> usize {
        self.sections
            .iter()
            .filter(|s| matches!(s.outcome, Some(SaveOutcome::Saved)))
            .count()
    }
}

/// First sentence of a fun fact, capped at `MAX_FACT_SUMMARY_CHARS`.
pub fn fact_summary(fact: &str) -> String {
    let sentence = match first_sentence(fact) {
        "" => fact.trim(),
        s => s,
    };
    sentence
        .chars()
        .take(MAX_FACT_SUMMARY_CHARS)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Check each extracted section against the bank and, unless `dry_run`, save
/// the ones not already known. A fact that is only similar is still saved.
pub fn record_newsletter(
    bank: &MemoryBank,
    content: &NewsletterContent,
    dry_run: bool,
) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    // 1. News, keyed by link
    report.sections.push(if content.news_link.is_empty() {
        SectionReport::missing(Category::News)
    } else {
        let url = &content.news_link;
        let verdict = bank.news.check(url);
        let outcome = if verdict.is_duplicate() || dry_run {
            None
        } else {
            Some(
                bank.news
                    .save(url, &content.news_title)
                    .with_context(|| format!("failed to save news URL {}", url))?,
            )
        };
        SectionReport {
            category: Category::News,
            key: Some(url.clone()),
            verdict: Some(verdict),
            outcome,
        }
    });

    // 2. Tool, keyed by name and link
    report.sections.push(if content.tool_title.is_empty() {
        SectionReport::missing(Category::Tools)
    } else {
        let name = &content.tool_title;
        let url = (!content.tool_link.is_empty()).then_some(content.tool_link.as_str());
        let verdict = bank.tools.check(name, url);
        let outcome = if verdict.is_duplicate() || dry_run {
            None
        } else {
            Some(
                bank.tools
                    .save(name, url)
                    .with_context(|| format!("failed to save tool {}", name))?,
            )
        };
        SectionReport {
            category: Category::Tools,
            key: Some(name.clone()),
            verdict: Some(verdict),
            outcome,
        }
    });

    // 3. Fun fact, keyed by its first sentence
    report.sections.push(if content.fun_content.is_empty() {
        SectionReport::missing(Category::Facts)
    } else {
        let summary = fact_summary(&content.fun_content);
        let verdict = bank.facts.check(&summary);
        let outcome = if verdict.is_duplicate() || dry_run {
            None
        } else {
            Some(
                bank.facts
                    .save(&summary, Some(&content.fun_content))
                    .context("failed to save fun fact")?,
            )
        };
        SectionReport {
            category: Category::Facts,
            key: Some(summary),
            verdict: Some(verdict),
            outcome,
        }
    });

    for section in &report.sections {
        debug!(%section, "ingest section");
    }
    info!(saved = report.saved(), dry_run, "newsletter recorded");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fact_summary_takes_first_sentence() {
        assert_eq!(
            fact_summary("Python doit son nom aux Monty Python. Pas au serpent."),
            "Python doit son nom aux Monty Python"
        );
        assert_eq!(fact_summary("  pas de point  "), "pas de point");
    }

    #[test]
    fn fact_summary_is_capped() {
        let long = "mot ".repeat(100);
        assert!(fact_summary(&long).chars().count() <= MAX_FACT_SUMMARY_CHARS);
    }

    #[test]
    fn missing_section_display() {
        assert_eq!(
            SectionReport::missing(Category::Tools).to_string(),
            "tools: section not found"
        );
    }
}
