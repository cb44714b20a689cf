//! Memory tools exposed to the newsletter agents.
//!
//! Each tool takes a JSON object of arguments and answers with the French
//! sentence the agents' prompts are written against: check tools start with
//! `OUI` (already used), `NON` (new) or `ATTENTION` (similar fact).

use crate::memory::{
    FactRecord, MatchedOn, MemoryBank, NewsRecord, Record, SaveOutcome, ToolRecord, Verdict,
};
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_LIST_LIMIT: i64 = 10;

const UNKNOWN_DATE: &str = "date inconnue";

/// A tool the agents can call
pub trait MemoryTool: Send + Sync {
    /// Tool name (must match what the agent sends)
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema for the input parameters
    fn parameters_schema(&self) -> Value;

    /// Run the tool and return the agent-facing answer
    fn execute(&self, input: Value) -> Result<String>;

    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.parameters_schema(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

fn parse_input<T: DeserializeOwned>(tool: &str, input: Value) -> Result<T> {
    let input = if input.is_null() { json!({}) } else { input };
    serde_json::from_value(input).with_context(|| format!("invalid arguments for {}", tool))
}

fn default_limit() -> i64 {
    DEFAULT_LIST_LIMIT
}

/// Negative limits list nothing.
fn clamp_limit(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}

fn limit_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "limit": {
                "type": "integer",
                "description": description,
                "default": DEFAULT_LIST_LIMIT
            }
        }
    })
}

fn day(date: Option<NaiveDateTime>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}

fn or_default<'a>(text: &'a str, fallback: &'a str) -> &'a str {
    if text.trim().is_empty() {
        fallback
    } else {
        text
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn render_news_check(verdict: &Verdict) -> String {
    match verdict {
        Verdict::New => "NON - Cette URL est nouvelle, vous pouvez l'utiliser.".to_string(),
        _ => "OUI - Cette URL a deja ete utilisee. Cherchez un autre article.".to_string(),
    }
}

pub fn render_news_save(outcome: &SaveOutcome) -> String {
    match outcome {
        SaveOutcome::Saved => {
            "URL sauvegardee avec succes. Elle ne sera plus proposee dans les prochaines editions."
                .to_string()
        }
        SaveOutcome::AlreadySaved { .. } => "URL deja enregistree, pas de doublon cree.".to_string(),
    }
}

pub fn render_news_list(records: &[NewsRecord], stored: usize) -> String {
    if stored == 0 {
        return "Aucune URL en memoire. C'est la premiere newsletter !".to_string();
    }
    let mut out = format!("Les {} dernieres URLs utilisees:\n\n", records.len());
    for r in records {
        out.push_str(&format!(
            "- [{}] {}\n",
            day(r.date_used()),
            or_default(&r.title, "Sans titre")
        ));
    }
    out
}

pub fn render_tool_check(verdict: &Verdict) -> String {
    match verdict {
        Verdict::New => "NON - Cet outil est nouveau, vous pouvez le presenter.".to_string(),
        _ => "OUI - Cet outil a deja ete presente. Cherchez un autre outil.".to_string(),
    }
}

pub fn render_tool_save(outcome: &SaveOutcome) -> String {
    match outcome {
        SaveOutcome::Saved => {
            "Outil sauvegarde avec succes. Il ne sera plus propose dans les prochaines editions."
                .to_string()
        }
        SaveOutcome::AlreadySaved {
            matched_on: MatchedOn::Url,
        } => "Outil deja enregistre (meme URL), pas de doublon cree.".to_string(),
        SaveOutcome::AlreadySaved { .. } => {
            "Outil deja enregistre (meme nom), pas de doublon cree.".to_string()
        }
    }
}

pub fn render_tool_list(records: &[ToolRecord], stored: usize) -> String {
    if stored == 0 {
        return "Aucun outil en memoire. C'est la premiere newsletter !".to_string();
    }
    let mut out = format!("Les {} derniers outils presentes:\n\n", records.len());
    for r in records {
        let name = or_default(&r.name, "Sans nom");
        if r.url.trim().is_empty() {
            out.push_str(&format!("- [{}] {}\n", day(r.date_used()), name));
        } else {
            out.push_str(&format!("- [{}] {} ({})\n", day(r.date_used()), name, r.url));
        }
    }
    out
}

pub fn render_fact_check(verdict: &Verdict) -> String {
    match verdict {
        Verdict::Duplicate { .. } => {
            "OUI - Ce fait a deja ete presente. Cherchez un autre fun fact.".to_string()
        }
        Verdict::Similar { matched, .. } => format!(
            "ATTENTION - Ce fait semble similaire a un fait deja presente ({}). \
             Verifiez bien ou cherchez un autre fun fact.",
            matched
        ),
        Verdict::New => "NON - Ce fait est nouveau, vous pouvez le presenter.".to_string(),
    }
}

pub fn render_fact_save(outcome: &SaveOutcome) -> String {
    match outcome {
        SaveOutcome::Saved => {
            "Fun fact sauvegarde avec succes. Il ne sera plus propose dans les prochaines editions."
                .to_string()
        }
        SaveOutcome::AlreadySaved { .. } => "Fait deja enregistre, pas de doublon cree.".to_string(),
    }
}

pub fn render_fact_list(records: &[FactRecord], stored: usize) -> String {
    if stored == 0 {
        return "Aucun fait en memoire. C'est la premiere newsletter !".to_string();
    }
    let mut out = format!("Les {} derniers fun facts presentes:\n\n", records.len());
    for r in records {
        out.push_str(&format!(
            "- [{}] {}\n",
            day(r.date_used()),
            or_default(&r.summary, "Sans resume")
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// News
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct UrlInput {
    url: String,
}

#[derive(Deserialize)]
struct SaveNewsInput {
    url: String,
    title: String,
}

#[derive(Deserialize)]
struct LimitInput {
    #[serde(default = "default_limit")]
    limit: i64,
}

pub struct CheckNewsUrlTool {
    bank: Arc<MemoryBank>,
}

impl MemoryTool for CheckNewsUrlTool {
    fn name(&self) -> &str {
        "check_news_url"
    }

    fn description(&self) -> &str {
        "Checks if an article URL has already been used in a previous newsletter. \
         Returns 'OUI' if the URL already exists (to avoid), 'NON' if it's new (OK to use). \
         ALWAYS use this tool BEFORE selecting an article to avoid duplicates."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "description": "The article URL to check" }
            },
            "required": ["url"]
        })
    }

    fn execute(&self, input: Value) -> Result<String> {
        let params: UrlInput = parse_input(self.name(), input)?;
        Ok(render_news_check(&self.bank.news.check(&params.url)))
    }
}

pub struct SaveNewsUrlTool {
    bank: Arc<MemoryBank>,
}

impl MemoryTool for SaveNewsUrlTool {
    fn name(&self) -> &str {
        "save_news_url"
    }

    fn description(&self) -> &str {
        "Saves an article URL in memory after selecting it for the newsletter. \
         ALWAYS use this tool AFTER finalizing the article choice to avoid \
         reusing it in future editions."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "description": "The article URL to save" },
                "title": { "type": "string", "description": "The article title" }
            },
            "required": ["url", "title"]
        })
    }

    fn execute(&self, input: Value) -> Result<String> {
        let params: SaveNewsInput = parse_input(self.name(), input)?;
        let outcome = self
            .bank
            .news
            .save(&params.url, &params.title)
            .context("failed to save news URL")?;
        Ok(render_news_save(&outcome))
    }
}

pub struct ListUsedNewsUrlsTool {
    bank: Arc<MemoryBank>,
}

impl MemoryTool for ListUsedNewsUrlsTool {
    fn name(&self) -> &str {
        "list_used_news_urls"
    }

    fn description(&self) -> &str {
        "Lists article URLs recently used in previous newsletters. \
         Useful to quickly see which topics have already been covered."
    }

    fn parameters_schema(&self) -> Value {
        limit_schema("Number of recent URLs to display (default: 10)")
    }

    fn execute(&self, input: Value) -> Result<String> {
        let params: LimitInput = parse_input(self.name(), input)?;
        let memory = self.bank.news.memory();
        let (stored, recent) = memory.recent_with_total(clamp_limit(params.limit));
        Ok(render_news_list(&recent, stored))
    }
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ToolNameInput {
    tool_name: String,
}

#[derive(Deserialize)]
struct SaveToolInput {
    tool_name: String,
    #[serde(default)]
    tool_url: String,
}

pub struct CheckToolTool {
    bank: Arc<MemoryBank>,
}

impl MemoryTool for CheckToolTool {
    fn name(&self) -> &str {
        "check_tool"
    }

    fn description(&self) -> &str {
        "Checks if a tech tool has already been presented in a previous newsletter, by name. \
         Returns 'OUI' if the tool already exists (to avoid), 'NON' if it's new (OK to use). \
         ALWAYS use this tool BEFORE selecting a tool to avoid duplicates."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "tool_name": { "type": "string", "description": "The tool name to check" }
            },
            "required": ["tool_name"]
        })
    }

    fn execute(&self, input: Value) -> Result<String> {
        let params: ToolNameInput = parse_input(self.name(), input)?;
        Ok(render_tool_check(&self.bank.tools.check_name(&params.tool_name)))
    }
}

pub struct CheckToolUrlTool {
    bank: Arc<MemoryBank>,
}

impl MemoryTool for CheckToolUrlTool {
    fn name(&self) -> &str {
        "check_tool_url"
    }

    fn description(&self) -> &str {
        "Checks if a tech tool has already been presented in a previous newsletter, by URL. \
         Returns 'OUI' if the URL already exists (to avoid), 'NON' if it's new (OK to use)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "description": "The tool URL to check" }
            },
            "required": ["url"]
        })
    }

    fn execute(&self, input: Value) -> Result<String> {
        let params: UrlInput = parse_input(self.name(), input)?;
        Ok(render_tool_check(&self.bank.tools.check_url(&params.url)))
    }
}

pub struct SaveToolUrlTool {
    bank: Arc<MemoryBank>,
}

impl MemoryTool for SaveToolUrlTool {
    fn name(&self) -> &str {
        "save_tool_url"
    }

    fn description(&self) -> &str {
        "Saves a tech tool in memory after selecting it for the newsletter. \
         ALWAYS use this tool AFTER finalizing the tool choice to avoid \
         reusing it in future editions."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "tool_name": { "type": "string", "description": "The tool name" },
                "tool_url": { "type": "string", "description": "The tool URL (optional)" }
            },
            "required": ["tool_name"]
        })
    }

    fn execute(&self, input: Value) -> Result<String> {
        let params: SaveToolInput = parse_input(self.name(), input)?;
        let outcome = self
            .bank
            .tools
            .save(&params.tool_name, Some(&params.tool_url))
            .context("failed to save tool")?;
        Ok(render_tool_save(&outcome))
    }
}

pub struct ListUsedToolsUrlsTool {
    bank: Arc<MemoryBank>,
}

impl MemoryTool for ListUsedToolsUrlsTool {
    fn name(&self) -> &str {
        "list_used_tools_urls"
    }

    fn description(&self) -> &str {
        "Lists tech tools recently presented in previous newsletters. \
         Useful to quickly see which tools have already been covered."
    }

    fn parameters_schema(&self) -> Value {
        limit_schema("Number of recent tools to display (default: 10)")
    }

    fn execute(&self, input: Value) -> Result<String> {
        let params: LimitInput = parse_input(self.name(), input)?;
        let memory = self.bank.tools.memory();
        let (stored, recent) = memory.recent_with_total(clamp_limit(params.limit));
        Ok(render_tool_list(&recent, stored))
    }
}

// ---------------------------------------------------------------------------
// Facts
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct FactSummaryInput {
    fact_summary: String,
}

#[derive(Deserialize)]
struct SaveFactInput {
    fact_summary: String,
    #[serde(default)]
    fact_full: String,
}

pub struct CheckFactTool {
    bank: Arc<MemoryBank>,
}

impl MemoryTool for CheckFactTool {
    fn name(&self) -> &str {
        "check_fact"
    }

    fn description(&self) -> &str {
        "Checks if a fun fact has already been presented in a previous newsletter. \
         Provide a short summary with main keywords (e.g., 'first computer bug moth 1947'). \
         Returns 'OUI' if the fact already exists (to avoid), 'ATTENTION' if a similar fact \
         exists, 'NON' if it's new (OK to use). \
         ALWAYS use this tool BEFORE selecting a fact to avoid duplicates."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "fact_summary": {
                    "type": "string",
                    "description": "A short summary of the fact (a few keywords) to identify it"
                }
            },
            "required": ["fact_summary"]
        })
    }

    fn execute(&self, input: Value) -> Result<String> {
        let params: FactSummaryInput = parse_input(self.name(), input)?;
        Ok(render_fact_check(&self.bank.facts.check(&params.fact_summary)))
    }
}

pub struct SaveFactTool {
    bank: Arc<MemoryBank>,
}

impl MemoryTool for SaveFactTool {
    fn name(&self) -> &str {
        "save_fact"
    }

    fn description(&self) -> &str {
        "Saves a fun fact in memory after selecting it for the newsletter. \
         ALWAYS use this tool AFTER finalizing the fact choice to avoid \
         reusing it in future editions."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "fact_summary": {
                    "type": "string",
                    "description": "A short summary of the fact to identify it"
                },
                "fact_full": {
                    "type": "string",
                    "description": "The complete fact (optional)"
                }
            },
            "required": ["fact_summary"]
        })
    }

    fn execute(&self, input: Value) -> Result<String> {
        let params: SaveFactInput = parse_input(self.name(), input)?;
        let outcome = self
            .bank
            .facts
            .save(&params.fact_summary, Some(&params.fact_full))
            .context("failed to save fun fact")?;
        Ok(render_fact_save(&outcome))
    }
}

pub struct ListUsedFactsTool {
    bank: Arc<MemoryBank>,
}

impl MemoryTool for ListUsedFactsTool {
    fn name(&self) -> &str {
        "list_used_facts"
    }

    fn description(&self) -> &str {
        "Lists fun facts recently presented in previous newsletters. \
         Useful to quickly see which facts have already been covered."
    }

    fn parameters_schema(&self) -> Value {
        limit_schema("Number of recent facts to display (default: 10)")
    }

    fn execute(&self, input: Value) -> Result<String> {
        let params: LimitInput = parse_input(self.name(), input)?;
        let memory = self.bank.facts.memory();
        let (stored, recent) = memory.recent_with_total(clamp_limit(params.limit));
        Ok(render_fact_list(&recent, stored))
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// All memory tools over one shared bank, in registration order
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn MemoryTool>>,
}

impl ToolRegistry {
    pub fn new(bank: Arc<MemoryBank>) -> Self {
        let tools: Vec<Arc<dyn MemoryTool>> = vec![
            Arc::new(CheckNewsUrlTool { bank: bank.clone() }),
            Arc::new(SaveNewsUrlTool { bank: bank.clone() }),
            Arc::new(ListUsedNewsUrlsTool { bank: bank.clone() }),
            Arc::new(CheckToolTool { bank: bank.clone() }),
            Arc::new(CheckToolUrlTool { bank: bank.clone() }),
            Arc::new(SaveToolUrlTool { bank: bank.clone() }),
            Arc::new(ListUsedToolsUrlsTool { bank: bank.clone() }),
            Arc::new(CheckFactTool { bank: bank.clone() }),
            Arc::new(SaveFactTool { bank: bank.clone() }),
            Arc::new(ListUsedFactsTool { bank }),
        ];
        Self { tools }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn MemoryTool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    /// Run a tool by name with JSON arguments.
    pub fn execute(&self, name: &str, input: Value) -> Result<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| anyhow!("unknown tool: {}", name))?;
        debug!(tool = name, %input, "executing memory tool");
        tool.execute(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_and_zero_limits_list_nothing() {
        assert_eq!(clamp_limit(-5), 0);
        assert_eq!(clamp_limit(0), 0);
        assert_eq!(clamp_limit(3), 3);
    }

    #[test]
    fn missing_fields_render_defaults() {
        let records = vec![NewsRecord {
            url: "https://a.io".to_string(),
            title: String::new(),
            date_used: None,
        }];
        assert_eq!(
            render_news_list(&records, 1),
            "Les 1 dernieres URLs utilisees:\n\n- [date inconnue] Sans titre\n"
        );
    }

    #[test]
    fn tool_list_shows_url_only_when_present() {
        let date = crate::memory::timestamp::parse("2026-01-15T08:00:00");
        let records = vec![
            ToolRecord {
                name: "Cursor AI".to_string(),
                url: "https://cursor.sh".to_string(),
                date_used: date,
            },
            ToolRecord {
                name: "Offline".to_string(),
                url: String::new(),
                date_used: date,
            },
        ];
        assert_eq!(
            render_tool_list(&records, 2),
            "Les 2 derniers outils presentes:\n\n\
             - [2026-01-15] Cursor AI (https://cursor.sh)\n\
             - [2026-01-15] Offline\n"
        );
    }

    #[test]
    fn empty_memory_sentinels() {
        assert_eq!(
            render_fact_list(&[], 0),
            "Aucun fait en memoire. C'est la premiere newsletter !"
        );
        assert_eq!(
            render_tool_list(&[], 0),
            "Aucun outil en memoire. C'est la premiere newsletter !"
        );
    }

    #[test]
    fn tool_save_names_the_matching_key() {
        assert!(render_tool_save(&SaveOutcome::AlreadySaved {
            matched_on: MatchedOn::Url
        })
        .contains("meme URL"));
        assert!(render_tool_save(&SaveOutcome::AlreadySaved {
            matched_on: MatchedOn::Name
        })
        .contains("meme nom"));
    }

    #[test]
    fn similar_fact_message_quotes_the_stored_summary() {
        let msg = render_fact_check(&Verdict::Similar {
            matched: "first bug moth harvard 1947".to_string(),
            score: 1.0,
        });
        assert!(msg.starts_with("ATTENTION - "));
        assert!(msg.contains("(first bug moth harvard 1947)"));
    }
}
