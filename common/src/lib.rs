/*!
common/src/lib.rs

Shared configuration types for newsrecall.

This file provides:
- Config data structures (deserialized from TOML)
- A loader for a TOML config file, with default + override merging
- Path helpers resolving the per-category memory files
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Retention bound applied to every category store.
pub const DEFAULT_MAX_ENTRIES: usize = 90;

/// Facts scoring strictly above this keyword overlap are reported as similar.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.4;

pub const DEFAULT_MEMORY_DIR: &str = "memory";
pub const DEFAULT_NEWS_FILE: &str = "used_news_urls.json";
pub const DEFAULT_TOOLS_FILE: &str = "used_tools.json";
pub const DEFAULT_FACTS_FILE: &str = "used_facts.json";

/// Memory store configuration section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Directory holding the category files (e.g. "memory"), relative to the working directory
    pub dir: Option<String>,
    pub max_entries: Option<usize>,
    pub similarity_threshold: Option<f64>,
    pub news_file: Option<String>,
    pub tools_file: Option<String>,
    pub facts_file: Option<String>,
}

impl MemoryConfig {
    /// Config rooted at `dir` with every other setting left to its default.
    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: Some(dir.as_ref().to_string_lossy().to_string()),
            ..Self::default()
        }
    }

    pub fn dir(&self) -> PathBuf {
        PathBuf::from(self.dir.as_deref().unwrap_or(DEFAULT_MEMORY_DIR))
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries.unwrap_or(DEFAULT_MAX_ENTRIES)
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
            .unwrap_or(DEFAULT_SIMILARITY_THRESHOLD)
    }

    pub fn news_path(&self) -> PathBuf {
        self.dir()
            .join(self.news_file.as_deref().unwrap_or(DEFAULT_NEWS_FILE))
    }

    pub fn tools_path(&self) -> PathBuf {
        self.dir()
            .join(self.tools_file.as_deref().unwrap_or(DEFAULT_TOOLS_FILE))
    }

    pub fn facts_path(&self) -> PathBuf {
        self.dir()
            .join(self.facts_file.as_deref().unwrap_or(DEFAULT_FACTS_FILE))
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive ("info", "debug", "newsrecall=debug", ...)
    pub level: Option<String>,
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub memory: MemoryConfig,
    pub logging: Option<LoggingConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml")?;
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    /// Missing files are skipped, so with neither present every setting keeps its default.
    pub fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        for path in [default_path, override_path].into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let val: toml::Value = toml::from_str(&data)
                .with_context(|| format!("Failed to parse configuration: {}", path.display()))?;
            merge_toml(&mut config_value, val);
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn config_from_string() {
        let toml = r#"
            [memory]
            dir = "data/memory"
            max_entries = 30

            [logging]
            level = "debug"
        "#;

        let cfg: Config = toml::from_str(toml).expect("parse config");
        assert_eq!(cfg.memory.dir(), PathBuf::from("data/memory"));
        assert_eq!(cfg.memory.max_entries(), 30);
        assert_eq!(cfg.memory.similarity_threshold(), DEFAULT_SIMILARITY_THRESHOLD);
        assert_eq!(cfg.log_level(), Some("debug"));
        assert_eq!(
            cfg.memory.facts_path(),
            PathBuf::from("data/memory").join(DEFAULT_FACTS_FILE)
        );
    }

    #[test]
    fn empty_config_uses_defaults() {
        let cfg: Config = toml::from_str("").expect("parse empty config");
        assert_eq!(cfg.memory.dir(), PathBuf::from(DEFAULT_MEMORY_DIR));
        assert_eq!(cfg.memory.max_entries(), DEFAULT_MAX_ENTRIES);
        assert_eq!(
            cfg.memory.news_path(),
            PathBuf::from(DEFAULT_MEMORY_DIR).join(DEFAULT_NEWS_FILE)
        );
        assert!(cfg.log_level().is_none());
    }

    #[test]
    fn override_file_wins_over_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let default_path = dir.path().join("config.default.toml");
        let override_path = dir.path().join("config.toml");

        fs::write(
            &default_path,
            "[memory]\ndir = \"memory\"\nmax_entries = 90\nsimilarity_threshold = 0.4\n",
        )
        .unwrap();
        fs::write(&override_path, "[memory]\nmax_entries = 10\n").unwrap();

        let cfg = Config::load_with_defaults(Some(&default_path), Some(&override_path))
            .expect("load merged config");
        assert_eq!(cfg.memory.max_entries(), 10);
        assert_eq!(cfg.memory.dir(), PathBuf::from("memory"));
        assert_eq!(cfg.memory.similarity_threshold(), 0.4);
    }

    #[test]
    fn missing_files_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.toml");

        let cfg = Config::load_with_defaults(Some(&missing), None).expect("load");
        assert_eq!(cfg.memory.max_entries(), DEFAULT_MAX_ENTRIES);
    }

    #[test]
    fn invalid_toml_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[memory\nmax_entries = ").unwrap();

        assert!(Config::from_file(&path).is_err());
        assert!(Config::load_with_defaults(None, Some(&path)).is_err());
    }

    #[test]
    fn shipped_default_config_parses() {
        let cfg: Config = toml::from_str(include_str!("../../config.default.toml"))
            .expect("parse config.default.toml");
        assert_eq!(cfg.memory.max_entries(), DEFAULT_MAX_ENTRIES);
        assert_eq!(cfg.memory.similarity_threshold(), DEFAULT_SIMILARITY_THRESHOLD);
        assert_eq!(
            cfg.memory.tools_path(),
            PathBuf::from(DEFAULT_MEMORY_DIR).join(DEFAULT_TOOLS_FILE)
        );
        assert_eq!(cfg.log_level(), Some("info"));
    }

    #[test]
    fn with_dir_roots_all_category_files() {
        let cfg = MemoryConfig::with_dir("/tmp/newsrecall");
        assert_eq!(cfg.tools_path(), PathBuf::from("/tmp/newsrecall/used_tools.json"));
        assert_eq!(cfg.max_entries(), DEFAULT_MAX_ENTRIES);
    }
}
