//! Configuration management
//!
//! TOML configuration with CLI overrides, mirroring the usual pattern:
//! serde defaults per field, discovery across default locations, and a
//! `--init` template generator. The matching thresholds live here because
//! their correct values are empirical and dataset-dependent, not constants.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main service configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to
    #[serde(default = "default_address")]
    pub address: String,
}

/// Knowledge base source. At most one source is used: `file` wins over
/// `url` wins over `sqlite_path`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KnowledgeConfig {
    /// Local JSON document of entries
    #[serde(default)]
    pub file: Option<String>,

    /// Remote JSON document fetched over HTTP at startup
    #[serde(default)]
    pub url: Option<String>,

    /// SQLite database of entries
    #[serde(default)]
    pub sqlite_path: Option<String>,

    /// Table holding question/answer/keywords/link columns
    #[serde(default = "default_sqlite_table")]
    pub sqlite_table: String,
}

/// Matching chain parameters. Thresholds are tuning knobs; the defaults are
/// starting points, not derivations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Ordered fallback chain; first success wins
    #[serde(default = "default_strategies")]
    pub strategies: Vec<String>,

    /// Keyword extractor: "tf" (term frequency) or "phrase" (heuristic)
    #[serde(default = "default_extractor")]
    pub extractor: String,

    /// Minimum cosine similarity for accepting a semantic match.
    /// The single most important knob in the chain.
    #[serde(default = "default_semantic_threshold")]
    pub semantic_threshold: f32,

    /// Minimum fuzzy ratio for treating two keywords as equivalent
    #[serde(default = "default_keyword_similarity")]
    pub keyword_similarity: f32,

    /// Require exact keyword intersection instead of fuzzy equivalence
    #[serde(default)]
    pub strict_keywords: bool,

    /// Minimum fuzzy ratio for a "did you mean" suggestion
    #[serde(default = "default_suggestion_floor")]
    pub suggestion_floor: f32,

    /// Maximum number of suggestions in a composite answer
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,

    /// Keywords extracted per query
    #[serde(default = "default_top_keywords")]
    pub top_keywords: usize,

    /// Maximum n-gram length for candidate keywords
    #[serde(default = "default_max_ngram")]
    pub max_ngram: usize,

    /// Fuzzy ratio at or above which near-duplicate candidates are merged
    #[serde(default = "default_dedup_similarity")]
    pub dedup_similarity: f32,
}

/// Durable log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Append-only, newline-delimited record of unanswered queries
    #[serde(default = "default_unanswered_path")]
    pub unanswered_path: String,
}

fn default_address() -> String {
    "0.0.0.0:8090".to_string()
}

fn default_sqlite_table() -> String {
    "entries".to_string()
}

fn default_strategies() -> Vec<String> {
    vec![
        "semantic".to_string(),
        "keyword".to_string(),
        "suggestion".to_string(),
    ]
}

fn default_extractor() -> String {
    "tf".to_string()
}

fn default_semantic_threshold() -> f32 {
    0.6
}

fn default_keyword_similarity() -> f32 {
    0.6
}

fn default_suggestion_floor() -> f32 {
    0.4
}

fn default_max_suggestions() -> usize {
    3
}

fn default_top_keywords() -> usize {
    5
}

fn default_max_ngram() -> usize {
    2
}

fn default_dedup_similarity() -> f32 {
    0.9
}

fn default_unanswered_path() -> String {
    "unanswered_queries.log".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
            extractor: default_extractor(),
            semantic_threshold: default_semantic_threshold(),
            keyword_similarity: default_keyword_similarity(),
            strict_keywords: false,
            suggestion_floor: default_suggestion_floor(),
            max_suggestions: default_max_suggestions(),
            top_keywords: default_top_keywords(),
            max_ngram: default_max_ngram(),
            dedup_similarity: default_dedup_similarity(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            unanswered_path: default_unanswered_path(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from default locations.
    ///
    /// Search order:
    /// 1. FAQBOT_CONFIG environment variable
    /// 2. ./faqbot.toml (current directory)
    /// 3. ~/.config/faqbot/faqbot.toml (user config)
    pub fn from_default_locations() -> Result<Option<(Self, PathBuf)>> {
        if let Ok(env_path) = std::env::var("FAQBOT_CONFIG") {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                let config = Self::from_file(&path)?;
                return Ok(Some((config, path)));
            }
        }

        let local_path = PathBuf::from("faqbot.toml");
        if local_path.exists() {
            let config = Self::from_file(&local_path)?;
            return Ok(Some((config, local_path)));
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_path = config_dir.join("faqbot").join("faqbot.toml");
            if user_path.exists() {
                let config = Self::from_file(&user_path)?;
                return Ok(Some((config, user_path)));
            }
        }

        Ok(None)
    }

    /// Generate a template configuration file.
    pub fn generate_template() -> String {
        r#"# faqbot configuration
# Generated template - customize as needed

[server]
# Address to bind the HTTP server to
address = "0.0.0.0:8090"

[knowledge]
# Exactly one source is used: file wins over url wins over sqlite_path.
# file = "chatbot_knowledge.json"
# url = "https://example.com/knowledge.json"
# sqlite_path = "knowledge.sqlite"
# sqlite_table = "entries"

[matching]
# Ordered fallback chain; first success wins
strategies = ["semantic", "keyword", "suggestion"]

# Keyword extractor: "tf" (term frequency) or "phrase" (heuristic phrases)
extractor = "tf"

# Minimum cosine similarity to accept a semantic match
semantic_threshold = 0.6

# Minimum fuzzy ratio for keyword equivalence
keyword_similarity = 0.6

# Require exact keyword intersection instead of fuzzy equivalence
strict_keywords = false

# Minimum fuzzy ratio for "did you mean" suggestions
suggestion_floor = 0.4

# Maximum suggestions in a composite answer
max_suggestions = 3

# Keywords extracted per query
top_keywords = 5

# Maximum n-gram length for candidate keywords
max_ngram = 2

# Fuzzy ratio at or above which near-duplicate candidates merge
dedup_similarity = 0.9

[log]
# Append-only record of queries with no match
unanswered_path = "unanswered_queries.log"
"#
        .to_string()
    }

    /// Write template config to the specified path.
    pub fn write_template(path: &Path) -> Result<()> {
        let template = Self::generate_template();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        std::fs::write(path, template)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Merge CLI overrides into the configuration.
    pub fn with_overrides(mut self, address: Option<String>, kb_file: Option<String>) -> Self {
        if let Some(addr) = address {
            self.server.address = addr;
        }
        if let Some(file) = kb_file {
            self.knowledge.file = Some(file);
        }
        self
    }
}
