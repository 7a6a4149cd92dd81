//! Knowledge base loading
//!
//! Three sources: a local JSON file, a remote JSON document fetched over
//! HTTP, or a SQLite table. Loading happens in the blocking startup phase (or
//! during an explicit reload); per-record problems skip the record, and a
//! source-level failure bubbles up so the caller can degrade to an empty
//! knowledge base instead of aborting startup.

use super::entry::{Entry, KnowledgeBase};
use crate::config::KnowledgeConfig;
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Timeout for the remote document fetch at startup.
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Where the knowledge base comes from.
#[derive(Debug, Clone)]
pub enum KbSource {
    File(PathBuf),
    Url(String),
    Sqlite { path: PathBuf, table: String },
}

impl KbSource {
    /// Resolve the configured source, if any. File wins over URL over SQLite
    /// when more than one is configured.
    pub fn from_config(config: &KnowledgeConfig) -> Option<Self> {
        if let Some(file) = &config.file {
            return Some(KbSource::File(PathBuf::from(file)));
        }
        if let Some(url) = &config.url {
            return Some(KbSource::Url(url.clone()));
        }
        config.sqlite_path.as_ref().map(|path| KbSource::Sqlite {
            path: PathBuf::from(path),
            table: config.sqlite_table.clone(),
        })
    }
}

impl std::fmt::Display for KbSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KbSource::File(path) => write!(f, "file:{}", path.display()),
            KbSource::Url(url) => write!(f, "{}", url),
            KbSource::Sqlite { path, table } => {
                write!(f, "sqlite:{}#{}", path.display(), table)
            }
        }
    }
}

/// Load the knowledge base from the given source.
pub fn load(source: &KbSource) -> Result<KnowledgeBase> {
    let kb = match source {
        KbSource::File(path) => load_file(path)?,
        KbSource::Url(url) => load_url(url)?,
        KbSource::Sqlite { path, table } => load_sqlite(path, table)?,
    };

    info!(source = %source, entries = kb.len(), "Knowledge base loaded");
    Ok(kb)
}

fn load_file(path: &Path) -> Result<KnowledgeBase> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read knowledge file: {}", path.display()))?;
    let records: Vec<serde_json::Value> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse knowledge file: {}", path.display()))?;

    Ok(collect_records(records))
}

fn load_url(url: &str) -> Result<KnowledgeBase> {
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let records: Vec<serde_json::Value> = client
        .get(url)
        .send()
        .with_context(|| format!("Failed to fetch knowledge document: {}", url))?
        .error_for_status()
        .with_context(|| format!("Knowledge document request rejected: {}", url))?
        .json()
        .with_context(|| format!("Failed to parse knowledge document: {}", url))?;

    Ok(collect_records(records))
}

/// Load rows from a SQLite table with question/answer/keywords/link columns.
/// Keywords are stored as one comma-separated column.
fn load_sqlite(path: &Path, table: &str) -> Result<KnowledgeBase> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open knowledge database: {}", path.display()))?;

    let sql = format!("SELECT question, answer, keywords, link FROM {} ORDER BY rowid", table);
    let mut stmt = conn
        .prepare(&sql)
        .with_context(|| format!("Failed to query knowledge table: {}", table))?;

    let rows = stmt.query_map([], |row| {
        let keywords: Option<String> = row.get(2)?;
        Ok(Entry {
            question: row.get(0)?,
            answer: row.get(1)?,
            keywords: keywords
                .unwrap_or_default()
                .split(',')
                .map(str::to_string)
                .collect(),
            link: row.get(3)?,
        })
    })?;

    let mut entries = Vec::new();
    for (index, row) in rows.enumerate() {
        match row {
            Ok(mut entry) => {
                if entry.normalize() {
                    entries.push(entry);
                } else {
                    warn!(row = index, "Skipping malformed knowledge row");
                }
            }
            Err(e) => warn!(row = index, error = %e, "Skipping unreadable knowledge row"),
        }
    }

    Ok(KnowledgeBase::new(entries))
}

/// Decode records leniently: malformed entries are skipped, not fatal.
fn collect_records(records: Vec<serde_json::Value>) -> KnowledgeBase {
    let mut entries = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Entry>(record) {
            Ok(mut entry) => {
                if entry.normalize() {
                    entries.push(entry);
                } else {
                    warn!(record = index, "Skipping malformed knowledge record");
                }
            }
            Err(e) => {
                warn!(record = index, error = %e, "Skipping undecodable knowledge record");
            }
        }
    }
    KnowledgeBase::new(entries)
}
