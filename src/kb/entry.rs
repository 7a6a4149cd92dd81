//! Knowledge base types
//!
//! An [`Entry`] is one question/answer/keywords/link record. The
//! [`KnowledgeBase`] is an ordered, immutable collection of entries built once
//! at startup; insertion order is the tie-break for equal-score matches.

use serde::{Deserialize, Serialize};

/// One knowledge base record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub question: String,
    pub answer: String,
    /// Lowercased, deduplicated, order-preserving keyword set.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Entry {
    pub fn new(question: &str, answer: &str, keywords: &[&str], link: Option<&str>) -> Self {
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
            keywords: normalize_keywords(keywords.iter().map(|k| k.to_string())),
            link: link.map(str::to_string),
        }
    }

    /// Validate required fields and normalize keywords in place.
    ///
    /// Returns false for malformed records (empty question or answer), which
    /// the loaders skip rather than treating as fatal.
    pub fn normalize(&mut self) -> bool {
        if self.question.trim().is_empty() || self.answer.trim().is_empty() {
            return false;
        }
        self.keywords = normalize_keywords(self.keywords.drain(..));
        if let Some(link) = &self.link {
            if link.trim().is_empty() {
                self.link = None;
            }
        }
        true
    }
}

/// Trim, lowercase, drop empties, and deduplicate preserving first occurrence.
fn normalize_keywords(keywords: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for keyword in keywords {
        let normalized = keyword.trim().to_lowercase();
        if !normalized.is_empty() && !out.contains(&normalized) {
            out.push(normalized);
        }
    }
    out
}

/// Ordered, immutable collection of entries.
///
/// An empty knowledge base is valid: every query then falls through the
/// matching chain to the unanswered state.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: Vec<Entry>,
}

impl KnowledgeBase {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
