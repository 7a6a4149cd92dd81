//! Keyword extraction
//!
//! Turns free text into a ranked list of distinct lowercased keywords.
//! Two interchangeable strategies sit behind the [`KeywordExtractor`] trait:
//!
//! - [`TfExtractor`]: statistical single-document term weighting. Candidate
//!   1..n-grams scored by term frequency (IDF degenerates to a constant for a
//!   single document), ties broken by first occurrence.
//! - [`PhraseExtractor`]: unsupervised phrase scoring from position, frequency,
//!   and casing heuristics. No model required.
//!
//! Both are deterministic for fixed parameters and merge near-duplicate
//! candidates whose similarity ratio reaches the dedup ceiling.

use super::fuzzy;
use rustc_hash::FxHashMap;

/// Common English stopwords excluded from candidate keywords.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as",
    "at", "be", "because", "been", "being", "but", "by", "can", "could", "did", "do", "does",
    "doing", "down", "for", "from", "had", "has", "have", "he", "her", "here", "hers", "him",
    "his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "me", "more", "most", "my",
    "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours",
    "out", "over", "own", "please", "same", "she", "should", "so", "some", "such", "than", "that",
    "the", "their", "theirs", "them", "then", "there", "these", "they", "this", "those", "through",
    "to", "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where",
    "which", "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours",
];

/// Stateless text -> ranked keyword list.
pub trait KeywordExtractor: Send + Sync {
    /// Extract up to `top_k` distinct lowercased keywords, best first.
    ///
    /// Empty or whitespace-only input yields an empty list, never an error.
    fn extract(&self, text: &str, top_k: usize) -> Vec<String>;
}

/// A token with its lowercased form and original casing preserved.
struct Token {
    lower: String,
    cased: bool,
}

/// A candidate phrase with accumulated scoring features.
struct Candidate {
    phrase: String,
    count: usize,
    first_index: usize,
    cased: bool,
}

fn tokenize(text: &str) -> Vec<Token> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(|s| Token {
            lower: s.to_lowercase(),
            cased: s.chars().any(|c| c.is_uppercase()),
        })
        .filter(|t| !STOPWORDS.contains(&t.lower.as_str()))
        .collect()
}

/// Collect distinct 1..=max_ngram candidates in first-occurrence order.
fn collect_candidates(tokens: &[Token], max_ngram: usize) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut seen: FxHashMap<String, usize> = FxHashMap::default();

    for n in 1..=max_ngram.max(1) {
        for (start, window) in tokens.windows(n).enumerate() {
            let phrase = window
                .iter()
                .map(|t| t.lower.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let cased = window.iter().any(|t| t.cased);

            match seen.get(&phrase) {
                Some(&idx) => {
                    candidates[idx].count += 1;
                    candidates[idx].cased |= cased;
                }
                None => {
                    seen.insert(phrase.clone(), candidates.len());
                    candidates.push(Candidate {
                        phrase,
                        count: 1,
                        first_index: start,
                        cased,
                    });
                }
            }
        }
    }

    candidates
}

/// Keep the top_k ranked phrases, merging near-duplicates above the ceiling.
fn take_deduplicated(ranked: Vec<Candidate>, top_k: usize, dedup_ceiling: f32) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(top_k);
    for candidate in ranked {
        if kept.len() >= top_k {
            break;
        }
        let duplicate = kept
            .iter()
            .any(|k| fuzzy::similarity_ratio(k, &candidate.phrase) >= dedup_ceiling);
        if !duplicate {
            kept.push(candidate.phrase);
        }
    }
    kept
}

/// Statistical single-document term-frequency extractor.
#[derive(Debug, Clone)]
pub struct TfExtractor {
    max_ngram: usize,
    dedup_ceiling: f32,
}

impl TfExtractor {
    pub fn new(max_ngram: usize, dedup_ceiling: f32) -> Self {
        Self {
            max_ngram,
            dedup_ceiling,
        }
    }
}

impl KeywordExtractor for TfExtractor {
    fn extract(&self, text: &str, top_k: usize) -> Vec<String> {
        let tokens = tokenize(text);
        if tokens.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let mut candidates = collect_candidates(&tokens, self.max_ngram);
        // Candidates are gathered per n-gram size, so insertion order alone
        // would rank an equal-count bigram after every unigram; tie on the
        // text position instead
        candidates.sort_by(|a, b| b.count.cmp(&a.count).then(a.first_index.cmp(&b.first_index)));

        take_deduplicated(candidates, top_k, self.dedup_ceiling)
    }
}

/// Unsupervised phrase extractor scoring position, frequency, and casing.
#[derive(Debug, Clone)]
pub struct PhraseExtractor {
    max_ngram: usize,
    dedup_ceiling: f32,
}

impl PhraseExtractor {
    pub fn new(max_ngram: usize, dedup_ceiling: f32) -> Self {
        Self {
            max_ngram,
            dedup_ceiling,
        }
    }

    /// Earlier, more frequent, and cased (acronym/title) phrases score higher.
    fn score(candidate: &Candidate, token_count: usize) -> f32 {
        let position_weight = 1.0 / (1.0 + candidate.first_index as f32 / token_count as f32);
        let casing_weight = if candidate.cased { 1.25 } else { 1.0 };
        candidate.count as f32 * position_weight * casing_weight
    }
}

impl KeywordExtractor for PhraseExtractor {
    fn extract(&self, text: &str, top_k: usize) -> Vec<String> {
        let tokens = tokenize(text);
        if tokens.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let token_count = tokens.len();
        let mut candidates = collect_candidates(&tokens, self.max_ngram);
        candidates.sort_by(|a, b| {
            let score_b = Self::score(b, token_count);
            let score_a = Self::score(a, token_count);
            score_b
                .partial_cmp(&score_a)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.first_index.cmp(&b.first_index))
        });

        take_deduplicated(candidates, top_k, self.dedup_ceiling)
    }
}
