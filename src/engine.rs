//! Answer engine
//!
//! The fallback chain that turns one free-text query into one answer. Each
//! strategy exposes the same `attempt` capability; the chain is an ordered
//! list configured at startup, terminal on the first success:
//!
//! 1. semantic similarity against the embedding index
//! 2. extracted keywords against each entry's keyword set
//! 3. whole-question fuzzy "did you mean" suggestions
//! 4. record the query as unanswered and return the fixed no-match message
//!
//! All per-query failure modes collapse into `None` from a strategy, so
//! nothing past this boundary can surface an internal error to the caller.

use crate::config::MatchingConfig;
use crate::kb::KnowledgeBase;
use crate::matching::{
    fuzzy, AccuracyMetrics, KeywordExtractor, PhraseExtractor, TfExtractor,
};
use crate::semantic::SemanticIndex;
use crate::unanswered::UnansweredLog;
use anyhow::{bail, Result};
use serde::Serialize;
use tracing::{debug, info};

/// Constant introductory message; never touches the knowledge base.
pub const GREETING: &str = "Hi! I'm the FAQ assistant. Ask me anything about our knowledge base!";

/// Returned for empty or whitespace-only input without invoking any strategy.
pub const EMPTY_PROMPT: &str = "Please provide a valid message.";

/// Fixed answer when every strategy falls through.
pub const NO_MATCH: &str = "Sorry, I couldn't find an answer to your question.";

/// Answer while the configured knowledge source is unavailable.
pub const UNAVAILABLE: &str =
    "The answer service is temporarily unavailable. Please try again later.";

/// Which strategy produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Semantic,
    Keyword,
    Suggestion,
    None,
}

/// One answer for one query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub answer: String,
    pub matched_index: Option<usize>,
    pub score: f32,
    pub strategy: Strategy,
}

/// Immutable view of the loaded data, shared read-only across handlers.
///
/// Refreshing the knowledge base means building a whole new snapshot and
/// swapping one `Arc`, never mutating in place while readers are active.
pub struct Snapshot {
    pub kb: KnowledgeBase,
    pub semantic: Option<SemanticIndex>,
    /// Set when a configured source failed to load; while the knowledge base
    /// is also empty, queries get the "temporarily unavailable" answer.
    pub degraded: bool,
}

impl Snapshot {
    /// Build the snapshot, encoding every question into the semantic index.
    pub fn build(kb: KnowledgeBase, degraded: bool) -> Self {
        let semantic = Some(SemanticIndex::build(&kb));
        Self {
            kb,
            semantic,
            degraded,
        }
    }

    /// Snapshot without an embedding index; the semantic state is skipped.
    pub fn without_semantic(kb: KnowledgeBase) -> Self {
        Self {
            kb,
            semantic: None,
            degraded: false,
        }
    }
}

/// Uniform capability every chain state implements.
pub trait MatchStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Produce an answer for the (trimmed, lowercased) query, or `None` to
    /// advance the chain.
    fn attempt(&self, query: &str, snapshot: &Snapshot) -> Option<QueryResult>;
}

/// Embedding similarity gated by the confidence threshold.
struct SemanticStrategy {
    threshold: f32,
}

impl MatchStrategy for SemanticStrategy {
    fn name(&self) -> &'static str {
        "semantic"
    }

    fn attempt(&self, query: &str, snapshot: &Snapshot) -> Option<QueryResult> {
        // Index unavailable: skip straight to the next state
        let index = snapshot.semantic.as_ref()?;

        let (matched, score) = index.best_match(query, self.threshold);
        let matched_index = matched?;
        let entry = snapshot.kb.get(matched_index)?;

        Some(QueryResult {
            answer: entry.answer.clone(),
            matched_index: Some(matched_index),
            score,
            strategy: Strategy::Semantic,
        })
    }
}

/// Extracted keywords against each entry's keyword set, in KB order.
struct KeywordStrategy {
    extractor: Box<dyn KeywordExtractor>,
    top_keywords: usize,
    similarity: f32,
    strict: bool,
}

impl KeywordStrategy {
    fn entry_matches(&self, extracted: &[String], expected: &[String]) -> Option<f32> {
        if expected.is_empty() {
            return None;
        }
        if self.strict {
            let hit = extracted.iter().any(|k| expected.contains(k));
            return hit.then_some(1.0);
        }
        let ratio = fuzzy::best_pair_ratio(extracted, expected);
        (ratio >= self.similarity).then_some(ratio)
    }
}

impl MatchStrategy for KeywordStrategy {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn attempt(&self, query: &str, snapshot: &Snapshot) -> Option<QueryResult> {
        let extracted = self.extractor.extract(query, self.top_keywords);
        if extracted.is_empty() {
            return None;
        }
        debug!(keywords = ?extracted, "Extracted query keywords");

        for (index, entry) in snapshot.kb.entries().iter().enumerate() {
            if let Some(score) = self.entry_matches(&extracted, &entry.keywords) {
                let metrics = AccuracyMetrics::compute(&extracted, &entry.keywords);
                debug!(
                    entry = index,
                    precision = metrics.precision,
                    recall = metrics.recall,
                    f1 = metrics.f1,
                    "Keyword match quality"
                );

                return Some(QueryResult {
                    answer: entry.answer.clone(),
                    matched_index: Some(index),
                    score,
                    strategy: Strategy::Keyword,
                });
            }
        }

        None
    }
}

/// Whole-question fuzzy ranking formatted as a "did you mean" answer.
struct SuggestionStrategy {
    floor: f32,
    max_suggestions: usize,
}

impl MatchStrategy for SuggestionStrategy {
    fn name(&self) -> &'static str {
        "suggestion"
    }

    fn attempt(&self, query: &str, snapshot: &Snapshot) -> Option<QueryResult> {
        let ranked = fuzzy::rank_suggestions(query, &snapshot.kb, self.floor, self.max_suggestions);
        if ranked.is_empty() {
            return None;
        }

        let mut answer = String::from("I couldn't find an exact answer. Did you mean one of these?");
        for (position, (index, _)) in ranked.iter().enumerate() {
            if let Some(entry) = snapshot.kb.get(*index) {
                answer.push_str(&format!(
                    "<br>{}. <b>{}</b>: {}",
                    position + 1,
                    entry.question,
                    entry.answer
                ));
            }
        }

        let (best_index, best_score) = ranked[0];
        Some(QueryResult {
            answer,
            matched_index: Some(best_index),
            score: best_score,
            strategy: Strategy::Suggestion,
        })
    }
}

fn build_extractor(config: &MatchingConfig) -> Result<Box<dyn KeywordExtractor>> {
    match config.extractor.as_str() {
        "tf" => Ok(Box::new(TfExtractor::new(
            config.max_ngram,
            config.dedup_similarity,
        ))),
        "phrase" => Ok(Box::new(PhraseExtractor::new(
            config.max_ngram,
            config.dedup_similarity,
        ))),
        other => bail!("Unknown keyword extractor: {other}"),
    }
}

/// The orchestrator: owns the ordered strategy chain and the unanswered log.
pub struct AnswerEngine {
    chain: Vec<Box<dyn MatchStrategy>>,
    unanswered: UnansweredLog,
}

impl AnswerEngine {
    /// Build the chain from configured strategy names; order is preserved and
    /// unknown names are rejected at startup.
    pub fn from_config(config: &MatchingConfig, unanswered: UnansweredLog) -> Result<Self> {
        let mut chain: Vec<Box<dyn MatchStrategy>> = Vec::with_capacity(config.strategies.len());

        for name in &config.strategies {
            match name.as_str() {
                "semantic" => chain.push(Box::new(SemanticStrategy {
                    threshold: config.semantic_threshold,
                })),
                "keyword" => chain.push(Box::new(KeywordStrategy {
                    extractor: build_extractor(config)?,
                    top_keywords: config.top_keywords,
                    similarity: config.keyword_similarity,
                    strict: config.strict_keywords,
                })),
                "suggestion" => chain.push(Box::new(SuggestionStrategy {
                    floor: config.suggestion_floor,
                    max_suggestions: config.max_suggestions,
                })),
                other => bail!("Unknown match strategy: {other}"),
            }
        }

        Ok(Self { chain, unanswered })
    }

    /// Answer one query. Never fails; every internal problem degrades to a
    /// user-safe canned message.
    pub fn answer(&self, snapshot: &Snapshot, message: &str) -> QueryResult {
        let query = message.trim().to_lowercase();

        if query.is_empty() {
            return QueryResult {
                answer: EMPTY_PROMPT.to_string(),
                matched_index: None,
                score: 0.0,
                strategy: Strategy::None,
            };
        }

        if snapshot.degraded && snapshot.kb.is_empty() {
            return QueryResult {
                answer: UNAVAILABLE.to_string(),
                matched_index: None,
                score: 0.0,
                strategy: Strategy::None,
            };
        }

        for strategy in &self.chain {
            if let Some(mut result) = strategy.attempt(&query, snapshot) {
                self.append_link(snapshot, &mut result);
                info!(
                    strategy = strategy.name(),
                    score = result.score,
                    entry = result.matched_index,
                    "Query answered"
                );
                return result;
            }
        }

        self.unanswered.record(&query);
        info!("Query unanswered");

        QueryResult {
            answer: NO_MATCH.to_string(),
            matched_index: None,
            score: 0.0,
            strategy: Strategy::None,
        }
    }

    /// Any match referencing an entry with a link gets a formatted reference
    /// appended; for suggestions that is the top-ranked candidate.
    fn append_link(&self, snapshot: &Snapshot, result: &mut QueryResult) {
        let Some(index) = result.matched_index else {
            return;
        };
        if let Some(link) = snapshot.kb.get(index).and_then(|e| e.link.as_ref()) {
            result.answer.push_str(&format!(
                r#"<br><a href="{}" target="_blank">Click here for more info</a>"#,
                link
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb::Entry;

    fn test_log() -> (tempfile::TempDir, UnansweredLog) {
        let dir = tempfile::tempdir().unwrap();
        let log = UnansweredLog::open(dir.path().join("unanswered.log"));
        (dir, log)
    }

    fn engine(config: &MatchingConfig) -> (tempfile::TempDir, AnswerEngine) {
        let (dir, log) = test_log();
        (dir, AnswerEngine::from_config(config, log).unwrap())
    }

    fn sample_kb() -> KnowledgeBase {
        KnowledgeBase::new(vec![
            Entry::new(
                "what is x",
                "X is a thing",
                &["x", "thing"],
                None,
            ),
            Entry::new(
                "how much does the premium plan cost",
                "The premium plan is $10 a month.",
                &["premium", "plan", "cost", "pricing"],
                Some("https://example.com/pricing"),
            ),
        ])
    }

    #[test]
    fn test_empty_input_short_circuits() {
        let (_dir, engine) = engine(&MatchingConfig::default());
        let snapshot = Snapshot::build(sample_kb(), false);

        for input in ["", "   ", "\t\n"] {
            let result = engine.answer(&snapshot, input);
            assert_eq!(result.answer, EMPTY_PROMPT);
            assert_eq!(result.strategy, Strategy::None);
            assert!(result.matched_index.is_none());
        }
    }

    #[test]
    fn test_exact_question_matches_semantically() {
        let (_dir, engine) = engine(&MatchingConfig::default());
        let snapshot = Snapshot::build(sample_kb(), false);

        let result = engine.answer(&snapshot, "what is x");
        assert_eq!(result.strategy, Strategy::Semantic);
        assert_eq!(result.matched_index, Some(0));
        assert!((result.score - 1.0).abs() < 0.01);
        assert_eq!(result.answer, "X is a thing");
    }

    #[test]
    fn test_empty_kb_reaches_unanswered() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("unanswered.log");
        let engine =
            AnswerEngine::from_config(&MatchingConfig::default(), UnansweredLog::open(&log_path))
                .unwrap();
        let snapshot = Snapshot::build(KnowledgeBase::empty(), false);

        let result = engine.answer(&snapshot, "Anything At All");
        assert_eq!(result.strategy, Strategy::None);
        assert_eq!(result.answer, NO_MATCH);

        let logged = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(logged.trim(), "anything at all");
    }

    #[test]
    fn test_keyword_fallback_without_semantic_index() {
        let (_dir, engine) = engine(&MatchingConfig::default());
        let snapshot = Snapshot::without_semantic(sample_kb());

        let result = engine.answer(&snapshot, "tell me about x");
        assert_eq!(result.strategy, Strategy::Keyword);
        assert_eq!(result.matched_index, Some(0));
        assert_eq!(result.answer, "X is a thing");
    }

    #[test]
    fn test_below_threshold_falls_through_to_keyword() {
        // Force the semantic gate shut so a related-but-inexact query falls
        // through; the keyword state must then pick it up
        let config = MatchingConfig {
            semantic_threshold: 0.999,
            ..MatchingConfig::default()
        };
        let (_dir, engine) = engine(&config);
        let snapshot = Snapshot::build(sample_kb(), false);

        let result = engine.answer(&snapshot, "tell me about x");
        assert_eq!(result.strategy, Strategy::Keyword);
        assert_eq!(result.matched_index, Some(0));
    }

    #[test]
    fn test_strict_keywords_intersection() {
        let config = MatchingConfig {
            strict_keywords: true,
            ..MatchingConfig::default()
        };
        let (_dir, engine) = engine(&config);
        let snapshot = Snapshot::without_semantic(sample_kb());

        let result = engine.answer(&snapshot, "tell me about x");
        assert_eq!(result.strategy, Strategy::Keyword);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn test_link_appended_to_keyword_match() {
        let (_dir, engine) = engine(&MatchingConfig::default());
        let snapshot = Snapshot::without_semantic(sample_kb());

        let result = engine.answer(&snapshot, "premium plan pricing");
        assert_eq!(result.strategy, Strategy::Keyword);
        assert!(result.answer.contains("https://example.com/pricing"));
        assert!(result.answer.starts_with("The premium plan is $10 a month."));
    }

    #[test]
    fn test_suggestion_state() {
        // No keywords overlap, but the question text is close enough for the
        // suggestion floor: disable semantic acceptance via a shut gate
        let config = MatchingConfig {
            semantic_threshold: 0.999,
            ..MatchingConfig::default()
        };
        let (_dir, engine) = engine(&config);
        let kb = KnowledgeBase::new(vec![Entry::new(
            "what are your opening hours",
            "We open at nine.",
            &["zzzz"],
            None,
        )]);
        let snapshot = Snapshot::build(kb, false);

        let result = engine.answer(&snapshot, "your opening hours");
        assert_eq!(result.strategy, Strategy::Suggestion);
        assert!(result.answer.contains("Did you mean"));
        assert!(result.answer.contains("what are your opening hours"));
        assert!(result.answer.contains("We open at nine."));
    }

    #[test]
    fn test_link_appended_to_suggestion_match() {
        let config = MatchingConfig {
            semantic_threshold: 0.999,
            ..MatchingConfig::default()
        };
        let (_dir, engine) = engine(&config);
        let kb = KnowledgeBase::new(vec![Entry::new(
            "what are your opening hours",
            "We open at nine.",
            &["zzzz"],
            Some("https://example.com/hours"),
        )]);
        let snapshot = Snapshot::build(kb, false);

        // The top-ranked candidate carries a link, so the composite answer
        // ends with its reference
        let result = engine.answer(&snapshot, "your opening hours");
        assert_eq!(result.strategy, Strategy::Suggestion);
        assert!(result.answer.contains("Did you mean"));
        assert!(result.answer.contains("https://example.com/hours"));
    }

    #[test]
    fn test_entries_without_keywords_unreachable_by_keyword_state() {
        let config = MatchingConfig {
            strategies: vec!["keyword".to_string()],
            ..MatchingConfig::default()
        };
        let (_dir, engine) = engine(&config);
        let kb = KnowledgeBase::new(vec![Entry::new("what is x", "X is a thing", &[], None)]);
        let snapshot = Snapshot::build(kb, false);

        let result = engine.answer(&snapshot, "tell me about x");
        assert_eq!(result.strategy, Strategy::None);
    }

    #[test]
    fn test_degraded_empty_snapshot_reports_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("unanswered.log");
        let engine =
            AnswerEngine::from_config(&MatchingConfig::default(), UnansweredLog::open(&log_path))
                .unwrap();
        let snapshot = Snapshot::build(KnowledgeBase::empty(), true);

        let result = engine.answer(&snapshot, "anything");
        assert_eq!(result.answer, UNAVAILABLE);
        // Not the user's fault: unavailable queries are not logged
        let logged = std::fs::read_to_string(&log_path).unwrap_or_default();
        assert!(logged.is_empty());
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        let config = MatchingConfig {
            strategies: vec!["telepathy".to_string()],
            ..MatchingConfig::default()
        };
        let (_dir, log) = test_log();
        assert!(AnswerEngine::from_config(&config, log).is_err());
    }

    #[test]
    fn test_chain_order_is_respected() {
        // With suggestion placed first, an exact question should surface as a
        // suggestion instead of a semantic match
        let config = MatchingConfig {
            strategies: vec!["suggestion".to_string(), "semantic".to_string()],
            ..MatchingConfig::default()
        };
        let (_dir, engine) = engine(&config);
        let snapshot = Snapshot::build(sample_kb(), false);

        let result = engine.answer(&snapshot, "what is x");
        assert_eq!(result.strategy, Strategy::Suggestion);
    }
}
