//! Query matching primitives
//!
//! Keyword extraction, fuzzy string similarity, and the diagnostic accuracy
//! metrics consumed by the answer engine's fallback chain.

pub mod fuzzy;
pub mod keywords;
pub mod metrics;

pub use keywords::{KeywordExtractor, PhraseExtractor, TfExtractor};
pub use metrics::AccuracyMetrics;
