//! faqbot - knowledge-base question answering
//!
//! Answers free-text questions against a small, static knowledge base of
//! question/answer/keyword entries through a layered fallback chain: semantic
//! embedding similarity, keyword extraction with fuzzy equivalence, and
//! whole-question "did you mean" suggestions. Queries no strategy can answer
//! land in an append-only unanswered log.

pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod kb;
pub mod matching;
pub mod semantic;
pub mod unanswered;
pub mod web;
