//! Fuzzy string matching
//!
//! Character-level similarity based on Ratcliff/Obershelp longest-common-block
//! matching, normalized to [0, 1]. Used for keyword equivalence (tolerating
//! stemming, pluralization, and typos) and for ranking whole-question
//! "did you mean" suggestions.

use crate::kb::KnowledgeBase;

/// Similarity ratio between two strings in [0, 1].
///
/// Computed as `2 * M / (len(a) + len(b))` where M is the total number of
/// characters covered by recursively matched common blocks.
pub fn similarity_ratio(a: &str, b: &str) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let matched = matching_chars(&a_chars, &b_chars);

    (2.0 * matched as f32) / ((a_chars.len() + b_chars.len()) as f32)
}

/// Total matched characters: longest common block, then recurse on both sides.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (a_start, b_start, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }

    len + matching_chars(&a[..a_start], &b[..b_start])
        + matching_chars(&a[a_start + len..], &b[b_start + len..])
}

/// Find the longest common contiguous block between `a` and `b`.
///
/// Returns (start in a, start in b, length); earliest occurrence wins ties.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0usize, 0usize, 0usize);
    // Single-row DP over suffix lengths ending at (i, j)
    let mut row = vec![0usize; b.len() + 1];

    for i in 0..a.len() {
        let mut prev = 0;
        for j in 0..b.len() {
            let diagonal = row[j + 1];
            row[j + 1] = if a[i] == b[j] { prev + 1 } else { 0 };
            if row[j + 1] > best.2 {
                best = (i + 1 - row[j + 1], j + 1 - row[j + 1], row[j + 1]);
            }
            prev = diagonal;
        }
    }

    best
}

/// Best pairwise similarity ratio between two keyword sets.
///
/// Returns 0.0 when either side is empty.
pub fn best_pair_ratio(extracted: &[String], expected: &[String]) -> f32 {
    let mut best = 0.0f32;
    for a in extracted {
        for b in expected {
            let ratio = similarity_ratio(a, b);
            if ratio > best {
                best = ratio;
            }
        }
    }
    best
}

/// True if any cross-pair of keywords meets the similarity threshold.
pub fn keywords_match(extracted: &[String], expected: &[String], threshold: f32) -> bool {
    best_pair_ratio(extracted, expected) >= threshold
}

/// Rank KB questions by whole-string similarity to the query.
///
/// Returns up to `top_n` (index, score) pairs whose score exceeds `floor`,
/// sorted descending; equal scores keep knowledge-base insertion order.
pub fn rank_suggestions(
    query: &str,
    kb: &KnowledgeBase,
    floor: f32,
    top_n: usize,
) -> Vec<(usize, f32)> {
    let mut ranked: Vec<(usize, f32)> = kb
        .entries()
        .iter()
        .enumerate()
        .map(|(idx, entry)| (idx, similarity_ratio(query, &entry.question.to_lowercase())))
        .filter(|(_, score)| *score > floor)
        .collect();

    // Stable sort preserves KB order for equal scores
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(top_n);

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb::Entry;

    fn kb_from_questions(questions: &[&str]) -> KnowledgeBase {
        KnowledgeBase::new(
            questions
                .iter()
                .map(|q| Entry::new(q, "answer", &[], None))
                .collect(),
        )
    }

    #[test]
    fn test_identical_strings() {
        assert!((similarity_ratio("hello", "hello") - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_disjoint_strings() {
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_empty_strings() {
        assert_eq!(similarity_ratio("", ""), 1.0);
        assert_eq!(similarity_ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_plural_tolerance() {
        // "keyword" vs "keywords" share a 7-char block out of 15 chars total
        let ratio = similarity_ratio("keyword", "keywords");
        assert!(ratio > 0.9, "ratio was {}", ratio);
    }

    #[test]
    fn test_keywords_match_exact_member() {
        let extracted = vec!["x".to_string(), "tell".to_string()];
        let expected = vec!["x".to_string(), "thing".to_string()];
        assert!(keywords_match(&extracted, &expected, 0.6));
    }

    #[test]
    fn test_keywords_match_below_threshold() {
        let extracted = vec!["weather".to_string()];
        let expected = vec!["pricing".to_string()];
        assert!(!keywords_match(&extracted, &expected, 0.6));
    }

    #[test]
    fn test_keywords_match_empty_sets() {
        assert!(!keywords_match(&[], &["x".to_string()], 0.6));
        assert!(!keywords_match(&["x".to_string()], &[], 0.6));
    }

    #[test]
    fn test_rank_suggestions_ordering() {
        let kb = kb_from_questions(&[
            "how do I reset my password",
            "how do I reset my username",
            "what are your opening hours",
        ]);

        let ranked = rank_suggestions("how do i reset my password", &kb, 0.4, 3);
        assert!(!ranked.is_empty());
        assert_eq!(ranked[0].0, 0);
        for pair in ranked.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn test_rank_suggestions_tie_keeps_kb_order() {
        let kb = kb_from_questions(&["same question text", "same question text"]);
        let ranked = rank_suggestions("same question text", &kb, 0.4, 3);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0, 0);
        assert_eq!(ranked[1].0, 1);
    }

    #[test]
    fn test_rank_suggestions_floor_filters_all() {
        let kb = kb_from_questions(&["completely unrelated question"]);
        let ranked = rank_suggestions("zzzz", &kb, 0.4, 3);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_rank_suggestions_respects_top_n() {
        let kb = kb_from_questions(&["reset password", "reset passwords", "reset my password", "password reset"]);
        let ranked = rank_suggestions("reset password", &kb, 0.4, 2);
        assert_eq!(ranked.len(), 2);
    }
}
