// crates/acgs2-impact-scorer/src/keywords.rs
// ============================================================================
// Module: High-Impact Keyword Vocabulary
// Description: Fallback semantic signal used when no embedding provider is
//              configured.
// ============================================================================

/// Keywords used for the keyword-matching fallback of the semantic signal.
/// Ported verbatim from the original scorer's `high_impact_keywords`.
pub const HIGH_IMPACT_KEYWORDS: &[&str] = &[
    "critical",
    "emergency",
    "security",
    "breach",
    "violation",
    "danger",
    "risk",
    "threat",
    "attack",
    "exploit",
    "vulnerability",
    "compromise",
    "governance",
    "policy",
    "regulation",
    "compliance",
    "legal",
    "audit",
    "financial",
    "transaction",
    "payment",
    "transfer",
    "blockchain",
    "consensus",
    "unauthorized",
    "abnormal",
    "suspicious",
    "alert",
];

/// Scores free text by counting keyword hits: one hit is `0.3`, capped at `0.9`.
///
/// Used whenever no [`crate::embedding::EmbeddingProvider`] is configured, or
/// when the configured provider declines to score a given text.
#[must_use]
pub fn keyword_fallback_score(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let lowered = text.to_lowercase();
    let hits = HIGH_IMPACT_KEYWORDS
        .iter()
        .filter(|keyword| lowered.contains(*keyword))
        .count();
    (hits as f64 * 0.3).min(0.9)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use super::*;

    #[test]
    fn empty_text_scores_zero() {
        assert!((keyword_fallback_score("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn three_or_more_hits_cap_at_point_nine() {
        let score = keyword_fallback_score("critical security breach exploit");
        assert!((score - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn single_hit_scores_point_three() {
        let score = keyword_fallback_score("routine status update, no issues");
        assert!((score - 0.0).abs() < f64::EPSILON);
        let score = keyword_fallback_score("a routine audit occurred");
        assert!((score - 0.3).abs() < f64::EPSILON);
    }
}
