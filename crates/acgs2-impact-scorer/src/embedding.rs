// crates/acgs2-impact-scorer/src/embedding.rs
// ============================================================================
// Module: Embedding Provider Seam
// Description: Trait boundary standing in for the source's transformer/ONNX
//              model backends, which are out of scope here (spec's external
//              embedding-model Non-goal).
// ============================================================================

//! ## Overview
//! The original scorer loads a DistilBERT or ONNX-quantized model in-process.
//! That is a real-model integration this crate does not own; callers who have
//! one supply it through this trait. With no provider configured, the scorer
//! falls back to [`crate::keywords::keyword_fallback_score`], matching the
//! original's own fallback path when no transformer backend is available.

/// Scores free text against a high-impact semantic reference set.
///
/// Implementations typically embed `text` and the reference keyword set, then
/// return their cosine similarity. Returning `None` tells the scorer to use
/// the keyword fallback instead of treating the text as zero-impact.
pub trait EmbeddingProvider: Send + Sync {
    /// Returns a similarity score in `[0, 1]`, or `None` to defer to the
    /// keyword fallback.
    fn similarity_to_high_impact_set(&self, text: &str) -> Option<f64>;
}
