//! Confidence-aware fusion of the three tiers.
//!
//! Uses the three-tier weights when tier 3 is available and the two-tier
//! fallback weights otherwise. Only tiers with confidence other than
//! `none` contribute; the weights of contributing tiers are renormalized
//! to sum to one. With nothing available the result is 0.

use super::{Tier1Result, Tier2Result, Tier3Result};
use crate::config::{FusionWeights, ProgressConfig};

/// Fused progress percentage in [0, 100].
pub fn fuse(
    tier1: &Tier1Result,
    tier2: &Tier2Result,
    tier3: Option<&Tier3Result>,
    config: &ProgressConfig,
) -> f64 {
    let tier3 = tier3.filter(|t| t.confidence.is_available());
    let weights: FusionWeights = if tier3.is_some() {
        config.weights
    } else {
        config.fallback_weights
    };

    let mut contributions = Vec::with_capacity(3);
    if tier1.confidence.is_available() {
        contributions.push((weights.tier1, tier1.progress_pct));
    }
    if tier2.confidence.is_available() {
        contributions.push((weights.tier2, tier2.progress_pct));
    }
    if let Some(t3) = tier3 {
        contributions.push((weights.tier3, t3.progress_pct));
    }

    let total_weight: f64 = contributions.iter().map(|(w, _)| w).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    let fused: f64 = contributions.iter().map(|(w, p)| w * p).sum::<f64>() / total_weight;
    fused.clamp(0.0, 100.0)
}
