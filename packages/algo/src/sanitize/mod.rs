//! Data Sanitization
//!
//! Numerical stability utilities for learning content and posteriors.
//!
//! Functions:
//! - IRT parameter validation
//! - Distribution normalization
//! - Challenge pool diagnostics

use serde::{Deserialize, Serialize};

use crate::types::Challenge;

/// Smallest discriminant still treated as informative
pub const MIN_DISCRIMINANT: f64 = 1e-6;

/// Largest absolute IRT parameter accepted from content
pub const MAX_IRT_ABS: f64 = 50.0;

/// Validated 2PL item parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrtParams {
    pub discriminant: f64,
    pub difficulty: f64,
}

/// Whether any value is NaN or infinite
pub fn has_invalid_values(arr: &[f64]) -> bool {
    arr.iter().any(|&x| x.is_nan() || x.is_infinite())
}

/// Missing, non-finite or non-positive-discriminant parameters are rejected
pub fn sanitize_irt_params(discriminant: Option<f64>, difficulty: Option<f64>) -> Option<IrtParams> {
    let discriminant = discriminant?;
    let difficulty = difficulty?;

    if !discriminant.is_finite() || !difficulty.is_finite() {
        return None;
    }
    if discriminant < MIN_DISCRIMINANT {
        return None;
    }

    Some(IrtParams {
        discriminant: discriminant.min(MAX_IRT_ABS),
        difficulty: difficulty.clamp(-MAX_IRT_ABS, MAX_IRT_ABS),
    })
}

/// Normalizes in place; returns false and leaves input untouched on an invalid sum
pub fn normalize_distribution(values: &mut [f64]) -> bool {
    if has_invalid_values(values) {
        return false;
    }
    let sum: f64 = values.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        return false;
    }
    for val in values.iter_mut() {
        *val /= sum;
    }
    true
}

/// Scales by the maximum so long answer histories do not underflow
pub fn rescale_by_max(values: &mut [f64]) {
    let max = values.iter().cloned().fold(0.0_f64, f64::max);
    if max > 0.0 && max.is_finite() {
        for val in values.iter_mut() {
            *val /= max;
        }
    }
}

/// Health report for a challenge pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolDiagnostics {
    pub total: usize,
    pub selectable: usize,
    pub missing_params: usize,
    pub degenerate_params: usize,
    pub not_selectable: usize,
}

impl PoolDiagnostics {
    pub fn is_healthy(&self) -> bool {
        self.missing_params == 0 && self.degenerate_params == 0
    }
}

/// Counts challenges with unusable IRT parameters
pub fn diagnose_pool(challenges: &[Challenge]) -> PoolDiagnostics {
    let mut diagnostics = PoolDiagnostics {
        total: challenges.len(),
        ..Default::default()
    };

    for challenge in challenges {
        if !challenge.status.is_selectable() {
            diagnostics.not_selectable += 1;
            continue;
        }
        if challenge.discriminant.is_none() || challenge.difficulty.is_none() {
            diagnostics.missing_params += 1;
        } else if challenge.irt_params().is_none() {
            diagnostics.degenerate_params += 1;
        } else {
            diagnostics.selectable += 1;
        }
    }

    diagnostics
}

// ==================== Tests ====================
