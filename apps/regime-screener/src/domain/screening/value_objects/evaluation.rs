//! Regime-fit evaluation of one entity.

use serde::{Deserialize, Serialize};

/// Explanation used when an entity has no metrics to score.
pub const NO_METRICS: &str = "No metrics";

/// Highest possible score.
pub const MAX_SCORE: u8 = 100;

/// Regime-fit score in `[0, 100]` with its explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EvaluationPayload")]
pub struct Evaluation {
    explanation: String,
    score: u8,
}

impl Evaluation {
    /// Create an evaluation, clamping the score into `[0, 100]`.
    #[must_use]
    pub fn new(explanation: impl Into<String>, score: i64) -> Self {
        Self {
            explanation: explanation.into(),
            score: score.clamp(0, i64::from(MAX_SCORE)) as u8,
        }
    }

    /// Deterministic result for an entity without metrics.
    #[must_use]
    pub fn no_metrics() -> Self {
        Self::new(NO_METRICS, 0)
    }

    /// Zero-score result for an entity whose scoring call failed.
    #[must_use]
    pub fn degraded(reason: impl std::fmt::Display) -> Self {
        Self::new(format!("Evaluation unavailable: {reason}"), 0)
    }

    /// The explanation text.
    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// The score.
    #[must_use]
    pub const fn score(&self) -> u8 {
        self.score
    }
}

/// Loose shape accepted from model output and stored reports.
#[derive(Debug, Deserialize)]
struct EvaluationPayload {
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    score: Option<f64>,
}

impl From<EvaluationPayload> for Evaluation {
    fn from(payload: EvaluationPayload) -> Self {
        let score = payload
            .score
            .filter(|s| s.is_finite())
            .map_or(0, |s| s.round() as i64);
        Self::new(payload.explanation.unwrap_or_default(), score)
    }
}
