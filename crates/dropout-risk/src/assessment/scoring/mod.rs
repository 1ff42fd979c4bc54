mod config;
mod rules;

pub use config::{ScoringConfig, ScoringConfigError, TierThresholds};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::AssessmentAnswers;
use super::result::{ResultSource, RiskLevel, RiskResult};

/// Deterministic local scorer used when the remote predictor is unavailable.
#[derive(Debug, Clone, Default)]
pub struct FallbackScorer {
    config: ScoringConfig,
}

impl FallbackScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(&self, answers: &AssessmentAnswers) -> FallbackScore {
        let (contributions, risk_score) = rules::score_answers(answers, &self.config);
        let risk_level = self.config.thresholds.classify(risk_score);

        FallbackScore {
            risk_score,
            risk_level,
            contributions,
        }
    }

    /// Full fallback result. Factors are never explained on this path and the
    /// confidence stays at the configured reduced value.
    pub fn result(&self, answers: &AssessmentAnswers) -> RiskResult {
        let score = self.score(answers);
        debug!(
            risk_score = score.risk_score,
            risk_level = score.risk_level.label(),
            contributions = ?score.contributions,
            "computed fallback risk score"
        );

        RiskResult {
            risk_level: score.risk_level,
            risk_score: score.risk_score,
            dropout_probability: f64::from(score.risk_score) / 100.0,
            risk_factors: Vec::new(),
            recommendations: vec![self.config.fallback_recommendation.clone()],
            model_confidence: self.config.fallback_confidence,
            source: ResultSource::Fallback,
            predicted_class: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    Attendance,
    Overwhelm,
    FinancialStress,
    Withdrawal,
    Performance,
}

/// Discrete contribution to a fallback score, kept for audit logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreContribution {
    pub factor: ScoreFactor,
    pub points: u16,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackScore {
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub contributions: Vec<ScoreContribution>,
}
