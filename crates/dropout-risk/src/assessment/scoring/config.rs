use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::super::domain::{Attendance, FinancialStress, OverwhelmFrequency};
use super::super::result::{Recommendation, RiskLevel};

/// Weights and constants driving the fallback scorer. Values missing from a
/// configuration file keep their defaults; unmapped answers contribute zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub attendance: BTreeMap<Attendance, u16>,
    pub overwhelm_frequency: BTreeMap<OverwhelmFrequency, u16>,
    pub financial_stress: BTreeMap<FinancialStress, u16>,
    pub withdrawal_considered: u16,
    pub performance_ceiling: u8,
    pub performance_multiplier: u16,
    pub thresholds: TierThresholds,
    pub fallback_confidence: f64,
    pub fallback_recommendation: Recommendation,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            attendance: BTreeMap::from([
                (Attendance::Always, 0),
                (Attendance::Often, 5),
                (Attendance::Sometimes, 15),
                (Attendance::Rarely, 25),
                (Attendance::Never, 35),
            ]),
            overwhelm_frequency: BTreeMap::from([
                (OverwhelmFrequency::Never, 0),
                (OverwhelmFrequency::Rarely, 5),
                (OverwhelmFrequency::Sometimes, 10),
                (OverwhelmFrequency::Often, 20),
                (OverwhelmFrequency::Always, 30),
            ]),
            financial_stress: BTreeMap::from([
                (FinancialStress::None, 0),
                (FinancialStress::Low, 5),
                (FinancialStress::Moderate, 10),
                (FinancialStress::High, 20),
                (FinancialStress::VeryHigh, 25),
            ]),
            withdrawal_considered: 15,
            performance_ceiling: 10,
            performance_multiplier: 2,
            thresholds: TierThresholds::default(),
            fallback_confidence: 0.7,
            fallback_recommendation: Recommendation {
                kind: "peer".to_string(),
                title: "Stay Connected".to_string(),
                description: "Continue engaging with campus resources".to_string(),
                urgency: "when-needed".to_string(),
                contact: None,
            },
        }
    }
}

impl ScoringConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScoringConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ScoringConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        let TierThresholds { medium, high } = self.thresholds;
        if medium > high || high > 100 {
            return Err(ScoringConfigError::InvalidThresholds { medium, high });
        }
        if !self.fallback_confidence.is_finite() || !(0.0..=1.0).contains(&self.fallback_confidence)
        {
            return Err(ScoringConfigError::InvalidConfidence(
                self.fallback_confidence,
            ));
        }
        Ok(())
    }
}

/// Lower bounds (inclusive) of the medium and high tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierThresholds {
    pub medium: u8,
    pub high: u8,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            medium: 35,
            high: 60,
        }
    }
}

impl TierThresholds {
    pub fn classify(&self, score: u8) -> RiskLevel {
        if score >= self.high {
            RiskLevel::High
        } else if score >= self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScoringConfigError {
    #[error("unable to read scoring config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("scoring config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tier thresholds must satisfy medium <= high <= 100 (got {medium}/{high})")]
    InvalidThresholds { medium: u8, high: u8 },
    #[error("fallback confidence {0} must be within 0..=1")]
    InvalidConfidence(f64),
}
