use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Whether a result came from the remote model or the local fallback scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Model,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub category: String,
    pub factor: String,
    pub impact: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub urgency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

/// Result handed to the results view after a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    pub risk_level: RiskLevel,
    pub risk_score: u8,
    pub dropout_probability: f64,
    pub risk_factors: Vec<RiskFactor>,
    pub recommendations: Vec<Recommendation>,
    pub model_confidence: f64,
    pub source: ResultSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_class: Option<String>,
}

/// Success body returned by the remote predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    pub dropout_probability: f64,
    #[serde(default)]
    pub predicted_class: Option<String>,
    #[serde(default)]
    pub risk_factors: Vec<RiskFactor>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    pub prediction_confidence: f64,
}

/// A well-formed JSON body carrying values outside their declared ranges.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResponseRangeError {
    #[error("risk_score {0} is outside 0..=100")]
    RiskScore(f64),
    #[error("dropout_probability {0} is outside 0..=1")]
    DropoutProbability(f64),
    #[error("prediction_confidence {0} is outside 0..=1")]
    Confidence(f64),
}

fn unit_interval(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

impl TryFrom<PredictionResponse> for RiskResult {
    type Error = ResponseRangeError;

    fn try_from(response: PredictionResponse) -> Result<Self, Self::Error> {
        let score = response.risk_score;
        if !score.is_finite() || !(0.0..=100.0).contains(&score) {
            return Err(ResponseRangeError::RiskScore(score));
        }
        if !unit_interval(response.dropout_probability) {
            return Err(ResponseRangeError::DropoutProbability(
                response.dropout_probability,
            ));
        }
        if !unit_interval(response.prediction_confidence) {
            return Err(ResponseRangeError::Confidence(
                response.prediction_confidence,
            ));
        }

        Ok(Self {
            risk_level: response.risk_level,
            risk_score: score.round() as u8,
            dropout_probability: response.dropout_probability,
            risk_factors: response.risk_factors,
            recommendations: response.recommendations,
            model_confidence: response.prediction_confidence,
            source: ResultSource::Model,
            predicted_class: response.predicted_class,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response() -> PredictionResponse {
        PredictionResponse {
            risk_level: RiskLevel::Medium,
            risk_score: 47.0,
            dropout_probability: 0.47,
            predicted_class: Some("Dropout".to_string()),
            risk_factors: vec![RiskFactor {
                category: "Financial".to_string(),
                factor: "Financial Stress".to_string(),
                impact: "high".to_string(),
                description: "Financial difficulties are a leading cause of withdrawal"
                    .to_string(),
            }],
            recommendations: Vec::new(),
            prediction_confidence: 0.91,
        }
    }

    #[test]
    fn remote_confidence_becomes_model_confidence() {
        let result = RiskResult::try_from(response()).expect("in range");
        assert_eq!(result.model_confidence, 0.91);
        assert_eq!(result.risk_score, 47);
        assert_eq!(result.source, ResultSource::Model);
        assert_eq!(result.risk_factors.len(), 1);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut body = response();
        body.risk_score = 140.0;
        assert_eq!(
            RiskResult::try_from(body),
            Err(ResponseRangeError::RiskScore(140.0))
        );

        let mut body = response();
        body.prediction_confidence = 1.5;
        assert!(RiskResult::try_from(body).is_err());
    }

    #[test]
    fn recommendation_kind_uses_type_on_the_wire() {
        let json = r#"{"type":"peer","title":"Stay Connected","description":"d","urgency":"when-needed"}"#;
        let recommendation: Recommendation = serde_json::from_str(json).expect("valid");
        assert_eq!(recommendation.kind, "peer");
        assert!(recommendation.contact.is_none());
        let value = serde_json::to_value(&recommendation).expect("serializes");
        assert_eq!(value["type"], "peer");
        assert!(value.get("contact").is_none());
    }
}
