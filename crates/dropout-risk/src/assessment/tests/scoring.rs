use super::common::*;
use crate::assessment::domain::{AssessmentAnswers, Attendance, FinancialStress, OverwhelmFrequency};
use crate::assessment::result::{ResultSource, RiskLevel};
use crate::assessment::scoring::{FallbackScorer, ScoringConfig, TierThresholds};

#[test]
fn worst_answers_clamp_to_one_hundred() {
    let answers = scoring_answers(
        Attendance::Never,
        OverwhelmFrequency::Always,
        FinancialStress::VeryHigh,
        true,
        1,
    );

    let score = FallbackScorer::default().score(&answers);

    let raw: u16 = score.contributions.iter().map(|c| c.points).sum();
    assert_eq!(raw, 123);
    assert_eq!(score.risk_score, 100);
    assert_eq!(score.risk_level, RiskLevel::High);
}

#[test]
fn best_answers_score_zero() {
    let answers = scoring_answers(
        Attendance::Always,
        OverwhelmFrequency::Never,
        FinancialStress::None,
        false,
        10,
    );

    let score = FallbackScorer::default().score(&answers);

    assert_eq!(score.risk_score, 0);
    assert_eq!(score.risk_level, RiskLevel::Low);
}

#[test]
fn middling_answers_land_in_medium() {
    let answers = scoring_answers(
        Attendance::Sometimes,
        OverwhelmFrequency::Sometimes,
        FinancialStress::Moderate,
        false,
        5,
    );

    let score = FallbackScorer::default().score(&answers);

    assert_eq!(score.risk_score, 45);
    assert_eq!(score.risk_level, RiskLevel::Medium);
}

#[test]
fn tier_boundaries_are_inclusive_lower_bounds() {
    let thresholds = TierThresholds::default();
    assert_eq!(thresholds.classify(34), RiskLevel::Low);
    assert_eq!(thresholds.classify(35), RiskLevel::Medium);
    assert_eq!(thresholds.classify(59), RiskLevel::Medium);
    assert_eq!(thresholds.classify(60), RiskLevel::High);
}

#[test]
fn missing_selections_contribute_nothing() {
    let score = FallbackScorer::default().score(&AssessmentAnswers::default());

    // Default satisfaction of 5 still counts as a shortfall.
    assert_eq!(score.risk_score, 10);
    assert_eq!(score.contributions.len(), 1);
}

#[test]
fn scoring_is_deterministic() {
    let scorer = FallbackScorer::default();
    let answers = complete_answers();

    assert_eq!(scorer.score(&answers), scorer.score(&answers));
    assert_eq!(scorer.result(&answers), scorer.result(&answers));
}

#[test]
fn fallback_result_carries_reduced_confidence_and_single_recommendation() {
    let answers = scoring_answers(
        Attendance::Sometimes,
        OverwhelmFrequency::Sometimes,
        FinancialStress::Moderate,
        false,
        5,
    );

    let result = FallbackScorer::default().result(&answers);

    assert_eq!(result.source, ResultSource::Fallback);
    assert_eq!(result.model_confidence, 0.7);
    assert_eq!(result.dropout_probability, 0.45);
    assert!(result.risk_factors.is_empty());
    assert!(result.predicted_class.is_none());
    assert_eq!(result.recommendations.len(), 1);
    let recommendation = &result.recommendations[0];
    assert_eq!(recommendation.kind, "peer");
    assert_eq!(recommendation.title, "Stay Connected");
    assert_eq!(
        recommendation.description,
        "Continue engaging with campus resources"
    );
    assert_eq!(recommendation.urgency, "when-needed");
}

#[test]
fn custom_weights_and_thresholds_apply() {
    let mut config = ScoringConfig::default();
    config.withdrawal_considered = 40;
    config.thresholds = TierThresholds {
        medium: 20,
        high: 50,
    };
    let scorer = FallbackScorer::new(config);

    let answers = scoring_answers(
        Attendance::Always,
        OverwhelmFrequency::Never,
        FinancialStress::None,
        true,
        10,
    );
    let score = scorer.score(&answers);

    assert_eq!(score.risk_score, 40);
    assert_eq!(score.risk_level, RiskLevel::Medium);
}

#[test]
fn partial_config_documents_keep_defaults() {
    let config: ScoringConfig =
        serde_json::from_str(r#"{"thresholds": {"medium": 30, "high": 70}}"#)
            .expect("valid config");

    assert_eq!(config.thresholds.high, 70);
    assert_eq!(config.withdrawal_considered, 15);
    assert_eq!(config.attendance.get(&Attendance::Never), Some(&35));
}

#[test]
fn inverted_thresholds_fail_validation() {
    let mut config = ScoringConfig::default();
    config.thresholds = TierThresholds {
        medium: 70,
        high: 40,
    };
    assert!(config.validate().is_err());

    let mut config = ScoringConfig::default();
    config.fallback_confidence = 1.2;
    assert!(config.validate().is_err());
}

#[test]
fn every_answer_combination_stays_in_bounds_and_tiers_consistently() {
    let attendance = [
        (Attendance::Always, 0),
        (Attendance::Often, 5),
        (Attendance::Sometimes, 15),
        (Attendance::Rarely, 25),
        (Attendance::Never, 35),
    ];
    let overwhelm = [
        (OverwhelmFrequency::Never, 0),
        (OverwhelmFrequency::Rarely, 5),
        (OverwhelmFrequency::Sometimes, 10),
        (OverwhelmFrequency::Often, 20),
        (OverwhelmFrequency::Always, 30),
    ];
    let stress = [
        (FinancialStress::None, 0),
        (FinancialStress::Low, 5),
        (FinancialStress::Moderate, 10),
        (FinancialStress::High, 20),
        (FinancialStress::VeryHigh, 25),
    ];
    let scorer = FallbackScorer::default();
    let thresholds = TierThresholds::default();
    let mut checked = 0;

    for (attend, attend_points) in attendance {
        for (over, over_points) in overwhelm {
            for (money, money_points) in stress {
                for withdrawal in [false, true] {
                    for satisfaction in 1..=10u8 {
                        let answers =
                            scoring_answers(attend, over, money, withdrawal, satisfaction);
                        let raw: u16 = attend_points
                            + over_points
                            + money_points
                            + if withdrawal { 15 } else { 0 }
                            + u16::from(10 - satisfaction) * 2;

                        let score = scorer.score(&answers);

                        assert!(score.risk_score <= 100, "{answers:?}");
                        assert_eq!(u16::from(score.risk_score), raw.min(100), "{answers:?}");
                        assert_eq!(
                            score.risk_level,
                            thresholds.classify(score.risk_score),
                            "{answers:?}"
                        );
                        checked += 1;
                    }
                }
            }
        }
    }

    assert_eq!(checked, 5 * 5 * 5 * 2 * 10);
}
