use super::super::domain::AssessmentAnswers;
use super::config::ScoringConfig;
use super::{ScoreContribution, ScoreFactor};

const MAX_SCORE: u32 = 100;

pub(crate) fn score_answers(
    answers: &AssessmentAnswers,
    config: &ScoringConfig,
) -> (Vec<ScoreContribution>, u8) {
    let mut contributions = Vec::new();

    if let Some(attendance) = answers.academic.attendance {
        let points = config.attendance.get(&attendance).copied().unwrap_or(0);
        contributions.push(ScoreContribution {
            factor: ScoreFactor::Attendance,
            points,
            notes: format!("attends class {}", attendance.label()),
        });
    }

    if let Some(frequency) = answers.academic.overwhelm_frequency {
        let points = config
            .overwhelm_frequency
            .get(&frequency)
            .copied()
            .unwrap_or(0);
        contributions.push(ScoreContribution {
            factor: ScoreFactor::Overwhelm,
            points,
            notes: format!("feels overwhelmed {}", frequency.label()),
        });
    }

    if let Some(stress) = answers.personal.financial_stress {
        let points = config.financial_stress.get(&stress).copied().unwrap_or(0);
        contributions.push(ScoreContribution {
            factor: ScoreFactor::FinancialStress,
            points,
            notes: format!("{} financial stress", stress.label()),
        });
    }

    if answers.services.withdrawal_considered() {
        contributions.push(ScoreContribution {
            factor: ScoreFactor::Withdrawal,
            points: config.withdrawal_considered,
            notes: "has considered withdrawing".to_string(),
        });
    }

    let satisfaction = answers.academic.performance_satisfaction.value();
    let shortfall = config.performance_ceiling.saturating_sub(satisfaction);
    contributions.push(ScoreContribution {
        factor: ScoreFactor::Performance,
        points: u16::from(shortfall).saturating_mul(config.performance_multiplier),
        notes: format!(
            "performance satisfaction {satisfaction}/{}",
            config.performance_ceiling
        ),
    });

    let total: u32 = contributions
        .iter()
        .map(|contribution| u32::from(contribution.points))
        .sum();
    let score = total.min(MAX_SCORE) as u8;

    (contributions, score)
}
