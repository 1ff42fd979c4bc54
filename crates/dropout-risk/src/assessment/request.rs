use serde::{Deserialize, Serialize};

use super::domain::{
    AcademicYear, AdvisorInteraction, AnswerError, AnswerUpdate, AssessmentAnswers, Attendance,
    EmploymentStatus, FinancialStress, OverwhelmFrequency, Rating, StudyHours, SupportService,
    WeeklyHours,
};

/// Outbound payload for the remote predictor, using its snake_case field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssessmentRequest {
    pub consent_given: bool,
    pub consent_data_processing: bool,
    pub consent_anonymous_analytics: bool,

    pub academic_year: AcademicYear,
    pub attendance: Attendance,
    pub overwhelm_frequency: OverwhelmFrequency,
    pub study_hours: StudyHours,
    pub performance_satisfaction: Rating,

    pub advisor_interaction: AdvisorInteraction,
    pub support_network_strength: Rating,
    pub extracurricular_hours: WeeklyHours,

    pub employment_status: EmploymentStatus,
    pub financial_stress: FinancialStress,
    pub career_alignment: Rating,

    #[serde(default)]
    pub services_used: Vec<SupportService>,
    pub withdrawal_considered: bool,
    #[serde(default)]
    pub withdrawal_reasons: Vec<String>,
}

/// A gated field was still empty when the request was shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("answer `{field}` has not been provided")]
pub struct IncompleteAnswers {
    pub field: &'static str,
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, IncompleteAnswers> {
    value.ok_or(IncompleteAnswers { field })
}

impl TryFrom<&AssessmentAnswers> for AssessmentRequest {
    type Error = IncompleteAnswers;

    fn try_from(answers: &AssessmentAnswers) -> Result<Self, Self::Error> {
        Ok(Self {
            consent_given: answers.consent.given,
            consent_data_processing: answers.consent.data_processing,
            consent_anonymous_analytics: answers.consent.anonymous_analytics,
            academic_year: required(answers.academic.year, "academic_year")?,
            attendance: required(answers.academic.attendance, "attendance")?,
            overwhelm_frequency: required(
                answers.academic.overwhelm_frequency,
                "overwhelm_frequency",
            )?,
            study_hours: required(answers.academic.study_hours, "study_hours")?,
            performance_satisfaction: answers.academic.performance_satisfaction,
            advisor_interaction: required(
                answers.support.advisor_interaction,
                "advisor_interaction",
            )?,
            support_network_strength: answers.support.support_network_strength,
            extracurricular_hours: answers.support.extracurricular_hours,
            employment_status: required(answers.personal.employment_status, "employment_status")?,
            financial_stress: required(answers.personal.financial_stress, "financial_stress")?,
            career_alignment: answers.personal.career_alignment,
            services_used: answers.services.used().iter().copied().collect(),
            withdrawal_considered: answers.services.withdrawal_considered(),
            withdrawal_reasons: answers.services.withdrawal_reasons().iter().cloned().collect(),
        })
    }
}

impl AssessmentRequest {
    /// The field updates that reproduce this request, grouped in wizard step order.
    pub fn updates(&self) -> Vec<AnswerUpdate> {
        let mut updates = vec![
            AnswerUpdate::ConsentGiven(self.consent_given),
            AnswerUpdate::ConsentDataProcessing(self.consent_data_processing),
            AnswerUpdate::ConsentAnonymousAnalytics(self.consent_anonymous_analytics),
            AnswerUpdate::AcademicYear(self.academic_year),
            AnswerUpdate::Attendance(self.attendance),
            AnswerUpdate::OverwhelmFrequency(self.overwhelm_frequency),
            AnswerUpdate::StudyHours(self.study_hours),
            AnswerUpdate::PerformanceSatisfaction(self.performance_satisfaction),
            AnswerUpdate::AdvisorInteraction(self.advisor_interaction),
            AnswerUpdate::SupportNetworkStrength(self.support_network_strength),
            AnswerUpdate::ExtracurricularHours(self.extracurricular_hours),
            AnswerUpdate::EmploymentStatus(self.employment_status),
            AnswerUpdate::FinancialStress(self.financial_stress),
            AnswerUpdate::CareerAlignment(self.career_alignment),
        ];
        updates.extend(
            self.services_used
                .iter()
                .copied()
                .map(AnswerUpdate::SelectService),
        );
        updates.push(AnswerUpdate::WithdrawalConsidered(self.withdrawal_considered));
        updates.extend(
            self.withdrawal_reasons
                .iter()
                .cloned()
                .map(AnswerUpdate::AddWithdrawalReason),
        );
        updates
    }
}

impl TryFrom<AssessmentRequest> for AssessmentAnswers {
    type Error = AnswerError;

    fn try_from(request: AssessmentRequest) -> Result<Self, Self::Error> {
        if request.services_used.contains(&SupportService::None) && request.services_used.len() > 1
        {
            return Err(AnswerError::ConflictingServices);
        }

        let mut answers = AssessmentAnswers::default();
        for update in request.updates() {
            answers.apply(update)?;
        }
        Ok(answers)
    }
}
