use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{AnswerError, AnswerUpdate, AssessmentAnswers};

/// Ordered questionnaire steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Consent,
    Academic,
    Support,
    Personal,
    ServicesReview,
}

impl WizardStep {
    pub const fn ordered() -> [WizardStep; 5] {
        [
            WizardStep::Consent,
            WizardStep::Academic,
            WizardStep::Support,
            WizardStep::Personal,
            WizardStep::ServicesReview,
        ]
    }

    pub const fn index(self) -> usize {
        match self {
            WizardStep::Consent => 0,
            WizardStep::Academic => 1,
            WizardStep::Support => 2,
            WizardStep::Personal => 3,
            WizardStep::ServicesReview => 4,
        }
    }

    pub const fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::Consent => Some(WizardStep::Academic),
            WizardStep::Academic => Some(WizardStep::Support),
            WizardStep::Support => Some(WizardStep::Personal),
            WizardStep::Personal => Some(WizardStep::ServicesReview),
            WizardStep::ServicesReview => None,
        }
    }

    pub const fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::Consent => None,
            WizardStep::Academic => Some(WizardStep::Consent),
            WizardStep::Support => Some(WizardStep::Academic),
            WizardStep::Personal => Some(WizardStep::Support),
            WizardStep::ServicesReview => Some(WizardStep::Personal),
        }
    }

    pub const fn is_last(self) -> bool {
        matches!(self, WizardStep::ServicesReview)
    }

    pub const fn label(self) -> &'static str {
        match self {
            WizardStep::Consent => "Consent",
            WizardStep::Academic => "Academic",
            WizardStep::Support => "Support",
            WizardStep::Personal => "Personal",
            WizardStep::ServicesReview => "Services & Review",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where the wizard is in its lifecycle. `Submitting` holds while a risk
/// assessment is in flight and blocks any second submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "step", rename_all = "snake_case")]
pub enum WizardPhase {
    Editing(WizardStep),
    Submitting,
    Done,
    Failed,
}

impl WizardPhase {
    pub const fn label(self) -> &'static str {
        match self {
            WizardPhase::Editing(_) => "editing",
            WizardPhase::Submitting => "submitting",
            WizardPhase::Done => "done",
            WizardPhase::Failed => "failed",
        }
    }
}

/// Step-gated questionnaire controller owning the answer record.
#[derive(Debug, Clone)]
pub struct AssessmentWizard {
    answers: AssessmentAnswers,
    phase: WizardPhase,
}

impl Default for AssessmentWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl AssessmentWizard {
    pub fn new() -> Self {
        Self {
            answers: AssessmentAnswers::default(),
            phase: WizardPhase::Editing(WizardStep::Consent),
        }
    }

    pub fn answers(&self) -> &AssessmentAnswers {
        &self.answers
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    /// Step shown to the user; once submission starts this stays on the last step.
    pub fn current_step(&self) -> WizardStep {
        match self.phase {
            WizardPhase::Editing(step) => step,
            WizardPhase::Submitting | WizardPhase::Done | WizardPhase::Failed => {
                WizardStep::ServicesReview
            }
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, WizardPhase::Submitting)
    }

    /// Field names that keep `step` from advancing.
    pub fn missing_fields(&self, step: WizardStep) -> Vec<&'static str> {
        let answers = &self.answers;
        let mut missing = Vec::new();
        match step {
            WizardStep::Consent => {
                if !answers.consent.given {
                    missing.push("consent_given");
                }
                if !answers.consent.data_processing {
                    missing.push("consent_data_processing");
                }
            }
            WizardStep::Academic => {
                if answers.academic.year.is_none() {
                    missing.push("academic_year");
                }
                if answers.academic.attendance.is_none() {
                    missing.push("attendance");
                }
                if answers.academic.overwhelm_frequency.is_none() {
                    missing.push("overwhelm_frequency");
                }
                if answers.academic.study_hours.is_none() {
                    missing.push("study_hours");
                }
            }
            WizardStep::Support => {
                if answers.support.advisor_interaction.is_none() {
                    missing.push("advisor_interaction");
                }
            }
            WizardStep::Personal => {
                if answers.personal.employment_status.is_none() {
                    missing.push("employment_status");
                }
                if answers.personal.financial_stress.is_none() {
                    missing.push("financial_stress");
                }
            }
            WizardStep::ServicesReview => {}
        }
        missing
    }

    pub fn gate(&self, step: WizardStep) -> bool {
        self.missing_fields(step).is_empty()
    }

    pub fn can_advance(&self) -> bool {
        match self.phase {
            WizardPhase::Editing(step) => !step.is_last() && self.gate(step),
            _ => false,
        }
    }

    pub fn can_submit(&self) -> bool {
        matches!(
            self.phase,
            WizardPhase::Editing(WizardStep::ServicesReview) | WizardPhase::Failed
        ) && self.gate(WizardStep::Consent)
    }

    /// Merge one field into the answers. Any step's field may change while editing.
    pub fn update(&mut self, update: AnswerUpdate) -> Result<(), WizardError> {
        self.resume_editing()?;
        self.answers.apply(update)?;
        Ok(())
    }

    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        let step = self.resume_editing()?;
        let next = step.next().ok_or(WizardError::AtFinalStep)?;
        let missing = self.missing_fields(step);
        if !missing.is_empty() {
            return Err(WizardError::ValidationBlocked { step, missing });
        }
        self.phase = WizardPhase::Editing(next);
        Ok(next)
    }

    pub fn previous(&mut self) -> Result<WizardStep, WizardError> {
        let step = self.resume_editing()?;
        let previous = step.previous().ok_or(WizardError::AtFirstStep)?;
        self.phase = WizardPhase::Editing(previous);
        Ok(previous)
    }

    /// Enter `Submitting` and hand back the answers to assess. Consent is
    /// re-checked here since it can be withdrawn from any later step.
    pub fn begin_submit(&mut self) -> Result<AssessmentAnswers, WizardError> {
        match self.phase {
            WizardPhase::Submitting => return Err(WizardError::SubmissionInFlight),
            WizardPhase::Done => return Err(WizardError::AlreadySubmitted),
            WizardPhase::Editing(step) if !step.is_last() => {
                return Err(WizardError::NotAtFinalStep { step })
            }
            WizardPhase::Editing(_) | WizardPhase::Failed => {}
        }

        if !self.gate(WizardStep::Consent) {
            return Err(WizardError::ConsentRequired);
        }

        self.phase = WizardPhase::Submitting;
        Ok(self.answers.clone())
    }

    pub fn complete_submit(&mut self) -> Result<(), WizardError> {
        if !self.is_submitting() {
            return Err(WizardError::NotSubmitting);
        }
        self.phase = WizardPhase::Done;
        Ok(())
    }

    /// Leave `Submitting` without a stored result; the same answers may be resubmitted.
    pub fn fail_submit(&mut self) -> Result<(), WizardError> {
        if !self.is_submitting() {
            return Err(WizardError::NotSubmitting);
        }
        self.phase = WizardPhase::Failed;
        Ok(())
    }

    fn resume_editing(&mut self) -> Result<WizardStep, WizardError> {
        match self.phase {
            WizardPhase::Editing(step) => Ok(step),
            WizardPhase::Failed => {
                self.phase = WizardPhase::Editing(WizardStep::ServicesReview);
                Ok(WizardStep::ServicesReview)
            }
            WizardPhase::Submitting => Err(WizardError::SubmissionInFlight),
            WizardPhase::Done => Err(WizardError::AlreadySubmitted),
        }
    }
}

/// Refused wizard transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("{step} step is incomplete, missing: {}", .missing.join(", "))]
    ValidationBlocked {
        step: WizardStep,
        missing: Vec<&'static str>,
    },
    #[error("consent and data processing agreement are required to submit")]
    ConsentRequired,
    #[error("submission is only possible from the final step (currently on {step})")]
    NotAtFinalStep { step: WizardStep },
    #[error("already on the final step")]
    AtFinalStep,
    #[error("already on the first step")]
    AtFirstStep,
    #[error("an assessment is already being submitted")]
    SubmissionInFlight,
    #[error("assessment has already been submitted")]
    AlreadySubmitted,
    #[error("no submission is in progress")]
    NotSubmitting,
    #[error(transparent)]
    InvalidAnswer(#[from] AnswerError),
}
