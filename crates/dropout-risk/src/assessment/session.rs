use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::AssessmentAnswers;
use super::predictor::{PredictionClient, RiskAdapter};
use super::result::RiskResult;
use super::wizard::{AssessmentWizard, WizardError, WizardStep};

/// Identifier wrapper for assessment sessions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Context object passed explicitly from the wizard to the results view.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    id: SessionId,
    wizard: AssessmentWizard,
    result: Option<RiskResult>,
}

impl AssessmentSession {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            wizard: AssessmentWizard::new(),
            result: None,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn wizard(&self) -> &AssessmentWizard {
        &self.wizard
    }

    pub fn wizard_mut(&mut self) -> &mut AssessmentWizard {
        &mut self.wizard
    }

    pub fn result(&self) -> Option<&RiskResult> {
        self.result.as_ref()
    }

    /// Run the submission end to end for a directly owned session.
    pub async fn submit<C>(&mut self, adapter: &RiskAdapter<C>) -> Result<&RiskResult, WizardError>
    where
        C: PredictionClient + 'static,
    {
        let answers = self.wizard.begin_submit()?;
        let result = adapter.assess(&answers).await;
        self.wizard.complete_submit()?;
        Ok(self.result.insert(result))
    }

    pub(crate) fn attach_result(&mut self, result: RiskResult) -> Result<(), WizardError> {
        self.wizard.complete_submit()?;
        self.result = Some(result);
        Ok(())
    }

    pub fn view(&self) -> WizardView {
        let step = self.wizard.current_step();
        WizardView {
            session_id: self.id.clone(),
            phase: self.wizard.phase().label(),
            step,
            step_label: step.label(),
            step_index: step.index(),
            total_steps: WizardStep::ordered().len(),
            can_advance: self.wizard.can_advance(),
            can_submit: self.wizard.can_submit(),
            missing_fields: self.wizard.missing_fields(step),
            answers: self.wizard.answers().clone(),
            has_result: self.result.is_some(),
        }
    }
}

/// Snapshot of a session for rendering the current wizard step.
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub session_id: SessionId,
    pub phase: &'static str,
    pub step: WizardStep,
    pub step_label: &'static str,
    pub step_index: usize,
    pub total_steps: usize,
    pub can_advance: bool,
    pub can_submit: bool,
    pub missing_fields: Vec<&'static str>,
    pub answers: AssessmentAnswers,
    pub has_result: bool,
}
