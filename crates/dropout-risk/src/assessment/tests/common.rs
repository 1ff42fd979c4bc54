use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::assessment::domain::{
    AcademicYear, AdvisorInteraction, AnswerUpdate, AssessmentAnswers, Attendance,
    EmploymentStatus, FinancialStress, OverwhelmFrequency, Rating, StudyHours, SupportService,
};
use crate::assessment::predictor::{PredictionClient, PredictorError, RiskAdapter};
use crate::assessment::repository::{AssessmentRecord, RepositoryError, ResultRepository};
use crate::assessment::request::AssessmentRequest;
use crate::assessment::result::{
    PredictionResponse, ResultSource, RiskFactor, RiskLevel, RiskResult,
};
use crate::assessment::scoring::FallbackScorer;
use crate::assessment::service::AssessmentService;
use crate::assessment::session::SessionId;
use crate::assessment::wizard::AssessmentWizard;

pub(super) const DEADLINE: Duration = Duration::from_secs(5);

pub(super) fn rating(value: u8) -> Rating {
    Rating::new(value).expect("rating in range")
}

/// Every update needed to take a fresh wizard through all five steps.
pub(super) fn complete_updates() -> Vec<AnswerUpdate> {
    vec![
        AnswerUpdate::ConsentGiven(true),
        AnswerUpdate::ConsentDataProcessing(true),
        AnswerUpdate::AcademicYear(AcademicYear::Second),
        AnswerUpdate::Attendance(Attendance::Sometimes),
        AnswerUpdate::OverwhelmFrequency(OverwhelmFrequency::Sometimes),
        AnswerUpdate::StudyHours(StudyHours::ThreeToFive),
        AnswerUpdate::PerformanceSatisfaction(rating(5)),
        AnswerUpdate::AdvisorInteraction(AdvisorInteraction::OncePerSemester),
        AnswerUpdate::EmploymentStatus(EmploymentStatus::PartTime),
        AnswerUpdate::FinancialStress(FinancialStress::Moderate),
        AnswerUpdate::SelectService(SupportService::Academic),
    ]
}

pub(super) fn complete_answers() -> AssessmentAnswers {
    let mut answers = AssessmentAnswers::default();
    for update in complete_updates() {
        answers.apply(update).expect("valid update");
    }
    answers
}

/// Answers carrying only the fields the fallback scorer reads.
pub(super) fn scoring_answers(
    attendance: Attendance,
    overwhelm: OverwhelmFrequency,
    stress: FinancialStress,
    withdrawal: bool,
    satisfaction: u8,
) -> AssessmentAnswers {
    let mut answers = AssessmentAnswers::default();
    answers.academic.attendance = Some(attendance);
    answers.academic.overwhelm_frequency = Some(overwhelm);
    answers.personal.financial_stress = Some(stress);
    answers.academic.performance_satisfaction = rating(satisfaction);
    answers.services.set_withdrawal_considered(withdrawal);
    answers
}

pub(super) fn wizard_at_review() -> AssessmentWizard {
    let mut wizard = AssessmentWizard::new();
    for update in complete_updates() {
        wizard.update(update).expect("update accepted");
    }
    for _ in 0..4 {
        wizard.next().expect("gate satisfied");
    }
    wizard
}

/// Drive a service session to the review step.
pub(super) fn session_at_review<C, R>(service: &AssessmentService<C, R>) -> SessionId
where
    C: PredictionClient + 'static,
    R: ResultRepository + 'static,
{
    let id = service.start().session_id;
    service
        .update(&id, complete_updates())
        .expect("updates accepted");
    for _ in 0..4 {
        service.next(&id).expect("advance");
    }
    id
}

pub(super) fn model_response() -> PredictionResponse {
    PredictionResponse {
        risk_level: RiskLevel::Medium,
        risk_score: 52.4,
        dropout_probability: 0.52,
        predicted_class: Some("Dropout".to_string()),
        risk_factors: vec![RiskFactor {
            category: "Academic".to_string(),
            factor: "Attendance".to_string(),
            impact: "medium".to_string(),
            description: "Irregular class attendance".to_string(),
        }],
        recommendations: Vec::new(),
        prediction_confidence: 0.88,
    }
}

/// Client returning a fixed body and counting calls.
#[derive(Debug)]
pub(super) struct StaticClient {
    response: PredictionResponse,
    calls: AtomicUsize,
}

impl StaticClient {
    pub(super) fn new(response: PredictionResponse) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PredictionClient for StaticClient {
    async fn predict(
        &self,
        _request: &AssessmentRequest,
    ) -> Result<PredictionResponse, PredictorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }

    async fn health(&self) -> bool {
        true
    }
}

#[derive(Debug, Default)]
pub(super) struct FailingClient;

impl PredictionClient for FailingClient {
    async fn predict(
        &self,
        _request: &AssessmentRequest,
    ) -> Result<PredictionResponse, PredictorError> {
        Err(PredictorError::Transport("connection refused".to_string()))
    }

    async fn health(&self) -> bool {
        false
    }
}

/// Client that answers only after `delay`.
#[derive(Debug)]
pub(super) struct SlowClient {
    pub(super) delay: Duration,
}

impl PredictionClient for SlowClient {
    async fn predict(
        &self,
        _request: &AssessmentRequest,
    ) -> Result<PredictionResponse, PredictorError> {
        tokio::time::sleep(self.delay).await;
        Ok(model_response())
    }

    async fn health(&self) -> bool {
        true
    }
}

pub(super) fn adapter<C>(client: C) -> RiskAdapter<C>
where
    C: PredictionClient + 'static,
{
    RiskAdapter::new(Arc::new(client), FallbackScorer::default(), DEADLINE)
}

#[derive(Debug, Default)]
pub(super) struct MemoryRepository {
    records: Mutex<Vec<AssessmentRecord>>,
}

impl MemoryRepository {
    pub(super) fn with_records(records: Vec<AssessmentRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

impl ResultRepository for MemoryRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<(), RepositoryError> {
        let mut records = self.records.lock().expect("lock");
        if records
            .iter()
            .any(|existing| existing.session_id == record.session_id)
        {
            return Err(RepositoryError::Conflict);
        }
        records.push(record);
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let records = self.records.lock().expect("lock");
        Ok(records
            .iter()
            .find(|record| &record.session_id == id)
            .cloned())
    }

    fn all(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Ok(self.records.lock().expect("lock").clone())
    }
}

/// Refuses the first insert, then behaves like `MemoryRepository`.
#[derive(Debug, Default)]
pub(super) struct FlakyRepository {
    tripped: AtomicBool,
    inner: MemoryRepository,
}

impl ResultRepository for FlakyRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<(), RepositoryError> {
        if !self.tripped.swap(true, Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("disk full".to_string()));
        }
        self.inner.insert(record)
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn all(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        self.inner.all()
    }
}

pub(super) struct UnavailableRepository;

impl ResultRepository for UnavailableRepository {
    fn insert(&self, _record: AssessmentRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn all(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }
}

pub(super) fn build_service<C>(client: C) -> Arc<AssessmentService<C, MemoryRepository>>
where
    C: PredictionClient + 'static,
{
    Arc::new(AssessmentService::new(
        Arc::new(adapter(client)),
        Arc::new(MemoryRepository::default()),
    ))
}

pub(super) fn stored_result(level: RiskLevel, score: u8, factors: &[&str]) -> RiskResult {
    RiskResult {
        risk_level: level,
        risk_score: score,
        dropout_probability: f64::from(score) / 100.0,
        risk_factors: factors
            .iter()
            .map(|category| RiskFactor {
                category: category.to_string(),
                factor: format!("{category} factor"),
                impact: "medium".to_string(),
                description: String::new(),
            })
            .collect(),
        recommendations: Vec::new(),
        model_confidence: 0.9,
        source: ResultSource::Model,
        predicted_class: None,
    }
}

pub(super) fn record(
    id: &str,
    submitted_at: DateTime<Utc>,
    level: RiskLevel,
    score: u8,
    factors: &[&str],
) -> AssessmentRecord {
    AssessmentRecord {
        session_id: SessionId(id.to_string()),
        submitted_at,
        request: AssessmentRequest::try_from(&complete_answers()).ok(),
        result: stored_result(level, score, factors),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
