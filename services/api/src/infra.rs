use dropout_risk::assessment::{
    AssessmentAnswers, AssessmentRecord, AssessmentRequest, AssessmentService, FallbackScorer,
    PredictionClient, PredictionResponse, PredictorError, RepositoryError, ResultRepository,
    RiskAdapter, RiskResult, SessionId,
};
use dropout_risk::config::AppConfig;
use dropout_risk::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryResultRepository {
    records: Arc<Mutex<HashMap<SessionId, AssessmentRecord>>>,
}

impl InMemoryResultRepository {
    fn guard(&self) -> Result<MutexGuard<'_, HashMap<SessionId, AssessmentRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl ResultRepository for InMemoryResultRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<(), RepositoryError> {
        let mut guard = self.guard()?;
        if guard.contains_key(&record.session_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.session_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Ok(self.guard()?.get(id).cloned())
    }

    fn all(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let mut records: Vec<AssessmentRecord> = self.guard()?.values().cloned().collect();
        records.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
        Ok(records)
    }
}

/// Client used when remote prediction is switched off; every submission is
/// scored locally.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct OfflinePredictionClient;

impl PredictionClient for OfflinePredictionClient {
    async fn predict(
        &self,
        _request: &AssessmentRequest,
    ) -> Result<PredictionResponse, PredictorError> {
        Err(PredictorError::Transport(
            "remote prediction disabled".to_string(),
        ))
    }

    async fn health(&self) -> bool {
        false
    }
}

pub(crate) type SharedService<C> = Arc<AssessmentService<C, InMemoryResultRepository>>;

pub(crate) fn assessment_service<C>(config: &AppConfig, client: C) -> SharedService<C>
where
    C: PredictionClient + 'static,
{
    let adapter = RiskAdapter::new(
        Arc::new(client),
        FallbackScorer::new(config.scoring.clone()),
        config.predictor.timeout,
    );
    Arc::new(
        AssessmentService::new(
            Arc::new(adapter),
            Arc::new(InMemoryResultRepository::default()),
        )
        .with_limits(config.sessions),
    )
}

/// Walk one questionnaire through the wizard and submit it.
pub(crate) async fn run_questionnaire<C>(
    service: &AssessmentService<C, InMemoryResultRepository>,
    request: &AssessmentRequest,
) -> Result<(SessionId, RiskResult), AppError>
where
    C: PredictionClient + 'static,
{
    AssessmentAnswers::try_from(request.clone())?;

    let id = service.start().session_id;
    let mut view = service.update(&id, request.updates())?;
    while !view.step.is_last() {
        view = service.next(&id)?;
    }
    let result = service.submit(&id).await?;
    Ok((id, result))
}
