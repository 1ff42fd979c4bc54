use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::domain::AssessmentAnswers;
use super::request::{AssessmentRequest, IncompleteAnswers};
use super::result::{PredictionResponse, ResponseRangeError, RiskResult};
use super::scoring::FallbackScorer;
use crate::config::PredictorConfig;

const PREDICT_PATH: &str = "/api/v1/predict/simplified";
const HEALTH_PATH: &str = "/health";

/// Boundary to the remote prediction service so the adapter can be exercised in isolation.
pub trait PredictionClient: Send + Sync {
    fn predict(
        &self,
        request: &AssessmentRequest,
    ) -> impl Future<Output = Result<PredictionResponse, PredictorError>> + Send;

    /// Liveness probe reduced to a boolean.
    fn health(&self) -> impl Future<Output = bool> + Send;
}

/// Reasons a remote prediction was not used.
#[derive(Debug, thiserror::Error)]
pub enum PredictorError {
    #[error("predictor request failed: {0}")]
    Transport(String),
    #[error("predictor returned status {0}")]
    Status(u16),
    #[error("predictor response malformed: {0}")]
    Malformed(String),
    #[error("predictor response out of range: {0}")]
    OutOfRange(#[from] ResponseRangeError),
    #[error("predictor did not answer within {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Incomplete(#[from] IncompleteAnswers),
}

/// `reqwest` backed client for the prediction API.
#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    http: reqwest::Client,
    base_url: String,
    health_timeout: Duration,
}

impl HttpPredictionClient {
    pub fn new(config: &PredictorConfig) -> Result<Self, PredictorError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| PredictorError::Transport(err.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            health_timeout: config.health_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl PredictionClient for HttpPredictionClient {
    async fn predict(
        &self,
        request: &AssessmentRequest,
    ) -> Result<PredictionResponse, PredictorError> {
        let response = self
            .http
            .post(self.endpoint(PREDICT_PATH))
            .json(request)
            .send()
            .await
            .map_err(|err| PredictorError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PredictorError::Status(status.as_u16()));
        }

        response
            .json::<PredictionResponse>()
            .await
            .map_err(|err| PredictorError::Malformed(err.to_string()))
    }

    async fn health(&self) -> bool {
        match self
            .http
            .get(self.endpoint(HEALTH_PATH))
            .timeout(self.health_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

/// Resolves answers to a `RiskResult`, preferring the remote model and
/// degrading to the fallback scorer on any failure. Never returns an error.
pub struct RiskAdapter<C> {
    client: Arc<C>,
    scorer: FallbackScorer,
    deadline: Duration,
}

impl<C> RiskAdapter<C>
where
    C: PredictionClient + 'static,
{
    pub fn new(client: Arc<C>, scorer: FallbackScorer, deadline: Duration) -> Self {
        Self {
            client,
            scorer,
            deadline,
        }
    }

    pub fn scorer(&self) -> &FallbackScorer {
        &self.scorer
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub async fn assess(&self, answers: &AssessmentAnswers) -> RiskResult {
        match self.remote(answers).await {
            Ok(result) => {
                info!(
                    risk_level = result.risk_level.label(),
                    risk_score = result.risk_score,
                    "remote prediction received"
                );
                result
            }
            Err(err) => {
                warn!(error = %err, "predictor unavailable, using fallback score");
                self.scorer.result(answers)
            }
        }
    }

    pub async fn predictor_healthy(&self) -> bool {
        self.client.health().await
    }

    async fn remote(&self, answers: &AssessmentAnswers) -> Result<RiskResult, PredictorError> {
        let request = AssessmentRequest::try_from(answers)?;
        let response = tokio::time::timeout(self.deadline, self.client.predict(&request))
            .await
            .map_err(|_| PredictorError::Timeout(self.deadline))??;
        Ok(RiskResult::try_from(response)?)
    }
}
