use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::request::AssessmentRequest;
use super::result::RiskResult;
use super::session::SessionId;

/// Stored outcome of a submitted assessment, read by the results view and analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub session_id: SessionId,
    pub submitted_at: DateTime<Utc>,
    pub request: Option<AssessmentRequest>,
    pub result: RiskResult,
}

/// Storage abstraction for results so the service can be exercised in isolation.
pub trait ResultRepository: Send + Sync {
    fn insert(&self, record: AssessmentRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<AssessmentRecord>, RepositoryError>;
    fn all(&self) -> Result<Vec<AssessmentRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
