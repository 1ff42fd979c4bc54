use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, warn};

use super::analytics::{self, DashboardStats};
use super::domain::AnswerUpdate;
use super::predictor::{PredictionClient, RiskAdapter};
use super::repository::{AssessmentRecord, RepositoryError, ResultRepository};
use super::request::AssessmentRequest;
use super::result::RiskResult;
use super::session::{AssessmentSession, SessionId, WizardView};
use super::wizard::{WizardError, WizardPhase};

/// Bounds on the map of live, unfinished sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// Sessions untouched for this long are dropped on the next `start`.
    pub idle_timeout: Duration,
    /// Live sessions kept at most; the least recently used one makes room.
    pub max_live: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(30 * 60),
            max_live: 10_000,
        }
    }
}

struct LiveSession {
    session: AssessmentSession,
    touched: Instant,
}

impl LiveSession {
    fn new(session: AssessmentSession) -> Self {
        Self {
            session,
            touched: Instant::now(),
        }
    }

    // A session mid-submit holds the only path to its result.
    fn evictable(&self) -> bool {
        self.session.wizard().phase() != WizardPhase::Submitting
    }
}

/// Service composing live wizard sessions, the risk adapter, and result storage.
///
/// Finished sessions leave the live map once their result is stored; from then
/// on the repository answers for them.
pub struct AssessmentService<C, R> {
    adapter: Arc<RiskAdapter<C>>,
    repository: Arc<R>,
    limits: SessionLimits,
    sessions: Mutex<HashMap<SessionId, LiveSession>>,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("asm-{id:06}"))
}

impl<C, R> AssessmentService<C, R>
where
    C: PredictionClient + 'static,
    R: ResultRepository + 'static,
{
    pub fn new(adapter: Arc<RiskAdapter<C>>, repository: Arc<R>) -> Self {
        Self {
            adapter,
            repository,
            limits: SessionLimits::default(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_limits(mut self, limits: SessionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn adapter(&self) -> &RiskAdapter<C> {
        &self.adapter
    }

    /// Open a new session positioned on the consent step.
    pub fn start(&self) -> WizardView {
        let session = AssessmentSession::new(next_session_id());
        let view = session.view();
        let mut sessions = self.sessions();
        let evicted = self.evict(&mut sessions);
        info!(session_id = %session.id(), evicted, "assessment session started");
        sessions.insert(session.id().clone(), LiveSession::new(session));
        view
    }

    /// Number of sessions still held in memory.
    pub fn live_sessions(&self) -> usize {
        self.sessions().len()
    }

    pub fn view(&self, id: &SessionId) -> Result<WizardView, AssessmentServiceError> {
        self.with_session(id, |session| Ok(session.view()))
    }

    /// Apply a batch of updates. Either every update lands or none does.
    pub fn update(
        &self,
        id: &SessionId,
        updates: Vec<AnswerUpdate>,
    ) -> Result<WizardView, AssessmentServiceError> {
        self.with_session(id, |session| {
            let mut wizard = session.wizard().clone();
            for update in updates {
                wizard.update(update)?;
            }
            *session.wizard_mut() = wizard;
            Ok(session.view())
        })
    }

    pub fn next(&self, id: &SessionId) -> Result<WizardView, AssessmentServiceError> {
        self.with_session(id, |session| {
            session.wizard_mut().next()?;
            Ok(session.view())
        })
    }

    pub fn previous(&self, id: &SessionId) -> Result<WizardView, AssessmentServiceError> {
        self.with_session(id, |session| {
            session.wizard_mut().previous()?;
            Ok(session.view())
        })
    }

    /// Submit the session's answers. The session stays in `Submitting` while the
    /// adapter runs, so a concurrent submit for the same session is refused.
    pub async fn submit(&self, id: &SessionId) -> Result<RiskResult, AssessmentServiceError> {
        let answers =
            self.with_session(id, |session| Ok(session.wizard_mut().begin_submit()?))?;

        let result = self.adapter.assess(&answers).await;

        let record = AssessmentRecord {
            session_id: id.clone(),
            submitted_at: Utc::now(),
            request: AssessmentRequest::try_from(&answers).ok(),
            result: result.clone(),
        };
        let stored = self.repository.insert(record);

        let outcome = self.with_session(id, |session| match stored {
            Ok(()) => {
                session.attach_result(result.clone())?;
                info!(
                    session_id = %id,
                    risk_level = result.risk_level.label(),
                    source = ?result.source,
                    "assessment submitted"
                );
                Ok(result)
            }
            Err(err) => {
                session.wizard_mut().fail_submit()?;
                warn!(session_id = %id, error = %err, "assessment result could not be stored");
                Err(err.into())
            }
        });

        if outcome.is_ok() {
            self.sessions().remove(id);
        }
        outcome
    }

    /// Result for the results view: the live session first, then storage.
    pub fn result(&self, id: &SessionId) -> Result<RiskResult, AssessmentServiceError> {
        let live = {
            let sessions = self.sessions();
            sessions
                .get(id)
                .map(|live| live.session.result().cloned())
        };

        match live {
            Some(Some(result)) => Ok(result),
            Some(None) => Err(AssessmentServiceError::ResultNotReady(id.clone())),
            None => self
                .repository
                .fetch(id)?
                .map(|record| record.result)
                .ok_or_else(|| AssessmentServiceError::SessionNotFound(id.clone())),
        }
    }

    pub fn records(&self) -> Result<Vec<AssessmentRecord>, AssessmentServiceError> {
        Ok(self.repository.all()?)
    }

    pub fn stats(&self) -> Result<DashboardStats, AssessmentServiceError> {
        Ok(analytics::dashboard_stats(&self.records()?))
    }

    pub async fn predictor_healthy(&self) -> bool {
        self.adapter.predictor_healthy().await
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<SessionId, LiveSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop idle sessions, then the least recently used ones until a new
    /// session fits under the cap. Returns how many were dropped.
    fn evict(&self, sessions: &mut HashMap<SessionId, LiveSession>) -> usize {
        let before = sessions.len();
        let idle_timeout = self.limits.idle_timeout;
        sessions.retain(|_, live| !live.evictable() || live.touched.elapsed() < idle_timeout);

        while sessions.len() >= self.limits.max_live {
            let oldest = sessions
                .iter()
                .filter(|(_, live)| live.evictable())
                .min_by_key(|(_, live)| live.touched)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    sessions.remove(&id);
                }
                None => break,
            }
        }
        before - sessions.len()
    }

    fn with_session<T>(
        &self,
        id: &SessionId,
        action: impl FnOnce(&mut AssessmentSession) -> Result<T, AssessmentServiceError>,
    ) -> Result<T, AssessmentServiceError> {
        {
            let mut sessions = self.sessions();
            if let Some(live) = sessions.get_mut(id) {
                live.touched = Instant::now();
                return action(&mut live.session);
            }
        }
        Err(self.missing(id))
    }

    // A stored result means the session finished and left the live map.
    fn missing(&self, id: &SessionId) -> AssessmentServiceError {
        match self.repository.fetch(id) {
            Ok(Some(_)) => WizardError::AlreadySubmitted.into(),
            Ok(None) => AssessmentServiceError::SessionNotFound(id.clone()),
            Err(err) => err.into(),
        }
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error("assessment session {0} not found")]
    SessionNotFound(SessionId),
    #[error("assessment session {0} has no result yet")]
    ResultNotReady(SessionId),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
