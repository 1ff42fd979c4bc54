//! Student dropout-risk assessment: the questionnaire wizard, the risk adapter
//! with its local fallback scorer, session hand-off and admin analytics.

pub mod analytics;
pub mod domain;
pub mod predictor;
pub mod repository;
pub mod request;
pub mod result;
pub mod router;
pub mod scoring;
pub mod service;
pub mod session;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use analytics::{
    DashboardStats, FactorTrend, RecentAssessment, RiskDistribution, RiskFactorSummary, TrendPoint,
};
pub use domain::{
    AcademicYear, AdvisorInteraction, AnswerError, AnswerUpdate, AssessmentAnswers, Attendance,
    EmploymentStatus, FinancialStress, OverwhelmFrequency, Rating, StudyHours, SupportService,
    WeeklyHours,
};
pub use predictor::{HttpPredictionClient, PredictionClient, PredictorError, RiskAdapter};
pub use repository::{AssessmentRecord, RepositoryError, ResultRepository};
pub use request::{AssessmentRequest, IncompleteAnswers};
pub use result::{
    PredictionResponse, Recommendation, ResultSource, RiskFactor, RiskLevel, RiskResult,
};
pub use router::assessment_router;
pub use scoring::{FallbackScore, FallbackScorer, ScoringConfig, ScoringConfigError, TierThresholds};
pub use service::{AssessmentService, AssessmentServiceError, SessionLimits};
pub use session::{AssessmentSession, SessionId, WizardView};
pub use wizard::{AssessmentWizard, WizardError, WizardPhase, WizardStep};
