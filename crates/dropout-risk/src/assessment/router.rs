use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::analytics;
use super::domain::AnswerUpdate;
use super::predictor::PredictionClient;
use super::repository::{RepositoryError, ResultRepository};
use super::service::{AssessmentService, AssessmentServiceError};
use super::session::SessionId;
use super::wizard::WizardError;

const DEFAULT_TREND_WEEKS: u32 = 12;
const DEFAULT_LIMIT: usize = 10;

type SharedService<C, R> = Arc<AssessmentService<C, R>>;

/// Router builder exposing the assessment wizard and the admin dashboard.
pub fn assessment_router<C, R>(service: SharedService<C, R>) -> Router
where
    C: PredictionClient + 'static,
    R: ResultRepository + 'static,
{
    Router::new()
        .route("/api/v1/assessments", post(start_handler::<C, R>))
        .route("/api/v1/assessments/:session_id", get(view_handler::<C, R>))
        .route(
            "/api/v1/assessments/:session_id/answers",
            post(answers_handler::<C, R>),
        )
        .route(
            "/api/v1/assessments/:session_id/next",
            post(next_handler::<C, R>),
        )
        .route(
            "/api/v1/assessments/:session_id/previous",
            post(previous_handler::<C, R>),
        )
        .route(
            "/api/v1/assessments/:session_id/submit",
            post(submit_handler::<C, R>),
        )
        .route(
            "/api/v1/assessments/:session_id/result",
            get(result_handler::<C, R>),
        )
        .route("/api/v1/predictor/health", get(predictor_health_handler::<C, R>))
        .route("/api/v1/admin/dashboard/stats", get(stats_handler::<C, R>))
        .route("/api/v1/admin/dashboard/trends", get(trends_handler::<C, R>))
        .route("/api/v1/admin/risk-factors", get(risk_factors_handler::<C, R>))
        .route(
            "/api/v1/admin/recent-assessments",
            get(recent_handler::<C, R>),
        )
        .route(
            "/api/v1/admin/risk-distribution",
            get(distribution_handler::<C, R>),
        )
        .with_state(service)
}

fn error_response(error: AssessmentServiceError) -> Response {
    let status = match &error {
        AssessmentServiceError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        AssessmentServiceError::ResultNotReady(_) => StatusCode::CONFLICT,
        AssessmentServiceError::Wizard(
            WizardError::SubmissionInFlight
            | WizardError::AlreadySubmitted
            | WizardError::NotSubmitting,
        ) => StatusCode::CONFLICT,
        AssessmentServiceError::Wizard(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AssessmentServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        AssessmentServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = match &error {
        AssessmentServiceError::Wizard(WizardError::ValidationBlocked { step, missing }) => json!({
            "error": error.to_string(),
            "step": step,
            "missing_fields": missing,
        }),
        _ => json!({
            "error": error.to_string(),
        }),
    };
    (status, axum::Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(
    status: StatusCode,
    outcome: Result<T, AssessmentServiceError>,
) -> Response {
    match outcome {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn start_handler<C, R>(State(service): State<SharedService<C, R>>) -> Response
where
    C: PredictionClient + 'static,
    R: ResultRepository + 'static,
{
    (StatusCode::CREATED, axum::Json(service.start())).into_response()
}

pub(crate) async fn view_handler<C, R>(
    State(service): State<SharedService<C, R>>,
    Path(session_id): Path<String>,
) -> Response
where
    C: PredictionClient + 'static,
    R: ResultRepository + 'static,
{
    respond(StatusCode::OK, service.view(&SessionId(session_id)))
}

pub(crate) async fn answers_handler<C, R>(
    State(service): State<SharedService<C, R>>,
    Path(session_id): Path<String>,
    axum::Json(updates): axum::Json<Vec<AnswerUpdate>>,
) -> Response
where
    C: PredictionClient + 'static,
    R: ResultRepository + 'static,
{
    respond(StatusCode::OK, service.update(&SessionId(session_id), updates))
}

pub(crate) async fn next_handler<C, R>(
    State(service): State<SharedService<C, R>>,
    Path(session_id): Path<String>,
) -> Response
where
    C: PredictionClient + 'static,
    R: ResultRepository + 'static,
{
    respond(StatusCode::OK, service.next(&SessionId(session_id)))
}

pub(crate) async fn previous_handler<C, R>(
    State(service): State<SharedService<C, R>>,
    Path(session_id): Path<String>,
) -> Response
where
    C: PredictionClient + 'static,
    R: ResultRepository + 'static,
{
    respond(StatusCode::OK, service.previous(&SessionId(session_id)))
}

pub(crate) async fn submit_handler<C, R>(
    State(service): State<SharedService<C, R>>,
    Path(session_id): Path<String>,
) -> Response
where
    C: PredictionClient + 'static,
    R: ResultRepository + 'static,
{
    respond(StatusCode::OK, service.submit(&SessionId(session_id)).await)
}

pub(crate) async fn result_handler<C, R>(
    State(service): State<SharedService<C, R>>,
    Path(session_id): Path<String>,
) -> Response
where
    C: PredictionClient + 'static,
    R: ResultRepository + 'static,
{
    respond(StatusCode::OK, service.result(&SessionId(session_id)))
}

pub(crate) async fn predictor_health_handler<C, R>(
    State(service): State<SharedService<C, R>>,
) -> Response
where
    C: PredictionClient + 'static,
    R: ResultRepository + 'static,
{
    let healthy = service.predictor_healthy().await;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, axum::Json(json!({ "predictor_available": healthy }))).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LimitParams {
    limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TrendParams {
    weeks: Option<u32>,
}

pub(crate) async fn stats_handler<C, R>(State(service): State<SharedService<C, R>>) -> Response
where
    C: PredictionClient + 'static,
    R: ResultRepository + 'static,
{
    respond(StatusCode::OK, service.stats())
}

pub(crate) async fn trends_handler<C, R>(
    State(service): State<SharedService<C, R>>,
    Query(params): Query<TrendParams>,
) -> Response
where
    C: PredictionClient + 'static,
    R: ResultRepository + 'static,
{
    let weeks = params.weeks.unwrap_or(DEFAULT_TREND_WEEKS);
    if weeks > analytics::MAX_TREND_WEEKS {
        let message = format!("weeks must be at most {}", analytics::MAX_TREND_WEEKS);
        return (StatusCode::BAD_REQUEST, axum::Json(json!({ "error": message }))).into_response();
    }
    let outcome = service
        .records()
        .map(|records| analytics::weekly_trends(&records, weeks, Utc::now()));
    respond(StatusCode::OK, outcome)
}

pub(crate) async fn risk_factors_handler<C, R>(
    State(service): State<SharedService<C, R>>,
    Query(params): Query<LimitParams>,
) -> Response
where
    C: PredictionClient + 'static,
    R: ResultRepository + 'static,
{
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let outcome = service
        .records()
        .map(|records| analytics::top_risk_factors(&records, limit, Utc::now()));
    respond(StatusCode::OK, outcome)
}

pub(crate) async fn recent_handler<C, R>(
    State(service): State<SharedService<C, R>>,
    Query(params): Query<LimitParams>,
) -> Response
where
    C: PredictionClient + 'static,
    R: ResultRepository + 'static,
{
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let outcome = service
        .records()
        .map(|records| analytics::recent_assessments(&records, limit));
    respond(StatusCode::OK, outcome)
}

pub(crate) async fn distribution_handler<C, R>(
    State(service): State<SharedService<C, R>>,
) -> Response
where
    C: PredictionClient + 'static,
    R: ResultRepository + 'static,
{
    let outcome = service
        .records()
        .map(|records| analytics::risk_distribution(&records));
    respond(StatusCode::OK, outcome)
}
