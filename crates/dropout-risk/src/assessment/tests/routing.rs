use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::assessment::router::{assessment_router, submit_handler};
use crate::assessment::service::AssessmentService;

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serializes")))
        .expect("request builds")
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).expect("request builds")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

fn complete_payload() -> Value {
    serde_json::to_value(complete_updates()).expect("updates serialize")
}

async fn start(router: &Router) -> String {
    let response = router
        .clone()
        .oneshot(post_empty("/api/v1/assessments"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    payload["session_id"]
        .as_str()
        .expect("session id present")
        .to_string()
}

#[tokio::test]
async fn start_route_opens_consent_step() {
    let router = assessment_router(build_service(FailingClient));

    let response = router
        .oneshot(post_empty("/api/v1/assessments"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["step"], "consent");
    assert_eq!(payload["phase"], "editing");
    assert_eq!(payload["can_advance"], false);
}

#[tokio::test]
async fn next_route_returns_unprocessable_with_missing_fields() {
    let router = assessment_router(build_service(FailingClient));
    let id = start(&router).await;

    let response = router
        .oneshot(post_empty(&format!("/api/v1/assessments/{id}/next")))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["step"], "consent");
    assert_eq!(
        payload["missing_fields"],
        json!(["consent_given", "consent_data_processing"])
    );
}

#[tokio::test]
async fn unknown_answer_fields_are_rejected() {
    let router = assessment_router(build_service(FailingClient));
    let id = start(&router).await;

    let response = router
        .oneshot(post_json(
            &format!("/api/v1/assessments/{id}/answers"),
            json!([{ "field": "shoe_size", "value": 44 }]),
        ))
        .await
        .expect("route executes");

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn unknown_session_returns_not_found() {
    let router = assessment_router(build_service(FailingClient));

    let response = router
        .oneshot(get("/api/v1/assessments/asm-missing"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn full_flow_submits_and_serves_the_result() {
    let router = assessment_router(build_service(StaticClient::new(model_response())));
    let id = start(&router).await;

    let response = router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/assessments/{id}/answers"),
            complete_payload(),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    for _ in 0..4 {
        let response = router
            .clone()
            .oneshot(post_empty(&format!("/api/v1/assessments/{id}/next")))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = router
        .clone()
        .oneshot(get(&format!("/api/v1/assessments/{id}/result")))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = router
        .clone()
        .oneshot(post_empty(&format!("/api/v1/assessments/{id}/submit")))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let submitted = read_json_body(response).await;
    assert_eq!(submitted["risk_level"], "medium");
    assert_eq!(submitted["source"], "model");

    let response = router
        .clone()
        .oneshot(get(&format!("/api/v1/assessments/{id}/result")))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await, submitted);

    let response = router
        .clone()
        .oneshot(post_empty(&format!("/api/v1/assessments/{id}/submit")))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = router
        .oneshot(get("/api/v1/admin/dashboard/stats"))
        .await
        .expect("route executes");
    let stats = read_json_body(response).await;
    assert_eq!(stats["total_assessments"], 1);
    assert_eq!(stats["medium_risk_count"], 1);
}

#[tokio::test]
async fn submit_handler_returns_internal_error_on_storage_failure() {
    let service = Arc::new(AssessmentService::new(
        Arc::new(adapter(FailingClient)),
        Arc::new(UnavailableRepository),
    ));
    let id = session_at_review(service.as_ref());

    let response = submit_handler::<FailingClient, UnavailableRepository>(
        State(service),
        Path(id.0),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn admin_routes_reject_storage_outage() {
    let service = Arc::new(AssessmentService::new(
        Arc::new(adapter(FailingClient)),
        Arc::new(UnavailableRepository),
    ));
    let router = assessment_router(service);

    let response = router
        .oneshot(get("/api/v1/admin/risk-distribution"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn predictor_health_route_reports_unavailable() {
    let router = assessment_router(build_service(FailingClient));

    let response = router
        .oneshot(get("/api/v1/predictor/health"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let payload = read_json_body(response).await;
    assert_eq!(payload["predictor_available"], false);
}

#[tokio::test]
async fn trend_route_refuses_oversized_windows() {
    let router = assessment_router(build_service(FailingClient));

    let response = router
        .clone()
        .oneshot(get("/api/v1/admin/dashboard/trends?weeks=20000000"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = router
        .oneshot(get("/api/v1/admin/dashboard/trends?weeks=52"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(52));
}
