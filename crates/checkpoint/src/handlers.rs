// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.
//!
//! Handles GET /health, GET /metrics, POST /v1/verify/{domain}.

use std::collections::BTreeMap;
use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use checkpoint_core::{CheckpointError, CircuitSnapshot, CircuitState, DomainKind, HealthStatus};
use serde::{Deserialize, Serialize};

use crate::server::AppState;

/// Query parameters for GET /health.
#[derive(Debug, Default, Deserialize)]
pub struct HealthParams {
    /// Re-run the cache availability probe before reporting.
    #[serde(default)]
    pub reprobe: bool,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" when every breaker is closed and the cache is available,
    /// "unhealthy" when every breaker is open, "degraded" otherwise.
    pub status: String,
    /// What is not closed or not available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub version: String,
    pub uptime_secs: u64,
    pub cache: CacheHealth,
    /// Breaker snapshot per domain, keyed by domain name.
    pub circuits: BTreeMap<String, CircuitSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct CacheHealth {
    pub available: bool,
    pub backend: Option<String>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// GET /health
pub async fn get_health(
    State(state): State<AppState>,
    Query(params): Query<HealthParams>,
) -> Json<HealthResponse> {
    if params.reprobe {
        let available = state.cache.reprobe().await;
        tracing::info!(available, "cache reprobed on request");
    }

    let mut circuits: BTreeMap<String, CircuitSnapshot> = state
        .gateways
        .circuits()
        .into_iter()
        .map(|(kind, snapshot)| (kind.to_string(), snapshot))
        .collect();
    if let Some(watcher) = &state.watcher {
        circuits.insert(DomainKind::Legislation.to_string(), watcher.circuit_state());
    }

    let cache_available = state.cache.is_available();
    let health = assess(&circuits, cache_available);

    Json(HealthResponse {
        status: health.label().to_string(),
        detail: health.detail().map(str::to_string),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        cache: CacheHealth {
            available: cache_available,
            backend: state.cache.backend_name().map(str::to_string),
        },
        circuits,
    })
}

fn assess(circuits: &BTreeMap<String, CircuitSnapshot>, cache_available: bool) -> HealthStatus {
    if !circuits.is_empty() && circuits.values().all(|s| s.state == CircuitState::Open) {
        return HealthStatus::Unhealthy("every source circuit is open".to_string());
    }

    let mut problems: Vec<String> = circuits
        .iter()
        .filter(|(_, s)| s.state != CircuitState::Closed)
        .map(|(name, s)| format!("{name} circuit {}", s.state))
        .collect();
    if !cache_available {
        problems.push("cache unavailable".to_string());
    }

    if problems.is_empty() {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded(problems.join(", "))
    }
}

/// GET /metrics
///
/// Prometheus text exposition. 404 when no recorder is installed.
pub async fn get_metrics(State(state): State<AppState>) -> Response {
    match &state.prometheus_render {
        Some(render) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => error_response(StatusCode::NOT_FOUND, "metrics are not enabled"),
    }
}

/// POST /v1/verify/{domain}
///
/// The body is the domain's query as JSON. Source trouble never fails the
/// request: it comes back as a FALLBACK result with status 200.
pub async fn post_verify(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let kind = match DomainKind::from_str(&domain) {
        Ok(kind) if DomainKind::STATUS_DOMAINS.contains(&kind) => kind,
        _ => {
            return error_response(
                StatusCode::NOT_FOUND,
                format!("unknown verification domain `{domain}`"),
            );
        }
    };

    let cancel = state.shutdown.child_token();
    match state.gateways.verify_json(kind, body, &cancel).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e @ CheckpointError::Validation { .. }) => {
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => {
            tracing::error!(domain = %kind, error = %e, "verification failed unexpectedly");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use checkpoint_gateway::{
        EntryBanDomain, InnDomain, PatentDomain, ResidencePermitDomain, WorkPermitDomain,
    };
    use checkpoint_test_utils::{CacheMode, TestHarness};
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    use super::*;
    use crate::app::Gateways;
    use crate::server::router;

    const NO_BAN_PAGE: &str = "Данных нет";

    fn state_from(harness: &TestHarness) -> AppState {
        let gateways = Gateways {
            entry_ban: harness.gateway(EntryBanDomain::new()),
            inn: harness.gateway(InnDomain::new()),
            patent: harness.gateway(PatentDomain::patent()),
            work_permit: harness.gateway(WorkPermitDomain::work_permit()),
            residence_permit: harness.gateway(ResidencePermitDomain::residence_permit()),
        };
        AppState {
            gateways: Arc::new(gateways),
            cache: harness.cache.clone(),
            watcher: None,
            start_time: Instant::now(),
            prometheus_render: None,
            shutdown: CancellationToken::new(),
        }
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn verify_request(domain: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(format!("/v1/verify/{domain}"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn person() -> serde_json::Value {
        serde_json::json!({
            "surname": "Иванов",
            "givenNames": "Иван",
            "birthDate": "1990-05-01",
            "citizenship": "UZ",
        })
    }

    #[tokio::test]
    async fn verify_returns_live_then_cached_result() {
        let harness = TestHarness::builder()
            .with_default_body(NO_BAN_PAGE)
            .build()
            .await;
        let state = state_from(&harness);

        let (status, first) = send(state.clone(), verify_request("entry_ban", person())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["source"], "LIVE");
        assert_eq!(first["status"]["code"], "NO_BAN");

        let (_, second) = send(state, verify_request("entry_ban", person())).await;
        assert_eq!(second["source"], "CACHE");
        assert_eq!(second["checkedAt"], first["checkedAt"]);
        assert_eq!(harness.fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn invalid_query_is_bad_request() {
        let harness = TestHarness::builder().build().await;
        let body = serde_json::json!({
            "surname": "  ",
            "givenNames": "Иван",
            "birthDate": "1990-05-01",
        });

        let (status, json) = send(state_from(&harness), verify_request("entry_ban", body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("surname"));
        assert_eq!(harness.fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let harness = TestHarness::builder().build().await;
        let body = serde_json::json!({ "series": "77" });

        let (status, _) = send(state_from(&harness), verify_request("patent", body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_domain_is_not_found() {
        let harness = TestHarness::builder().build().await;

        let (status, _) = send(state_from(&harness), verify_request("visa", person())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            send(state_from(&harness), verify_request("legislation", person())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unavailable_source_is_still_ok() {
        let harness = TestHarness::builder()
            .configure(|c| {
                c.retry_attempts = 1;
                c.retry_delay_ms = 1;
            })
            .with_responses(vec![Err(CheckpointError::HttpStatus { status: 503 })])
            .build()
            .await;

        let (status, json) = send(state_from(&harness), verify_request("entry_ban", person())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["source"], "FALLBACK");
        assert_eq!(json["fallback"], "retries_exhausted");
        assert_eq!(json["status"]["code"], "UNKNOWN");
    }

    #[tokio::test]
    async fn health_reports_circuits_and_cache() {
        let harness = TestHarness::builder().build().await;
        let request = Request::get("/health").body(Body::empty()).unwrap();

        let (status, json) = send(state_from(&harness), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert!(json.get("detail").is_none());
        assert_eq!(json["cache"]["available"], true);
        assert_eq!(json["circuits"]["entry_ban"]["state"], "CLOSED");
        assert_eq!(json["circuits"].as_object().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn health_is_degraded_without_cache() {
        let harness = TestHarness::builder()
            .with_cache(CacheMode::Failing)
            .build()
            .await;
        let request = Request::get("/health?reprobe=true")
            .body(Body::empty())
            .unwrap();

        let (status, json) = send(state_from(&harness), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["detail"], "cache unavailable");
        assert_eq!(json["cache"]["available"], false);
    }

    #[tokio::test]
    async fn health_names_open_circuits() {
        let harness = TestHarness::builder()
            .configure(|c| {
                c.retry_attempts = 1;
                c.circuit_breaker_threshold = 1;
            })
            .with_responses(vec![Err(CheckpointError::HttpStatus { status: 503 })])
            .build()
            .await;
        let state = state_from(&harness);
        send(state.clone(), verify_request("entry_ban", person())).await;
        let request = Request::get("/health").body(Body::empty()).unwrap();

        let (_, json) = send(state, request).await;

        assert_eq!(json["status"], "degraded");
        assert_eq!(json["detail"], "entry_ban circuit open");
        assert_eq!(json["circuits"]["entry_ban"]["state"], "OPEN");
    }

    #[test]
    fn every_open_circuit_is_unhealthy() {
        let open = CircuitSnapshot {
            state: CircuitState::Open,
            failures: 5,
        };
        let circuits = BTreeMap::from([("inn".to_string(), open), ("patent".to_string(), open)]);

        assert!(matches!(assess(&circuits, true), HealthStatus::Unhealthy(_)));
        assert_eq!(assess(&BTreeMap::new(), true), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn metrics_without_recorder_is_not_found() {
        let harness = TestHarness::builder().build().await;
        let request = Request::get("/metrics").body(Body::empty()).unwrap();

        let (status, _) = send(state_from(&harness), request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn metrics_renders_exposition_text() {
        let harness = TestHarness::builder().build().await;
        let mut state = state_from(&harness);
        state.prometheus_render = Some(Arc::new(|| "checkpoint_up 1\n".to_string()));
        let request = Request::get("/metrics").body(Body::empty()).unwrap();

        let response = router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(&bytes[..], b"checkpoint_up 1\n");
    }
}
