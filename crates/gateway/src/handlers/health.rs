//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;
use std::time::Instant;

use crate::AppState;
use brandsheet_common::metrics;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub spreadsheet: CheckResult,
}

#[derive(Serialize)]
pub struct CheckResult {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Liveness probe - always returns healthy if server is running
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.config.observability.service_name.clone(),
        version: brandsheet_common::VERSION.to_string(),
    })
}

/// Readiness probe - lists the sheets of the backing spreadsheet
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    let start = Instant::now();

    let spreadsheet = match state.sync.sheets().await {
        Ok(_) => CheckResult {
            status: "up".to_string(),
            latency_ms: Some(start.elapsed().as_millis() as u64),
            error: None,
        },
        Err(e) => CheckResult {
            status: "down".to_string(),
            latency_ms: None,
            error: Some(e.to_string()),
        },
    };

    let all_healthy = spreadsheet.status == "up";
    metrics::record_store_up(all_healthy);

    Json(ReadyResponse {
        status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
        checks: HealthChecks { spreadsheet },
    })
}

#[cfg(test)]
mod tests {
    use crate::test_support::router_with;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use brandsheet_common::sheets::MemorySheetStore;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn get_json(path: &str, store: MemorySheetStore) -> (StatusCode, Value) {
        let response = router_with(store)
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_is_always_up() {
        let (status, body) = get_json("/health", MemorySheetStore::new(2)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "brandsheet");
    }

    #[tokio::test]
    async fn test_ready_probes_spreadsheet() {
        let store = MemorySheetStore::with_default_sheet(2, "Sheet1");
        let (status, body) = get_json("/ready", store).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["checks"]["spreadsheet"]["status"], "up");
    }
}
