//! Operational HTTP surface (§6).
//!
//! Required by the core even though the HTTP server itself is an external
//! collaborator's responsibility — the three routes here are the contract
//! the collaborator must expose, backed directly by the Concurrency Gate
//! and the Isolation Runtime Adapter.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::gate::ConcurrencyGate;
use crate::runtime::RuntimeAdapter;

#[derive(Clone)]
struct AppState {
    runtime: Arc<dyn RuntimeAdapter>,
    gate: Arc<ConcurrencyGate>,
}

pub fn router(runtime: Arc<dyn RuntimeAdapter>, gate: Arc<ConcurrencyGate>) -> Router {
    let state = AppState { runtime, gate };
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/api/v1/executions/active", get(active_executions))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "healthy", "service": "executor"}))
}

async fn ready(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    if state.runtime.ping().await {
        (StatusCode::OK, Json(json!({"status": "ready", "service": "executor"})))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "not_ready", "service": "executor"})),
        )
    }
}

async fn active_executions(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({"active_executions": state.gate.active_count()}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;
    use crate::runtime::{ContainerSpec, Signal, WaitOutcome};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    struct StubRuntime {
        reachable: bool,
    }

    #[async_trait]
    impl RuntimeAdapter for StubRuntime {
        async fn create(&self, _spec: &ContainerSpec) -> Result<String, RuntimeError> {
            Ok("c".into())
        }
        async fn start(&self, _container_id: &str) -> Result<(), RuntimeError> {
            Ok(())
        }
        async fn wait(
            &self,
            _container_id: &str,
            _cancel: CancellationToken,
        ) -> Result<WaitOutcome, RuntimeError> {
            Ok(WaitOutcome::Exited(0))
        }
        async fn kill(&self, _container_id: &str, _signal: Signal) {}
        async fn logs(&self, _container_id: &str) -> Result<Vec<u8>, RuntimeError> {
            Ok(Vec::new())
        }
        async fn stop(&self, _container_id: &str, _grace_seconds: u32) {}
        async fn remove(&self, _container_id: &str, _force: bool) {}
        async fn ping(&self) -> bool {
            self.reachable
        }
    }

    #[tokio::test]
    async fn health_always_reports_healthy() {
        let app = router(Arc::new(StubRuntime { reachable: false }), Arc::new(ConcurrencyGate::new(1)));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn ready_reflects_runtime_reachability() {
        let app = router(Arc::new(StubRuntime { reachable: true }), Arc::new(ConcurrencyGate::new(1)));
        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn ready_returns_503_when_runtime_unreachable() {
        let app = router(Arc::new(StubRuntime { reachable: false }), Arc::new(ConcurrencyGate::new(1)));
        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 503);
    }

    #[tokio::test]
    async fn active_executions_reflects_the_gate() {
        let gate = Arc::new(ConcurrencyGate::new(2));
        let _permit = gate.acquire(&CancellationToken::new()).await.unwrap();
        let app = router(Arc::new(StubRuntime { reachable: true }), Arc::clone(&gate));
        let response = app
            .oneshot(Request::builder().uri("/api/v1/executions/active").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }
}
