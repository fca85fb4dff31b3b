//! Liveness probe.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::error::{ok, ApiResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    /// Live display connections.
    subscribers: usize,
}

async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    // A stopped hub reports zero rather than failing the probe.
    let subscribers = state.hub().subscriber_count().await.unwrap_or(0);
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        subscribers,
    })
}

#[cfg(test)]
mod tests {
    use crate::testkit::{send, test_state};
    use axum::http::{Method, StatusCode};
    use kaori_realtime::SubscriberScope;

    #[tokio::test]
    async fn test_health_reports_subscribers() {
        let state = test_state();
        let _sub = state.hub().register(SubscriberScope::default()).unwrap();

        let (status, body) = send(&state, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ok");
        assert_eq!(body["data"]["subscribers"], 1);
    }
}
