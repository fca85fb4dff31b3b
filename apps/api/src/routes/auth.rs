//! Staff login.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use crate::auth::{login_with_pin, LoginResponse, PinLoginRequest};
use crate::error::{ok, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/auth/login/pin", post(login_pin))
}

async fn login_pin(
    State(state): State<AppState>,
    payload: Result<Json<PinLoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(req) = payload?;
    Ok(ok(login_with_pin(&state, &req)?))
}

#[cfg(test)]
mod tests {
    use crate::testkit::{send, test_state};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_pin_login() {
        let state = test_state();
        let (status, body) = send(
            &state,
            Method::POST,
            "/api/auth/login/pin",
            None,
            Some(json!({ "email": "kitchen@kaori.pos", "pin": "2222" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["token_type"], "Bearer");
        assert_eq!(body["data"]["expires_in"], 24 * 3600);
        assert_eq!(body["data"]["user"]["role"], "kitchen");
        assert!(body["data"]["user"].get("pin_hash").is_none());

        let token = body["data"]["access_token"].as_str().unwrap();
        let claims = state.jwt().validate_token(token).unwrap();
        assert_eq!(claims.store_id, "store-1");
    }

    #[tokio::test]
    async fn test_wrong_pin() {
        let state = test_state();
        let (status, body) = send(
            &state,
            Method::POST,
            "/api/auth/login/pin",
            None,
            Some(json!({ "email": "kitchen@kaori.pos", "pin": "0000" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "Invalid email or PIN");
    }
}
