use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use chrono::Utc;
use clicker::{
    model::{ClickResult, Stats},
    resolver::stats,
};
use rand::{SeedableRng, rngs::StdRng};
use serde::Deserialize;
use tracing::{error, warn};

use crate::{error::AppError, state::AppState, utils::validate_user_id};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickRequest {
    user_id: String,
}

pub async fn click_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ClickRequest>, JsonRejection>,
) -> Result<Json<ClickResult>, AppError> {
    let Json(request) = payload.map_err(|e| {
        warn!("Rejected click payload: {e}");
        AppError::MalformedPayload
    })?;
    let user_id = validate_user_id(&request.user_id)?;

    let mut rng = StdRng::from_entropy();

    state
        .resolver
        .resolve_click(state.store.as_ref(), user_id, &mut rng, Utc::now())
        .await
        .map(Json)
        .map_err(|e| {
            error!("Click processing error for {user_id}: {e}");
            AppError::ClickFailed(e)
        })
}

pub async fn stats_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Stats>, AppError> {
    let user_id = validate_user_id(&user_id)?;

    stats(state.store.as_ref(), user_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!("User stats fetch error for {user_id}: {e}");
            AppError::StatsFailed(e)
        })
}

pub async fn health_handler() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header::CONTENT_TYPE},
    };
    use clicker::store::MemoryStore;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::{
        app,
        config::{Config, StoreKind},
        state::AppState,
    };

    fn test_app() -> Router {
        app_with_origins(vec!["http://localhost:3000".to_string()])
    }

    fn app_with_origins(allowed_origins: Vec<String>) -> Router {
        let config = Config {
            port: 0,
            store: StoreKind::Memory,
            redis_url: String::new(),
            redis_timeout_ms: 100,
            allowed_origins,
        };

        app(AppState::with_store(config, std::sync::Arc::new(MemoryStore::new())))
    }

    fn click(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/click")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_click_then_stats() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(click(r#"{"userId":"user_1731600000000"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let clicked = json_body(response).await;
        assert_eq!(clicked["totalClicks"], 1);
        assert!(clicked["totalScore"].as_u64().unwrap() >= 1);
        assert!(clicked["scoreIncrease"].as_f64().unwrap() >= 1.0);
        assert!(clicked["activeEffects"].is_array());
        assert!(clicked.get("prize").is_some());

        let response = app
            .oneshot(get("/api/stats/user_1731600000000"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let stats = json_body(response).await;
        assert_eq!(stats["userId"], "user_1731600000000");
        assert_eq!(stats["totalClicks"], 1);
        assert_eq!(stats["totalScore"], clicked["totalScore"]);
    }

    #[tokio::test]
    async fn test_stats_unknown_user() {
        let response = test_app().oneshot(get("/api/stats/nobody")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "totalScore": 0, "totalClicks": 0, "prizeCount": 0 })
        );
    }

    #[tokio::test]
    async fn test_malformed_clicks() {
        let app = test_app();

        for body in [r#"{}"#, r#"{"userId":""}"#, r#"{"userId":"a b"}"#, "not json"] {
            let response = app.clone().oneshot(click(body)).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(json_body(response).await, json!({ "error": "Malformed payload" }));
        }
    }

    #[tokio::test]
    async fn test_wildcard_origin_still_serves() {
        let app = app_with_origins(crate::config::split_origins("*"));
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let app = app_with_origins(vec!["*".to_string()]);
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_padded_user_id_rejected() {
        let response = test_app()
            .oneshot(click(r#"{"userId":" user_1"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app().oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
