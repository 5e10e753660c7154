use std::net::SocketAddr;

use axum::extract::{DefaultBodyLimit, FromRequest, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::store::PasteStore;
use crate::types::api::{CreatePaste, PasteBody, PasteCreated};
use crate::{ApiError, AppState};

/// Overrides the clock for a fetch, in epoch milliseconds. Exists for
/// deterministic expiry testing.
const NOW_OVERRIDE_HEADER: &str = "x-now-ms";

pub async fn run(state: AppState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], state.config.port));
    let app = router(state);

    info!("listening on http://{addr}");

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/pastes", post(create_paste))
        .route("/api/pastes/:id", get(fetch_paste))
        .route("/api/healthz", get(healthz))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(
            state.config.limits.max_upload_size,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Json extractor that reports body errors as an [`ApiError`] instead of
/// axum's plain-text rejection.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
struct AppJson<T>(T);

async fn create_paste(
    State(config): State<Config>,
    State(store): State<PasteStore>,
    AppJson(req): AppJson<CreatePaste>,
) -> crate::ApiResult<impl IntoResponse> {
    let size = req.content.len();
    let id = store.create(req.content, req.ttl_seconds, req.max_views, Utc::now())?;

    info!("new paste: id='{id}', size={size}");

    let url = config.paste_url(&id);
    Ok((StatusCode::CREATED, axum::Json(PasteCreated { id, url })))
}

async fn fetch_paste(
    State(store): State<PasteStore>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> crate::ApiResult<axum::Json<PasteBody>> {
    let now = request_time(&headers)?;
    let paste = store.fetch(&id, now)?;

    Ok(axum::Json(PasteBody {
        content: paste.content,
        remaining_views: paste.remaining_views,
        expires_at: paste.expires_at,
    }))
}

async fn healthz() -> axum::Json<serde_json::Value> {
    axum::Json(json!({ "ok": true }))
}

fn request_time(headers: &HeaderMap) -> crate::ApiResult<DateTime<Utc>> {
    let Some(value) = headers.get(NOW_OVERRIDE_HEADER) else {
        return Ok(Utc::now());
    };

    let millis: i64 = value
        .to_str()
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .ok_or(ApiError::InvalidTimeOverride)?;

    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or(ApiError::InvalidTimeOverride)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::ids::RandomIds;

    fn test_router() -> Router {
        let state = AppState {
            config: Config::default(),
            store: PasteStore::new(Arc::new(RandomIds::default())),
        };
        router(state)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn create_request(body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/pastes")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn fetch_request(id: &str, now_ms: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(format!("/api/pastes/{id}"));
        if let Some(now_ms) = now_ms {
            builder = builder.header(NOW_OVERRIDE_HEADER, now_ms);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn create_and_fetch_roundtrip() {
        let app = test_router();

        let (status, created) =
            send(&app, create_request(json!({ "content": "hello world" }))).await;
        assert_eq!(status, StatusCode::CREATED);

        let id = created["id"].as_str().unwrap();
        assert!(!id.is_empty());
        assert_eq!(
            created["url"],
            format!("http://localhost:8090/api/pastes/{id}")
        );

        let (status, body) = send(&app, fetch_request(id, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], "hello world");
        assert_eq!(body["remaining_views"], Value::Null);
        assert_eq!(body["expires_at"], Value::Null);
    }

    #[tokio::test]
    async fn expires_at_is_set_only_with_a_ttl() {
        let app = test_router();

        let (_, created) = send(
            &app,
            create_request(json!({ "content": "timed", "ttl_seconds": 60 })),
        )
        .await;
        let (_, body) = send(&app, fetch_request(created["id"].as_str().unwrap(), None)).await;
        assert!(body["expires_at"].is_string());

        let parsed = DateTime::parse_from_rfc3339(body["expires_at"].as_str().unwrap());
        assert!(parsed.is_ok());
    }

    #[tokio::test]
    async fn view_quota_is_drained_over_http() {
        let app = test_router();

        let (_, created) = send(
            &app,
            create_request(json!({ "content": "once", "max_views": 1 })),
        )
        .await;
        let id = created["id"].as_str().unwrap();

        let (status, body) = send(&app, fetch_request(id, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["remaining_views"], 0);

        let (status, exhausted) = send(&app, fetch_request(id, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // indistinguishable from an id that never existed
        let (status, missing) = send(&app, fetch_request("no-such-id", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(exhausted, missing);
        assert_eq!(missing["error"], "Paste unavailable");
    }

    #[tokio::test]
    async fn time_override_drives_expiry() {
        let app = test_router();

        let (_, created) = send(
            &app,
            create_request(json!({ "content": "short-lived", "ttl_seconds": 60 })),
        )
        .await;
        let id = created["id"].as_str().unwrap();

        let later = (Utc::now() + chrono::Duration::seconds(120)).timestamp_millis();
        let (status, _) = send(&app, fetch_request(id, Some(&later.to_string()))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // lazily deleted; gone at the real clock too
        let (status, _) = send(&app, fetch_request(id, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unparseable_time_override_is_rejected() {
        let app = test_router();

        let (_, created) = send(&app, create_request(json!({ "content": "x" }))).await;
        let id = created["id"].as_str().unwrap();

        let (status, body) = send(&app, fetch_request(id, Some("bananas"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn invalid_inputs_are_rejected_with_an_error_body() {
        let app = test_router();

        for body in [
            json!({ "content": "" }),
            json!({ "content": "x", "ttl_seconds": 0 }),
            json!({ "content": "x", "max_views": 0 }),
            json!({ "ttl_seconds": 5 }),
        ] {
            let (status, response) = send(&app, create_request(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(response["error"].is_string());
        }
    }

    #[tokio::test]
    async fn healthz_reports_ok() {
        let app = test_router();

        let (status, body) = send(
            &app,
            Request::builder()
                .uri("/api/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));
    }
}
