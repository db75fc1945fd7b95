use std::convert::Infallible;
use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures::stream::{self, Stream, StreamExt};
use sim::{Reactor, ReactorState};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::warn;

use crate::action::Action;
use crate::error::ApiError;
use crate::hub::Hub;

#[derive(Clone)]
pub struct AppState {
    pub reactor: Arc<Reactor>,
    pub hub: Arc<Hub>,
}

pub fn router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/api/state", get(get_state))
        .route("/api/action", post(post_action))
        .route("/events", get(events))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn get_state(State(app): State<AppState>) -> Json<ReactorState> {
    Json(app.reactor.snapshot())
}

async fn post_action(State(app): State<AppState>, body: Bytes) -> Result<StatusCode, ApiError> {
    let action = Action::parse(&body)?;
    action.apply(&app.reactor);
    Ok(StatusCode::NO_CONTENT)
}

async fn events(
    State(app): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Register before taking the first snapshot so no tick slips between them.
    let sub = app.hub.subscribe();
    let initial = match serde_json::to_string(&app.reactor.snapshot()) {
        Ok(json) => Some(json),
        Err(e) => {
            warn!(error = %e, "failed to encode initial snapshot");
            None
        }
    };

    let first =
        stream::iter(initial).map(|json| Ok::<_, Infallible>(Event::default().data(json)));
    let updates = stream::unfold(sub, |mut sub| async move {
        let frame = sub.recv().await?;
        Some((Ok::<_, Infallible>(Event::default().data(&*frame)), sub))
    });

    Sse::new(first.chain(updates)).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::Frame;
    use axum::body::{to_bytes, Body, BodyDataStream};
    use axum::http::{header, Method, Request};
    use sim::{ReactorConfig, Status};
    use std::time::Duration;
    use tower::ServiceExt;

    fn app() -> (Router, AppState) {
        let state = AppState {
            reactor: Arc::new(Reactor::with_config(ReactorConfig::with_seed(2)).unwrap()),
            hub: Arc::new(Hub::new()),
        };
        let router = router(state.clone(), Path::new("does-not-exist"));
        (router, state)
    }

    async fn next_event(body: &mut BodyDataStream) -> String {
        let chunk = tokio::time::timeout(Duration::from_secs(1), body.next())
            .await
            .expect("no event")
            .expect("stream ended")
            .unwrap();
        String::from_utf8(chunk.to_vec()).unwrap()
    }

    fn action(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/action")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn state_endpoint_returns_snapshot() {
        let (router, state) = app();
        let resp = router
            .oneshot(Request::get("/api/state").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let parsed: ReactorState = serde_json::from_slice(&body).unwrap();
        let expected = state.reactor.snapshot();
        assert_eq!(parsed.is_powered_on, expected.is_powered_on);
        assert_eq!(parsed.temperature, 350.0);
        assert_eq!(parsed.power_output, 1000.0);
        assert_eq!(parsed.fuel_rod, expected.fuel_rod);
        assert_eq!(parsed.status, Status::NONE);
    }

    #[tokio::test]
    async fn wrong_methods_are_rejected() {
        let (router, _) = app();
        let resp = router
            .clone()
            .oneshot(Request::post("/api/state").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

        let resp = router
            .oneshot(Request::get("/api/action").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn action_applies_command() {
        let (router, state) = app();
        let resp = router.oneshot(action(r#"{"type":"scram"}"#)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        let s = state.reactor.snapshot();
        assert!(s.status.contains(Status::SCRAM));
        assert!(!s.is_powered_on);
    }

    #[tokio::test]
    async fn ignored_setpoint_still_succeeds() {
        let (router, state) = app();
        let before = state.reactor.snapshot();
        let resp = router
            .oneshot(action(r#"{"type":"setFissionRate","value":99}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(state.reactor.snapshot(), before);
    }

    #[tokio::test]
    async fn bad_actions_leave_state_alone() {
        let (router, state) = app();
        let before = state.reactor.snapshot();
        for body in ["{", r#"{"type":"selfDestruct"}"#, r#"{"type":"scram","value":"x"}"#] {
            let resp = router.clone().oneshot(action(body)).await.unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
        }
        assert_eq!(state.reactor.snapshot(), before);
    }

    #[tokio::test]
    async fn events_stream_snapshot_then_updates() {
        let (router, state) = app();
        let resp = router
            .oneshot(Request::get("/events").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(state.hub.subscriber_count(), 1);

        let mut body = resp.into_body().into_data_stream();
        let first = next_event(&mut body).await;
        assert!(first.starts_with("data: {"), "{first}");
        assert!(first.contains(r#""isPoweredOn":true"#));

        state.hub.publish(Frame::from(r#"{"tick":1}"#));
        let second = next_event(&mut body).await;
        assert_eq!(second, "data: {\"tick\":1}\n\n");

        drop(body);
        assert_eq!(state.hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn unknown_paths_fall_through_to_static() {
        let (router, _) = app();
        let resp = router
            .oneshot(Request::get("/index.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
