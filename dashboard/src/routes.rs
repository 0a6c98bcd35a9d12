use std::sync::Arc;

use axum::Router;
use axum::extract::{Json, State};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tracing::debug;
use volume::Series;

use crate::state::AppState;
use crate::views;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(views::index))
        .route("/chart.svg", get(views::chart_svg))
        .route("/fragments/chart", get(views::fragment_chart))
        .route("/styles.css", get(views::styles))
        .route("/series", get(series))
        .route("/visibility", post(visibility))
        .with_state(state)
}

#[derive(Deserialize)]
pub struct VisibilityRequest {
    visible: bool,
}

#[derive(Serialize)]
pub struct VisibilityResponse {
    visible: bool,
}

pub async fn visibility(
    State(state): State<Arc<AppState>>,
    Json(data): Json<VisibilityRequest>,
) -> Json<VisibilityResponse> {
    debug!(visible = data.visible, "Visibility changed");
    state.visibility.set(data.visible);
    Json(VisibilityResponse {
        visible: state.visibility.is_visible(),
    })
}

/// The points as the chart holds them, including updates not yet drawn.
pub async fn series(State(state): State<Arc<AppState>>) -> Json<Series> {
    Json(state.chart().points.clone())
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use volume::visibility::VisibilityNotifier;
    use volume::{Presentation, RenderSink, StyleConfig};

    use super::*;
    use crate::sink::SvgSink;

    fn app() -> (Router, Arc<AppState>, tokio::sync::watch::Receiver<bool>) {
        let (notifier, rx) = VisibilityNotifier::new();
        let state = Arc::new(AppState::new(notifier, 700));
        (router(Arc::clone(&state)), state, rx)
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn visibility_post_reaches_the_session_channel() {
        let (app, _state, mut rx) = app();
        let request = Request::post("/visibility")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"visible":false}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(rx.has_changed().unwrap());
        assert!(!*rx.borrow_and_update());
        assert_eq!(body_string(response).await, r#"{"visible":false}"#);
    }

    #[tokio::test]
    async fn chart_svg_is_missing_until_first_render() {
        let (app, state, _rx) = app();
        let response = app
            .clone()
            .oneshot(Request::get("/chart.svg").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let mut sink = SvgSink::new(Arc::clone(&state.chart));
        let series = Series {
            labels: vec!["3:00".to_owned()],
            counts: vec![2],
        };
        sink.render(&series, &StyleConfig::from(&Presentation::default()));

        let response = app
            .oneshot(Request::get("/chart.svg").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "image/svg+xml"
        );
        assert!(body_string(response).await.contains("3:00: 2"));
    }

    #[tokio::test]
    async fn series_reports_undrawn_updates() {
        let (app, state, _rx) = app();
        let mut sink = SvgSink::new(Arc::clone(&state.chart));
        let series = Series {
            labels: vec!["3:00".to_owned(), "4:00".to_owned()],
            counts: vec![2, 0],
        };
        sink.render(&series, &StyleConfig::from(&Presentation::default()));
        sink.update_point(1, 5);

        let response = app
            .oneshot(Request::get("/series").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["counts"], serde_json::json!([2, 5]));
        assert_eq!(body["labels"][1], "4:00");
    }

    #[tokio::test]
    async fn failure_replaces_the_chart() {
        let (app, state, _rx) = app();
        state.fail("Unable to retrieve data, target URL is not specified.".to_owned());
        let response = app
            .oneshot(Request::get("/fragments/chart").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(body_string(response).await.contains("target URL is not specified"));
    }
}
