use crate::controller::{health_check_controller, sample_controller, stream_controller};
use axum::{routing::get, Router};
use service::AppState;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Event Stream API"
        ),
        paths(
            health_check_controller::health_check,
            sample_controller::index,
            stream_controller::counter,
            stream_controller::test,
            stream_controller::postman,
        ),
        components(
            schemas(
                health_check_controller::HealthStatus,
            )
        ),
        tags(
            (name = "event_stream", description = "Server-sent event streams")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes(app_state.clone()))
        .merge(sample_routes())
        .merge(stream_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check_controller::health_check))
        .with_state(app_state)
}

fn sample_routes() -> Router {
    Router::new().route("/", get(sample_controller::index))
}

/// Every stream endpoint runs the same session; only the profile differs.
fn stream_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/stream", get(stream_controller::counter))
        .route("/stream/test", get(stream_controller::test))
        .route("/stream/postman", get(stream_controller::postman))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, Bytes};
    use axum::http::{header, Request, StatusCode};
    use clap::Parser;
    use http_body_util::BodyExt;
    use service::config::Config;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    fn app_state(args: &[&str]) -> AppState {
        let config =
            Config::parse_from(std::iter::once("web").chain(args.iter().copied()));
        AppState::new(config, CancellationToken::new())
    }

    async fn get(app: Router, uri: &str) -> axum::response::Response {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        app.oneshot(request).await.unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes: Bytes = tokio::time::timeout(
            Duration::from_secs(5),
            response.into_body().collect(),
        )
        .await
        .expect("stream did not end")
        .unwrap()
        .to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_bounded_test_stream_emits_full_sequence() {
        let state = app_state(&["--test-max-events", "3", "--test-interval-ms", "0"]);
        let response = get(define_routes(state), "/stream/test").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream; charset=utf-8"
        );
        assert_eq!(
            body_text(response).await,
            ": heartbeat\n\n\
             data: Connected to SSE stream\n\n\
             data: Message number: 1\n\n\
             data: Message number: 2\n\n\
             data: Message number: 3\n\n\
             data: Stream ended\n\n"
        );
    }

    #[tokio::test]
    async fn test_postman_stream_sends_json_padding_and_strict_headers() {
        let state = app_state(&[
            "--postman-max-events",
            "2",
            "--postman-interval-ms",
            "0",
            "--postman-padding-len",
            "5",
        ]);
        let response = get(define_routes(state), "/stream/postman").await;

        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "no-cache, no-store, must-revalidate, private"
        );
        assert_eq!(response.headers()[header::CONTENT_ENCODING], "identity");

        let text = body_text(response).await;
        let frames: Vec<&str> = text.split_terminator("\n\n").collect();
        assert_eq!(
            &frames[..4],
            &[
                "data: Starting SSE stream...",
                "data: This is designed for Postman",
                "data: Connection established",
                "data: Ready to stream data",
            ]
        );

        let message: serde_json::Value =
            serde_json::from_str(frames[4].strip_prefix("data: ").unwrap()).unwrap();
        assert_eq!(message["message"], "Counter: 1");
        assert!(message["timestamp"].is_string());
        assert_eq!(frames[5], "data: .....");
        assert_eq!(frames[7], "data: .....");
        assert_eq!(frames.last(), Some(&"data: Stream completed!"));
        assert_eq!(frames.len(), 9);
    }

    #[tokio::test]
    async fn test_counter_stream_starts_with_heartbeat_then_counts_from_start() {
        let state = app_state(&["--counter-start", "18", "--counter-interval-ms", "0"]);
        let manager = state.sse_manager.clone();
        let response = get(define_routes(state), "/stream").await;

        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "no-cache, no-store, must-revalidate"
        );
        let mut body = response.into_body();
        let mut received = Vec::new();
        while !received.ends_with(b"data: 19\n\n") {
            let frame = body.frame().await.unwrap().unwrap();
            received.extend_from_slice(&frame.into_data().unwrap());
        }
        assert_eq!(received, b": heartbeat\n\ndata: 18\n\ndata: 19\n\n");
        assert_eq!(manager.registry().count_for("counter"), 1);

        drop(body);
        for _ in 0..100 {
            if manager.registry().is_empty() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("counter stream kept running after the client went away");
    }

    #[tokio::test]
    async fn test_health_reports_open_streams() {
        let state = app_state(&["--counter-interval-ms", "60000"]);
        let app = define_routes(state);

        let stream = get(app.clone(), "/stream").await;
        let response = get(app, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let health: serde_json::Value =
            serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(health["status_code"], 200);
        assert_eq!(health["data"]["status"], "healthy");
        assert_eq!(health["data"]["active_streams"], 1);
        assert_eq!(health["data"]["streams"]["counter"], 1);
        drop(stream);
    }

    #[tokio::test]
    async fn test_sample_route_returns_ten_chunks() {
        let response = get(define_routes(app_state(&[])), "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "some fake video bytes".repeat(10));
    }
}
