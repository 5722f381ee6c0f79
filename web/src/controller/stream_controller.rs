use crate::stream::handler::open_stream;
use crate::stream::headers::HeaderPolicy;
use crate::Error;
use axum::extract::State;
use axum::response::Response;
use service::AppState;

/// GET an open-ended counter stream
///
/// Sends a heartbeat comment (unless disabled), then one bare counter value
/// per interval until the client disconnects or the server shuts down.
#[utoipa::path(
    get,
    path = "/stream",
    responses(
        (status = 200, description = "Open-ended event stream", content_type = "text/event-stream"),
        (status = 500, description = "Stream profile is misconfigured")
    )
)]
pub async fn counter(State(app_state): State<AppState>) -> Result<Response, Error> {
    Ok(open_stream(
        &app_state.sse_manager,
        &app_state.profiles.counter,
        HeaderPolicy::Standard,
    )?)
}

/// GET a bounded test stream
///
/// Greets the client, sends a fixed number of numbered messages and ends with
/// a `Stream ended` notice.
#[utoipa::path(
    get,
    path = "/stream/test",
    responses(
        (status = 200, description = "Bounded event stream", content_type = "text/event-stream"),
        (status = 500, description = "Stream profile is misconfigured")
    )
)]
pub async fn test(State(app_state): State<AppState>) -> Result<Response, Error> {
    Ok(open_stream(
        &app_state.sse_manager,
        &app_state.profiles.test,
        HeaderPolicy::Standard,
    )?)
}

/// GET a bounded JSON stream for buffering clients
///
/// Like `/stream/test` but with JSON payloads, filler frames after every
/// message and stricter caching headers, so tools such as Postman render
/// events as they arrive.
#[utoipa::path(
    get,
    path = "/stream/postman",
    responses(
        (status = 200, description = "Bounded JSON event stream", content_type = "text/event-stream"),
        (status = 500, description = "Stream profile is misconfigured")
    )
)]
pub async fn postman(State(app_state): State<AppState>) -> Result<Response, Error> {
    Ok(open_stream(
        &app_state.sse_manager,
        &app_state.profiles.postman,
        HeaderPolicy::Strict,
    )?)
}
