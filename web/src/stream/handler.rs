use super::headers::{stream_headers, HeaderPolicy};
use axum::body::Body;
use axum::response::Response;
use futures::StreamExt;
use log::*;
use sse::{EventStream, Manager, StreamConfig};
use std::convert::Infallible;
use std::sync::Arc;

/// Opens a session for `profile` and wraps its frames in a chunked response.
///
/// The response body owns the session's stream. When the client goes away
/// hyper drops the body, which cancels the session.
pub(crate) fn open_stream(
    manager: &Manager,
    profile: &Arc<StreamConfig>,
    policy: HeaderPolicy,
) -> Result<Response, sse::Error> {
    let stream = manager.open(Arc::clone(profile))?;
    debug!(
        "Streaming {} to connection {}",
        profile.name,
        stream.connection_id()
    );

    Ok(into_response(stream, policy))
}

fn into_response(stream: EventStream, policy: HeaderPolicy) -> Response {
    let frames = stream.frames().map(|frame| Ok::<_, Infallible>(frame.into_bytes()));
    let body = Body::from_stream(frames);

    let mut response = Response::new(body);
    *response.headers_mut() = stream_headers(policy);
    response
}
