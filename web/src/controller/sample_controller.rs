use axum::body::{Body, Bytes};
use axum::response::IntoResponse;
use std::convert::Infallible;

const SAMPLE_CHUNK: &[u8] = b"some fake video bytes";
const SAMPLE_CHUNKS: usize = 10;

/// GET a plain chunked body
///
/// Ten identical chunks with no event framing, for checking that chunked
/// transfer works end to end.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Chunked sample body", content_type = "application/octet-stream")
    )
)]
pub async fn index() -> impl IntoResponse {
    let chunks = std::iter::repeat(Bytes::from_static(SAMPLE_CHUNK))
        .take(SAMPLE_CHUNKS)
        .map(Ok::<_, Infallible>);
    Body::from_stream(futures::stream::iter(chunks))
}
