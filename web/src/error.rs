use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(sse::Error);

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.0)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{}", self.0)
    }
}

// Every streaming-core error is a server-side configuration bug, never
// something the client can fix.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("Refusing to open stream: {}", self.0);
        match self.0 {
            sse::Error::Configuration(_)
            | sse::Error::Encoding(_)
            | sse::Error::CounterOverflow { .. }
            | sse::Error::Aborted(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
            }
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<sse::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_map_to_internal_server_error() {
        let error = Error::from(sse::Error::Configuration("increment".to_string()));
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_display_forwards_the_core_message() {
        let error = Error::from(sse::Error::CounterOverflow { value: 7 });
        assert_eq!(error.to_string(), "Stream counter overflowed after value 7");
    }
}
