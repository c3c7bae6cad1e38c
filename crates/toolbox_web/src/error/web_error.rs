use super::ResponseError;
use crate::core::Response;
use crate::id::IdError;
use crate::pages::RenderError;

/// Error type returned by handlers and middleware.
///
/// Wraps any [`ResponseError`]. Request context such as the request id is
/// attached by the tracing span the error is logged in.
#[derive(Debug)]
pub struct WebError {
    inner: Box<dyn ResponseError>,
}

impl WebError {
    pub fn new<T: ResponseError + 'static>(err: T) -> Self {
        Self {
            inner: Box::new(err),
        }
    }

    pub fn status_code(&self) -> http::StatusCode {
        self.inner.status_code()
    }

    /// Log the error and convert it into an HTTP response.
    pub fn into_response(self) -> Response {
        let status = self.inner.status_code();
        if status.is_server_error() {
            tracing::error!(status_code = %status, error = %self.inner, "request failed");
        } else {
            tracing::warn!(status_code = %status, error = %self.inner, "request rejected");
        }

        self.inner.error_response()
    }
}

impl std::fmt::Display for WebError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl std::error::Error for WebError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl From<crate::error::SimpleError> for WebError {
    fn from(err: crate::error::SimpleError) -> Self {
        Self::new(err)
    }
}

impl From<IdError> for WebError {
    fn from(err: IdError) -> Self {
        Self::new(err)
    }
}

impl From<RenderError> for WebError {
    fn from(err: RenderError) -> Self {
        Self::new(err)
    }
}
