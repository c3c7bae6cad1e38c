use bytes::Bytes;
use http::{HeaderMap, HeaderValue, StatusCode};

/// Fully buffered HTTP response. Pages and fragments are small, so the body
/// is always held in memory.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Construct an empty response with given status. Does not set content-type.
    pub fn empty(status: StatusCode) -> Self {
        Self::new(status)
    }

    pub fn text<S: Into<String>>(status: StatusCode, body: S) -> Self {
        Self::with_content_type(status, "text/plain; charset=utf-8", body.into())
    }

    /// Construct an HTML response with UTF-8 charset.
    pub fn html<S: Into<String>>(status: StatusCode, body: S) -> Self {
        Self::with_content_type(status, "text/html; charset=utf-8", body.into())
    }

    /// Construct a JSON response from any serializable value.
    pub fn json(status: StatusCode, value: impl serde::Serialize) -> Self {
        match serde_json::to_vec(&value) {
            Ok(bytes) => Self::with_content_type(status, "application/json", bytes),
            Err(err) => {
                tracing::error!(error = %err, "failed to serialize json body");
                let mut res = Self::new(StatusCode::INTERNAL_SERVER_ERROR);
                res.headers.insert(
                    http::header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                res
            }
        }
    }

    fn with_content_type(status: StatusCode, ct: &'static str, body: impl Into<Bytes>) -> Self {
        let mut res = Self::new(status);
        res.headers
            .insert(http::header::CONTENT_TYPE, HeaderValue::from_static(ct));
        res.body = body.into();
        res
    }

    pub fn set_header<K, V>(&mut self, k: K, v: V)
    where
        K: TryInto<http::HeaderName>,
        V: TryInto<HeaderValue>,
    {
        if let (Ok(key), Ok(value)) = (k.try_into(), v.try_into()) {
            self.headers.insert(key, value);
        }
    }

    pub fn header<K, V>(mut self, k: K, v: V) -> Self
    where
        K: TryInto<http::HeaderName>,
        V: TryInto<HeaderValue>,
    {
        self.set_header(k, v);
        self
    }

    /// Body as UTF-8 text, lossily.
    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
