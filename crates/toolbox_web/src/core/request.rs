use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, Uri};

#[derive(Debug)]
pub struct Request {
    pub inner: http::Request<Bytes>,
    /// Path parameters captured by the router.
    pub params: HashMap<String, String>,
}

impl Request {
    /// Build a request for `path`.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid URI. Use [`Request::try_new`] for
    /// paths read off the wire.
    pub fn new<S: AsRef<str>>(method: Method, path: S) -> Self {
        Self::try_new(method, path).expect("valid request uri")
    }

    pub fn try_new<S: AsRef<str>>(method: Method, path: S) -> Result<Self, http::Error> {
        let inner = http::Request::builder()
            .method(method)
            .uri(path.as_ref())
            .body(Bytes::new())?;
        Ok(Self {
            inner,
            params: HashMap::new(),
        })
    }

    pub fn header<K, V>(mut self, k: K, v: V) -> Self
    where
        K: TryInto<http::HeaderName>,
        V: TryInto<HeaderValue>,
    {
        if let (Ok(key), Ok(value)) = (k.try_into(), v.try_into()) {
            self.inner.headers_mut().append(key, value);
        }
        self
    }

    pub fn with_body<B: Into<Bytes>>(mut self, body: B) -> Self {
        *self.inner.body_mut() = body.into();
        self
    }

    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    pub fn path(&self) -> &str {
        self.inner.uri().path()
    }

    pub fn headers(&self) -> &HeaderMap<HeaderValue> {
        self.inner.headers()
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap<HeaderValue> {
        self.inner.headers_mut()
    }

    pub fn body(&self) -> &Bytes {
        self.inner.body()
    }

    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|s| s.as_str())
    }
}
