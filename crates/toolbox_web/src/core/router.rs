use crate::core::{Method, Request, Response};
use crate::error::WebError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Process the request and return a response or error
    async fn handle(&self, req: Request) -> Result<Response, WebError>;
}

/// Wrapper for simple closure-based handlers that return Result
pub struct ResultClosure<F>
where
    F: Fn(Request) -> Result<Response, WebError> + Send + Sync + 'static,
{
    closure: F,
}

impl<F> ResultClosure<F>
where
    F: Fn(Request) -> Result<Response, WebError> + Send + Sync + 'static,
{
    pub fn new(closure: F) -> Self {
        Self { closure }
    }
}

#[async_trait]
impl<F> Handler for ResultClosure<F>
where
    F: Fn(Request) -> Result<Response, WebError> + Send + Sync + 'static,
{
    async fn handle(&self, req: Request) -> Result<Response, WebError> {
        (self.closure)(req)
    }
}

pub type RouteMatch = (Arc<dyn Handler>, HashMap<String, String>);

/// Method-keyed routing table backed by `matchit`.
#[derive(Default)]
pub struct Router {
    by_method: HashMap<Method, matchit::Router<Arc<dyn Handler>>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if `path` is not a valid pattern or conflicts with an existing
    /// route for the same method. Routes are fixed at startup.
    pub fn add<S: Into<String>>(&mut self, method: Method, path: S, handler: Arc<dyn Handler>) {
        let path = path.into();
        let table = self.by_method.entry(method.clone()).or_default();
        if let Err(err) = table.insert(path.clone(), handler) {
            panic!("invalid route {method} {path}: {err}");
        }
    }

    pub fn get<S: Into<String>>(&mut self, path: S, handler: Arc<dyn Handler>) {
        self.add(Method::GET, path, handler)
    }

    /// Add a GET route with a simple closure handler returning Result
    pub fn get_fn<S, F>(&mut self, path: S, handler: F)
    where
        S: Into<String>,
        F: Fn(Request) -> Result<Response, WebError> + Send + Sync + 'static,
    {
        self.add(Method::GET, path, Arc::new(ResultClosure::new(handler)))
    }

    pub fn post<S: Into<String>>(&mut self, path: S, handler: Arc<dyn Handler>) {
        self.add(Method::POST, path, handler)
    }

    pub fn find(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        if let Some(found) = self.lookup(method, path) {
            return Some(found);
        }

        // HEAD behaves like GET without a body unless routed explicitly
        if *method == Method::HEAD {
            return self.lookup(&Method::GET, path);
        }

        None
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let m = self.by_method.get(method)?.at(path).ok()?;
        let params = m
            .params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Some((Arc::clone(m.value), params))
    }

    /// Methods that have a route for `path`, sorted (for 405 / OPTIONS).
    pub fn allowed_methods(&self, path: &str) -> Vec<String> {
        let mut methods: Vec<String> = self
            .by_method
            .iter()
            .filter(|(_, r)| r.at(path).is_ok())
            .map(|(m, _)| m.as_str().to_string())
            .collect();
        methods.sort();
        methods
    }
}
