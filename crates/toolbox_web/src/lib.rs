pub mod config;
pub mod core;
pub mod error;
pub mod id;
pub mod middleware;
pub mod pages;

// Re-export commonly used types at the crate root
pub use config::ServerConfig;
pub use crate::core::*;
pub use error::{ResponseError, WebError};
pub use http::StatusCode;
pub use id::{DecodedId, Id, IdError, IdGenerator};
pub use middleware::*;

use async_trait::async_trait;
use bytes::Bytes;
use http::Response as HttpResponse;
use pingora::protocols::http::ServerSession;
use pingora::server::ShutdownWatch;
use pingora_core::apps::{HttpPersistentSettings, HttpServerApp, HttpServerOptions, ReusedHttpStream};
use pingora_core::services::listening::Service;
use pingora_http::ResponseHeader;
use std::collections::HashMap;
use std::sync::Arc;

/// The main application: holds router and middleware.
pub struct App {
    router: Router,
    middlewares: Vec<Arc<dyn Middleware>>,
    keepalive_secs: u64,
}

/// Default 404 handler
struct NotFoundHandler;

#[async_trait]
impl Handler for NotFoundHandler {
    async fn handle(&self, req: Request) -> Result<Response, WebError> {
        Err(error::not_found(format!("no route for {}", req.path())))
    }
}

/// 405 for a known path requested with the wrong method, 204 for OPTIONS.
struct MethodMismatchHandler {
    allowed: Vec<String>,
}

#[async_trait]
impl Handler for MethodMismatchHandler {
    async fn handle(&self, req: Request) -> Result<Response, WebError> {
        let allow = self.allowed.join(", ");
        if *req.method() == Method::OPTIONS {
            return Ok(Response::empty(StatusCode::NO_CONTENT).header(http::header::ALLOW, allow));
        }
        Ok(Response::text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
            .header(http::header::ALLOW, allow))
    }
}

/// Toolbox application: page routes wrapped in panic recovery, a tracing
/// span and request ids, all sharing `generator`.
pub fn build_app(generator: Arc<IdGenerator>) -> App {
    let mut app = App::new(pages::routes(Arc::clone(&generator)));
    // last registered runs first
    app.use_middleware(PanicRecoveryMiddleware::new());
    app.use_middleware(TracingMiddleware::new());
    app.use_middleware(RequestId::new(generator));
    app
}

impl App {
    pub fn new(router: Router) -> Self {
        Self {
            router,
            middlewares: Vec::new(),
            keepalive_secs: ServerConfig::default().keepalive_secs,
        }
    }

    pub fn use_middleware<M: Middleware + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Arc::new(middleware));
    }

    /// Wrap the app in a pingora listening service bound per `config`.
    pub fn into_service(mut self, config: &ServerConfig) -> Service<App> {
        self.keepalive_secs = config.keepalive_secs;
        let mut service = Service::new(config.service_name.clone(), self);
        service.add_tcp(&config.listen_addr);
        service
    }

    /// Handle a request end-to-end through middlewares and the router.
    pub async fn handle(&self, req: Request) -> Response {
        let is_head = *req.method() == Method::HEAD;
        let (handler, params): (Arc<dyn Handler>, HashMap<String, String>) =
            match self.router.find(req.method(), req.path()) {
                Some(found) => found,
                None => (self.fallback(&req), HashMap::new()),
            };

        let entry = compose(&self.middlewares, handler);
        let response = entry
            .handle(req.with_params(params))
            .await
            .unwrap_or_else(WebError::into_response);

        let mut response = self.finalize(response);
        if is_head {
            // content-length still describes the GET body
            response.body = Bytes::new();
        }
        response
    }

    /// Handler for requests with no route: method mismatch when the path is
    /// known under other methods (or the request is OPTIONS), 404 otherwise.
    fn fallback(&self, req: &Request) -> Arc<dyn Handler> {
        let mut allowed = self.router.allowed_methods(req.path());
        if *req.method() == Method::OPTIONS {
            allowed.push(Method::OPTIONS.to_string());
            allowed.sort();
            allowed.dedup();
        }
        if allowed.is_empty() {
            return Arc::new(NotFoundHandler);
        }
        Arc::new(MethodMismatchHandler { allowed })
    }

    /// Set content-length unless the handler already did.
    fn finalize(&self, mut response: Response) -> Response {
        if !response.headers.contains_key(http::header::CONTENT_LENGTH) {
            response
                .headers
                .insert(http::header::CONTENT_LENGTH, response.body.len().into());
        }
        response
    }
}

#[async_trait]
impl HttpServerApp for App {
    async fn process_new_http(
        self: &Arc<Self>,
        mut http: ServerSession,
        shutdown: &ShutdownWatch,
    ) -> Option<ReusedHttpStream> {
        match http.read_request().await {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                tracing::debug!(error = %e, "failed to read request header");
                return None;
            }
        }
        if *shutdown.borrow() {
            http.set_keepalive(None);
        } else {
            http.set_keepalive(Some(self.keepalive_secs));
        }

        let (req, is_head) = {
            let reqh = http.req_header();
            let path = String::from_utf8_lossy(reqh.raw_path()).to_string();
            let req = Request::try_new(reqh.method.clone(), &path).map(|mut req| {
                for (name, value) in reqh.headers.iter() {
                    req = req.header(name.clone(), value.clone());
                }
                req
            });
            (req.map_err(|e| (e, path)), reqh.method == Method::HEAD)
        };
        let mut req = match req {
            Ok(req) => req,
            Err((e, path)) => {
                tracing::warn!(error = %e, path = %path, "rejecting request with invalid uri");
                let _ = http.respond_error(400).await;
                return None;
            }
        };

        // Read request body only when hinted by headers
        if !is_head {
            let has_te = req.headers().contains_key(http::header::TRANSFER_ENCODING);
            let has_len = req
                .headers()
                .get(http::header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(0)
                > 0;
            if has_te || has_len {
                match http.read_request_body().await {
                    Ok(Some(bytes)) => req = req.with_body(bytes),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::debug!(error = %e, "failed to read request body");
                        return None;
                    }
                }
            }
        }

        let res = self.handle(req).await;

        let mut builder = HttpResponse::builder().status(res.status);
        for (k, v) in res.headers.iter() {
            builder = builder.header(k, v);
        }
        let parts = match builder.body(()) {
            Ok(r) => r.into_parts().0,
            Err(e) => {
                tracing::error!(error = %e, "failed to build response header");
                return None;
            }
        };
        let resp_header: ResponseHeader = parts.into();
        if let Err(e) = http.write_response_header(Box::new(resp_header)).await {
            tracing::error!(error = %e, "failed to write response header");
            return None;
        }

        if !is_head
            && let Err(e) = http.write_response_body(res.body, true).await
        {
            tracing::error!(error = %e, "failed to write response body");
            return None;
        }

        let persistent_settings = HttpPersistentSettings::for_session(&http);
        match http.finish().await {
            Ok(c) => c.map(|s| ReusedHttpStream::new(s, Some(persistent_settings))),
            Err(e) => {
                tracing::debug!(error = %e, "failed to finish session");
                None
            }
        }
    }

    fn h2_options(&self) -> Option<pingora::protocols::http::v2::server::H2Options> {
        None
    }

    fn server_options(&self) -> Option<&HttpServerOptions> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{ENCODED_LEN, FixedClock};

    fn app() -> App {
        build_app(Arc::new(IdGenerator::new()))
    }

    fn header<'a>(res: &'a Response, name: impl http::header::AsHeaderName) -> Option<&'a str> {
        res.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn generated_id(res: &Response) -> String {
        let body = res.body_text();
        let marker = r#"id="generatedIDValue" type="text" disabled value=""#;
        let start = body.find(marker).expect("id input present") + marker.len();
        body[start..start + ENCODED_LEN].to_string()
    }

    #[tokio::test]
    async fn landing_page_has_title() {
        let res = app().handle(Request::new(Method::GET, "/")).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(header(&res, http::header::CONTENT_TYPE), Some("text/html; charset=utf-8"));
        let body = res.body_text();
        assert!(body.contains("<title>Home</title>"));
        assert!(body.contains("<h1>Tools</h1>"));
    }

    #[tokio::test]
    async fn ids_page_offers_scheme_selection() {
        let res = app().handle(Request::new(Method::GET, "/ids")).await;
        assert_eq!(res.status, StatusCode::OK);
        let body = res.body_text();
        assert!(body.contains("<h1>IDs</h1>"));
        assert!(body.contains(r#"<option value="xid">xid</option>"#));
    }

    #[tokio::test]
    async fn new_id_renders_all_fields() {
        let generator = Arc::new(
            IdGenerator::builder()
                .clock(Arc::new(FixedClock::from_unix(1_300_816_219)))
                .machine([0x60, 0xf4, 0x86])
                .pid(0xe428)
                .counter_seed(0x412dc9)
                .build(),
        );
        let app = build_app(generator);

        // client-supplied request id keeps the generator's counter for the handler
        let req = Request::new(Method::POST, "/api/ids/new").header(REQUEST_ID_HEADER, "t-1");
        let res = app.handle(req).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(header(&res, REQUEST_ID_HEADER), Some("t-1"));
        let body = res.body_text();
        assert!(body.contains(r#"value="9m4e2mr0ui3e8a215n4g""#));
        assert!(body.contains(r#"value="2011-03-22 17:50:19 UTC""#));
        assert!(body.contains(r#"value="YPSG""#));
        assert!(body.contains(r#"value="58408""#));
        assert!(body.contains(r#"value="4271561""#));
    }

    #[tokio::test]
    async fn concurrent_new_ids_are_distinct() {
        let app = app();
        let (a, b) = tokio::join!(
            app.handle(Request::new(Method::POST, "/api/ids/new")),
            app.handle(Request::new(Method::POST, "/api/ids/new")),
        );
        assert_eq!(a.status, StatusCode::OK);
        assert_eq!(b.status, StatusCode::OK);

        let (a, b) = (generated_id(&a), generated_id(&b));
        assert_ne!(a, b);
        assert!(a.parse::<Id>().is_ok());
        assert!(b.parse::<Id>().is_ok());
    }

    #[tokio::test]
    async fn concurrent_new_ids_across_tasks() {
        let app = Arc::new(app());
        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let app = Arc::clone(&app);
                tokio::spawn(async move {
                    let res = app.handle(Request::new(Method::POST, "/api/ids/new")).await;
                    assert_eq!(res.status, StatusCode::OK);
                    generated_id(&res)
                })
            })
            .collect();

        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.expect("no panic"));
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 16);
    }

    #[tokio::test]
    async fn decode_route_accepts_canonical_ids() {
        let res = app()
            .handle(Request::new(Method::GET, "/api/ids/decode/9m4e2mr0ui3e8a215n4g"))
            .await;
        assert_eq!(res.status, StatusCode::OK);
        assert!(res.body_text().contains(r#"value="YPSG""#));
    }

    #[tokio::test]
    async fn decode_route_rejects_malformed_ids() {
        let res = app().handle(Request::new(Method::GET, "/api/ids/decode/nope")).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(header(&res, http::header::CONTENT_TYPE), Some("application/json"));
        let body: serde_json::Value = serde_json::from_slice(&res.body).unwrap();
        assert!(body["error"].as_str().unwrap().starts_with("malformed identifier"));
        assert!(res.headers.contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn every_response_has_request_id_and_length() {
        let res = app().handle(Request::new(Method::GET, "/ids")).await;
        let request_id = header(&res, REQUEST_ID_HEADER).expect("request id");
        assert!(request_id.parse::<Id>().is_ok());
        assert_eq!(
            header(&res, http::header::CONTENT_LENGTH),
            Some(res.body.len().to_string().as_str())
        );
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let res = app().handle(Request::new(Method::GET, "/missing")).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert!(res.headers.contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn get_on_new_id_path_is_405() {
        let res = app().handle(Request::new(Method::GET, "/api/ids/new")).await;
        assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(header(&res, http::header::ALLOW), Some("POST"));
    }

    #[tokio::test]
    async fn wrong_method_is_405_with_allow() {
        let res = app().handle(Request::new(Method::POST, "/")).await;
        assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(header(&res, http::header::ALLOW), Some("GET"));
        let request_id = header(&res, REQUEST_ID_HEADER).expect("request id");
        assert!(request_id.parse::<Id>().is_ok());
    }

    #[tokio::test]
    async fn options_lists_methods() {
        let res = app()
            .handle(Request::new(Method::OPTIONS, "/api/ids/new"))
            .await;
        assert_eq!(res.status, StatusCode::NO_CONTENT);
        assert_eq!(header(&res, http::header::ALLOW), Some("OPTIONS, POST"));
        assert_eq!(header(&res, http::header::CONTENT_LENGTH), Some("0"));
        assert!(res.headers.contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn head_uses_get_route_without_body() {
        let app = app();
        let get = app.handle(Request::new(Method::GET, "/")).await;
        let head = app.handle(Request::new(Method::HEAD, "/")).await;
        assert_eq!(head.status, StatusCode::OK);
        assert!(head.body.is_empty());
        assert_eq!(
            header(&head, http::header::CONTENT_LENGTH),
            Some(get.body.len().to_string().as_str())
        );
        assert!(head.headers.contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn panicking_handler_returns_500() {
        let mut router = Router::new();
        router.get_fn("/boom", |_req| panic!("boom"));
        let mut app = App::new(router);
        app.use_middleware(PanicRecoveryMiddleware::new());

        let res = app.handle(Request::new(Method::GET, "/boom")).await;
        assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn app_respects_manual_content_length() {
        let mut router = Router::new();
        router.get_fn("/manual", |_req| {
            Ok(Response::text(StatusCode::OK, "hello").header("content-length", "999"))
        });
        let app = App::new(router);

        let res = app.handle(Request::new(Method::GET, "/manual")).await;
        assert_eq!(header(&res, http::header::CONTENT_LENGTH), Some("999"));
    }
}
