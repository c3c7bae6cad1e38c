use crate::{
    core::{Handler, Request, Response},
    error::WebError,
    id::IdGenerator,
    middleware::Middleware,
};
use http::HeaderValue;
use std::sync::Arc;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Tags every request and response with `x-request-id`.
///
/// A non-empty id sent by the client is kept; otherwise a fresh identifier
/// is minted from the shared [`IdGenerator`].
#[derive(Clone)]
pub struct RequestId {
    generator: Arc<IdGenerator>,
}

impl RequestId {
    pub fn new(generator: Arc<IdGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait::async_trait]
impl Middleware for RequestId {
    async fn handle(&self, mut req: Request, next: Arc<dyn Handler>) -> Result<Response, WebError> {
        let supplied = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .filter(|v| !v.is_empty())
            .cloned();
        let request_id = match supplied {
            Some(value) => value,
            None => {
                // canonical ids are always valid header values
                let value = HeaderValue::from_str(&self.generator.generate().to_string())
                    .map_err(crate::error::internal_error)?;
                req.headers_mut().insert(REQUEST_ID_HEADER, value.clone());
                value
            }
        };

        let mut res = next.handle(req).await?;
        if !res.headers.contains_key(REQUEST_ID_HEADER) {
            res.headers.insert(REQUEST_ID_HEADER, request_id);
        }
        Ok(res)
    }
}
