//! HTML pages and the routes that serve them.
//!
//! Pages are composed with `std::fmt::Write`; a formatting failure surfaces
//! as [`RenderError`] and is answered with a 500.

mod handlers;
pub mod ids;
pub mod layout;

pub use handlers::{DecodeIdHandler, IdsPageHandler, IndexHandler, NewIdHandler};

use std::sync::Arc;

use http::StatusCode;

use crate::core::Router;
use crate::error::ResponseError;
use crate::id::IdGenerator;

pub const INDEX_PATH: &str = "/";
pub const IDS_PATH: &str = "/ids";
pub const NEW_ID_PATH: &str = "/api/ids/new";
pub const DECODE_ID_PATH: &str = "/api/ids/decode/{id}";

#[derive(Debug, thiserror::Error)]
#[error("failed to render {page} page")]
pub struct RenderError {
    page: &'static str,
    #[source]
    source: std::fmt::Error,
}

impl RenderError {
    pub fn new(page: &'static str, source: std::fmt::Error) -> Self {
        Self { page, source }
    }
}

impl ResponseError for RenderError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Routing table for the toolbox pages.
pub fn routes(generator: Arc<IdGenerator>) -> Router {
    let mut router = Router::new();
    router.get(INDEX_PATH, IndexHandler::new());
    router.get(IDS_PATH, IdsPageHandler::new());
    router.post(NEW_ID_PATH, NewIdHandler::new(generator));
    router.get(DECODE_ID_PATH, DecodeIdHandler::new());
    router
}
