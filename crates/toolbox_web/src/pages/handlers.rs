use std::sync::Arc;

use async_trait::async_trait;
use http::StatusCode;

use super::ids;
use super::layout::Page;
use crate::core::{Handler, Request, Response};
use crate::error::{self, WebError};
use crate::id::{Id, IdGenerator};

pub struct IndexHandler;

impl IndexHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

#[async_trait]
impl Handler for IndexHandler {
    async fn handle(&self, _req: Request) -> Result<Response, WebError> {
        let html = Page {
            name: "index",
            title: "Home",
            body: "<h1>Tools</h1>",
        }
        .render()?;
        Ok(Response::html(StatusCode::OK, html))
    }
}

pub struct IdsPageHandler;

impl IdsPageHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

#[async_trait]
impl Handler for IdsPageHandler {
    async fn handle(&self, _req: Request) -> Result<Response, WebError> {
        let body = ids::ids_body()?;
        let html = Page {
            name: "ids",
            title: "IDs",
            body: &body,
        }
        .render()?;
        Ok(Response::html(StatusCode::OK, html))
    }
}

/// Mints a fresh id and answers with its decoded fields.
pub struct NewIdHandler {
    generator: Arc<IdGenerator>,
}

impl NewIdHandler {
    pub fn new(generator: Arc<IdGenerator>) -> Arc<Self> {
        Arc::new(Self { generator })
    }
}

#[async_trait]
impl Handler for NewIdHandler {
    async fn handle(&self, _req: Request) -> Result<Response, WebError> {
        let decoded = self.generator.generate().decode();
        tracing::debug!(id = %decoded.id, counter = decoded.counter, "generated id");
        Ok(Response::html(
            StatusCode::OK,
            ids::result_fragment(&decoded)?,
        ))
    }
}

/// Decodes an id given in the path, e.g. one copied from an earlier result.
pub struct DecodeIdHandler;

impl DecodeIdHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

#[async_trait]
impl Handler for DecodeIdHandler {
    async fn handle(&self, req: Request) -> Result<Response, WebError> {
        let raw = req
            .param("id")
            .ok_or_else(|| error::bad_request("missing id"))?;
        let id: Id = raw.parse()?;
        Ok(Response::html(
            StatusCode::OK,
            ids::result_fragment(&id.decode())?,
        ))
    }
}
