#![allow(clippy::module_inception)]
pub mod middleware;
pub mod panic_recovery_middleware;
pub mod request_id_middleware;
pub mod tracing_middleware;

pub use middleware::{Middleware, compose};
pub use panic_recovery_middleware::PanicRecoveryMiddleware;
pub use request_id_middleware::{REQUEST_ID_HEADER, RequestId};
pub use tracing_middleware::TracingMiddleware;
