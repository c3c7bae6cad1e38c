pub mod request;
pub mod response;
pub(crate) mod router;

pub use http::Method;
pub use request::Request;
pub use response::Response;
pub use router::{Handler, Router};
