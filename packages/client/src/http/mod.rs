//! HTTP/1.1 message heads

pub mod headers;
pub mod request;
pub mod response;

pub use headers::HeaderCollection;
pub use request::RequestHead;
pub use response::ResponseHead;
