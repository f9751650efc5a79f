//! Request builder
//!
//! Invalid input (a bad URL, header name or value) is recorded when it is
//! set and reported by [`RequestBuilder::send`], so calls chain without
//! intermediate `Result`s.

pub mod body;
pub mod core;
pub mod headers;
pub mod methods;

pub use self::core::RequestBuilder;
pub use headers::ContentType;
