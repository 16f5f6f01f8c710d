//! Query building
//!
//! A [`QueryRequest`] holds the mutable per-call state (method, format,
//! query fragment and options). A [`QueryBuilder`] owns one request and is
//! consumed by its terminal operation, so no state survives from one call
//! to the next.

pub mod builder;
pub mod document;
pub mod request;

pub use builder::QueryBuilder;
pub use document::DocumentFile;
pub use request::{Format, Method, QueryRequest, RequestOptions};
