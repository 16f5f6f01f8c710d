//! Omogen client translation layer
//!
//! Maps object-oriented CRUD and query operations onto the Omogen remote
//! object store. Reads travel in the JSON-like "API" format, writes, deletes
//! and uploads in the positional line-based "PDA" format. This crate builds
//! the query strings (including the nested relation-expansion grammar),
//! decodes both response encodings into uniform envelopes, converts between
//! local and remote field names and materializes typed entities.

pub mod auth;
pub mod client;
pub mod config;
pub mod constants;
pub mod descriptor;
pub mod entity;
pub mod error;
pub mod query;
pub mod registry;
pub mod relations;
pub mod response;
pub mod schema;
pub mod transport;
pub mod value;

pub use auth::{LoginResponse, prepare_user_id};
pub use client::OmogenClient;
pub use config::{OmogenConfig, OmogenConfigBuilder};
pub use descriptor::{ConversionTable, ConvertedAttributes, EntityDescriptor, OperationKind};
pub use entity::Entity;
pub use error::{OmogenError, Result};
pub use query::{DocumentFile, Format, Method, QueryBuilder, QueryRequest, RequestOptions};
pub use registry::TypeRegistry;
pub use relations::RelationTree;
pub use response::{ApiResponse, PdaResponse, PdaStatus};
pub use schema::Schema;
pub use transport::{
    HttpMethod, HttpRequest, HttpResponse, MultipartPart, RequestBody, ReqwestTransport, Transport,
};
pub use value::{Record, Value};
