//! Librarium backend library.
//!
//! A book catalogue management service: bearer-token authentication plus
//! CRUD and bulk-import operations over a two-table relational schema,
//! speaking HTTP/JSON at the edge and SQL through Diesel underneath.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
/// Request-tracing middleware.
pub use middleware::trace::Trace;
