//! BookSwap backend library modules.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
/// Request-scoped trace identifier.
pub use domain::TraceId;
/// Tracing middleware for Actix apps.
pub use middleware::Trace;
