//! Guardian Vision backend-for-frontend library.
//!
//! The [`domain`] owns roles, sessions, validation and dashboard aggregation;
//! [`inbound`] exposes them over HTTP and [`outbound`] reaches the care API.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
