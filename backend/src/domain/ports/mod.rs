//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod care_api;

#[cfg(test)]
pub use care_api::MockCareApi;
pub use care_api::{CareApi, CareApiError, FIXTURE_PASSWORD, FixtureCareApi};
