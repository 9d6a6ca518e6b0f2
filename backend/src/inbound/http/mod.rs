//! HTTP inbound adapter exposing the dashboard REST endpoints.

pub mod admin;
pub mod auth;
pub mod caregiver;
pub mod error;
pub mod health;
pub mod legacy_cookies;
pub mod patient;
pub mod profile;
pub mod registrations;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
