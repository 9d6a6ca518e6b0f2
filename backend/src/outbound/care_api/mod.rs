//! Care REST API outbound adapter.
//!
//! This module provides the HTTP implementation of the `CareApi` port.

mod dto;
mod http_client;

pub use http_client::CareApiHttpClient;
