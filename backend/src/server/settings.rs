//! Application settings loaded via OrthoConfig.
//!
//! Every value can be set with a `GUARDIAN_*` environment variable, a
//! configuration file or a command-line flag.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use guardian_vision::inbound::http::state::DEFAULT_MAX_UPLOAD_BYTES;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_API_BASE_URL: &str = "http://localhost:8081/";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Process-level configuration for the BFF server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GUARDIAN")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Base URL of the care API.
    pub api_base_url: Option<String>,
    /// Per-request timeout towards the care API.
    pub request_timeout_secs: Option<u64>,
    /// Largest accepted profile image.
    pub max_upload_bytes: Option<usize>,
    /// Serve deterministic fixture data instead of calling the care API.
    #[ortho_config(default = false)]
    pub fixtures: bool,
}

impl AppSettings {
    /// Parse the configured bind address.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::ErrorKind::InvalidInput`] when the value is not a
    /// socket address.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|error| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid GUARDIAN_BIND_ADDR '{raw}': {error}"),
            )
        })
    }

    /// Parse the configured care API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::ErrorKind::InvalidInput`] when the value is not an
    /// absolute URL.
    pub fn api_base_url(&self) -> std::io::Result<Url> {
        let raw = self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL);
        Url::parse(raw).map_err(|error| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid GUARDIAN_API_BASE_URL '{raw}': {error}"),
            )
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }
}
