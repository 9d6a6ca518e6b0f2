//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the care API port and domain services, and remain testable
//! without I/O.

use std::sync::Arc;

use crate::domain::ports::CareApi;
use crate::domain::{SelectionTracker, UserAggregator};

/// Default cap on profile image uploads.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub care_api: Arc<dyn CareApi>,
    pub aggregator: UserAggregator,
    pub selections: Arc<SelectionTracker>,
    pub max_upload_bytes: usize,
}

impl HttpState {
    /// Construct state over a care API implementation.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use guardian_vision::domain::ports::FixtureCareApi;
    /// use guardian_vision::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(Arc::new(FixtureCareApi));
    /// assert_eq!(state.max_upload_bytes, 5 * 1024 * 1024);
    /// ```
    pub fn new(care_api: Arc<dyn CareApi>) -> Self {
        Self {
            aggregator: UserAggregator::new(care_api.clone()),
            care_api,
            selections: Arc::new(SelectionTracker::new()),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Override the profile image size cap.
    #[must_use]
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
