//! Correlation identifier shared by the request span, the `trace-id`
//! response header and every error payload produced while serving a request.
//!
//! The value sits in tokio task-local storage. Spawned tasks do not inherit
//! it; re-enter with [`TraceId::scope`] when work leaves the request task.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use uuid::Uuid;

tokio::task_local! {
    static CURRENT: TraceId;
}

/// UUID naming one inbound request.
///
/// # Examples
/// ```
/// use guardian_vision::TraceId;
///
/// let parsed: TraceId = "6f1c3c52-8d8e-4a57-9a53-0c1d2e3f4a5b".parse().unwrap();
/// assert_eq!(parsed.to_string(), "6f1c3c52-8d8e-4a57-9a53-0c1d2e3f4a5b");
/// assert!(TraceId::current().is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Identifier of the request being served on this task.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Drive `fut` with `self` as the current identifier.
    pub async fn scope<F: Future>(self, fut: F) -> F::Output {
        CURRENT.scope(self, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
