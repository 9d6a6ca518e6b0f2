//! Session identity and role resolution.
//!
//! Accounts carry a display identifier of the form `GV - <CODE> - <N>`, where
//! `<CODE>` is `AA`, `CC` or `PT`. Resolution is silent: anything that does not
//! yield a recognised identifier resolves to [`SessionState::Anonymous`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{LOGIN_ROUTE, RecordId, Role, UserKey};

/// Legacy cookie holding the display identifier.
pub const IDENTITY_COOKIE: &str = "username";
/// Legacy cookie holding the numeric record id.
pub const USER_ID_COOKIE: &str = "userId";

static IDENTIFIER_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn identifier_regex() -> Option<&'static Regex> {
    IDENTIFIER_RE
        .get_or_init(|| match Regex::new(r"GV - ([A-Z]{2})(?: - (\d+))?") {
            Ok(re) => Some(re),
            Err(error) => {
                tracing::error!(%error, "session identifier pattern failed to compile");
                None
            }
        })
        .as_ref()
}

/// Parsed `GV - <CODE> - <N>` identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionIdentifier {
    role: Role,
    sequence: Option<u64>,
}

impl SessionIdentifier {
    /// Locate an identifier anywhere in `raw` and classify its role code.
    ///
    /// # Examples
    /// ```
    /// use guardian_vision::domain::{Role, SessionIdentifier};
    ///
    /// let id = SessionIdentifier::parse("GV - CC - 12").expect("identifier");
    /// assert_eq!(id.role(), Role::Caregiver);
    /// assert_eq!(id.sequence(), Some(12));
    /// assert!(SessionIdentifier::parse("GV - ZZ - 1").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let captures = identifier_regex()?.captures(raw)?;
        let role = Role::from_code(captures.get(1)?.as_str())?;
        let sequence = captures.get(2).and_then(|m| m.as_str().parse().ok());
        Some(Self { role, sequence })
    }

    /// Role encoded by the identifier.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Trailing sequence number, when present.
    pub fn sequence(&self) -> Option<u64> {
        self.sequence
    }
}

impl fmt::Display for SessionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sequence {
            Some(n) => write!(f, "GV - {} - {n}", self.role.code()),
            None => write!(f, "GV - {}", self.role.code()),
        }
    }
}

/// Authenticated session facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    role: Role,
    username: String,
    user_id: Option<RecordId>,
}

impl ActiveSession {
    /// Build a session for `username`, deriving the role from its identifier.
    ///
    /// Returns `None` when the username carries no recognised identifier.
    pub fn from_username(username: impl Into<String>, user_id: Option<RecordId>) -> Option<Self> {
        let username = username.into();
        let identifier = SessionIdentifier::parse(&username)?;
        Some(Self {
            role: identifier.role(),
            username,
            user_id,
        })
    }

    /// Role of the signed-in account.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Display identifier of the signed-in account.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Record id of the signed-in account, when known.
    pub fn user_id(&self) -> Option<RecordId> {
        self.user_id
    }

    /// Composite key of the signed-in account, when its id is known.
    pub fn user_key(&self) -> Option<UserKey> {
        self.user_id.map(|id| UserKey::new(self.role, id))
    }
}

/// Outcome of resolving a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// A recognised account is signed in.
    Authenticated(ActiveSession),
    /// Nobody is signed in, or the stored identity was unrecognised.
    Anonymous,
}

impl SessionState {
    /// Route the visitor should land on.
    pub fn landing_route(&self) -> &'static str {
        match self {
            Self::Authenticated(session) => session.role().dashboard_route(),
            Self::Anonymous => LOGIN_ROUTE,
        }
    }

    /// Role of the signed-in account, if any.
    pub fn role(&self) -> Option<Role> {
        match self {
            Self::Authenticated(session) => Some(session.role()),
            Self::Anonymous => None,
        }
    }
}

/// Resolve a session from decoded cookie values.
///
/// The `username` cookie is consulted first; any other value carrying an
/// identifier is accepted as a fallback. A numeric `userId` cookie is attached
/// when present and well formed.
pub fn resolve_from_cookies(cookies: &BTreeMap<String, String>) -> SessionState {
    let identity = cookies
        .get(IDENTITY_COOKIE)
        .filter(|value| SessionIdentifier::parse(value).is_some())
        .or_else(|| {
            cookies
                .iter()
                .filter(|(name, _)| name.as_str() != USER_ID_COOKIE)
                .map(|(_, value)| value)
                .find(|value| SessionIdentifier::parse(value).is_some())
        });

    let Some(identity) = identity else {
        return SessionState::Anonymous;
    };

    let user_id = cookies
        .get(USER_ID_COOKIE)
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .map(RecordId::new);

    match ActiveSession::from_username(identity.clone(), user_id) {
        Some(session) => SessionState::Authenticated(session),
        None => SessionState::Anonymous,
    }
}
