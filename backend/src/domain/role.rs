//! The three account roles and the routing facts derived from them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Landing route for visitors without a recognised session.
pub const LOGIN_ROUTE: &str = "/";

/// Account role.
///
/// Role is not stored on backend records: it is assigned from the collection
/// a record was fetched from, or from the code embedded in a session
/// identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Platform administrator.
    Admin,
    /// Caregiver responsible for a set of patients.
    Caregiver,
    /// Monitored patient.
    Patient,
}

impl Role {
    /// Every role, in directory order.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Caregiver, Role::Patient];

    /// Two-letter code embedded in `GV - <CODE> - <N>` identifiers.
    pub fn code(self) -> &'static str {
        match self {
            Self::Admin => "AA",
            Self::Caregiver => "CC",
            Self::Patient => "PT",
        }
    }

    /// Map a two-letter identifier code back to a role.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.code() == code)
    }

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Caregiver => "caregiver",
            Self::Patient => "patient",
        }
    }

    /// Plural path segment used by the care API (`/api/{collection}/...`).
    pub fn collection(self) -> &'static str {
        match self {
            Self::Admin => "admins",
            Self::Caregiver => "caregivers",
            Self::Patient => "patients",
        }
    }

    /// Dashboard route a signed-in user of this role lands on.
    pub fn dashboard_route(self) -> &'static str {
        match self {
            Self::Admin => "/pages/admin",
            Self::Caregiver => "/pages/caregiver",
            Self::Patient => "/pages/patient",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a role name is not one of `admin`, `caregiver`, `patient`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct RoleParseError(pub String);

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == normalised)
            .ok_or_else(|| RoleParseError(s.to_owned()))
    }
}
