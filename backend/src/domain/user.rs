//! User records exchanged with the care API.
//!
//! Records arrive as flat, role-less payloads from three collections. The
//! domain tags each one with its source role and identifies it by
//! [`UserKey`] because numeric ids repeat across roles.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Role, UpstreamSession};

/// Numeric record identifier assigned by the care API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    /// Wrap a raw id.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Composite identity of a record: its role plus its id.
///
/// # Examples
/// ```
/// use guardian_vision::domain::{RecordId, Role, UserKey};
///
/// let key = UserKey::new(Role::Caregiver, RecordId::new(2));
/// assert_eq!(key.to_string(), "caregiver-2");
/// assert_ne!(key, UserKey::new(Role::Patient, RecordId::new(2)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserKey {
    role: Role,
    id: RecordId,
}

impl UserKey {
    /// Build a key.
    pub const fn new(role: Role, id: RecordId) -> Self {
        Self { role, id }
    }

    /// Role half of the key.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Id half of the key.
    pub fn id(&self) -> RecordId {
        self.id
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.role, self.id)
    }
}

impl Serialize for UserKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Personal and contact fields shared by every role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    pub username: String,
    pub email: String,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub address: String,
    pub gender: String,
    pub mobile_number: String,
}

impl PersonalDetails {
    /// Full name with empty parts skipped.
    pub fn display_name(&self) -> String {
        [
            Some(self.first_name.as_str()),
            self.middle_name.as_deref(),
            Some(self.last_name.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// Medical measurements recorded for a patient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalProfile {
    pub age: Option<u32>,
    /// Height in centimetres.
    pub height: Option<f64>,
    /// Weight in kilograms.
    pub weight: Option<f64>,
}

/// Emergency contact registered for a patient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub name: String,
    pub number: String,
    pub address: String,
}

/// Administrator account.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Administrator {
    pub id: RecordId,
    #[serde(flatten)]
    pub details: PersonalDetails,
}

/// Patient account.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: RecordId,
    #[serde(flatten)]
    pub details: PersonalDetails,
    pub medical: MedicalProfile,
    pub emergency_contact: EmergencyContact,
    pub image_url: Option<String>,
    /// Weak reference; resolve with a caregiver lookup.
    pub caregiver_id: Option<RecordId>,
}

/// Caregiver account together with the patients assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Caregiver {
    pub id: RecordId,
    #[serde(flatten)]
    pub details: PersonalDetails,
    pub patients: Vec<Patient>,
    /// Set when the follow-up patient lookup failed.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub patients_unavailable: bool,
}

/// A record tagged with the collection it was fetched from.
///
/// Serialises with a `role` field next to the record's own fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum UserRecord {
    Admin(Administrator),
    Caregiver(Caregiver),
    Patient(Patient),
}

impl UserRecord {
    /// Role assigned from the source collection.
    pub fn role(&self) -> Role {
        match self {
            Self::Admin(_) => Role::Admin,
            Self::Caregiver(_) => Role::Caregiver,
            Self::Patient(_) => Role::Patient,
        }
    }

    /// Record id, unique only within its role.
    pub fn id(&self) -> RecordId {
        match self {
            Self::Admin(admin) => admin.id,
            Self::Caregiver(caregiver) => caregiver.id,
            Self::Patient(patient) => patient.id,
        }
    }

    /// Composite key.
    pub fn key(&self) -> UserKey {
        UserKey::new(self.role(), self.id())
    }

    /// Shared personal fields.
    pub fn details(&self) -> &PersonalDetails {
        match self {
            Self::Admin(admin) => &admin.details,
            Self::Caregiver(caregiver) => &caregiver.details,
            Self::Patient(patient) => &patient.details,
        }
    }
}

/// Display state of a patient's caregiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CaregiverAssignment {
    /// The caregiver was resolved.
    Assigned { id: RecordId, name: String },
    /// The patient has no caregiver.
    Unassigned,
    /// The lookup failed; the view shows "unknown".
    Unknown,
}

/// Account created through a registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredAccount {
    pub username: String,
}

/// Identity returned by the care API after a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedAccount {
    pub id: RecordId,
    pub username: String,
    /// Credential the care API expects on later calls for this account.
    pub upstream: UpstreamSession,
}

/// The three role-partitioned collections returned by the directory call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDirectory {
    pub admins: Vec<Administrator>,
    pub caregivers: Vec<Caregiver>,
    pub patients: Vec<Patient>,
}
