//! Registration and profile form validation.
//!
//! [`validate_field`] is the per-field rule used on blur. Whole-form checks
//! always re-run every rule against the values currently submitted, so a
//! stale error snapshot can never let an invalid form through.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use zeroize::Zeroizing;

use super::{EmergencyContact, MedicalProfile, RecordId, Role};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_CHARS: usize = 6;

static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn email_regex() -> Option<&'static Regex> {
    EMAIL_RE
        .get_or_init(|| match Regex::new(r"\S+@\S+\.\S+") {
            Ok(re) => Some(re),
            Err(error) => {
                tracing::error!(%error, "email pattern failed to compile");
                None
            }
        })
        .as_ref()
}

/// Input fields on the registration and profile forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Email,
    Password,
    FirstName,
    MiddleName,
    LastName,
    Address,
    Gender,
    MobileNumber,
    /// Caregiver-only; validated but never forwarded upstream.
    EmployeeId,
    Age,
    Height,
    Weight,
    EmergencyContactName,
    EmergencyContactNumber,
    EmergencyContactAddress,
    CaregiverId,
    ProfileImage,
}

impl FormField {
    /// Every field, in form order.
    pub const ALL: [FormField; 17] = [
        FormField::Email,
        FormField::Password,
        FormField::FirstName,
        FormField::MiddleName,
        FormField::LastName,
        FormField::Address,
        FormField::Gender,
        FormField::MobileNumber,
        FormField::EmployeeId,
        FormField::Age,
        FormField::Height,
        FormField::Weight,
        FormField::EmergencyContactName,
        FormField::EmergencyContactNumber,
        FormField::EmergencyContactAddress,
        FormField::CaregiverId,
        FormField::ProfileImage,
    ];

    /// Wire name used by form payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
            Self::FirstName => "first_name",
            Self::MiddleName => "middle_name",
            Self::LastName => "last_name",
            Self::Address => "address",
            Self::Gender => "gender",
            Self::MobileNumber => "mobile_number",
            Self::EmployeeId => "employee_id",
            Self::Age => "age",
            Self::Height => "height",
            Self::Weight => "weight",
            Self::EmergencyContactName => "emergency_contact_name",
            Self::EmergencyContactNumber => "emergency_contact_number",
            Self::EmergencyContactAddress => "emergency_contact_address",
            Self::CaregiverId => "caregiver_id",
            Self::ProfileImage => "profile_image",
        }
    }

    /// Whether the registration form shows this field for `role`.
    pub fn applies_to(self, role: Role) -> bool {
        match self {
            Self::EmployeeId => role == Role::Caregiver,
            Self::Age
            | Self::Height
            | Self::Weight
            | Self::EmergencyContactName
            | Self::EmergencyContactNumber
            | Self::EmergencyContactAddress
            | Self::CaregiverId
            | Self::ProfileImage => role == Role::Patient,
            _ => true,
        }
    }

    /// Whether a signed-in user of `role` may change this field through the
    /// profile editor. Passwords, images and assignments have their own flows.
    pub fn editable_for(self, role: Role) -> bool {
        !matches!(
            self,
            Self::Password | Self::EmployeeId | Self::CaregiverId | Self::ProfileImage
        ) && self.applies_to(role)
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised for field names no form declares.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown form field '{0}'")]
pub struct FormFieldParseError(pub String);

impl FromStr for FormField {
    type Err = FormFieldParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| FormFieldParseError(s.to_owned()))
    }
}

/// A failed rule for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: FormField,
    pub message: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for FieldError {}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

fn is_positive_number(value: &str) -> bool {
    value
        .parse::<f64>()
        .is_ok_and(|n| n.is_finite() && n > 0.0)
}

fn is_email(value: &str) -> bool {
    email_regex().is_some_and(|re| re.is_match(value))
}

/// Check one field value for the active role.
///
/// Role-conditional fields pass unconditionally when they do not apply to
/// `role`.
///
/// # Examples
/// ```
/// use guardian_vision::domain::{FormField, Role, validate_field};
///
/// assert!(validate_field(FormField::Email, "not-an-email", Role::Admin).is_some());
/// assert!(validate_field(FormField::Email, "a@b.com", Role::Admin).is_none());
/// assert!(validate_field(FormField::Age, "", Role::Patient).is_some());
/// assert!(validate_field(FormField::Age, "", Role::Admin).is_none());
/// ```
pub fn validate_field(field: FormField, value: &str, role: Role) -> Option<FieldError> {
    if !field.applies_to(role) {
        return None;
    }
    let value = if field == FormField::Password {
        value
    } else {
        value.trim()
    };
    let message = match field {
        FormField::Email if !is_email(value) => "Valid email is required",
        FormField::Password if value.chars().count() < MIN_PASSWORD_CHARS => {
            "Password must be at least 6 characters"
        }
        FormField::FirstName if value.is_empty() => "First name is required",
        FormField::LastName if value.is_empty() => "Last name is required",
        FormField::Address if value.is_empty() => "Address is required",
        FormField::Gender if value.is_empty() => "Gender is required",
        FormField::MobileNumber if !is_digits(value) => "Valid mobile number is required",
        FormField::EmployeeId if value.is_empty() => "Employee ID is required",
        FormField::Age if !is_digits(value) || value.parse::<u32>().is_err() => {
            "Valid age is required"
        }
        FormField::Height if !is_positive_number(value) => "Valid height is required",
        FormField::Weight if !is_positive_number(value) => "Valid weight is required",
        FormField::EmergencyContactName if value.is_empty() => {
            "Emergency contact name is required"
        }
        FormField::EmergencyContactNumber if !is_digits(value) => {
            "Valid emergency number is required"
        }
        FormField::EmergencyContactAddress if value.is_empty() => {
            "Emergency address is required"
        }
        FormField::CaregiverId if !value.parse::<i64>().is_ok_and(|id| id > 0) => {
            "Caregiver selection is required"
        }
        FormField::ProfileImage if value.is_empty() => "Profile image is required",
        _ => return None,
    };
    Some(FieldError { field, message })
}

/// Check a new password against the length rule.
pub fn validate_password(value: &str) -> Result<(), FieldError> {
    match validate_field(FormField::Password, value, Role::Admin) {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

/// Field errors keyed by field, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<FormField, &'static str>);

impl FormErrors {
    /// Whether every field passed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message for one field, if it failed.
    pub fn get(&self, field: FormField) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    /// Iterate failing fields with their messages.
    pub fn iter(&self) -> impl Iterator<Item = (FormField, &'static str)> + '_ {
        self.0.iter().map(|(field, message)| (*field, *message))
    }

    pub(crate) fn push(&mut self, error: FieldError) {
        self.0.insert(error.field, error.message);
    }
}

impl FromIterator<FieldError> for FormErrors {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        let mut errors = Self::default();
        for error in iter {
            errors.push(error);
        }
        errors
    }
}

/// Patient-only registration data.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientIntake {
    pub medical: MedicalProfile,
    pub emergency_contact: EmergencyContact,
    pub caregiver_id: RecordId,
    pub image_url: String,
}

/// Validated registration payload for `POST /api/{role}s`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub role: Role,
    pub email: String,
    pub password: Zeroizing<String>,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub address: String,
    pub gender: String,
    pub mobile_number: String,
    pub patient: Option<PatientIntake>,
}

/// Submitted registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationForm {
    role: Role,
    fields: BTreeMap<FormField, String>,
}

impl RegistrationForm {
    /// Capture submitted values for `role`.
    pub fn new(role: Role, fields: BTreeMap<FormField, String>) -> Self {
        Self { role, fields }
    }

    /// Role being registered.
    pub fn role(&self) -> Role {
        self.role
    }

    fn value(&self, field: FormField) -> &str {
        self.fields.get(&field).map_or("", String::as_str)
    }

    fn trimmed(&self, field: FormField) -> String {
        self.value(field).trim().to_owned()
    }

    /// Run every rule for the role against the current values.
    ///
    /// Required fields that were never submitted fail as if left empty.
    pub fn validate(&self) -> FormErrors {
        FormField::ALL
            .into_iter()
            .filter_map(|field| validate_field(field, self.value(field), self.role))
            .collect()
    }

    /// Validate and convert into the upstream registration payload.
    pub fn into_new_user(self) -> Result<NewUser, FormErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }

        let middle_name = Some(self.trimmed(FormField::MiddleName)).filter(|m| !m.is_empty());
        let patient = (self.role == Role::Patient).then(|| PatientIntake {
            medical: MedicalProfile {
                age: self.value(FormField::Age).trim().parse().ok(),
                height: self.value(FormField::Height).trim().parse().ok(),
                weight: self.value(FormField::Weight).trim().parse().ok(),
            },
            emergency_contact: EmergencyContact {
                name: self.trimmed(FormField::EmergencyContactName),
                number: self.trimmed(FormField::EmergencyContactNumber),
                address: self.trimmed(FormField::EmergencyContactAddress),
            },
            caregiver_id: RecordId::new(
                self.value(FormField::CaregiverId).trim().parse().unwrap_or_default(),
            ),
            image_url: self.trimmed(FormField::ProfileImage),
        });

        Ok(NewUser {
            role: self.role,
            email: self.trimmed(FormField::Email),
            password: Zeroizing::new(self.value(FormField::Password).to_owned()),
            first_name: self.trimmed(FormField::FirstName),
            middle_name,
            last_name: self.trimmed(FormField::LastName),
            address: self.trimmed(FormField::Address),
            gender: self.trimmed(FormField::Gender),
            mobile_number: self.trimmed(FormField::MobileNumber),
            patient,
        })
    }
}
