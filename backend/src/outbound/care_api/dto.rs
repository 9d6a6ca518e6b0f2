//! Transport DTOs for the care REST API.
//!
//! Upstream payloads mix camelCase and snake_case spellings for the same
//! field depending on the endpoint. Response bodies pass through
//! [`canonical_keys`] before decoding, which also settles payloads carrying
//! both spellings at once; the serde aliases cover DTOs decoded directly.
//! DTOs decode first and then map into domain records in one pass.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::domain::{
    Administrator, Caregiver, EmergencyContact, EventKind, EventRecord, FormField,
    MedicalProfile, NewUser, Patient, PersonalDetails, ProfileUpdate, RecordId, Role, UserDirectory,
    UserRecord,
};

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for ch in key.chars() {
        match ch {
            '_' if !out.is_empty() => upper = true,
            _ if upper => {
                out.extend(ch.to_uppercase());
                upper = false;
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Rewrite every object key to camelCase, recursively.
///
/// When a payload carries both spellings of one field the camelCase value
/// wins and the snake_case duplicate is dropped.
pub(super) fn canonical_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let (camel, snake): (Vec<_>, Vec<_>) =
                map.into_iter().partition(|(key, _)| !key.contains('_'));
            let mut out = Map::new();
            for (key, inner) in camel {
                out.insert(key, canonical_keys(inner));
            }
            for (key, inner) in snake {
                out.entry(camel_case(&key))
                    .or_insert_with(|| canonical_keys(inner));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonical_keys).collect()),
        other => other,
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CaregiverRefDto {
    pub(super) id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UserDto {
    pub(super) id: i64,
    #[serde(default)]
    pub(super) username: String,
    #[serde(default)]
    pub(super) email: String,
    #[serde(default, alias = "first_name")]
    pub(super) first_name: String,
    #[serde(default, alias = "middle_name")]
    pub(super) middle_name: Option<String>,
    #[serde(default, alias = "last_name")]
    pub(super) last_name: String,
    #[serde(default)]
    pub(super) address: String,
    #[serde(default)]
    pub(super) gender: String,
    #[serde(default, alias = "mobile_number")]
    pub(super) mobile_number: Option<String>,
    #[serde(default)]
    pub(super) age: Option<u32>,
    #[serde(default)]
    pub(super) height: Option<f64>,
    #[serde(default)]
    pub(super) weight: Option<f64>,
    #[serde(default, alias = "emergency_contact_name")]
    pub(super) emergency_contact_name: Option<String>,
    #[serde(default, alias = "emergency_contact_number")]
    pub(super) emergency_contact_number: Option<String>,
    #[serde(default, alias = "emergency_contact_address")]
    pub(super) emergency_contact_address: Option<String>,
    #[serde(default, alias = "image_url")]
    pub(super) image_url: Option<String>,
    #[serde(default, alias = "caregiver_id")]
    pub(super) caregiver_id: Option<i64>,
    #[serde(default)]
    pub(super) caregiver: Option<CaregiverRefDto>,
    #[serde(default)]
    pub(super) patients: Vec<UserDto>,
}

impl UserDto {
    fn details(&mut self) -> PersonalDetails {
        PersonalDetails {
            username: std::mem::take(&mut self.username),
            email: std::mem::take(&mut self.email),
            first_name: std::mem::take(&mut self.first_name),
            middle_name: self.middle_name.take().filter(|m| !m.trim().is_empty()),
            last_name: std::mem::take(&mut self.last_name),
            address: std::mem::take(&mut self.address),
            gender: std::mem::take(&mut self.gender),
            mobile_number: self.mobile_number.take().unwrap_or_default(),
        }
    }

    pub(super) fn into_admin(mut self) -> Administrator {
        Administrator {
            id: RecordId::new(self.id),
            details: self.details(),
        }
    }

    pub(super) fn into_caregiver(mut self) -> Caregiver {
        let details = self.details();
        Caregiver {
            id: RecordId::new(self.id),
            details,
            patients: self.patients.into_iter().map(Self::into_patient).collect(),
            patients_unavailable: false,
        }
    }

    pub(super) fn into_patient(mut self) -> Patient {
        let details = self.details();
        let caregiver_id = self
            .caregiver_id
            .or_else(|| self.caregiver.as_ref().map(|c| c.id))
            .map(RecordId::new);
        Patient {
            id: RecordId::new(self.id),
            details,
            medical: MedicalProfile {
                age: self.age,
                height: self.height,
                weight: self.weight,
            },
            emergency_contact: EmergencyContact {
                name: self.emergency_contact_name.unwrap_or_default(),
                number: self.emergency_contact_number.unwrap_or_default(),
                address: self.emergency_contact_address.unwrap_or_default(),
            },
            image_url: self.image_url.filter(|url| !url.trim().is_empty()),
            caregiver_id,
        }
    }

    pub(super) fn into_record(self, role: Role) -> UserRecord {
        match role {
            Role::Admin => UserRecord::Admin(self.into_admin()),
            Role::Caregiver => UserRecord::Caregiver(self.into_caregiver()),
            Role::Patient => UserRecord::Patient(self.into_patient()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct DirectoryDto {
    #[serde(default)]
    pub(super) admins: Vec<UserDto>,
    #[serde(default)]
    pub(super) caregivers: Vec<UserDto>,
    #[serde(default)]
    pub(super) patients: Vec<UserDto>,
}

impl DirectoryDto {
    pub(super) fn into_domain(self) -> UserDirectory {
        UserDirectory {
            admins: self.admins.into_iter().map(UserDto::into_admin).collect(),
            caregivers: self
                .caregivers
                .into_iter()
                .map(UserDto::into_caregiver)
                .collect(),
            patients: self.patients.into_iter().map(UserDto::into_patient).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct EventDto {
    pub(super) id: i64,
    pub(super) timestamp: String,
    #[serde(default, alias = "video_url")]
    pub(super) video_url: Option<String>,
    #[serde(default, alias = "last_known_location")]
    pub(super) last_known_location: Option<String>,
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
                .ok()
                .map(|naive| naive.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
}

impl EventDto {
    pub(super) fn into_domain(self, kind: EventKind) -> Result<EventRecord, String> {
        let timestamp = parse_timestamp(&self.timestamp)
            .ok_or_else(|| format!("event {} has invalid timestamp '{}'", self.id, self.timestamp))?;
        Ok(EventRecord::new(
            RecordId::new(self.id),
            kind,
            timestamp,
            self.video_url.filter(|url| !url.trim().is_empty()),
            self.last_known_location
                .filter(|location| !location.trim().is_empty()),
        ))
    }
}

#[derive(Debug, Serialize)]
pub(super) struct LoginRequestDto<'a> {
    pub(super) identifier: &'a str,
    pub(super) password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct LoginResponseDto {
    pub(super) id: i64,
    pub(super) username: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct RegisteredDto {
    pub(super) username: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PresignRequestDto<'a> {
    pub(super) file_name: &'a str,
    pub(super) content_type: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PresignResponseDto {
    #[serde(alias = "upload_url", alias = "url")]
    pub(super) upload_url: String,
    #[serde(alias = "file_url", alias = "publicUrl")]
    pub(super) file_url: String,
}

#[derive(Debug, Serialize)]
pub(super) struct PasswordDto<'a> {
    pub(super) password: &'a str,
}

/// Registration body, keyed by the form's field names.
#[derive(Debug, Serialize)]
pub(super) struct NewUserDto<'a> {
    email: &'a str,
    password: &'a str,
    first_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    middle_name: Option<&'a str>,
    last_name: &'a str,
    address: &'a str,
    gender: &'a str,
    mobile_number: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    emergency_contact_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    emergency_contact_number: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    emergency_contact_address: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    caregiver_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
}

impl<'a> From<&'a NewUser> for NewUserDto<'a> {
    fn from(user: &'a NewUser) -> Self {
        let patient = user.patient.as_ref();
        Self {
            email: &user.email,
            password: user.password.as_str(),
            first_name: &user.first_name,
            middle_name: user.middle_name.as_deref(),
            last_name: &user.last_name,
            address: &user.address,
            gender: &user.gender,
            mobile_number: &user.mobile_number,
            age: patient.and_then(|p| p.medical.age),
            height: patient.and_then(|p| p.medical.height),
            weight: patient.and_then(|p| p.medical.weight),
            emergency_contact_name: patient.map(|p| p.emergency_contact.name.as_str()),
            emergency_contact_number: patient.map(|p| p.emergency_contact.number.as_str()),
            emergency_contact_address: patient.map(|p| p.emergency_contact.address.as_str()),
            caregiver_id: patient.map(|p| p.caregiver_id.get()),
            image_url: patient.map(|p| p.image_url.as_str()),
        }
    }
}

fn record_key(field: FormField) -> Option<&'static str> {
    Some(match field {
        FormField::Email => "email",
        FormField::FirstName => "firstName",
        FormField::MiddleName => "middleName",
        FormField::LastName => "lastName",
        FormField::Address => "address",
        FormField::Gender => "gender",
        FormField::MobileNumber => "mobileNumber",
        FormField::Age => "age",
        FormField::Height => "height",
        FormField::Weight => "weight",
        FormField::EmergencyContactName => "emergencyContactName",
        FormField::EmergencyContactNumber => "emergencyContactNumber",
        FormField::EmergencyContactAddress => "emergencyContactAddress",
        FormField::ProfileImage => "imageUrl",
        FormField::Password | FormField::EmployeeId | FormField::CaregiverId => return None,
    })
}

fn record_value(field: FormField, value: &str) -> Value {
    let number = match field {
        FormField::Age => value.parse::<u64>().ok().map(Number::from),
        FormField::Height | FormField::Weight => {
            value.parse::<f64>().ok().and_then(Number::from_f64)
        }
        _ => None,
    };
    number.map_or_else(|| Value::String(value.to_owned()), Value::Number)
}

/// Partial record body for `PUT` updates, keyed by record field names.
pub(super) fn update_body(update: &ProfileUpdate) -> Value {
    let map: Map<String, Value> = update
        .changes()
        .iter()
        .filter_map(|(field, value)| {
            record_key(*field).map(|key| (key.to_owned(), record_value(*field, value)))
        })
        .collect();
    Value::Object(map)
}
