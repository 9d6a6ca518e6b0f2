//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the serialised shape of their corresponding
//! domain types but live in the inbound adapter layer where framework concerns
//! belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// A newer request superseded this one.
    #[schema(rename = "conflict")]
    Conflict,
    /// The care API could not be reached.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "form has invalid fields")]
    message: String,
    /// Correlation identifier matching the `trace-id` response header.
    #[schema(example = "6f1c3c52-8d8e-4a57-9a53-0c1d2e3f4a5b")]
    trace_id: Option<String>,
    /// Supplementary details, e.g. `fields` for form validation failures.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Capability`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Capability, rename_all = "camelCase")]
pub enum CapabilitySchema {
    ListUsers,
    EditUsers,
    DeleteUsers,
    ResetPasswords,
    ViewAssignedPatients,
    ViewPatientEvents,
    ViewOwnRecord,
    ViewOwnCaregiver,
    ViewOwnEvents,
    EditOwnProfile,
}

/// OpenAPI schema for [`crate::domain::DashboardDescriptor`].
#[derive(ToSchema)]
#[schema(as = crate::domain::DashboardDescriptor, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct DashboardDescriptorSchema {
    #[schema(example = "caregiver")]
    role: String,
    #[schema(example = "Caregiver dashboard")]
    title: String,
    #[schema(example = "/pages/caregiver")]
    route: String,
    capabilities: Vec<CapabilitySchema>,
}

/// OpenAPI schema for [`crate::domain::MedicalProfile`].
#[derive(ToSchema)]
#[schema(as = crate::domain::MedicalProfile)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct MedicalProfileSchema {
    age: Option<u32>,
    /// Centimetres.
    height: Option<f64>,
    /// Kilograms.
    weight: Option<f64>,
}

/// OpenAPI schema for [`crate::domain::EmergencyContact`].
#[derive(ToSchema)]
#[schema(as = crate::domain::EmergencyContact)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct EmergencyContactSchema {
    name: String,
    number: String,
    address: String,
}

/// OpenAPI schema for [`crate::domain::Patient`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Patient, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PatientSchema {
    #[schema(example = 3)]
    id: i64,
    #[schema(example = "GV - PT - 3")]
    username: String,
    email: String,
    first_name: String,
    middle_name: Option<String>,
    last_name: String,
    address: String,
    gender: String,
    mobile_number: String,
    medical: MedicalProfileSchema,
    emergency_contact: EmergencyContactSchema,
    image_url: Option<String>,
    caregiver_id: Option<i64>,
}

/// OpenAPI schema for [`crate::domain::Caregiver`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Caregiver, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CaregiverSchema {
    #[schema(example = 2)]
    id: i64,
    #[schema(example = "GV - CC - 2")]
    username: String,
    email: String,
    first_name: String,
    middle_name: Option<String>,
    last_name: String,
    address: String,
    gender: String,
    mobile_number: String,
    patients: Vec<PatientSchema>,
    /// Present and `true` when the patient lookup failed.
    patients_unavailable: Option<bool>,
}

/// OpenAPI schema for [`crate::domain::UserRecord`].
///
/// Every record carries its `role`; role-specific fields appear only on
/// records of that role.
#[derive(ToSchema)]
#[schema(as = crate::domain::UserRecord, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserRecordSchema {
    #[schema(example = "caregiver")]
    role: String,
    #[schema(example = 2)]
    id: i64,
    #[schema(example = "GV - CC - 2")]
    username: String,
    email: String,
    first_name: String,
    middle_name: Option<String>,
    last_name: String,
    address: String,
    gender: String,
    mobile_number: String,
    medical: Option<MedicalProfileSchema>,
    emergency_contact: Option<EmergencyContactSchema>,
    image_url: Option<String>,
    caregiver_id: Option<i64>,
    patients: Option<Vec<PatientSchema>>,
    patients_unavailable: Option<bool>,
}

/// OpenAPI schema for [`crate::domain::CaregiverAssignment`].
#[derive(ToSchema)]
#[schema(as = crate::domain::CaregiverAssignment)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CaregiverAssignmentSchema {
    /// `assigned`, `unassigned` or `unknown`.
    #[schema(example = "assigned")]
    status: String,
    id: Option<i64>,
    #[schema(example = "Carla Reyes")]
    name: Option<String>,
}

/// OpenAPI schema for [`crate::domain::Coordinates`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Coordinates)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CoordinatesSchema {
    #[schema(example = 14.676)]
    latitude: f64,
    #[schema(example = 121.0437)]
    longitude: f64,
}

/// OpenAPI schema for [`crate::domain::EventRecord`].
#[derive(ToSchema)]
#[schema(as = crate::domain::EventRecord, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct EventRecordSchema {
    id: i64,
    /// `alert` or `outage`.
    #[schema(example = "alert")]
    kind: String,
    #[schema(example = "2024-03-01T08:30:00Z")]
    timestamp: String,
    video_url: Option<String>,
    #[schema(example = "https://maps.google.com/?q=14.6760,121.0437")]
    last_known_location: Option<String>,
    coordinates: Option<CoordinatesSchema>,
}

/// OpenAPI schema for an event panel, [`crate::domain::PanelState`].
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct EventPanelSchema {
    /// `loaded` or `unavailable`.
    #[schema(example = "loaded")]
    state: String,
    /// Present when `state` is `loaded`.
    items: Option<Vec<EventRecordSchema>>,
}

/// OpenAPI schema for [`crate::domain::PatientEvents`].
#[derive(ToSchema)]
#[schema(as = crate::domain::PatientEvents, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PatientEventsSchema {
    patient_id: i64,
    alerts: EventPanelSchema,
    outages: EventPanelSchema,
}

/// OpenAPI schema for [`crate::domain::CaregiverDashboard`].
#[derive(ToSchema)]
#[schema(as = crate::domain::CaregiverDashboard)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CaregiverDashboardSchema {
    caregiver: CaregiverSchema,
}

/// OpenAPI schema for [`crate::domain::PatientDashboard`].
#[derive(ToSchema)]
#[schema(as = crate::domain::PatientDashboard)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PatientDashboardSchema {
    patient: PatientSchema,
    caregiver: CaregiverAssignmentSchema,
    events: PatientEventsSchema,
}
