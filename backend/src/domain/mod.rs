//! Domain primitives, services and ports.
//!
//! Purpose: model the Guardian Vision accounts, sessions and monitoring data
//! independently of HTTP and of the external care API. Types here carry
//! serde contracts for the JSON the dashboards consume; inbound adapters wrap
//! them for OpenAPI.
//!
//! Public surface:
//! - Role, session and user identity (`Role`, `SessionState`, `UserKey`).
//! - Form rules (`validate_field`, `RegistrationForm`, `ProfileUpdate`).
//! - Coordinate extraction (`extract_coordinates`).
//! - Services (`UserAggregator`, `SelectionTracker`, `DashboardDescriptor`).
//! - Error (alias to `error::Error`) and the request `TraceId`.

pub mod aggregator;
pub mod auth;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod location;
pub mod ports;
pub mod profile;
pub mod role;
pub mod selection;
pub mod session;
pub mod trace_id;
pub mod user;
pub mod validation;

pub use self::aggregator::{CaregiverDashboard, PatientDashboard, UserAggregator};
pub use self::auth::{LoginCredentials, LoginValidationError, UpstreamSession};
pub use self::dashboard::{Capability, DashboardDescriptor};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::events::{EventKind, EventRecord, PanelState, PatientEvents};
pub use self::location::{Coordinates, extract_coordinates};
pub use self::profile::{ImageUpload, ImageUploadError, PasswordChange, PresignedUpload, ProfileUpdate};
pub use self::role::{LOGIN_ROUTE, Role, RoleParseError};
pub use self::selection::{SelectionTicket, SelectionTracker};
pub use self::session::{
    ActiveSession, IDENTITY_COOKIE, SessionIdentifier, SessionState, USER_ID_COOKIE,
    resolve_from_cookies,
};
pub use self::trace_id::TraceId;
pub use self::user::{
    Administrator, AuthenticatedAccount, Caregiver, CaregiverAssignment, EmergencyContact,
    MedicalProfile, Patient, PersonalDetails, RecordId, RegisteredAccount, UserDirectory,
    UserKey, UserRecord,
};
pub use self::validation::{
    FieldError, FormErrors, FormField, FormFieldParseError, MIN_PASSWORD_CHARS, NewUser,
    PatientIntake, RegistrationForm, validate_field, validate_password,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use guardian_vision::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
