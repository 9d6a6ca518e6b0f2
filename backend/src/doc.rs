//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer, the
//! request and response bodies, and the schema wrappers from
//! [`crate::inbound::http::schemas`] that describe domain types without
//! coupling them to utoipa. The session cookie is the only security scheme.
//!
//! The document backs Swagger UI in debug builds and is exported by
//! `cargo run --bin openapi-dump`.

use crate::inbound::http::auth::{LandingResponse, LoginRequest, SessionResponse};
use crate::inbound::http::caregiver::{SelectionRequest, SelectionResponse};
use crate::inbound::http::profile::{ImageResponse, PasswordRequest, ProfileChangesRequest};
use crate::inbound::http::registrations::{
    FieldCheckRequest, FieldCheckResponse, RegistrationRequest, RegistrationResponse,
};
use crate::inbound::http::schemas::{
    CapabilitySchema, CaregiverAssignmentSchema, CaregiverDashboardSchema, CaregiverSchema,
    CoordinatesSchema, DashboardDescriptorSchema, EmergencyContactSchema, ErrorCodeSchema,
    ErrorSchema, EventPanelSchema, EventRecordSchema, MedicalProfileSchema,
    PatientDashboardSchema, PatientEventsSchema, PatientSchema, UserRecordSchema,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Encrypted session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Guardian Vision API",
        description = "Role-based dashboards for patients, caregivers and administrators over the care API."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::current_session,
        crate::inbound::http::auth::dashboard,
        crate::inbound::http::registrations::validate_registration_field,
        crate::inbound::http::registrations::upload_registration_image,
        crate::inbound::http::registrations::register,
        crate::inbound::http::admin::list_users,
        crate::inbound::http::admin::update_user,
        crate::inbound::http::admin::reset_password,
        crate::inbound::http::admin::delete_user,
        crate::inbound::http::caregiver::caregiver_dashboard,
        crate::inbound::http::caregiver::select_patient,
        crate::inbound::http::patient::patient_dashboard,
        crate::inbound::http::patient::patient_events,
        crate::inbound::http::profile::update_profile,
        crate::inbound::http::profile::change_password,
        crate::inbound::http::profile::upload_image,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        LoginRequest,
        LandingResponse,
        SessionResponse,
        FieldCheckRequest,
        FieldCheckResponse,
        RegistrationRequest,
        RegistrationResponse,
        SelectionRequest,
        SelectionResponse,
        ProfileChangesRequest,
        PasswordRequest,
        ImageResponse,
        ErrorSchema,
        ErrorCodeSchema,
        CapabilitySchema,
        DashboardDescriptorSchema,
        MedicalProfileSchema,
        EmergencyContactSchema,
        PatientSchema,
        CaregiverSchema,
        UserRecordSchema,
        CaregiverAssignmentSchema,
        CoordinatesSchema,
        EventRecordSchema,
        EventPanelSchema,
        PatientEventsSchema,
        CaregiverDashboardSchema,
        PatientDashboardSchema,
    )),
    tags(
        (name = "session", description = "Sign-in, sign-out and session discovery"),
        (name = "registrations", description = "Account registration and field checks"),
        (name = "admin", description = "Account management for administrators"),
        (name = "caregiver", description = "Caregiver dashboard and patient selection"),
        (name = "patient", description = "Patient dashboard and event panels"),
        (name = "profile", description = "Self-service profile edits"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document's shape.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";
    const PATIENT_SCHEMA_NAME: &str = "crate.domain.Patient";

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case(ERROR_SCHEMA_NAME, "code")]
    #[case(ERROR_SCHEMA_NAME, "message")]
    #[case(PATIENT_SCHEMA_NAME, "username")]
    #[case(PATIENT_SCHEMA_NAME, "caregiverId")]
    fn domain_schemas_expose_wire_fields(#[case] schema: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let found = schemas
            .get(schema)
            .unwrap_or_else(|| panic!("{schema} registered"));
        assert_object_schema_has_field(found, field);
    }

    #[rstest]
    #[case("/api/v1/login")]
    #[case("/api/v1/admin/users/{role}/{id}/password")]
    #[case("/api/v1/patients/{id}/events")]
    #[case("/api/v1/profile/image")]
    #[case("/api/v1/registrations/image")]
    #[case("/health/ready")]
    fn endpoints_are_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "{path} missing");
    }

    #[test]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
