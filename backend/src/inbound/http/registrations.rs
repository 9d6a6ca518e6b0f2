//! Account registration handlers.
//!
//! ```text
//! POST /api/v1/registrations/validate {"role":"patient","field":"age","value":"7a"}
//! POST /api/v1/registrations/image?fileName=me.png   (raw image body)
//! POST /api/v1/registrations {"role":"admin","fields":{"email":"a@b.co",...}}
//! ```
//!
//! Blur validation checks one field at a time; submission re-derives every
//! field's error from the submitted values, so a form whose fields were never
//! touched still fails on its required fields. Patients upload their profile
//! image first and submit the returned URL as `profile_image`.

use std::collections::BTreeMap;

use actix_web::{HttpRequest, HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{RegistrationForm, UpstreamSession, validate_field};
use crate::inbound::http::ApiResult;
use crate::inbound::http::profile::{ImageQuery, ImageResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    form_errors, image_upload, parse_field, parse_fields, parse_role,
};

/// One field check for `POST /api/v1/registrations/validate`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldCheckRequest {
    #[schema(example = "patient")]
    pub role: String,
    #[schema(example = "age")]
    pub field: String,
    #[serde(default)]
    #[schema(example = "7a")]
    pub value: String,
}

/// Outcome of a field check; `error` is absent when the value passes.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldCheckResponse {
    #[schema(example = "age")]
    pub field: String,
    #[schema(example = "Valid age is required")]
    pub error: Option<String>,
}

/// Registration submission for `POST /api/v1/registrations`.
///
/// `fields` maps wire field names (`first_name`, `emergency_contact_number`,
/// ...) to their raw values.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    #[schema(example = "caregiver")]
    pub role: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

/// Username the care API assigned to a new account.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    #[schema(example = "GV - CC - 100")]
    pub username: String,
}

/// Validate one registration field as the user leaves it.
#[utoipa::path(
    post,
    path = "/api/v1/registrations/validate",
    request_body = FieldCheckRequest,
    responses(
        (status = 200, description = "Field check result", body = FieldCheckResponse),
        (status = 400, description = "Unknown role or field", body = ErrorSchema)
    ),
    tags = ["registrations"],
    operation_id = "validateRegistrationField",
    security([])
)]
#[post("/registrations/validate")]
pub async fn validate_registration_field(
    payload: web::Json<FieldCheckRequest>,
) -> ApiResult<web::Json<FieldCheckResponse>> {
    let FieldCheckRequest { role, field, value } = payload.into_inner();
    let role = parse_role(&role)?;
    let field = parse_field(&field)?;
    let error = validate_field(field, &value, role).map(|error| error.message.to_owned());
    Ok(web::Json(FieldCheckResponse {
        field: field.as_str().to_owned(),
        error,
    }))
}

/// Store a registration profile image before the account exists.
///
/// The body is the raw image, capped like self-service uploads. The care API
/// presigns the slot without a session cookie since nobody is signed in yet.
#[utoipa::path(
    post,
    path = "/api/v1/registrations/image",
    params(ImageQuery),
    request_body(content = Vec<u8>, content_type = "image/*"),
    responses(
        (status = 200, description = "Image stored", body = ImageResponse),
        (status = 400, description = "Not an acceptable image", body = ErrorSchema),
        (status = 413, description = "Image too large"),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["registrations"],
    operation_id = "uploadRegistrationImage",
    security([])
)]
#[post("/registrations/image")]
pub async fn upload_registration_image(
    req: HttpRequest,
    state: web::Data<HttpState>,
    query: web::Query<ImageQuery>,
    body: web::Bytes,
) -> ApiResult<web::Json<ImageResponse>> {
    let image = image_upload(&req, &query.file_name, &body, state.max_upload_bytes)?;
    let anonymous = UpstreamSession::anonymous();
    let target = state.care_api.presign_upload(&anonymous, &image).await?;
    state.care_api.upload_object(&target, &image).await?;
    info!(bytes = image.bytes().len(), "registration image uploaded");
    Ok(web::Json(ImageResponse {
        file_url: target.file_url,
    }))
}

/// Validate a complete registration form and create the account.
///
/// Any failing field blocks submission with `400` and `details.fields`.
/// `employee_id` is checked for caregivers but never sent upstream.
#[utoipa::path(
    post,
    path = "/api/v1/registrations",
    request_body = RegistrationRequest,
    responses(
        (status = 201, description = "Account created", body = RegistrationResponse),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 409, description = "Account already exists", body = ErrorSchema),
        (status = 503, description = "Care API unavailable", body = ErrorSchema)
    ),
    tags = ["registrations"],
    operation_id = "register",
    security([])
)]
#[post("/registrations")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegistrationRequest>,
) -> ApiResult<HttpResponse> {
    let RegistrationRequest { role, fields } = payload.into_inner();
    let role = parse_role(&role)?;
    let form = RegistrationForm::new(role, parse_fields(fields)?);
    let new_user = form.into_new_user().map_err(|errors| form_errors(&errors))?;
    let account = state.care_api.register(&new_user).await?;
    info!(%role, "registered account");
    Ok(HttpResponse::Created().json(RegistrationResponse {
        username: account.username,
    }))
}
