//! Self-service profile handlers.
//!
//! ```text
//! PUT  /api/v1/profile {"fields":{"mobile_number":"09171234567"}}
//! PUT  /api/v1/profile/password {"newPassword":"secret1"}
//! POST /api/v1/profile/image?fileName=me.png   (raw image body)
//! ```

use std::collections::BTreeMap;

use actix_web::{HttpRequest, HttpResponse, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Capability, Error, FormField, PasswordChange, ProfileUpdate};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{field_error, form_errors, image_upload, parse_fields};

/// Field changes keyed by form field name (`first_name`, `age`, ...).
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChangesRequest {
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

/// Replacement password.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRequest {
    #[schema(example = "secret1")]
    pub new_password: String,
}

/// Query parameters for the raw image upload endpoints.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ImageQuery {
    /// Original file name of the image.
    pub file_name: String,
}

/// Public URL of an uploaded profile image.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    #[schema(example = "https://storage.guardian.example/me.png")]
    pub file_url: String,
}

/// Edit the signed-in account's profile fields.
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    request_body = ProfileChangesRequest,
    responses(
        (status = 204, description = "Profile updated"),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Care API unavailable", body = ErrorSchema)
    ),
    tags = ["profile"],
    operation_id = "updateProfile"
)]
#[put("/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfileChangesRequest>,
) -> ApiResult<HttpResponse> {
    let signed_in = session.require_session()?;
    signed_in.require(Capability::EditOwnProfile)?;
    let key = signed_in.user_key()?;
    let update = ProfileUpdate::try_new(key.role(), parse_fields(payload.into_inner().fields)?)
        .map_err(|errors| form_errors(&errors))?;
    if update.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    state
        .care_api
        .update_user(&signed_in.upstream, key, &update)
        .await?;
    info!(user = %key, fields = update.changes().len(), "profile updated");
    Ok(HttpResponse::NoContent().finish())
}

/// Change the signed-in account's password.
#[utoipa::path(
    put,
    path = "/api/v1/profile/password",
    request_body = PasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Password too short", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["profile"],
    operation_id = "changePassword"
)]
#[put("/profile/password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PasswordRequest>,
) -> ApiResult<HttpResponse> {
    let signed_in = session.require_session()?;
    signed_in.require(Capability::EditOwnProfile)?;
    let key = signed_in.user_key()?;
    let change = PasswordChange::try_new(&payload.new_password).map_err(|err| field_error(&err))?;
    state
        .care_api
        .update_password(&signed_in.upstream, key, &change)
        .await?;
    info!(user = %key, "password changed");
    Ok(HttpResponse::NoContent().finish())
}

/// Upload a new profile image and point the profile at it.
///
/// The body is the raw image; its `Content-Type` must be `image/*`. The
/// image goes to the storage slot the care API presigns, then the profile's
/// image URL is updated.
#[utoipa::path(
    post,
    path = "/api/v1/profile/image",
    params(ImageQuery),
    request_body(content = Vec<u8>, content_type = "image/*"),
    responses(
        (status = 200, description = "Image stored", body = ImageResponse),
        (status = 400, description = "Not an acceptable image", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Role has no profile image", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["profile"],
    operation_id = "uploadProfileImage"
)]
#[post("/profile/image")]
pub async fn upload_image(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ImageQuery>,
    body: web::Bytes,
) -> ApiResult<web::Json<ImageResponse>> {
    let signed_in = session.require_session()?;
    signed_in.require(Capability::EditOwnProfile)?;
    let key = signed_in.user_key()?;
    if !FormField::ProfileImage.applies_to(key.role()) {
        return Err(Error::forbidden("this account has no profile image"));
    }
    let image = image_upload(&req, &query.file_name, &body, state.max_upload_bytes)?;

    let target = state
        .care_api
        .presign_upload(&signed_in.upstream, &image)
        .await?;
    state.care_api.upload_object(&target, &image).await?;
    let update = ProfileUpdate::image_url(key.role(), target.file_url.clone());
    state
        .care_api
        .update_user(&signed_in.upstream, key, &update)
        .await?;
    info!(user = %key, bytes = image.bytes().len(), "profile image uploaded");
    Ok(web::Json(ImageResponse {
        file_url: target.file_url,
    }))
}
