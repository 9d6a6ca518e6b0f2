//! Administrator user-management handlers.
//!
//! ```text
//! GET    /api/v1/admin/users?expand=true
//! PUT    /api/v1/admin/users/{role}/{id}
//! PUT    /api/v1/admin/users/{role}/{id}/password
//! DELETE /api/v1/admin/users/{role}/{id}
//! ```
//!
//! Records are addressed by role and id together because ids repeat across
//! roles.

use actix_web::{HttpResponse, delete, get, put, web};
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

use crate::domain::{Capability, PasswordChange, ProfileUpdate, RecordId, UserKey, UserRecord};
use crate::inbound::http::ApiResult;
use crate::inbound::http::profile::{PasswordRequest, ProfileChangesRequest};
use crate::inbound::http::schemas::{ErrorSchema, UserRecordSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{field_error, form_errors, parse_fields, parse_role};

/// Query parameters for `GET /api/v1/admin/users`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    /// Fetch each caregiver's assigned patients as well.
    #[serde(default)]
    pub expand: bool,
}

/// Path parameters addressing one account.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct UserPath {
    /// `admin`, `caregiver` or `patient`.
    pub role: String,
    pub id: i64,
}

impl UserPath {
    fn key(&self) -> ApiResult<UserKey> {
        Ok(UserKey::new(parse_role(&self.role)?, RecordId::new(self.id)))
    }
}

/// Every account, admins first, then caregivers, then patients.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Merged user directory", body = [UserRecordSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 503, description = "User directory unavailable", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listUsers"
)]
#[get("/admin/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<UserListQuery>,
) -> ApiResult<web::Json<Vec<UserRecord>>> {
    let signed_in = session.require_session()?;
    signed_in.require(Capability::ListUsers)?;
    let users = state
        .aggregator
        .list_users(&signed_in.upstream, query.expand)
        .await?;
    Ok(web::Json(users))
}

/// Edit another account's profile fields.
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{role}/{id}",
    params(UserPath),
    request_body = ProfileChangesRequest,
    responses(
        (status = 204, description = "Account updated"),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Account not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminUpdateUser"
)]
#[put("/admin/users/{role}/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<UserPath>,
    payload: web::Json<ProfileChangesRequest>,
) -> ApiResult<HttpResponse> {
    let signed_in = session.require_session()?;
    signed_in.require(Capability::EditUsers)?;
    let key = path.key()?;
    let update = ProfileUpdate::try_new(key.role(), parse_fields(payload.into_inner().fields)?)
        .map_err(|errors| form_errors(&errors))?;
    state
        .care_api
        .admin_update_user(&signed_in.upstream, key, &update)
        .await?;
    info!(target_user = %key, "administrator updated account");
    Ok(HttpResponse::NoContent().finish())
}

/// Reset another account's password.
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{role}/{id}/password",
    params(UserPath),
    request_body = PasswordRequest,
    responses(
        (status = 204, description = "Password reset"),
        (status = 400, description = "Password too short", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Account not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminResetPassword"
)]
#[put("/admin/users/{role}/{id}/password")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<UserPath>,
    payload: web::Json<PasswordRequest>,
) -> ApiResult<HttpResponse> {
    let signed_in = session.require_session()?;
    signed_in.require(Capability::ResetPasswords)?;
    let key = path.key()?;
    let change = PasswordChange::try_new(&payload.new_password).map_err(|err| field_error(&err))?;
    state
        .care_api
        .admin_update_password(&signed_in.upstream, key, &change)
        .await?;
    info!(target_user = %key, "administrator reset password");
    Ok(HttpResponse::NoContent().finish())
}

/// Delete an account.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{role}/{id}",
    params(UserPath),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 400, description = "Unknown role", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Account not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "deleteUser"
)]
#[delete("/admin/users/{role}/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<UserPath>,
) -> ApiResult<HttpResponse> {
    let signed_in = session.require_session()?;
    signed_in.require(Capability::DeleteUsers)?;
    let key = path.key()?;
    state.care_api.delete_user(&signed_in.upstream, key).await?;
    info!(target_user = %key, "administrator deleted account");
    Ok(HttpResponse::NoContent().finish())
}
