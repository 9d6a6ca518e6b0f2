//! Sign-in, sign-out and session discovery handlers.
//!
//! ```text
//! POST /api/v1/login {"identifier":"GV - CC - 2","password":"password"}
//! POST /api/v1/logout
//! GET /api/v1/session
//! GET /api/v1/dashboard
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::{
    ActiveSession, DashboardDescriptor, Error, LOGIN_ROUTE, LoginCredentials,
    LoginValidationError, Role, SessionState, UpstreamSession,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::legacy_cookies;
use crate::inbound::http::schemas::{DashboardDescriptorSchema, ErrorSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/login`.
///
/// `identifier` accepts either the account's `GV - <CODE> - <N>` username or
/// its email address.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(alias = "username", alias = "email")]
    pub identifier: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.identifier, &value.password)
    }
}

/// Where the client should navigate next.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LandingResponse {
    #[schema(value_type = Option<String>, example = "caregiver")]
    pub role: Option<Role>,
    #[schema(example = "GV - CC - 2")]
    pub username: Option<String>,
    #[schema(example = "/pages/caregiver")]
    pub landing: String,
}

/// Session discovery payload for `GET /api/v1/session`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub authenticated: bool,
    /// False for identities carried over from legacy cookies; those must
    /// sign in before any account endpoint answers.
    pub verified: bool,
    #[schema(value_type = Option<String>, example = "patient")]
    pub role: Option<Role>,
    pub username: Option<String>,
    #[schema(example = "/pages/patient")]
    pub landing: String,
}

impl SessionResponse {
    fn from_state(state: &SessionState, verified: bool) -> Self {
        match state {
            SessionState::Authenticated(session) => Self {
                authenticated: true,
                verified,
                role: Some(session.role()),
                username: Some(session.username().to_owned()),
                landing: state.landing_route().to_owned(),
            },
            SessionState::Anonymous => Self {
                authenticated: false,
                verified: false,
                role: None,
                username: None,
                landing: state.landing_route().to_owned(),
            },
        }
    }
}

/// Authenticate against the care API and establish a session.
///
/// The account's role is classified from its username. Accounts whose
/// username carries no recognised role code are refused.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LandingResponse, headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 403, description = "Account role not recognised", body = ErrorSchema),
        (status = 503, description = "Care API unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error")
    ),
    tags = ["session"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LandingResponse>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let account = state.care_api.authenticate(&credentials).await?;
    if !account.upstream.is_issued() {
        tracing::error!("care api login succeeded without issuing a session cookie");
        return Err(Error::service_unavailable("care api did not issue a session"));
    }
    let identity = ActiveSession::from_username(account.username.clone(), Some(account.id))
        .ok_or_else(|| {
            Error::forbidden("account role not recognised")
                .with_details(json!({ "code": "unknown_role" }))
        })?;
    session.persist(&identity, &account.upstream)?;
    info!(role = %identity.role(), "signed in");
    Ok(web::Json(LandingResponse {
        role: Some(identity.role()),
        username: Some(identity.username().to_owned()),
        landing: identity.role().dashboard_route().to_owned(),
    }))
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyIdentifier => {
            Error::invalid_request("identifier must not be empty")
                .with_details(json!({ "field": "identifier", "code": "empty_identifier" }))
        }
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// End the session and expire any legacy identity cookies.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 200, description = "Signed out", body = LandingResponse)
    ),
    tags = ["session"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    let mut response = HttpResponse::Ok();
    legacy_cookies::expire(&mut response);
    response.json(LandingResponse {
        role: None,
        username: None,
        landing: LOGIN_ROUTE.to_owned(),
    })
}

/// Report who is signed in and where they should land.
///
/// Visitors without a session but with the plaintext `username`/`userId`
/// cookies of earlier dashboard builds keep their landing route: the identity
/// moves into the encrypted session marked unverified and the plaintext
/// cookies are expired. Plaintext cookies are forgeable, so an unverified
/// identity only steers navigation; every account endpoint answers `401`
/// until the visitor signs in. Anything unrecognised resolves silently to the
/// login landing.
#[utoipa::path(
    get,
    path = "/api/v1/session",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 500, description = "Internal server error")
    ),
    tags = ["session"],
    operation_id = "currentSession",
    security([])
)]
#[get("/session")]
pub async fn current_session(req: HttpRequest, session: SessionContext) -> ApiResult<HttpResponse> {
    if let Some(identity) = session.active_session()? {
        let verified = session.is_verified()?;
        let state = SessionState::Authenticated(identity);
        return Ok(HttpResponse::Ok().json(SessionResponse::from_state(&state, verified)));
    }

    let legacy = legacy_cookies::resolve_request(&req);
    let mut response = HttpResponse::Ok();
    if let SessionState::Authenticated(identity) = &legacy {
        session.persist(identity, &UpstreamSession::anonymous())?;
        legacy_cookies::expire(&mut response);
        info!(role = %identity.role(), "carried legacy cookie identity as unverified");
    }
    Ok(response.json(SessionResponse::from_state(&legacy, false)))
}

/// Dashboard descriptor for the signed-in role.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard for the session's role", body = DashboardDescriptorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["session"],
    operation_id = "dashboard"
)]
#[get("/dashboard")]
pub async fn dashboard(session: SessionContext) -> ApiResult<web::Json<DashboardDescriptor>> {
    let signed_in = session.require_session()?;
    Ok(web::Json(signed_in.dashboard()))
}

#[cfg(test)]
mod tests;
