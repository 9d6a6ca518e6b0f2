//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test as actix_test, web};
use serde::Deserialize;
use serde_json::json;

use crate::domain::ports::{CareApi, FixtureCareApi};
use crate::domain::{ActiveSession, Error, RecordId, UpstreamSession};
use crate::inbound::http::error::{json_config, query_config};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Test-only route that signs the caller in without the care API.
pub const TEST_SIGN_IN_PATH: &str = "/test/sign-in";

/// Upstream credential stored by [`TEST_SIGN_IN_PATH`].
pub const TEST_UPSTREAM: &str = "JSESSIONID=test";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Handler state over the fixture care API.
pub fn fixture_state() -> web::Data<HttpState> {
    web::Data::new(HttpState::new(Arc::new(FixtureCareApi)))
}

/// Handler state over any care API, typically a `MockCareApi`.
pub fn state_with(api: impl CareApi + 'static) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(Arc::new(api)))
}

/// The `session` cookie set by a response.
pub fn session_cookie(res: &ServiceResponse) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// App with session middleware, extractor error handlers, the test sign-in
/// route and `routes` mounted under `/api/v1`.
pub fn test_app<F>(
    state: web::Data<HttpState>,
    routes: F,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    F: FnOnce(&mut web::ServiceConfig) + 'static,
{
    App::new()
        .app_data(state)
        .app_data(json_config())
        .app_data(query_config())
        .wrap(test_session_middleware())
        .route(TEST_SIGN_IN_PATH, web::post().to(sign_in_as))
        .service(web::scope("/api/v1").configure(routes))
}

#[derive(Deserialize)]
struct TestIdentity {
    username: String,
    id: Option<i64>,
}

async fn sign_in_as(
    session: SessionContext,
    payload: web::Json<TestIdentity>,
) -> Result<HttpResponse, Error> {
    let TestIdentity { username, id } = payload.into_inner();
    let identity = ActiveSession::from_username(username, id.map(RecordId::new))
        .ok_or_else(|| Error::invalid_request("username carries no role code"))?;
    session.persist(&identity, &UpstreamSession::new(TEST_UPSTREAM))?;
    Ok(HttpResponse::NoContent().finish())
}

/// Sign in as `username` with account `id` and return the session cookie.
pub async fn signed_in_cookie<S>(app: &S, username: &str, id: Option<i64>) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri(TEST_SIGN_IN_PATH)
            .set_json(json!({ "username": username, "id": id }))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "test sign-in failed");
    session_cookie(&res)
}
