//! Tests for sign-in and session discovery handlers.

use super::*;
use crate::domain::ports::{CareApiError, MockCareApi};
use crate::domain::{AuthenticatedAccount, RecordId};
use crate::inbound::http::admin::list_users;
use crate::inbound::http::test_utils::{fixture_state, session_cookie, state_with, test_app};
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::Value;

#[derive(Debug)]
struct ValidationExpectation<'a> {
    message: &'a str,
    field: &'a str,
    code: &'a str,
}

fn session_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(login)
        .service(logout)
        .service(current_session)
        .service(dashboard);
}

async fn sign_in<S>(app: &S, identifier: &str, password: &str) -> ServiceResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(&LoginRequest {
            identifier: identifier.into(),
            password: password.into(),
        })
        .to_request();
    actix_test::call_service(app, request).await
}

#[rstest]
#[case(
    "   ",
    "password",
    ValidationExpectation {
        message: "identifier must not be empty",
        field: "identifier",
        code: "empty_identifier",
    }
)]
#[case(
    "GV - AA - 1",
    "",
    ValidationExpectation {
        message: "password must not be empty",
        field: "password",
        code: "empty_password",
    }
)]
#[actix_web::test]
async fn login_rejects_blank_credentials(
    #[case] identifier: &str,
    #[case] password: &str,
    #[case] expected: ValidationExpectation<'_>,
) {
    let app = actix_test::init_service(test_app(fixture_state(), session_routes)).await;
    let response = sign_in(&app, identifier, password).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["message"], expected.message);
    assert_eq!(value["code"], "invalid_request");
    assert_eq!(value["details"]["field"], expected.field);
    assert_eq!(value["details"]["code"], expected.code);
}

#[actix_web::test]
async fn login_rejects_wrong_password_with_unauthorised_status() {
    let app = actix_test::init_service(test_app(fixture_state(), session_routes)).await;
    let response = sign_in(&app, "GV - AA - 1", "wrong-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["code"], "unauthorized");
}

#[rstest]
#[case("GV - AA - 1", "admin", "/pages/admin")]
#[case("carla@guardian.example", "caregiver", "/pages/caregiver")]
#[case("GV - PT - 3", "patient", "/pages/patient")]
#[actix_web::test]
async fn login_classifies_role_and_landing(
    #[case] identifier: &str,
    #[case] role: &str,
    #[case] landing: &str,
) {
    let app = actix_test::init_service(test_app(fixture_state(), session_routes)).await;
    let response = sign_in(&app, identifier, "password").await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    let body: LandingResponse = actix_test::read_body_json(response).await;
    assert_eq!(body.role.map(Role::as_str), Some(role));
    assert_eq!(body.landing, landing);

    let session = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/session")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    let body: SessionResponse = actix_test::read_body_json(session).await;
    assert!(body.authenticated);
    assert!(body.verified);
    assert_eq!(body.landing, landing);
}

#[actix_web::test]
async fn login_refuses_accounts_without_a_role_code() {
    let mut api = MockCareApi::new();
    api.expect_authenticate().returning(|_| {
        Ok(AuthenticatedAccount {
            id: RecordId::new(9),
            username: "visitor".to_owned(),
            upstream: UpstreamSession::new("JSESSIONID=x"),
        })
    });
    let app = actix_test::init_service(test_app(state_with(api), session_routes)).await;
    let response = sign_in(&app, "visitor", "password").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(
        response
            .response()
            .cookies()
            .all(|cookie| cookie.name() != "session")
    );
}

#[actix_web::test]
async fn login_without_an_issued_credential_is_not_persisted() {
    let mut api = MockCareApi::new();
    api.expect_authenticate().returning(|_| {
        Ok(AuthenticatedAccount {
            id: RecordId::new(1),
            username: "GV - AA - 1".to_owned(),
            upstream: UpstreamSession::new(""),
        })
    });
    let app = actix_test::init_service(test_app(state_with(api), session_routes)).await;
    let response = sign_in(&app, "GV - AA - 1", "password").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(
        response
            .response()
            .cookies()
            .all(|cookie| cookie.name() != "session")
    );
}

#[actix_web::test]
async fn login_reports_unreachable_care_api() {
    let mut api = MockCareApi::new();
    api.expect_authenticate()
        .returning(|_| Err(CareApiError::transport("connection refused")));
    let app = actix_test::init_service(test_app(state_with(api), session_routes)).await;
    let response = sign_in(&app, "GV - AA - 1", "password").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn anonymous_session_lands_on_login() {
    let app = actix_test::init_service(test_app(fixture_state(), session_routes)).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/session").to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: SessionResponse = actix_test::read_body_json(response).await;
    assert!(!body.authenticated);
    assert_eq!(body.role, None);
    assert_eq!(body.landing, "/");
}

#[actix_web::test]
async fn legacy_cookies_are_upgraded_and_expired() {
    let app = actix_test::init_service(test_app(fixture_state(), session_routes)).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/session")
            .insert_header((header::COOKIE, "username=GV%20-%20PT%20-%203; userId=3"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    let expired: Vec<Cookie<'_>> = response
        .response()
        .cookies()
        .filter(|cookie| cookie.name() == "username" || cookie.name() == "userId")
        .collect();
    assert_eq!(expired.len(), 2);
    assert!(expired.iter().all(|cookie| cookie.value().is_empty()));
    let body: SessionResponse = actix_test::read_body_json(response).await;
    assert!(body.authenticated);
    assert!(!body.verified);
    assert_eq!(body.landing, "/pages/patient");

    let again = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/session")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let body: SessionResponse = actix_test::read_body_json(again).await;
    assert!(!body.verified);
    assert_eq!(body.landing, "/pages/patient");

    let descriptor = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/dashboard")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(descriptor.status(), StatusCode::UNAUTHORIZED);
    let value: Value = actix_test::read_body_json(descriptor).await;
    assert_eq!(value["details"]["code"], "unverified_session");
}

#[actix_web::test]
async fn forged_legacy_admin_cookie_cannot_list_users() {
    let app = actix_test::init_service(test_app(fixture_state(), |cfg: &mut web::ServiceConfig| {
        session_routes(cfg);
        cfg.service(list_users);
    }))
    .await;
    let upgraded = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/session")
            .insert_header((header::COOKIE, "username=GV%20-%20AA%20-%201; userId=1"))
            .to_request(),
    )
    .await;
    let cookie = session_cookie(&upgraded);

    let listing = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/admin/users")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(listing.status(), StatusCode::UNAUTHORIZED);

    let without_session = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/admin/users")
            .insert_header((header::COOKIE, "username=GV%20-%20AA%20-%201; userId=1"))
            .to_request(),
    )
    .await;
    assert_eq!(without_session.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn unrecognised_legacy_cookie_stays_anonymous() {
    let app = actix_test::init_service(test_app(fixture_state(), session_routes)).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/session")
            .insert_header((header::COOKIE, "username=GV%20-%20ZZ%20-%203"))
            .to_request(),
    )
    .await;
    let body: SessionResponse = actix_test::read_body_json(response).await;
    assert!(!body.authenticated);
    assert_eq!(body.landing, "/");
}

#[actix_web::test]
async fn dashboard_requires_a_session() {
    let app = actix_test::init_service(test_app(fixture_state(), session_routes)).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/dashboard").to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn dashboard_lists_role_capabilities() {
    let app = actix_test::init_service(test_app(fixture_state(), session_routes)).await;
    let signed_in = sign_in(&app, "GV - AA - 1", "password").await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/dashboard")
            .cookie(session_cookie(&signed_in))
            .to_request(),
    )
    .await;
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["route"], "/pages/admin");
    let capabilities = value["capabilities"].as_array().expect("capabilities");
    assert!(capabilities.iter().any(|c| c == "deleteUsers"));
    assert!(!capabilities.iter().any(|c| c == "viewOwnEvents"));
}

#[actix_web::test]
async fn logout_purges_the_session() {
    let app = actix_test::init_service(test_app(fixture_state(), session_routes)).await;
    let signed_in = sign_in(&app, "GV - CC - 2", "password").await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(session_cookie(&signed_in))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(session_cookie(&response).value(), "");
    let body: LandingResponse = actix_test::read_body_json(response).await;
    assert_eq!(body.landing, "/");
}
