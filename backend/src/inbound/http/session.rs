//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations: persisting the signed-in identity together
//! with its upstream credential, reading it back, and signing out. The
//! session cookie is encrypted and `HttpOnly`, so page scripts can neither
//! read nor forge it.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{ActiveSession, Capability, DashboardDescriptor, Error, UpstreamSession, UserKey};

pub(crate) const IDENTITY_KEY: &str = "identity";
pub(crate) const UPSTREAM_KEY: &str = "upstream";

/// Identity and upstream credential of a signed-in request.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub identity: ActiveSession,
    pub upstream: UpstreamSession,
}

impl SignedIn {
    /// Composite key of the signed-in account.
    ///
    /// Sessions upgraded from legacy cookies may lack the numeric id; those
    /// must sign in again before using per-account endpoints.
    pub fn user_key(&self) -> Result<UserKey, Error> {
        self.identity
            .user_key()
            .ok_or_else(|| Error::unauthorized("session has no account id; sign in again"))
    }

    /// Dashboard descriptor for the signed-in role.
    pub fn dashboard(&self) -> DashboardDescriptor {
        DashboardDescriptor::for_role(self.identity.role())
    }

    /// Fail with `403 Forbidden` unless the role grants `capability`.
    pub fn require(&self, capability: Capability) -> Result<(), Error> {
        self.dashboard().require(capability)
    }
}

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist a signed-in identity and rotate the session cookie.
    pub fn persist(&self, identity: &ActiveSession, upstream: &UpstreamSession) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(IDENTITY_KEY, identity)
            .and_then(|()| self.0.insert(UPSTREAM_KEY, upstream.expose()))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the signed-in identity, if present.
    ///
    /// An entry that no longer decodes is treated as signed out.
    pub fn active_session(&self) -> Result<Option<ActiveSession>, Error> {
        match self.0.get::<ActiveSession>(IDENTITY_KEY) {
            Ok(identity) => Ok(identity),
            Err(error) => {
                tracing::warn!(%error, "unreadable identity in session cookie");
                Ok(None)
            }
        }
    }

    /// Upstream credential stored beside the identity, if any.
    fn upstream(&self) -> Result<Option<UpstreamSession>, Error> {
        self.0
            .get::<String>(UPSTREAM_KEY)
            .map(|raw| raw.map(UpstreamSession::new))
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))
    }

    /// Whether the stored identity was established by a care API login.
    ///
    /// Identities upgraded from legacy cookies only steer navigation.
    pub fn is_verified(&self) -> Result<bool, Error> {
        Ok(self.upstream()?.is_some_and(|upstream| upstream.is_issued()))
    }

    /// Require a verified signed-in identity or return `401 Unauthorized`.
    pub fn require_session(&self) -> Result<SignedIn, Error> {
        let identity = self
            .active_session()?
            .ok_or_else(|| Error::unauthorized("login required"))?;
        let upstream = self
            .upstream()?
            .filter(UpstreamSession::is_issued)
            .ok_or_else(|| {
                Error::unauthorized("login required").with_details(serde_json::json!({
                    "code": "unverified_session",
                }))
            })?;
        Ok(SignedIn { identity, upstream })
    }

    /// Drop every session entry; the response expires the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RecordId, Role};
    use crate::inbound::http::test_utils::session_cookie;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test, web};
    use rstest::rstest;

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .route(
                "/set",
                web::get().to(|session: SessionContext| async move {
                    let identity = ActiveSession::from_username("GV - CC - 2", Some(RecordId::new(2)))
                        .expect("fixture identity");
                    session.persist(&identity, &UpstreamSession::new("JSESSIONID=abc"))?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/get",
                web::get().to(|session: SessionContext| async move {
                    let signed_in = session.require_session()?;
                    Ok::<_, Error>(HttpResponse::Ok().body(format!(
                        "{}|{}|{}",
                        signed_in.identity.role(),
                        signed_in.user_key()?,
                        signed_in.upstream.expose()
                    )))
                }),
            )
            .route(
                "/logout",
                web::get().to(|session: SessionContext| async move {
                    session.purge();
                    HttpResponse::Ok()
                }),
            )
    }

    #[actix_web::test]
    async fn round_trips_identity_and_upstream_credential() {
        let app = actix_test::init_service(session_test_app()).await;

        let set_res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set_res.status(), StatusCode::OK);
        let cookie = session_cookie(&set_res);
        assert!(cookie.http_only().unwrap_or(false));

        let get_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/get").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(get_res.status(), StatusCode::OK);
        let body = actix_test::read_body(get_res).await;
        assert_eq!(body, "caregiver|caregiver-2|JSESSIONID=abc");
    }

    #[actix_web::test]
    async fn missing_session_is_unauthorised() {
        let app = actix_test::init_service(session_test_app()).await;
        let res = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/get").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn plaintext_cookie_is_not_a_session() {
        let app = actix_test::init_service(session_test_app()).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/get")
                .cookie(Cookie::new("session", r#"{"identity":"GV - AA - 1"}"#))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn tampered_identity_is_unauthorised() {
        let app = actix_test::init_service(
            session_test_app().route(
                "/set-invalid",
                web::get().to(|session: Session| async move {
                    session
                        .insert(IDENTITY_KEY, "not-an-identity")
                        .expect("set invalid identity");
                    session
                        .insert(UPSTREAM_KEY, "")
                        .expect("set upstream credential");
                    HttpResponse::Ok()
                }),
            ),
        )
        .await;

        let set_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/set-invalid").to_request(),
        )
        .await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/get")
                .cookie(session_cookie(&set_res))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn purge_expires_the_cookie() {
        let app = actix_test::init_service(session_test_app()).await;
        let set_res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/set").to_request()).await;
        let cookie = session_cookie(&set_res);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/logout").cookie(cookie).to_request(),
        )
        .await;
        let removal = session_cookie(&res);
        assert_eq!(removal.value(), "");
    }

    #[rstest]
    fn capabilities_follow_the_role() {
        let signed_in = SignedIn {
            identity: ActiveSession::from_username("GV - PT - 3", Some(RecordId::new(3)))
                .expect("identity"),
            upstream: UpstreamSession::new(""),
        };
        assert!(signed_in.require(Capability::ViewOwnEvents).is_ok());
        let err = signed_in
            .require(Capability::ListUsers)
            .expect_err("patients cannot list users");
        assert_eq!(err.code(), crate::domain::ErrorCode::Forbidden);
    }

    #[rstest]
    fn legacy_session_without_id_has_no_key() {
        let signed_in = SignedIn {
            identity: ActiveSession::from_username("GV - PT", None).expect("identity"),
            upstream: UpstreamSession::new(""),
        };
        assert_eq!(signed_in.identity.role(), Role::Patient);
        assert!(signed_in.user_key().is_err());
    }
}
