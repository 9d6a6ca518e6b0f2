//! Reqwest-backed adapter for the care REST API.
//!
//! This adapter owns transport details only: URL construction, credential
//! replay, timeout and status mapping, and JSON decoding into domain records.
//! Failures are returned once; there are no retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, HeaderMap, SET_COOKIE, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::dto::{
    DirectoryDto, EventDto, LoginRequestDto, LoginResponseDto, NewUserDto, PasswordDto,
    PresignRequestDto, PresignResponseDto, RegisteredDto, UserDto, canonical_keys, update_body,
};
use crate::domain::ports::{CareApi, CareApiError};
use crate::domain::{
    Administrator, AuthenticatedAccount, Caregiver, EventKind, EventRecord, ImageUpload,
    LoginCredentials, NewUser, PasswordChange, Patient, PresignedUpload, ProfileUpdate, RecordId,
    RegisteredAccount, Role, UpstreamSession, UserDirectory, UserKey, UserRecord,
};

const DEFAULT_USER_AGENT: &str = concat!("guardian-vision/", env!("CARGO_PKG_VERSION"));

/// Care API client issuing requests relative to one base URL.
pub struct CareApiHttpClient {
    client: Client,
    base: Url,
    user_agent: String,
}

impl CareApiHttpClient {
    /// Build a client with an explicit per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::with_user_agent(base, timeout, DEFAULT_USER_AGENT)
    }

    /// Build a client sending a custom user agent.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_user_agent(
        mut base: Url,
        timeout: Duration,
        user_agent: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            user_agent: user_agent.into(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, CareApiError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|error| CareApiError::transport(format!("invalid endpoint {path}: {error}")))
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        session: Option<&UpstreamSession>,
    ) -> Result<RequestBuilder, CareApiError> {
        let mut builder = self
            .client
            .request(method, self.endpoint(path)?)
            .header(USER_AGENT, self.user_agent.as_str())
            .header(ACCEPT, "application/json");
        if let Some(session) = session.filter(|session| session.is_issued()) {
            builder = builder.header(COOKIE, session.expose());
        }
        Ok(builder)
    }

    async fn execute(
        &self,
        builder: RequestBuilder,
    ) -> Result<(HeaderMap, Vec<u8>), CareApiError> {
        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok((headers, body.to_vec()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        session: &UpstreamSession,
        path: &str,
    ) -> Result<T, CareApiError> {
        let (_, body) = self
            .execute(self.request(Method::GET, path, Some(session))?)
            .await?;
        decode(&body)
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        session: Option<&UpstreamSession>,
        path: &str,
        body: &B,
    ) -> Result<(HeaderMap, Vec<u8>), CareApiError> {
        self.execute(self.request(method, path, session)?.json(body))
            .await
    }

    async fn events(
        &self,
        session: &UpstreamSession,
        kind: EventKind,
        patient_id: RecordId,
    ) -> Result<Vec<EventRecord>, CareApiError> {
        let segment = match kind {
            EventKind::Alert => "alerts",
            EventKind::Outage => "outages",
        };
        let dtos: Vec<EventDto> = self
            .get_json(session, &format!("api/{segment}/patient/{patient_id}"))
            .await?;
        Ok(events_from(dtos, kind))
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, CareApiError> {
    serde_json::from_slice::<Value>(body)
        .map(canonical_keys)
        .and_then(serde_json::from_value)
        .map_err(|error| CareApiError::decode(format!("invalid care api JSON payload: {error}")))
}

/// Map event DTOs, dropping records whose timestamp cannot be read.
fn events_from(dtos: Vec<EventDto>, kind: EventKind) -> Vec<EventRecord> {
    dtos.into_iter()
        .filter_map(|dto| match dto.into_domain(kind) {
            Ok(record) => Some(record),
            Err(reason) => {
                tracing::warn!(?kind, %reason, "skipping unreadable event record");
                None
            }
        })
        .collect()
}

fn user_path(key: UserKey) -> String {
    format!("api/{}/{}", key.role().collection(), key.id())
}

fn admin_user_path(key: UserKey) -> String {
    format!("api/admins/users/{}/{}", key.role(), key.id())
}

/// Collapse `Set-Cookie` headers into a `Cookie` header value.
fn upstream_credential(headers: &HeaderMap) -> String {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .filter(|pair| pair.contains('='))
        .collect::<Vec<_>>()
        .join("; ")
}

#[async_trait]
impl CareApi for CareApiHttpClient {
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedAccount, CareApiError> {
        let body = LoginRequestDto {
            identifier: credentials.identifier(),
            password: credentials.password(),
        };
        let (headers, bytes) = self
            .send_json(Method::POST, None, "api/auth/login", &body)
            .await?;
        let account: LoginResponseDto = decode(&bytes)?;
        Ok(AuthenticatedAccount {
            id: RecordId::new(account.id),
            username: account.username,
            upstream: UpstreamSession::new(upstream_credential(&headers)),
        })
    }

    async fn directory(&self, session: &UpstreamSession) -> Result<UserDirectory, CareApiError> {
        let dto: DirectoryDto = self.get_json(session, "api/admins/users").await?;
        Ok(dto.into_domain())
    }

    async fn current_admin(
        &self,
        session: &UpstreamSession,
    ) -> Result<Administrator, CareApiError> {
        let dto: UserDto = self.get_json(session, "api/admins/me").await?;
        Ok(dto.into_admin())
    }

    async fn current_caregiver(
        &self,
        session: &UpstreamSession,
    ) -> Result<Caregiver, CareApiError> {
        let dto: UserDto = self.get_json(session, "api/caregivers/me").await?;
        Ok(dto.into_caregiver())
    }

    async fn fetch_user(
        &self,
        session: &UpstreamSession,
        key: UserKey,
    ) -> Result<UserRecord, CareApiError> {
        let dto: UserDto = self.get_json(session, &user_path(key)).await?;
        Ok(dto.into_record(key.role()))
    }

    async fn update_user(
        &self,
        session: &UpstreamSession,
        key: UserKey,
        update: &ProfileUpdate,
    ) -> Result<(), CareApiError> {
        self.send_json(Method::PUT, Some(session), &user_path(key), &update_body(update))
            .await
            .map(drop)
    }

    async fn update_password(
        &self,
        session: &UpstreamSession,
        key: UserKey,
        change: &PasswordChange,
    ) -> Result<(), CareApiError> {
        let body = PasswordDto {
            password: change.new_password(),
        };
        self.send_json(Method::PUT, Some(session), &user_path(key), &body)
            .await
            .map(drop)
    }

    async fn delete_user(
        &self,
        session: &UpstreamSession,
        key: UserKey,
    ) -> Result<(), CareApiError> {
        self.execute(self.request(Method::DELETE, &user_path(key), Some(session))?)
            .await
            .map(drop)
    }

    async fn admin_update_user(
        &self,
        session: &UpstreamSession,
        key: UserKey,
        update: &ProfileUpdate,
    ) -> Result<(), CareApiError> {
        self.send_json(
            Method::PUT,
            Some(session),
            &admin_user_path(key),
            &update_body(update),
        )
        .await
        .map(drop)
    }

    async fn admin_update_password(
        &self,
        session: &UpstreamSession,
        key: UserKey,
        change: &PasswordChange,
    ) -> Result<(), CareApiError> {
        let body = PasswordDto {
            password: change.new_password(),
        };
        let path = format!("{}/password", admin_user_path(key));
        self.send_json(Method::PUT, Some(session), &path, &body)
            .await
            .map(drop)
    }

    async fn caregiver(
        &self,
        session: &UpstreamSession,
        id: RecordId,
    ) -> Result<Caregiver, CareApiError> {
        let dto: UserDto = self
            .get_json(session, &user_path(UserKey::new(Role::Caregiver, id)))
            .await?;
        Ok(dto.into_caregiver())
    }

    async fn caregiver_patients(
        &self,
        session: &UpstreamSession,
        caregiver_id: RecordId,
    ) -> Result<Vec<Patient>, CareApiError> {
        let dtos: Vec<UserDto> = self
            .get_json(session, &format!("api/patients/caregiver/{caregiver_id}"))
            .await?;
        Ok(dtos.into_iter().map(UserDto::into_patient).collect())
    }

    async fn alerts(
        &self,
        session: &UpstreamSession,
        patient_id: RecordId,
    ) -> Result<Vec<EventRecord>, CareApiError> {
        self.events(session, EventKind::Alert, patient_id).await
    }

    async fn outages(
        &self,
        session: &UpstreamSession,
        patient_id: RecordId,
    ) -> Result<Vec<EventRecord>, CareApiError> {
        self.events(session, EventKind::Outage, patient_id).await
    }

    async fn register(&self, user: &NewUser) -> Result<RegisteredAccount, CareApiError> {
        let path = format!("api/{}", user.role.collection());
        let (_, bytes) = self
            .send_json(Method::POST, None, &path, &NewUserDto::from(user))
            .await?;
        let dto: RegisteredDto = decode(&bytes)?;
        Ok(RegisteredAccount {
            username: dto.username,
        })
    }

    async fn presign_upload(
        &self,
        session: &UpstreamSession,
        image: &ImageUpload,
    ) -> Result<PresignedUpload, CareApiError> {
        let body = PresignRequestDto {
            file_name: image.file_name(),
            content_type: image.content_type(),
        };
        let (_, bytes) = self
            .send_json(Method::POST, Some(session), "api/s3/presign", &body)
            .await?;
        let dto: PresignResponseDto = decode(&bytes)?;
        Ok(PresignedUpload {
            upload_url: dto.upload_url,
            file_url: dto.file_url,
        })
    }

    async fn upload_object(
        &self,
        target: &PresignedUpload,
        image: &ImageUpload,
    ) -> Result<(), CareApiError> {
        let url = Url::parse(&target.upload_url).map_err(|error| {
            CareApiError::decode(format!("presigned url is invalid: {error}"))
        })?;
        let builder = self
            .client
            .put(url)
            .header(USER_AGENT, self.user_agent.as_str())
            .header(CONTENT_TYPE, image.content_type())
            .body(image.bytes().to_vec());
        self.execute(builder).await.map(drop)
    }
}

fn map_transport_error(error: reqwest::Error) -> CareApiError {
    if error.is_timeout() {
        CareApiError::timeout(error.to_string())
    } else {
        CareApiError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> CareApiError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CareApiError::unauthorized(message),
        StatusCode::NOT_FOUND => CareApiError::not_found(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            CareApiError::timeout(message)
        }
        _ => CareApiError::status(status.as_u16(), body_preview),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
