//! Driven port for the external care REST API.
//!
//! The care API owns every record; this service only reads, relays writes and
//! reshapes responses. Calls other than login and registration replay the
//! caller's [`UpstreamSession`].

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use super::define_port_error;
use crate::domain::{
    Administrator, AuthenticatedAccount, Caregiver, EmergencyContact, Error, EventKind,
    EventRecord, ImageUpload, LoginCredentials, MedicalProfile, NewUser, PasswordChange, Patient,
    PersonalDetails, PresignedUpload, ProfileUpdate, RecordId, RegisteredAccount, Role,
    UpstreamSession, UserDirectory, UserKey, UserRecord,
};

define_port_error! {
    /// Errors surfaced while calling the care API.
    pub enum CareApiError {
        /// The request never produced a response.
        Transport { message: String } =>
            "care api transport failed: {message}",
        /// The request exceeded its deadline.
        Timeout { message: String } =>
            "care api timed out: {message}",
        /// The API answered with an unexpected status.
        Status { status: u16, message: String } =>
            "care api returned status {status}: {message}",
        /// The response body did not match the expected shape.
        Decode { message: String } =>
            "care api response decode failed: {message}",
        /// The requested record does not exist.
        NotFound { message: String } =>
            "care api record not found: {message}",
        /// Credentials were rejected or the upstream session expired.
        Unauthorized { message: String } =>
            "care api rejected credentials: {message}",
    }
}

impl From<CareApiError> for Error {
    fn from(err: CareApiError) -> Self {
        match err {
            CareApiError::Unauthorized { .. } => {
                Self::unauthorized("session is no longer valid; sign in again")
            }
            CareApiError::NotFound { message } => Self::not_found(message),
            CareApiError::Status { status: 400, message } => Self::invalid_request(message),
            CareApiError::Status { status: 409, message } => Self::conflict(message),
            other => {
                tracing::warn!(error = %other, "care api unavailable");
                Self::service_unavailable("care service is unavailable")
            }
        }
    }
}

/// Port for the external care REST API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CareApi: Send + Sync {
    /// Exchange credentials for an account identity and upstream session.
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedAccount, CareApiError>;

    /// Fetch the role-partitioned user directory.
    async fn directory(&self, session: &UpstreamSession) -> Result<UserDirectory, CareApiError>;

    /// Fetch the signed-in administrator.
    async fn current_admin(&self, session: &UpstreamSession)
    -> Result<Administrator, CareApiError>;

    /// Fetch the signed-in caregiver with the patients embedded upstream.
    async fn current_caregiver(&self, session: &UpstreamSession)
    -> Result<Caregiver, CareApiError>;

    /// Fetch one record by composite key.
    async fn fetch_user(
        &self,
        session: &UpstreamSession,
        key: UserKey,
    ) -> Result<UserRecord, CareApiError>;

    /// Apply a self-service profile update.
    async fn update_user(
        &self,
        session: &UpstreamSession,
        key: UserKey,
        update: &ProfileUpdate,
    ) -> Result<(), CareApiError>;

    /// Replace the signed-in account's password.
    async fn update_password(
        &self,
        session: &UpstreamSession,
        key: UserKey,
        change: &PasswordChange,
    ) -> Result<(), CareApiError>;

    /// Delete a record.
    async fn delete_user(&self, session: &UpstreamSession, key: UserKey)
    -> Result<(), CareApiError>;

    /// Apply an administrator's edit to another account.
    async fn admin_update_user(
        &self,
        session: &UpstreamSession,
        key: UserKey,
        update: &ProfileUpdate,
    ) -> Result<(), CareApiError>;

    /// Reset another account's password as administrator.
    async fn admin_update_password(
        &self,
        session: &UpstreamSession,
        key: UserKey,
        change: &PasswordChange,
    ) -> Result<(), CareApiError>;

    /// Fetch one caregiver by id.
    async fn caregiver(
        &self,
        session: &UpstreamSession,
        id: RecordId,
    ) -> Result<Caregiver, CareApiError>;

    /// Fetch the patients assigned to a caregiver.
    async fn caregiver_patients(
        &self,
        session: &UpstreamSession,
        caregiver_id: RecordId,
    ) -> Result<Vec<Patient>, CareApiError>;

    /// Fetch a patient's alert history.
    async fn alerts(
        &self,
        session: &UpstreamSession,
        patient_id: RecordId,
    ) -> Result<Vec<EventRecord>, CareApiError>;

    /// Fetch a patient's outage history.
    async fn outages(
        &self,
        session: &UpstreamSession,
        patient_id: RecordId,
    ) -> Result<Vec<EventRecord>, CareApiError>;

    /// Create an account; the API assigns the username.
    async fn register(&self, user: &NewUser) -> Result<RegisteredAccount, CareApiError>;

    /// Reserve a storage slot for an image.
    async fn presign_upload(
        &self,
        session: &UpstreamSession,
        image: &ImageUpload,
    ) -> Result<PresignedUpload, CareApiError>;

    /// Send image bytes to a presigned slot.
    async fn upload_object(
        &self,
        target: &PresignedUpload,
        image: &ImageUpload,
    ) -> Result<(), CareApiError>;
}

/// Fixture password accepted for every fixture account.
pub const FIXTURE_PASSWORD: &str = "password";

/// Deterministic in-memory care API used when no upstream is configured.
///
/// Holds one administrator (id 1), one caregiver (id 2) and one patient
/// (id 3) assigned to that caregiver. Writes succeed without effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureCareApi;

impl FixtureCareApi {
    fn details(username: &str, first: &str, last: &str) -> PersonalDetails {
        PersonalDetails {
            username: username.to_owned(),
            email: format!("{}@guardian.example", first.to_ascii_lowercase()),
            first_name: first.to_owned(),
            middle_name: None,
            last_name: last.to_owned(),
            address: "1 Mabini St, Quezon City".to_owned(),
            gender: "female".to_owned(),
            mobile_number: "09170000000".to_owned(),
        }
    }

    fn admin() -> Administrator {
        Administrator {
            id: RecordId::new(1),
            details: Self::details("GV - AA - 1", "Alma", "Santos"),
        }
    }

    fn patient() -> Patient {
        Patient {
            id: RecordId::new(3),
            details: Self::details("GV - PT - 3", "Lola", "Cruz"),
            medical: MedicalProfile {
                age: Some(78),
                height: Some(152.0),
                weight: Some(50.5),
            },
            emergency_contact: EmergencyContact {
                name: "Paolo Cruz".to_owned(),
                number: "09181111111".to_owned(),
                address: "3 Rizal Ave, Quezon City".to_owned(),
            },
            image_url: None,
            caregiver_id: Some(RecordId::new(2)),
        }
    }

    fn caregiver() -> Caregiver {
        Caregiver {
            id: RecordId::new(2),
            details: Self::details("GV - CC - 2", "Carla", "Reyes"),
            patients: vec![Self::patient()],
            patients_unavailable: false,
        }
    }

    fn events(kind: EventKind, patient_id: RecordId) -> Vec<EventRecord> {
        if patient_id != Self::patient().id {
            return Vec::new();
        }
        let timestamp = Utc
            .with_ymd_and_hms(2024, 3, 1, 8, 30, 0)
            .single()
            .unwrap_or_default();
        vec![EventRecord::new(
            RecordId::new(10),
            kind,
            timestamp,
            Some("https://videos.guardian.example/10.mp4".to_owned()),
            Some("https://maps.google.com/?q=14.6760,121.0437".to_owned()),
        )]
    }

    fn find(key: UserKey) -> Option<UserRecord> {
        let record = match key.role() {
            Role::Admin => UserRecord::Admin(Self::admin()),
            Role::Caregiver => UserRecord::Caregiver(Self::caregiver()),
            Role::Patient => UserRecord::Patient(Self::patient()),
        };
        (record.id() == key.id()).then_some(record)
    }

    fn require(key: UserKey) -> Result<UserRecord, CareApiError> {
        Self::find(key).ok_or_else(|| CareApiError::not_found(key.to_string()))
    }
}

#[async_trait]
impl CareApi for FixtureCareApi {
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedAccount, CareApiError> {
        let records = [
            UserRecord::Admin(Self::admin()),
            UserRecord::Caregiver(Self::caregiver()),
            UserRecord::Patient(Self::patient()),
        ];
        records
            .iter()
            .find(|record| {
                let details = record.details();
                details.username == credentials.identifier()
                    || details.email == credentials.identifier()
            })
            .filter(|_| credentials.password() == FIXTURE_PASSWORD)
            .map(|record| AuthenticatedAccount {
                id: record.id(),
                username: record.details().username.clone(),
                upstream: UpstreamSession::new(format!("fixture-{}", record.key())),
            })
            .ok_or_else(|| CareApiError::unauthorized("invalid credentials"))
    }

    async fn directory(&self, _session: &UpstreamSession) -> Result<UserDirectory, CareApiError> {
        Ok(UserDirectory {
            admins: vec![Self::admin()],
            caregivers: vec![Caregiver {
                patients: Vec::new(),
                ..Self::caregiver()
            }],
            patients: vec![Self::patient()],
        })
    }

    async fn current_admin(
        &self,
        _session: &UpstreamSession,
    ) -> Result<Administrator, CareApiError> {
        Ok(Self::admin())
    }

    async fn current_caregiver(
        &self,
        _session: &UpstreamSession,
    ) -> Result<Caregiver, CareApiError> {
        Ok(Self::caregiver())
    }

    async fn fetch_user(
        &self,
        _session: &UpstreamSession,
        key: UserKey,
    ) -> Result<UserRecord, CareApiError> {
        Self::require(key)
    }

    async fn update_user(
        &self,
        _session: &UpstreamSession,
        key: UserKey,
        _update: &ProfileUpdate,
    ) -> Result<(), CareApiError> {
        Self::require(key).map(drop)
    }

    async fn update_password(
        &self,
        _session: &UpstreamSession,
        key: UserKey,
        _change: &PasswordChange,
    ) -> Result<(), CareApiError> {
        Self::require(key).map(drop)
    }

    async fn delete_user(
        &self,
        _session: &UpstreamSession,
        key: UserKey,
    ) -> Result<(), CareApiError> {
        Self::require(key).map(drop)
    }

    async fn admin_update_user(
        &self,
        _session: &UpstreamSession,
        key: UserKey,
        _update: &ProfileUpdate,
    ) -> Result<(), CareApiError> {
        Self::require(key).map(drop)
    }

    async fn admin_update_password(
        &self,
        _session: &UpstreamSession,
        key: UserKey,
        _change: &PasswordChange,
    ) -> Result<(), CareApiError> {
        Self::require(key).map(drop)
    }

    async fn caregiver(
        &self,
        _session: &UpstreamSession,
        id: RecordId,
    ) -> Result<Caregiver, CareApiError> {
        match Self::require(UserKey::new(Role::Caregiver, id))? {
            UserRecord::Caregiver(caregiver) => Ok(caregiver),
            _ => Err(CareApiError::not_found(format!("caregiver-{id}"))),
        }
    }

    async fn caregiver_patients(
        &self,
        _session: &UpstreamSession,
        caregiver_id: RecordId,
    ) -> Result<Vec<Patient>, CareApiError> {
        let caregiver = Self::caregiver();
        Ok(if caregiver.id == caregiver_id {
            caregiver.patients
        } else {
            Vec::new()
        })
    }

    async fn alerts(
        &self,
        _session: &UpstreamSession,
        patient_id: RecordId,
    ) -> Result<Vec<EventRecord>, CareApiError> {
        Ok(Self::events(EventKind::Alert, patient_id))
    }

    async fn outages(
        &self,
        _session: &UpstreamSession,
        patient_id: RecordId,
    ) -> Result<Vec<EventRecord>, CareApiError> {
        Ok(Self::events(EventKind::Outage, patient_id))
    }

    async fn register(&self, user: &NewUser) -> Result<RegisteredAccount, CareApiError> {
        Ok(RegisteredAccount {
            username: format!("GV - {} - 100", user.role.code()),
        })
    }

    async fn presign_upload(
        &self,
        _session: &UpstreamSession,
        image: &ImageUpload,
    ) -> Result<PresignedUpload, CareApiError> {
        Ok(PresignedUpload {
            upload_url: format!("https://storage.guardian.example/upload/{}", image.file_name()),
            file_url: format!("https://storage.guardian.example/{}", image.file_name()),
        })
    }

    async fn upload_object(
        &self,
        _target: &PresignedUpload,
        _image: &ImageUpload,
    ) -> Result<(), CareApiError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("GV - AA - 1", Role::Admin)]
    #[case("carla@guardian.example", Role::Caregiver)]
    #[case("GV - PT - 3", Role::Patient)]
    #[tokio::test]
    async fn fixture_accepts_known_accounts(#[case] identifier: &str, #[case] role: Role) {
        let creds =
            LoginCredentials::try_from_parts(identifier, FIXTURE_PASSWORD).expect("credentials");
        let account = FixtureCareApi.authenticate(&creds).await.expect("known account");
        let session = crate::domain::ActiveSession::from_username(account.username, Some(account.id))
            .expect("fixture usernames carry identifiers");
        assert_eq!(session.role(), role);
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_rejects_wrong_password() {
        let creds = LoginCredentials::try_from_parts("GV - AA - 1", "nope").expect("credentials");
        let err = FixtureCareApi.authenticate(&creds).await.expect_err("rejected");
        assert!(matches!(err, CareApiError::Unauthorized { .. }));
    }

    #[rstest]
    #[case(CareApiError::unauthorized("x"), ErrorCode::Unauthorized)]
    #[case(CareApiError::not_found("x"), ErrorCode::NotFound)]
    #[case(CareApiError::status(400_u16, "x"), ErrorCode::InvalidRequest)]
    #[case(CareApiError::status(409_u16, "x"), ErrorCode::Conflict)]
    #[case(CareApiError::status(500_u16, "x"), ErrorCode::ServiceUnavailable)]
    #[case(CareApiError::timeout("x"), ErrorCode::ServiceUnavailable)]
    #[case(CareApiError::decode("x"), ErrorCode::ServiceUnavailable)]
    fn errors_map_to_domain_codes(#[case] err: CareApiError, #[case] expected: ErrorCode) {
        assert_eq!(Error::from(err).code(), expected);
    }
}
