//! Reassembles relational views from the care API's flat collections.
//!
//! The directory call returns admins, caregivers and patients as separate
//! role-less lists. This service tags each record with its collection's role,
//! performs the follow-up lookups that restore caregiver/patient links, and
//! degrades individual fields or panels when a follow-up fails.

use std::sync::Arc;

use futures_util::future::join_all;
use futures_util::join;
use serde::Serialize;

use super::ports::CareApi;
use super::{
    Caregiver, CaregiverAssignment, Error, PanelState, Patient, PatientEvents, RecordId, Role,
    UpstreamSession, UserKey, UserRecord,
};

/// Everything the caregiver dashboard shows before a patient is selected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaregiverDashboard {
    pub caregiver: Caregiver,
}

/// Everything the patient dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDashboard {
    pub patient: Patient,
    pub caregiver: CaregiverAssignment,
    pub events: PatientEvents,
}

/// Read-side service composing care API calls into dashboard views.
#[derive(Clone)]
pub struct UserAggregator {
    api: Arc<dyn CareApi>,
}

impl UserAggregator {
    /// Build the service over a care API port.
    pub fn new(api: Arc<dyn CareApi>) -> Self {
        Self { api }
    }

    /// Merged user list: admins, then caregivers, then patients, each group
    /// in upstream order.
    ///
    /// With `expand_caregivers`, every caregiver's patient list is fetched
    /// with one follow-up request per caregiver. A failed follow-up leaves
    /// that caregiver with no patients and `patients_unavailable` set.
    pub async fn list_users(
        &self,
        session: &UpstreamSession,
        expand_caregivers: bool,
    ) -> Result<Vec<UserRecord>, Error> {
        let directory = self.api.directory(session).await.map_err(|err| {
            tracing::warn!(error = %err, "user directory fetch failed");
            Error::service_unavailable("user directory is unavailable")
        })?;

        let caregivers = if expand_caregivers {
            join_all(
                directory
                    .caregivers
                    .into_iter()
                    .map(|caregiver| self.with_patients(session, caregiver)),
            )
            .await
        } else {
            directory.caregivers
        };

        let records = directory
            .admins
            .into_iter()
            .map(UserRecord::Admin)
            .chain(caregivers.into_iter().map(UserRecord::Caregiver))
            .chain(directory.patients.into_iter().map(UserRecord::Patient))
            .collect();
        Ok(records)
    }

    async fn with_patients(&self, session: &UpstreamSession, mut caregiver: Caregiver) -> Caregiver {
        match self.api.caregiver_patients(session, caregiver.id).await {
            Ok(patients) => {
                caregiver.patients = patients;
                caregiver.patients_unavailable = false;
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    caregiver = %UserKey::new(Role::Caregiver, caregiver.id),
                    "caregiver patient lookup failed"
                );
                caregiver.patients = Vec::new();
                caregiver.patients_unavailable = true;
            }
        }
        caregiver
    }

    /// Resolve the display state of a patient's caregiver.
    pub async fn caregiver_assignment(
        &self,
        session: &UpstreamSession,
        patient: &Patient,
    ) -> CaregiverAssignment {
        let Some(caregiver_id) = patient.caregiver_id else {
            return CaregiverAssignment::Unassigned;
        };
        match self.api.caregiver(session, caregiver_id).await {
            Ok(caregiver) => CaregiverAssignment::Assigned {
                id: caregiver.id,
                name: caregiver.details.display_name(),
            },
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    patient = %UserKey::new(Role::Patient, patient.id),
                    "caregiver lookup failed"
                );
                CaregiverAssignment::Unknown
            }
        }
    }

    /// Fetch alerts and outages concurrently; each panel fails on its own.
    pub async fn patient_events(
        &self,
        session: &UpstreamSession,
        patient_id: RecordId,
    ) -> PatientEvents {
        let (alerts, outages) = join!(
            self.api.alerts(session, patient_id),
            self.api.outages(session, patient_id)
        );
        PatientEvents {
            patient_id,
            alerts: panel(alerts, "alerts", patient_id),
            outages: panel(outages, "outages", patient_id),
        }
    }

    /// Signed-in caregiver with assigned patients.
    pub async fn caregiver_dashboard(
        &self,
        session: &UpstreamSession,
    ) -> Result<CaregiverDashboard, Error> {
        let caregiver = self.api.current_caregiver(session).await?;
        Ok(CaregiverDashboard { caregiver })
    }

    /// Patient record, caregiver assignment and event panels for `patient_id`.
    pub async fn patient_dashboard(
        &self,
        session: &UpstreamSession,
        patient_id: RecordId,
    ) -> Result<PatientDashboard, Error> {
        let key = UserKey::new(Role::Patient, patient_id);
        let UserRecord::Patient(patient) = self.api.fetch_user(session, key).await? else {
            return Err(Error::not_found(format!("{key} is not a patient")));
        };
        let (caregiver, events) = join!(
            self.caregiver_assignment(session, &patient),
            self.patient_events(session, patient_id)
        );
        Ok(PatientDashboard {
            patient,
            caregiver,
            events,
        })
    }

    /// Whether `patient_id` is assigned to the signed-in caregiver.
    pub async fn caregiver_owns_patient(
        &self,
        session: &UpstreamSession,
        patient_id: RecordId,
    ) -> Result<bool, Error> {
        let caregiver = self.api.current_caregiver(session).await?;
        Ok(caregiver.patients.iter().any(|patient| patient.id == patient_id))
    }
}

fn panel<T, E: std::fmt::Display>(
    result: Result<T, E>,
    panel: &'static str,
    patient_id: RecordId,
) -> PanelState<T> {
    match result {
        Ok(value) => PanelState::Loaded(value),
        Err(err) => {
            tracing::warn!(error = %err, panel, patient = %patient_id, "event panel fetch failed");
            PanelState::Unavailable
        }
    }
}
