//! Caregiver dashboard handlers.
//!
//! ```text
//! GET  /api/v1/caregiver/me
//! POST /api/v1/caregiver/selection {"patientId":3}
//! ```
//!
//! Selecting a patient issues a ticket. Event fetches made under an older
//! ticket are refused once a newer selection exists; see
//! [`crate::inbound::http::patient::patient_events`].

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::{Capability, CaregiverDashboard, Error, RecordId, SelectionTicket};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{CaregiverDashboardSchema, ErrorSchema};
use crate::inbound::http::session::{SessionContext, SignedIn};
use crate::inbound::http::state::HttpState;

/// Patient chosen on the caregiver dashboard.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    #[schema(example = 3)]
    pub patient_id: i64,
}

/// Ticket to pass to the selected patient's event fetch.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    #[schema(value_type = u64, example = 4)]
    pub ticket: SelectionTicket,
    #[schema(example = 3)]
    pub patient_id: i64,
}

/// Signed-in caregiver with assigned patients.
#[utoipa::path(
    get,
    path = "/api/v1/caregiver/me",
    responses(
        (status = 200, description = "Caregiver dashboard", body = CaregiverDashboardSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 503, description = "Care API unavailable", body = ErrorSchema)
    ),
    tags = ["caregiver"],
    operation_id = "caregiverDashboard"
)]
#[get("/caregiver/me")]
pub async fn caregiver_dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<CaregiverDashboard>> {
    let signed_in = session.require_session()?;
    signed_in.require(Capability::ViewAssignedPatients)?;
    let dashboard = state.aggregator.caregiver_dashboard(&signed_in.upstream).await?;
    Ok(web::Json(dashboard))
}

/// Select one of the caregiver's patients.
#[utoipa::path(
    post,
    path = "/api/v1/caregiver/selection",
    request_body = SelectionRequest,
    responses(
        (status = 200, description = "Selection recorded", body = SelectionResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Patient not assigned to this caregiver", body = ErrorSchema)
    ),
    tags = ["caregiver"],
    operation_id = "selectPatient"
)]
#[post("/caregiver/selection")]
pub async fn select_patient(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SelectionRequest>,
) -> ApiResult<web::Json<SelectionResponse>> {
    let signed_in = session.require_session()?;
    signed_in.require(Capability::ViewPatientEvents)?;
    let viewer = signed_in.user_key()?;
    let patient_id = RecordId::new(payload.patient_id);
    ensure_assigned(&state, &signed_in, patient_id).await?;
    let ticket = state.selections.select(viewer, patient_id);
    debug!(%viewer, patient = %patient_id, ticket = ticket.get(), "patient selected");
    Ok(web::Json(SelectionResponse {
        ticket,
        patient_id: patient_id.get(),
    }))
}

/// Fail with `403` unless `patient_id` is assigned to the signed-in caregiver.
pub(crate) async fn ensure_assigned(
    state: &HttpState,
    signed_in: &SignedIn,
    patient_id: RecordId,
) -> Result<(), Error> {
    if state
        .aggregator
        .caregiver_owns_patient(&signed_in.upstream, patient_id)
        .await?
    {
        Ok(())
    } else {
        Err(Error::forbidden("patient is not assigned to this caregiver"))
    }
}
