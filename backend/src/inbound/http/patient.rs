//! Patient dashboard and event history handlers.
//!
//! ```text
//! GET /api/v1/patient/me
//! GET /api/v1/patients/{id}/events?ticket=4
//! ```

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{Capability, Error, PatientDashboard, PatientEvents, RecordId, SelectionTicket};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caregiver::ensure_assigned;
use crate::inbound::http::schemas::{ErrorSchema, PatientDashboardSchema, PatientEventsSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Path parameters for `GET /api/v1/patients/{id}/events`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct PatientPath {
    /// Patient record id.
    pub id: i64,
}

/// Query parameters for `GET /api/v1/patients/{id}/events`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventsQuery {
    /// Ticket from `POST /api/v1/caregiver/selection`. When present, the
    /// response is refused if a newer selection was made meanwhile.
    #[param(value_type = Option<u64>)]
    pub ticket: Option<SelectionTicket>,
}

/// Signed-in patient's record, caregiver and events.
#[utoipa::path(
    get,
    path = "/api/v1/patient/me",
    responses(
        (status = 200, description = "Patient dashboard", body = PatientDashboardSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Patient record not found", body = ErrorSchema),
        (status = 503, description = "Care API unavailable", body = ErrorSchema)
    ),
    tags = ["patient"],
    operation_id = "patientDashboard"
)]
#[get("/patient/me")]
pub async fn patient_dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<PatientDashboard>> {
    let signed_in = session.require_session()?;
    signed_in.require(Capability::ViewOwnRecord)?;
    let key = signed_in.user_key()?;
    let dashboard = state
        .aggregator
        .patient_dashboard(&signed_in.upstream, key.id())
        .await?;
    Ok(web::Json(dashboard))
}

/// Alert and outage panels for one patient.
///
/// Caregivers may read the events of their assigned patients; patients only
/// their own. A failed panel is reported as `unavailable` without failing
/// the other one.
#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}/events",
    params(PatientPath, EventsQuery),
    responses(
        (status = 200, description = "Event panels", body = PatientEventsSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "A newer selection superseded this request", body = ErrorSchema)
    ),
    tags = ["patient"],
    operation_id = "patientEvents"
)]
#[get("/patients/{id}/events")]
pub async fn patient_events(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<PatientPath>,
    query: web::Query<EventsQuery>,
) -> ApiResult<web::Json<PatientEvents>> {
    let signed_in = session.require_session()?;
    let viewer = signed_in.user_key()?;
    let patient_id = RecordId::new(path.id);
    let dashboard = signed_in.dashboard();
    if dashboard.allows(Capability::ViewPatientEvents) {
        ensure_assigned(&state, &signed_in, patient_id).await?;
    } else {
        dashboard.require(Capability::ViewOwnEvents)?;
        if viewer.id() != patient_id {
            return Err(Error::forbidden("patients may only view their own events"));
        }
    }

    let events = state
        .aggregator
        .patient_events(&signed_in.upstream, patient_id)
        .await;
    if let Some(ticket) = query.ticket {
        state.selections.ensure_current(viewer, ticket, patient_id)?;
    }
    Ok(web::Json(events))
}
