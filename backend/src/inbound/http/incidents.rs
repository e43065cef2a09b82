//! Incident endpoints.
//!
//! ```text
//! GET  /incidents
//! POST /incidents         {"custodianId":1,"restroomId":2,"description":"leak","severity":"high"}
//! POST /incidents/resolve {"incidentId":7}
//! ```

use actix_web::{HttpResponse, get, post, web};

use crate::domain::IncidentId;
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{IncidentDto, ReportIncidentBody, ResolveIncidentBody};
use crate::inbound::http::error::accept_json;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Every incident, newest first.
#[utoipa::path(
    get,
    path = "/incidents",
    responses(
        (status = 200, description = "Incidents", body = [IncidentDto]),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["incidents"],
    operation_id = "listIncidents"
)]
#[get("/incidents")]
pub async fn list_incidents(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<IncidentDto>>> {
    let incidents = state.queries.list_incidents(session.capabilities()).await?;
    Ok(web::Json(incidents.iter().map(IncidentDto::from).collect()))
}

/// Report an incident. Always accepted, even on an already blocked restroom.
#[utoipa::path(
    post,
    path = "/incidents",
    request_body = ReportIncidentBody,
    responses(
        (status = 201, description = "Incident reported", body = IncidentDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["incidents"],
    operation_id = "reportIncident"
)]
#[post("/incidents")]
pub async fn report_incident(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Result<web::Json<ReportIncidentBody>, actix_web::Error>,
) -> ApiResult<HttpResponse> {
    let capabilities = session.capabilities();
    capabilities.require_authenticated()?;
    let body = accept_json(payload)?;
    let incident = state
        .commands
        .report_incident(capabilities, body.into())
        .await?;
    Ok(HttpResponse::Created().json(IncidentDto::from(&incident)))
}

/// Resolve an incident. Resolving twice returns the original resolution.
#[utoipa::path(
    post,
    path = "/incidents/resolve",
    request_body = ResolveIncidentBody,
    responses(
        (status = 200, description = "Incident resolved", body = IncidentDto),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Admin access required", body = ErrorSchema),
        (status = 404, description = "Unknown incident", body = ErrorSchema)
    ),
    tags = ["incidents"],
    operation_id = "resolveIncident"
)]
#[post("/incidents/resolve")]
pub async fn resolve_incident(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Result<web::Json<ResolveIncidentBody>, actix_web::Error>,
) -> ApiResult<web::Json<IncidentDto>> {
    let capabilities = session.capabilities();
    capabilities.require_admin()?;
    let body = accept_json(payload)?;
    let incident = state
        .commands
        .resolve_incident(capabilities, IncidentId::new(body.incident_id))
        .await?;
    Ok(web::Json(IncidentDto::from(&incident)))
}
