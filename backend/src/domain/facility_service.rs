//! Facility domain service: the gating engine.
//!
//! Implements the check and incident driving ports on top of a
//! [`FacilityRepository`]. Capability guards run before any repository call;
//! post-commit effects run only after the write has returned successfully.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::effects::{EffectDispatcher, IncidentNotification, PostCommitEffect};
use crate::domain::gating::{self, RestroomStatus};
use crate::domain::ports::{
    CheckInsertion, FacilityCommand, FacilityQuery, FacilityRepository, FacilityRepositoryError,
    LogCheckRequest, RECENT_CHECKS_LIMIT, ReportIncidentRequest, ResolveOutcome,
};
use crate::domain::{
    AuditEntry, AuditEventKind, Capabilities, ChangeReason, Check, CheckNote, Custodian,
    CustodianId, DataChangedEvent, Error, Incident, IncidentDescription, IncidentId,
    LastCheckSnapshot, NewCheck, NewIncident, Restroom, RestroomId, Severity,
};

fn map_repository_error(error: FacilityRepositoryError) -> Error {
    match error {
        FacilityRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("facility repository unavailable: {message}"))
        }
        FacilityRepositoryError::Query { message } => {
            Error::internal(format!("facility repository error: {message}"))
        }
    }
}

fn invalid_field(field: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field }))
}

/// Gating engine implementing [`FacilityCommand`] and [`FacilityQuery`].
#[derive(Clone)]
pub struct FacilityService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
    effects: EffectDispatcher,
}

impl<R> FacilityService<R> {
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>, effects: EffectDispatcher) -> Self {
        Self {
            repo,
            clock,
            effects,
        }
    }
}

impl<R> FacilityService<R>
where
    R: FacilityRepository,
{
    async fn custodian(&self, id: CustodianId) -> Result<Custodian, Error> {
        self.repo
            .find_custodian(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| invalid_field("custodianId", format!("unknown custodian {id}")))
    }

    async fn restroom(&self, id: RestroomId) -> Result<Restroom, Error> {
        self.repo
            .find_restroom(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| invalid_field("restroomId", format!("unknown restroom {id}")))
    }

    async fn existing_restroom(&self, id: RestroomId) -> Result<Restroom, Error> {
        self.repo
            .find_restroom(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("restroom {id} not found")))
    }

    /// Best-effort display names for effects that run after a committed
    /// write; lookup failures fall back to the raw ids.
    async fn labels(&self, restroom_id: RestroomId, custodian_id: CustodianId) -> (String, String) {
        let restroom = match self.repo.find_restroom(restroom_id).await {
            Ok(Some(restroom)) => restroom.name().to_owned(),
            Ok(None) => restroom_id.to_string(),
            Err(err) => {
                warn!(%restroom_id, error = %err, "restroom lookup for audit failed");
                restroom_id.to_string()
            }
        };
        let custodian = match self.repo.find_custodian(custodian_id).await {
            Ok(Some(custodian)) => custodian.name().to_owned(),
            Ok(None) => custodian_id.to_string(),
            Err(err) => {
                warn!(%custodian_id, error = %err, "custodian lookup for audit failed");
                custodian_id.to_string()
            }
        };
        (restroom, custodian)
    }

    async fn status_for(&self, restroom_id: RestroomId) -> Result<RestroomStatus, Error> {
        let latest = self
            .repo
            .latest_check_for_restroom(restroom_id)
            .await
            .map_err(map_repository_error)?;
        let incidents = self
            .repo
            .incidents_for_restroom(restroom_id)
            .await
            .map_err(map_repository_error)?;
        Ok(RestroomStatus::derive(
            restroom_id,
            latest.as_ref(),
            &incidents,
        ))
    }
}

#[async_trait]
impl<R> FacilityCommand for FacilityService<R>
where
    R: FacilityRepository,
{
    async fn log_check(
        &self,
        caps: Capabilities,
        request: LogCheckRequest,
    ) -> Result<Check, Error> {
        caps.require_authenticated()?;
        let note = CheckNote::parse(request.note.as_deref())
            .map_err(|err| invalid_field("notes", err.to_string()))?;
        let custodian = self.custodian(request.custodian_id).await?;
        let restroom = self.restroom(request.restroom_id).await?;

        let insertion = self
            .repo
            .insert_check_unless_blocked(NewCheck {
                custodian_id: custodian.id(),
                restroom_id: restroom.id(),
                checked_at: self.clock.utc(),
                note,
            })
            .await
            .map_err(map_repository_error)?;
        let check = match insertion {
            CheckInsertion::Inserted(check) => check,
            CheckInsertion::Blocked => {
                return Err(Error::conflict(format!(
                    "restroom {} has an active incident; resolve it before logging a check",
                    restroom.name()
                ))
                .with_details(json!({ "restroomId": restroom.id().get() })));
            }
        };
        info!(
            check_id = %check.id(),
            restroom_id = %restroom.id(),
            custodian_id = %custodian.id(),
            "check logged"
        );

        self.effects
            .dispatch(vec![
                PostCommitEffect::Audit(AuditEntry {
                    occurred_at: check.checked_at(),
                    kind: AuditEventKind::Check,
                    restroom: restroom.name().to_owned(),
                    custodian: custodian.name().to_owned(),
                    details: check
                        .note()
                        .map(|note| note.as_str().to_owned())
                        .unwrap_or_default(),
                }),
                PostCommitEffect::Broadcast(DataChangedEvent::new(ChangeReason::CheckLogged)),
            ])
            .await;
        Ok(check)
    }

    async fn report_incident(
        &self,
        caps: Capabilities,
        request: ReportIncidentRequest,
    ) -> Result<Incident, Error> {
        caps.require_authenticated()?;
        let description = IncidentDescription::new(&request.description)
            .map_err(|err| invalid_field("description", err.to_string()))?;
        let severity = Severity::parse(request.severity.as_deref())
            .map_err(|err| invalid_field("severity", err.to_string()))?;
        let custodian = self.custodian(request.custodian_id).await?;
        let restroom = self.restroom(request.restroom_id).await?;

        let last_check = self
            .repo
            .latest_check_for_restroom(restroom.id())
            .await
            .map_err(map_repository_error)?
            .map(|check| LastCheckSnapshot {
                checked_at: check.checked_at(),
                checked_by: check.custodian_id(),
            });

        let incident = self
            .repo
            .insert_incident(NewIncident {
                custodian_id: custodian.id(),
                restroom_id: restroom.id(),
                description,
                severity,
                created_at: self.clock.utc(),
                last_check,
            })
            .await
            .map_err(map_repository_error)?;
        info!(
            incident_id = %incident.id(),
            restroom_id = %restroom.id(),
            severity = incident.severity().as_str(),
            "incident reported"
        );

        let last_checked_by = match last_check {
            Some(snapshot) if snapshot.checked_by == custodian.id() => {
                Some(custodian.name().to_owned())
            }
            Some(snapshot) => Some(self.labels(restroom.id(), snapshot.checked_by).await.1),
            None => None,
        };
        let notification = IncidentNotification {
            incident_id: incident.id().get(),
            restroom: restroom.name().to_owned(),
            building: restroom.building().to_owned(),
            floor: restroom.floor().to_owned(),
            reporter: custodian.name().to_owned(),
            description: incident.description().as_str().to_owned(),
            severity: incident.severity().as_str().to_owned(),
            reported_at: incident.created_at(),
            last_checked_at: last_check.map(|snapshot| snapshot.checked_at),
            last_checked_by,
        };

        self.effects
            .dispatch(vec![
                PostCommitEffect::NotifyIncident(notification),
                PostCommitEffect::Audit(AuditEntry {
                    occurred_at: incident.created_at(),
                    kind: AuditEventKind::Incident,
                    restroom: restroom.name().to_owned(),
                    custodian: custodian.name().to_owned(),
                    details: format!("[{}] {}", incident.severity(), incident.description()),
                }),
                PostCommitEffect::Broadcast(DataChangedEvent::new(ChangeReason::IncidentReported)),
            ])
            .await;
        Ok(incident)
    }

    async fn resolve_incident(
        &self,
        caps: Capabilities,
        incident_id: IncidentId,
    ) -> Result<Incident, Error> {
        caps.require_admin()?;
        let outcome = self
            .repo
            .resolve_incident(incident_id, self.clock.utc())
            .await
            .map_err(map_repository_error)?;
        let incident = match outcome {
            ResolveOutcome::Resolved(incident) => incident,
            ResolveOutcome::AlreadyResolved(incident) => {
                info!(%incident_id, "incident already resolved");
                return Ok(incident);
            }
            ResolveOutcome::NotFound => {
                return Err(Error::not_found(format!("incident {incident_id} not found")));
            }
        };
        info!(%incident_id, restroom_id = %incident.restroom_id(), "incident resolved");

        let (restroom, custodian) = self
            .labels(incident.restroom_id(), incident.custodian_id())
            .await;
        let resolved_at = incident.resolved_at().unwrap_or_else(|| self.clock.utc());
        self.effects
            .dispatch(vec![
                PostCommitEffect::Audit(AuditEntry {
                    occurred_at: resolved_at,
                    kind: AuditEventKind::Resolve,
                    restroom,
                    custodian,
                    details: format!("Incident #{incident_id} resolved"),
                }),
                PostCommitEffect::Broadcast(DataChangedEvent::new(ChangeReason::IncidentResolved)),
            ])
            .await;
        Ok(incident)
    }
}

#[async_trait]
impl<R> FacilityQuery for FacilityService<R>
where
    R: FacilityRepository,
{
    async fn list_restrooms(&self, caps: Capabilities) -> Result<Vec<Restroom>, Error> {
        caps.require_authenticated()?;
        self.repo.list_restrooms().await.map_err(map_repository_error)
    }

    async fn list_custodians(&self, caps: Capabilities) -> Result<Vec<Custodian>, Error> {
        caps.require_authenticated()?;
        self.repo.list_custodians().await.map_err(map_repository_error)
    }

    async fn recent_checks(&self, caps: Capabilities) -> Result<Vec<Check>, Error> {
        caps.require_authenticated()?;
        self.repo
            .recent_checks(RECENT_CHECKS_LIMIT)
            .await
            .map_err(map_repository_error)
    }

    async fn list_incidents(&self, caps: Capabilities) -> Result<Vec<Incident>, Error> {
        caps.require_authenticated()?;
        self.repo.list_incidents().await.map_err(map_repository_error)
    }

    async fn can_log_check(
        &self,
        caps: Capabilities,
        restroom_id: RestroomId,
    ) -> Result<bool, Error> {
        caps.require_authenticated()?;
        let restroom = self.existing_restroom(restroom_id).await?;
        let incidents = self
            .repo
            .incidents_for_restroom(restroom.id())
            .await
            .map_err(map_repository_error)?;
        Ok(gating::can_log_check(restroom.id(), &incidents))
    }

    async fn restroom_status(
        &self,
        caps: Capabilities,
        restroom_id: RestroomId,
    ) -> Result<RestroomStatus, Error> {
        caps.require_authenticated()?;
        let restroom = self.existing_restroom(restroom_id).await?;
        self.status_for(restroom.id()).await
    }

    async fn restroom_statuses(&self, caps: Capabilities) -> Result<Vec<RestroomStatus>, Error> {
        caps.require_authenticated()?;
        let restrooms = self.repo.list_restrooms().await.map_err(map_repository_error)?;
        let mut statuses = Vec::with_capacity(restrooms.len());
        for restroom in restrooms {
            statuses.push(self.status_for(restroom.id()).await?);
        }
        Ok(statuses)
    }
}

#[cfg(test)]
#[path = "facility_service_tests.rs"]
mod tests;
