//! Driving port for check and incident mutations.
//!
//! Every call carries the caller's [`Capabilities`]; implementations guard
//! before touching the store and dispatch post-commit effects afterwards.

use async_trait::async_trait;

use crate::domain::{Capabilities, Check, CustodianId, Error, Incident, IncidentId, RestroomId};

/// Request to log a restroom check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogCheckRequest {
    pub custodian_id: CustodianId,
    pub restroom_id: RestroomId,
    pub note: Option<String>,
}

/// Request to report an incident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportIncidentRequest {
    pub custodian_id: CustodianId,
    pub restroom_id: RestroomId,
    pub description: String,
    pub severity: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FacilityCommand: Send + Sync {
    /// Log a check; fails with `conflict` while the restroom is blocked.
    async fn log_check(
        &self,
        caps: Capabilities,
        request: LogCheckRequest,
    ) -> Result<Check, Error>;

    /// Report an incident; always allowed for authenticated callers.
    async fn report_incident(
        &self,
        caps: Capabilities,
        request: ReportIncidentRequest,
    ) -> Result<Incident, Error>;

    /// Resolve an incident. Requires the admin capability.
    ///
    /// Resolving an already resolved incident succeeds and returns it
    /// unchanged.
    async fn resolve_incident(
        &self,
        caps: Capabilities,
        incident_id: IncidentId,
    ) -> Result<Incident, Error>;
}
