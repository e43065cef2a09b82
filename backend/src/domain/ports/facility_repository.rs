//! Port for facility persistence.
//!
//! The repository owns restrooms, custodians, checks, and incidents. The two
//! mutating operations that carry business rules are expressed as single
//! atomic calls so adapters can hold a lock or transaction across the
//! decision and the write:
//!
//! - [`FacilityRepository::insert_check_unless_blocked`] evaluates the
//!   pending-incident rule and inserts in one step.
//! - [`FacilityRepository::resolve_incident`] performs the one-way
//!   pending-to-resolved transition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Check, Custodian, CustodianId, FacilitySeed, Incident, IncidentId, NewCheck,
    NewIncident, Restroom, RestroomId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by facility repository adapters.
    pub enum FacilityRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "facility repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "facility repository query failed: {message}",
    }
}

/// Result of an atomic check insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInsertion {
    /// The check was written.
    Inserted(Check),
    /// A pending incident exists for the restroom; nothing was written.
    Blocked,
}

/// Result of an incident resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The incident moved from pending to resolved.
    Resolved(Incident),
    /// The incident was already resolved and is returned unchanged.
    AlreadyResolved(Incident),
    /// No incident has this id.
    NotFound,
}

/// Port for facility storage.
///
/// Listing operations return records newest first, except restrooms and
/// custodians which are ordered by id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FacilityRepository: Send + Sync {
    async fn list_restrooms(&self) -> Result<Vec<Restroom>, FacilityRepositoryError>;

    async fn find_restroom(
        &self,
        id: RestroomId,
    ) -> Result<Option<Restroom>, FacilityRepositoryError>;

    async fn list_custodians(&self) -> Result<Vec<Custodian>, FacilityRepositoryError>;

    async fn find_custodian(
        &self,
        id: CustodianId,
    ) -> Result<Option<Custodian>, FacilityRepositoryError>;

    /// Most recent checks across all restrooms, at most `limit` rows.
    async fn recent_checks(&self, limit: usize) -> Result<Vec<Check>, FacilityRepositoryError>;

    /// Most recent check on one restroom.
    async fn latest_check_for_restroom(
        &self,
        restroom_id: RestroomId,
    ) -> Result<Option<Check>, FacilityRepositoryError>;

    async fn list_incidents(&self) -> Result<Vec<Incident>, FacilityRepositoryError>;

    async fn incidents_for_restroom(
        &self,
        restroom_id: RestroomId,
    ) -> Result<Vec<Incident>, FacilityRepositoryError>;

    async fn find_incident(
        &self,
        id: IncidentId,
    ) -> Result<Option<Incident>, FacilityRepositoryError>;

    /// Insert `check` unless its restroom has a pending incident.
    ///
    /// The incident lookup and the insert must be atomic with respect to
    /// concurrent incident reports on the same restroom.
    async fn insert_check_unless_blocked(
        &self,
        check: NewCheck,
    ) -> Result<CheckInsertion, FacilityRepositoryError>;

    /// Insert a new pending incident.
    async fn insert_incident(
        &self,
        incident: NewIncident,
    ) -> Result<Incident, FacilityRepositoryError>;

    /// Mark an incident resolved at `at` if it is still pending.
    ///
    /// `pending` and `resolved_at` change together. An already resolved
    /// incident keeps its original `resolved_at`.
    async fn resolve_incident(
        &self,
        id: IncidentId,
        at: DateTime<Utc>,
    ) -> Result<ResolveOutcome, FacilityRepositoryError>;

    /// Insert seed restrooms and custodians, skipping ids that already exist.
    async fn seed(&self, seed: &FacilitySeed) -> Result<(), FacilityRepositoryError>;
}

/// Maximum number of checks returned by the check listing.
pub const RECENT_CHECKS_LIMIT: usize = 100;
