//! Driving port for facility reads.

use async_trait::async_trait;

use crate::domain::{Capabilities, Check, Custodian, Error, Incident, Restroom, RestroomId};
use crate::domain::gating::RestroomStatus;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FacilityQuery: Send + Sync {
    async fn list_restrooms(&self, caps: Capabilities) -> Result<Vec<Restroom>, Error>;

    async fn list_custodians(&self, caps: Capabilities) -> Result<Vec<Custodian>, Error>;

    /// The most recent checks, newest first.
    async fn recent_checks(&self, caps: Capabilities) -> Result<Vec<Check>, Error>;

    /// Every incident, newest first.
    async fn list_incidents(&self, caps: Capabilities) -> Result<Vec<Incident>, Error>;

    /// Whether a check may currently be logged on `restroom_id`.
    async fn can_log_check(&self, caps: Capabilities, restroom_id: RestroomId)
    -> Result<bool, Error>;

    /// Derived status of one restroom; `not_found` for unknown ids.
    async fn restroom_status(
        &self,
        caps: Capabilities,
        restroom_id: RestroomId,
    ) -> Result<RestroomStatus, Error>;

    /// Derived status of every restroom, ordered by restroom id.
    async fn restroom_statuses(&self, caps: Capabilities) -> Result<Vec<RestroomStatus>, Error>;
}
