//! Pure gating rules.
//!
//! A restroom is blocked while at least one of its incidents is pending.
//! Nothing stores a "blocked" flag; callers recompute it from incident rows,
//! so these helpers are the single definition of the rule used by the
//! service and by the in-process store's atomic insert.

use chrono::{DateTime, Utc};

use crate::domain::{Check, CustodianId, Incident, RestroomId};

/// True when any of `incidents` for `restroom_id` is pending.
pub fn has_active_incident<'a, I>(restroom_id: RestroomId, incidents: I) -> bool
where
    I: IntoIterator<Item = &'a Incident>,
{
    incidents
        .into_iter()
        .any(|incident| incident.restroom_id() == restroom_id && incident.is_pending())
}

/// True when a check may be logged against `restroom_id`.
///
/// # Examples
/// ```
/// use facility_backend::domain::{RestroomId, gating};
///
/// assert!(gating::can_log_check(RestroomId::new(1), &[]));
/// ```
pub fn can_log_check<'a, I>(restroom_id: RestroomId, incidents: I) -> bool
where
    I: IntoIterator<Item = &'a Incident>,
{
    !has_active_incident(restroom_id, incidents)
}

/// Derived status of a single restroom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestroomStatus {
    pub restroom_id: RestroomId,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub last_checked_by: Option<CustodianId>,
    pub has_active_incident: bool,
}

impl RestroomStatus {
    /// Compute the status from the latest check and the restroom's incidents.
    pub fn derive<'a, I>(restroom_id: RestroomId, latest_check: Option<&Check>, incidents: I) -> Self
    where
        I: IntoIterator<Item = &'a Incident>,
    {
        Self {
            restroom_id,
            last_checked_at: latest_check.map(Check::checked_at),
            last_checked_by: latest_check.map(Check::custodian_id),
            has_active_incident: has_active_incident(restroom_id, incidents),
        }
    }
}
