//! Incidents: reported problems that block checks until resolved.
//!
//! An incident starts pending and transitions to resolved exactly once. The
//! resolution timestamp is written with the transition and never changes
//! afterwards. Incidents also carry a snapshot of the restroom's latest check
//! at the moment they were reported, so notification emails and the audit
//! trail can say when the restroom was last seen in good order.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::domain::{CustodianId, IncidentId, RestroomId};

/// Severity applied when the reporter does not provide one.
pub const DEFAULT_SEVERITY: &str = "medium";
/// Maximum characters accepted in an incident description.
pub const DESCRIPTION_MAX: usize = 2000;
/// Maximum characters accepted in a severity tag.
pub const SEVERITY_MAX: usize = 32;

/// Validation errors raised while constructing incidents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncidentValidationError {
    EmptyDescription,
    DescriptionTooLong { max: usize },
    SeverityTooLong { max: usize },
    PendingWithResolution,
    ResolvedWithoutTimestamp,
    ResolvedBeforeCreated,
}

impl fmt::Display for IncidentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDescription => write!(f, "description must not be empty"),
            Self::DescriptionTooLong { max } => {
                write!(f, "description must be at most {max} characters")
            }
            Self::SeverityTooLong { max } => write!(f, "severity must be at most {max} characters"),
            Self::PendingWithResolution => {
                write!(f, "a pending incident must not carry a resolution time")
            }
            Self::ResolvedWithoutTimestamp => {
                write!(f, "a resolved incident must carry a resolution time")
            }
            Self::ResolvedBeforeCreated => {
                write!(f, "resolution time must not precede creation time")
            }
        }
    }
}

impl std::error::Error for IncidentValidationError {}

/// Human description of the problem, non-empty once trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentDescription(String);

impl IncidentDescription {
    /// Validate a raw description.
    ///
    /// # Examples
    /// ```
    /// use facility_backend::domain::IncidentDescription;
    ///
    /// assert!(IncidentDescription::new("   ").is_err());
    /// assert_eq!(IncidentDescription::new(" clogged ").unwrap().as_str(), "clogged");
    /// ```
    pub fn new(raw: &str) -> Result<Self, IncidentValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IncidentValidationError::EmptyDescription);
        }
        if trimmed.chars().count() > DESCRIPTION_MAX {
            return Err(IncidentValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for IncidentDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-form severity tag. Blank or missing input means `"medium"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Severity(String);

impl Severity {
    pub fn parse(raw: Option<&str>) -> Result<Self, IncidentValidationError> {
        let Some(trimmed) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(Self::default());
        };
        if trimmed.chars().count() > SEVERITY_MAX {
            return Err(IncidentValidationError::SeverityTooLong { max: SEVERITY_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self(DEFAULT_SEVERITY.to_owned())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Most recent check on the restroom when the incident was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastCheckSnapshot {
    pub checked_at: DateTime<Utc>,
    pub checked_by: CustodianId,
}

/// Incident awaiting insertion; always pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIncident {
    pub custodian_id: CustodianId,
    pub restroom_id: RestroomId,
    pub description: IncidentDescription,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
    pub last_check: Option<LastCheckSnapshot>,
}

/// Raw parts used to rebuild a persisted incident.
#[derive(Debug, Clone)]
pub struct IncidentDraft {
    pub id: IncidentId,
    pub custodian_id: CustodianId,
    pub restroom_id: RestroomId,
    pub description: IncidentDescription,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
    pub pending: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub last_check: Option<LastCheckSnapshot>,
}

/// A persisted incident.
///
/// ## Invariants
/// - `pending` is true exactly when `resolved_at` is `None`.
/// - `resolved_at`, when set, is not earlier than `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incident {
    id: IncidentId,
    custodian_id: CustodianId,
    restroom_id: RestroomId,
    description: IncidentDescription,
    severity: Severity,
    created_at: DateTime<Utc>,
    pending: bool,
    resolved_at: Option<DateTime<Utc>>,
    last_check: Option<LastCheckSnapshot>,
}

impl Incident {
    /// Rebuild an incident, validating the resolution invariants.
    pub fn new(draft: IncidentDraft) -> Result<Self, IncidentValidationError> {
        match (draft.pending, draft.resolved_at) {
            (true, Some(_)) => return Err(IncidentValidationError::PendingWithResolution),
            (false, None) => return Err(IncidentValidationError::ResolvedWithoutTimestamp),
            (false, Some(at)) if at < draft.created_at => {
                return Err(IncidentValidationError::ResolvedBeforeCreated);
            }
            _ => {}
        }
        Ok(Self {
            id: draft.id,
            custodian_id: draft.custodian_id,
            restroom_id: draft.restroom_id,
            description: draft.description,
            severity: draft.severity,
            created_at: draft.created_at,
            pending: draft.pending,
            resolved_at: draft.resolved_at,
            last_check: draft.last_check,
        })
    }

    /// Attach a store-assigned id to a freshly reported incident.
    pub fn from_new(id: IncidentId, new: NewIncident) -> Self {
        Self {
            id,
            custodian_id: new.custodian_id,
            restroom_id: new.restroom_id,
            description: new.description,
            severity: new.severity,
            created_at: new.created_at,
            pending: true,
            resolved_at: None,
            last_check: new.last_check,
        }
    }

    /// Transition to resolved.
    ///
    /// Returns `false` and leaves the incident untouched when it is already
    /// resolved. A timestamp earlier than `created_at` is clamped up to it.
    pub fn resolve(&mut self, at: DateTime<Utc>) -> bool {
        if !self.pending {
            return false;
        }
        self.pending = false;
        self.resolved_at = Some(at.max(self.created_at));
        true
    }

    pub fn id(&self) -> IncidentId {
        self.id
    }

    pub fn custodian_id(&self) -> CustodianId {
        self.custodian_id
    }

    pub fn restroom_id(&self) -> RestroomId {
        self.restroom_id
    }

    pub fn description(&self) -> &IncidentDescription {
        &self.description
    }

    pub fn severity(&self) -> &Severity {
        &self.severity
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    pub fn last_check(&self) -> Option<LastCheckSnapshot> {
        self.last_check
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::{fixture, rstest};

    #[fixture]
    fn created_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, 9, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    fn draft(
        created_at: DateTime<Utc>,
        pending: bool,
        resolved_at: Option<DateTime<Utc>>,
    ) -> IncidentDraft {
        IncidentDraft {
            id: IncidentId::new(1),
            custodian_id: CustodianId::new(1),
            restroom_id: RestroomId::new(1),
            description: IncidentDescription::new("clogged").expect("valid"),
            severity: Severity::default(),
            created_at,
            pending,
            resolved_at,
            last_check: None,
        }
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n")]
    fn blank_descriptions_are_rejected(#[case] raw: &str) {
        assert_eq!(
            IncidentDescription::new(raw),
            Err(IncidentValidationError::EmptyDescription)
        );
    }

    #[rstest]
    #[case(None, "medium")]
    #[case(Some("  "), "medium")]
    #[case(Some(" high "), "high")]
    fn severity_defaults_to_medium(#[case] raw: Option<&str>, #[case] expected: &str) {
        assert_eq!(Severity::parse(raw).expect("valid").as_str(), expected);
    }

    #[rstest]
    fn pending_incident_with_resolution_is_rejected(created_at: DateTime<Utc>) {
        let err = Incident::new(draft(created_at, true, Some(created_at))).expect_err("invalid");
        assert_eq!(err, IncidentValidationError::PendingWithResolution);
    }

    #[rstest]
    fn resolved_incident_without_timestamp_is_rejected(created_at: DateTime<Utc>) {
        let err = Incident::new(draft(created_at, false, None)).expect_err("invalid");
        assert_eq!(err, IncidentValidationError::ResolvedWithoutTimestamp);
    }

    #[rstest]
    fn resolution_before_creation_is_rejected(created_at: DateTime<Utc>) {
        let earlier = created_at - Duration::minutes(1);
        let err = Incident::new(draft(created_at, false, Some(earlier))).expect_err("invalid");
        assert_eq!(err, IncidentValidationError::ResolvedBeforeCreated);
    }

    #[rstest]
    fn resolve_transitions_once(created_at: DateTime<Utc>) {
        let mut incident = Incident::new(draft(created_at, true, None)).expect("valid");
        let first = created_at + Duration::hours(1);
        assert!(incident.resolve(first));
        assert!(!incident.is_pending());
        assert_eq!(incident.resolved_at(), Some(first));

        assert!(!incident.resolve(first + Duration::hours(1)));
        assert_eq!(incident.resolved_at(), Some(first));
    }

    #[rstest]
    fn resolve_clamps_to_creation_time(created_at: DateTime<Utc>) {
        let mut incident = Incident::new(draft(created_at, true, None)).expect("valid");
        assert!(incident.resolve(created_at - Duration::seconds(5)));
        assert_eq!(incident.resolved_at(), Some(created_at));
    }
}
