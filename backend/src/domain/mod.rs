//! Domain primitives, services, and ports.
//!
//! Purpose: model restrooms, custodians, checks, and incidents, enforce the
//! gating rule, and describe the driven ports the outbound adapters
//! implement. Nothing here knows about HTTP, SQL, or files.
//!
//! Public surface:
//! - Error and ErrorCode: transport-agnostic failure payload.
//! - Restroom, Custodian, Check, Incident: validated records.
//! - Capabilities: per-session `{authenticated, admin}` flags.
//! - FacilityService: the gating engine behind the command and query ports.
//! - EffectDispatcher: post-commit notification pipeline.
//! - MonthlyReportJob and MonthlyReportScheduler: audit file roll-up.

pub mod access;
pub mod audit;
pub mod auth;
pub mod check;
pub mod effects;
pub mod error;
pub mod events;
pub mod facility;
pub mod facility_service;
pub mod gating;
pub mod ids;
pub mod incident;
pub mod monthly_report;
pub mod ports;
pub mod trace_id;

pub use self::access::Capabilities;
pub use self::audit::{AUDIT_HEADER, AuditEntry, AuditEventKind, AuditPeriod};
pub use self::auth::{LoginValidationError, Password, Role, SharedSecret};
pub use self::check::{CHECK_NOTE_MAX, Check, CheckNote, CheckValidationError, NewCheck};
pub use self::effects::{EffectDispatcher, IncidentNotification, PostCommitEffect};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::events::{ChangeReason, DataChangedEvent};
pub use self::facility::{
    Custodian, FacilitySeed, FacilityValidationError, Gender, LABEL_MAX, Restroom,
};
pub use self::facility_service::FacilityService;
pub use self::gating::RestroomStatus;
pub use self::ids::{CheckId, CustodianId, IncidentId, RestroomId};
pub use self::incident::{
    DEFAULT_SEVERITY, DESCRIPTION_MAX, Incident, IncidentDescription, IncidentDraft,
    IncidentValidationError, LastCheckSnapshot, NewIncident, SEVERITY_MAX, Severity,
};
pub use self::monthly_report::{
    MonthlyReportJob, MonthlyReportScheduler, REPORT_MINUTE, ReportOutcome, ReportSleeper,
    TokioSleeper, next_run_after,
};
pub use self::trace_id::TraceId;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use facility_backend::domain::{ApiResult, Error};
///
/// fn guarded() -> ApiResult<()> {
///     Err(Error::forbidden("admin access required"))
/// }
/// # assert!(guarded().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
