//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod audit_log;
mod change_broadcaster;
mod facility_command;
mod facility_query;
mod facility_repository;
mod login_service;
mod mailer;

#[cfg(test)]
pub use audit_log::{MockAuditArchive, MockAuditLog};
pub use audit_log::{AuditArchive, AuditFile, AuditLog, AuditLogError};
#[cfg(test)]
pub use change_broadcaster::MockChangeBroadcaster;
pub use change_broadcaster::ChangeBroadcaster;
#[cfg(test)]
pub use facility_command::MockFacilityCommand;
pub use facility_command::{FacilityCommand, LogCheckRequest, ReportIncidentRequest};
#[cfg(test)]
pub use facility_query::MockFacilityQuery;
pub use facility_query::FacilityQuery;
#[cfg(test)]
pub use facility_repository::MockFacilityRepository;
pub use facility_repository::{
    CheckInsertion, FacilityRepository, FacilityRepositoryError, RECENT_CHECKS_LIMIT,
    ResolveOutcome,
};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{LoginService, SharedSecretLoginService};
#[cfg(test)]
pub use mailer::MockMailer;
pub use mailer::{DisabledMailer, MailAttachment, MailMessage, Mailer, MailerError};
