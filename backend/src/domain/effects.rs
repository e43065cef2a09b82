//! Post-commit effect pipeline.
//!
//! Commands build an ordered list of [`PostCommitEffect`]s once their store
//! write has succeeded and hand it to [`EffectDispatcher::dispatch`]. Each
//! effect runs on its own: a failure is logged at `warn` and the remaining
//! effects still run. Nothing is retried and nothing reaches the caller.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, warn};

use crate::domain::ports::{AuditLog, ChangeBroadcaster, MailMessage, Mailer};
use crate::domain::{AuditEntry, DataChangedEvent};

/// Details carried by the incident notification email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentNotification {
    pub incident_id: i32,
    pub restroom: String,
    pub building: String,
    pub floor: String,
    pub reporter: String,
    pub description: String,
    pub severity: String,
    pub reported_at: DateTime<Utc>,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub last_checked_by: Option<String>,
}

impl IncidentNotification {
    /// Render the notification as a plain-text message.
    pub fn to_mail_message(&self) -> MailMessage {
        let last_check = match (self.last_checked_at, self.last_checked_by.as_deref()) {
            (Some(at), Some(by)) => format!("{} by {by}", timestamp(at)),
            (Some(at), None) => timestamp(at),
            _ => "never".to_owned(),
        };
        let body = format!(
            "A new incident has been reported.\n\n\
             Restroom: {restroom}\n\
             Location: {building}, floor {floor}\n\
             Reported by: {reporter}\n\
             Severity: {severity}\n\
             Reported at: {reported_at}\n\
             Last checked: {last_check}\n\n\
             {description}\n",
            restroom = self.restroom,
            building = self.building,
            floor = self.floor,
            reporter = self.reporter,
            severity = self.severity,
            reported_at = timestamp(self.reported_at),
            description = self.description,
        );
        MailMessage {
            subject: format!(
                "[{}] Incident #{} at {}",
                self.severity, self.incident_id, self.restroom
            ),
            body,
            attachments: Vec::new(),
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// A best-effort step run after a successful store write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostCommitEffect {
    NotifyIncident(IncidentNotification),
    Audit(AuditEntry),
    Broadcast(DataChangedEvent),
}

impl PostCommitEffect {
    fn label(&self) -> &'static str {
        match self {
            Self::NotifyIncident(_) => "notify_incident",
            Self::Audit(_) => "audit",
            Self::Broadcast(_) => "broadcast",
        }
    }
}

/// Runs post-commit effects against the notification adapters.
#[derive(Clone)]
pub struct EffectDispatcher {
    broadcaster: Arc<dyn ChangeBroadcaster>,
    audit: Arc<dyn AuditLog>,
    mailer: Arc<dyn Mailer>,
}

impl EffectDispatcher {
    pub fn new(
        broadcaster: Arc<dyn ChangeBroadcaster>,
        audit: Arc<dyn AuditLog>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            broadcaster,
            audit,
            mailer,
        }
    }

    /// Run every effect in order. Never fails.
    pub async fn dispatch(&self, effects: Vec<PostCommitEffect>) {
        for effect in effects {
            let label = effect.label();
            if let Err(message) = self.run(effect).await {
                warn!(effect = label, error = %message, "post-commit effect failed");
            }
        }
    }

    async fn run(&self, effect: PostCommitEffect) -> Result<(), String> {
        match effect {
            PostCommitEffect::NotifyIncident(notification) => {
                if !self.mailer.is_configured() {
                    debug!(
                        incident_id = notification.incident_id,
                        "mail not configured; skipping incident email"
                    );
                    return Ok(());
                }
                self.mailer
                    .send(notification.to_mail_message())
                    .await
                    .map_err(|err| err.to_string())
            }
            PostCommitEffect::Audit(entry) => {
                self.audit.append(&entry).await.map_err(|err| err.to_string())
            }
            PostCommitEffect::Broadcast(event) => {
                let receivers = self.broadcaster.publish(event);
                debug!(reason = event.reason.as_str(), receivers, "broadcast data change");
                Ok(())
            }
        }
    }
}
