//! Port for outgoing email.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by mail adapters.
    pub enum MailerError {
        /// No mail channel is configured.
        NotConfigured => "mail delivery is not configured",
        /// The relay could not be reached.
        Transport { message: String } => "mail transport failed: {message}",
        /// The relay answered with a failure.
        Rejected { status: u16, message: String } =>
            "mail relay rejected message ({status}): {message}",
    }
}

/// File attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAttachment {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Message addressed to the configured operations mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub subject: String,
    pub body: String,
    pub attachments: Vec<MailAttachment>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Whether a delivery channel exists at all.
    fn is_configured(&self) -> bool;

    /// Deliver `message`. Adapters do not retry.
    async fn send(&self, message: MailMessage) -> Result<(), MailerError>;
}

/// Mailer used when no relay is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    fn is_configured(&self) -> bool {
        false
    }

    async fn send(&self, _message: MailMessage) -> Result<(), MailerError> {
        Err(MailerError::not_configured())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_mailer_refuses_to_send() {
        let mailer = DisabledMailer;
        assert!(!mailer.is_configured());
        let err = mailer
            .send(MailMessage {
                subject: "s".to_owned(),
                body: "b".to_owned(),
                attachments: Vec::new(),
            })
            .await
            .expect_err("disabled");
        assert_eq!(err, MailerError::NotConfigured);
    }

    #[test]
    fn rejected_error_formats_status() {
        let err = MailerError::rejected(502_u16, "bad gateway");
        assert_eq!(
            err.to_string(),
            "mail relay rejected message (502): bad gateway"
        );
    }
}
