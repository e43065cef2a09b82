//! Reqwest-backed mail relay adapter.
//!
//! Owns transport details only: payload serialisation, bearer
//! authentication, request timeout, and HTTP error mapping.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::RelayMessageDto;
use crate::domain::ports::{MailMessage, Mailer, MailerError};

/// Sender, recipients and credentials for the relay.
#[derive(Clone)]
pub struct MailRelayIdentity {
    pub from: String,
    pub to: Vec<String>,
    pub token: Option<Zeroizing<String>>,
}

/// [`Mailer`] that POSTs JSON messages to a single relay endpoint.
pub struct HttpMailRelay {
    client: Client,
    endpoint: Url,
    identity: MailRelayIdentity,
}

impl HttpMailRelay {
    /// Build a relay client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        timeout: Duration,
        identity: MailRelayIdentity,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            identity,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailRelay {
    fn is_configured(&self) -> bool {
        !self.identity.to.is_empty()
    }

    async fn send(&self, message: MailMessage) -> Result<(), MailerError> {
        if !self.is_configured() {
            return Err(MailerError::not_configured());
        }
        let payload = RelayMessageDto::new(&self.identity.from, &self.identity.to, &message);
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload);
        if let Some(token) = self.identity.token.as_ref() {
            request = request.bearer_auth(token.as_str());
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(map_status_error(status, body.as_ref()));
        }
        debug!(subject = %message.subject, "mail relay accepted message");
        Ok(())
    }
}

fn map_transport_error(error: reqwest::Error) -> MailerError {
    if error.is_timeout() {
        MailerError::transport(format!("timed out: {error}"))
    } else {
        MailerError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> MailerError {
    const PREVIEW_CHAR_LIMIT: usize = 160;
    let preview: String = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(PREVIEW_CHAR_LIMIT)
        .collect();
    MailerError::rejected(status.as_u16(), preview)
}
