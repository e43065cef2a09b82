//! Application settings loaded via OrthoConfig.
//!
//! Every field can be set from the command line, a config file, or a
//! `FACILITY_`-prefixed environment variable.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::SharedSecret;
use crate::outbound::mail::MailRelayIdentity;

const DEFAULT_AUDIT_DIR: &str = "audit";
const DEFAULT_MAIL_TIMEOUT_SECS: u64 = 10;
const DEFAULT_POOL_SIZE: u32 = 10;

/// Runtime configuration for the facility server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FACILITY")]
pub struct AppSettings {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL. Without one the server keeps data in memory.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub pool_size: Option<u32>,
    /// Shared password for staff logins.
    pub staff_password: Option<String>,
    /// Shared password for admin logins.
    pub admin_password: Option<String>,
    /// Directory holding the monthly audit CSV files.
    pub audit_dir: Option<PathBuf>,
    /// Mail relay endpoint. Email is disabled when absent.
    pub mail_endpoint: Option<String>,
    /// Bearer token for the mail relay.
    pub mail_token: Option<String>,
    /// Sender address used for notifications and reports.
    pub mail_from: Option<String>,
    /// Comma-separated recipient list.
    pub mail_to: Option<String>,
    /// Mail relay request timeout in seconds.
    pub mail_timeout_secs: Option<u64>,
    /// Keep last month's audit file when the report email could not be sent.
    #[ortho_config(default = false)]
    pub retain_unsent_reports: bool,
    /// Seed file for restrooms and custodians; the bundled fixture otherwise.
    pub seed_path: Option<PathBuf>,
}

/// Problems found while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid mail endpoint '{value}': {source}")]
    MailEndpoint {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("mail endpoint is set but no sender address is configured")]
    MissingSender,
}

impl AppSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)))
    }

    pub fn pool_size(&self) -> u32 {
        self.pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }

    pub fn audit_dir(&self) -> PathBuf {
        self.audit_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_AUDIT_DIR))
    }

    /// Staff secret; logins are refused when unset or blank.
    pub fn staff_secret(&self) -> Option<SharedSecret> {
        self.staff_password.as_deref().and_then(SharedSecret::new)
    }

    /// Admin secret; admin logins are refused when unset or blank.
    pub fn admin_secret(&self) -> Option<SharedSecret> {
        self.admin_password.as_deref().and_then(SharedSecret::new)
    }

    pub fn mail_timeout(&self) -> Duration {
        Duration::from_secs(self.mail_timeout_secs.unwrap_or(DEFAULT_MAIL_TIMEOUT_SECS))
    }

    /// Recipients parsed from `mail_to`, blanks dropped.
    pub fn mail_recipients(&self) -> Vec<String> {
        self.mail_to
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|addr| !addr.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Relay endpoint and identity, or `None` when email is disabled.
    ///
    /// # Errors
    ///
    /// Fails when the endpoint is not a URL or no sender is configured.
    pub fn mail_relay(&self) -> Result<Option<(Url, MailRelayIdentity)>, SettingsError> {
        let Some(raw) = self.mail_endpoint.as_deref().filter(|v| !v.trim().is_empty()) else {
            return Ok(None);
        };
        let endpoint = Url::parse(raw).map_err(|source| SettingsError::MailEndpoint {
            value: raw.to_owned(),
            source,
        })?;
        let from = self
            .mail_from
            .clone()
            .filter(|from| !from.trim().is_empty())
            .ok_or(SettingsError::MissingSender)?;
        let identity = MailRelayIdentity {
            from,
            to: self.mail_recipients(),
            token: self.mail_token.clone().map(Zeroizing::new),
        };
        Ok(Some((endpoint, identity)))
    }
}
