//! Mail outbound adapters.
//!
//! Email leaves the process through a JSON mail-relay HTTP API. When no relay
//! endpoint is configured the server uses
//! [`DisabledMailer`](crate::domain::ports::DisabledMailer) instead.

mod dto;
mod http_relay;

pub use http_relay::{HttpMailRelay, MailRelayIdentity};
