//! Per-connection change listener.
//!
//! Forwards broadcast events as JSON text frames, pings the client on a
//! fixed interval, and drops the connection once the client stops
//! answering or the login that opened it has ended.

use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::sync::broadcast::{Receiver, error::RecvError};
use tokio::time;
use tracing::{debug, warn};

use crate::domain::DataChangedEvent;
use crate::inbound::http::session::login_is_active;
use crate::inbound::http::session_store::MemorySessionStore;

#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(300);

enum ListenerExit {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    FeedClosed,
    HeartbeatTimeout,
    SessionEnded,
    Protocol(ProtocolError),
    Network(Closed),
}

impl ListenerExit {
    fn close_reason(self) -> Option<Option<CloseReason>> {
        match self {
            Self::HeartbeatTimeout => Some(Some(CloseReason {
                code: CloseCode::Normal,
                description: Some("heartbeat timeout".to_owned()),
            })),
            Self::SessionEnded => Some(Some(CloseReason {
                code: CloseCode::Policy,
                description: Some("session ended".to_owned()),
            })),
            Self::Protocol(_) => Some(Some(CloseReason {
                code: CloseCode::Protocol,
                description: Some("protocol error".to_owned()),
            })),
            Self::FeedClosed => Some(Some(CloseReason {
                code: CloseCode::Away,
                description: Some("server shutting down".to_owned()),
            })),
            Self::ClientClosed(reason) => Some(reason),
            Self::StreamClosed | Self::Network(_) => None,
        }
    }

    fn log(&self) {
        match self {
            Self::HeartbeatTimeout => warn!("change listener heartbeat timeout"),
            Self::SessionEnded => debug!("change listener login ended"),
            Self::Protocol(error) => warn!(error = %error, "change listener protocol error"),
            Self::Network(error) => warn!(error = %error, "change listener send failed"),
            Self::FeedClosed | Self::ClientClosed(_) | Self::StreamClosed => {
                debug!("change listener disconnected");
            }
        }
    }
}

/// The login a listener was opened under.
pub(super) struct LoginWatch {
    sessions: MemorySessionStore,
    login_id: String,
}

impl LoginWatch {
    pub(super) fn new(sessions: MemorySessionStore, login_id: String) -> Self {
        Self { sessions, login_id }
    }

    fn ensure_active(&self) -> Result<(), ListenerExit> {
        if login_is_active(&self.sessions, &self.login_id) {
            Ok(())
        } else {
            Err(ListenerExit::SessionEnded)
        }
    }
}

pub(super) async fn run_listener(
    mut session: Session,
    mut stream: MessageStream,
    mut feed: Receiver<DataChangedEvent>,
    login: LoginWatch,
) {
    let mut last_seen = Instant::now();
    let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

    let exit = loop {
        let step = tokio::select! {
            _ = heartbeat.tick() => match login.ensure_active() {
                Ok(()) => ping(&mut session, last_seen).await,
                Err(exit) => Err(exit),
            },
            message = stream.recv() => on_client_message(&mut session, &mut last_seen, message).await,
            event = feed.recv() => match login.ensure_active() {
                Ok(()) => forward(&mut session, event).await,
                Err(exit) => Err(exit),
            },
        };
        if let Err(exit) = step {
            break exit;
        }
    };

    exit.log();
    if let Some(reason) = exit.close_reason() {
        if let Err(error) = session.close(reason).await {
            debug!(error = %error, "change listener already closed");
        }
    }
}

async fn ping(session: &mut Session, last_seen: Instant) -> Result<(), ListenerExit> {
    if last_seen.elapsed() > CLIENT_TIMEOUT {
        return Err(ListenerExit::HeartbeatTimeout);
    }
    session.ping(b"").await.map_err(ListenerExit::Network)
}

async fn on_client_message(
    session: &mut Session,
    last_seen: &mut Instant,
    message: Option<Result<Message, ProtocolError>>,
) -> Result<(), ListenerExit> {
    let message = match message {
        None => return Err(ListenerExit::StreamClosed),
        Some(Err(error)) => return Err(ListenerExit::Protocol(error)),
        Some(Ok(message)) => message,
    };
    *last_seen = Instant::now();
    match message {
        Message::Ping(payload) => session.pong(&payload).await.map_err(ListenerExit::Network),
        Message::Close(reason) => Err(ListenerExit::ClientClosed(reason)),
        Message::Text(_)
        | Message::Binary(_)
        | Message::Pong(_)
        | Message::Continuation(_)
        | Message::Nop => Ok(()),
    }
}

async fn forward(
    session: &mut Session,
    event: Result<DataChangedEvent, RecvError>,
) -> Result<(), ListenerExit> {
    match event {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(body) => session.text(body).await.map_err(ListenerExit::Network),
            Err(error) => {
                warn!(error = %error, "failed to serialise change event");
                Ok(())
            }
        },
        Err(RecvError::Lagged(skipped)) => {
            warn!(skipped, "change listener lagged; dropping oldest events");
            Ok(())
        }
        Err(RecvError::Closed) => Err(ListenerExit::FeedClosed),
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
