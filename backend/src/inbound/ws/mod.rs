//! WebSocket inbound adapter pushing change notifications to listeners.
//!
//! Clients open `GET /events` with a staff session cookie and then receive
//! one text frame per committed mutation. Nothing the client sends is
//! interpreted beyond pings and close frames. Logging out closes every
//! listener opened under that login.

use actix_web::web::{self, Payload};
use actix_web::{HttpRequest, HttpResponse, get};
use tracing::{debug, error};

use crate::domain::Error;
use crate::inbound::http::session::SessionContext;

mod session;

pub mod state;

/// Upgrade an authenticated request to the change feed.
#[get("/events")]
pub async fn events_entry(
    state: web::Data<state::WsState>,
    session: SessionContext,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    session.capabilities().require_authenticated()?;
    let login_id = session
        .login_id()
        .ok_or_else(|| Error::unauthorized("login required"))?;

    // Subscribe before answering the upgrade so no event published after the
    // handshake is missed.
    let receiver = state.broadcaster.subscribe();
    let (response, ws_session, messages) = actix_ws::handle(&req, stream).map_err(|err| {
        error!(error = %err, "WebSocket upgrade failed");
        err
    })?;

    debug!("change listener connected");
    let login = session::LoginWatch::new(state.sessions.clone(), login_id);
    actix_web::rt::spawn(session::run_listener(ws_session, messages, receiver, login));
    Ok(response)
}
