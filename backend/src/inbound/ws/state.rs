//! Shared WebSocket adapter state.

use std::sync::Arc;

use crate::domain::ports::ChangeBroadcaster;
use crate::inbound::http::session_store::MemorySessionStore;

/// Dependency bundle for the change feed endpoint.
#[derive(Clone)]
pub struct WsState {
    pub broadcaster: Arc<dyn ChangeBroadcaster>,
    /// Store behind the session middleware, consulted to end listeners
    /// whose login has gone.
    pub sessions: MemorySessionStore,
}

impl WsState {
    pub fn new(broadcaster: Arc<dyn ChangeBroadcaster>, sessions: MemorySessionStore) -> Self {
        Self {
            broadcaster,
            sessions,
        }
    }
}
