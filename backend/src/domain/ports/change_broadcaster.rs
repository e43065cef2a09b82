//! Port for pushing change notifications to live listeners.

use tokio::sync::broadcast;

use crate::domain::DataChangedEvent;

/// Fan-out channel for [`DataChangedEvent`]s.
///
/// Publishing never blocks. Listeners that fall behind lose the oldest
/// events and carry on.
#[cfg_attr(test, mockall::automock)]
pub trait ChangeBroadcaster: Send + Sync {
    /// Send `event` to every subscriber, returning how many received it.
    fn publish(&self, event: DataChangedEvent) -> usize;

    /// Register a new listener.
    fn subscribe(&self) -> broadcast::Receiver<DataChangedEvent>;
}
