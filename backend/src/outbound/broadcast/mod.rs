//! Tokio broadcast channel implementation of [`ChangeBroadcaster`].

use tokio::sync::broadcast;

use crate::domain::DataChangedEvent;
use crate::domain::ports::ChangeBroadcaster;

/// Default ring size; a listener further behind than this skips ahead.
pub const DEFAULT_CAPACITY: usize = 64;

/// Bounded fan-out of change events.
///
/// `publish` never waits on receivers. With no listeners the event is
/// dropped.
#[derive(Debug, Clone)]
pub struct TokioChangeBroadcaster {
    sender: broadcast::Sender<DataChangedEvent>,
}

impl TokioChangeBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for TokioChangeBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ChangeBroadcaster for TokioChangeBroadcaster {
    fn publish(&self, event: DataChangedEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    fn subscribe(&self) -> broadcast::Receiver<DataChangedEvent> {
        self.sender.subscribe()
    }
}
