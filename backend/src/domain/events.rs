//! Change notifications pushed to connected listeners.

use serde::{Deserialize, Serialize};

/// Why the data changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeReason {
    CheckLogged,
    IncidentReported,
    IncidentResolved,
}

impl ChangeReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CheckLogged => "check-logged",
            Self::IncidentReported => "incident-reported",
            Self::IncidentResolved => "incident-resolved",
        }
    }
}

/// Message sent to every listener after a committed mutation.
///
/// Serialises as `{"type":"data-changed","reason":"check-logged"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "data-changed")]
pub struct DataChangedEvent {
    pub reason: ChangeReason,
}

impl DataChangedEvent {
    pub const fn new(reason: ChangeReason) -> Self {
        Self { reason }
    }
}
