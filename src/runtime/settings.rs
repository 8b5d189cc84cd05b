use serde::{Deserialize, Serialize};

/// Process-wide tracking switch, handed to the tracker through the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingSettings {
    pub enabled: bool,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl TrackingSettings {
    pub const DISABLED: TrackingSettings = TrackingSettings { enabled: false };
}
