use serde::{Deserialize, Serialize};

/// Path of the streaming endpoint on the serving host.
pub const WS_PATH: &str = "/ws";

/// Value of the `type` field that marks an inbound record as a status notice.
/// Records without it are telemetry.
pub const STATUS_TAG: &str = "status";

/// Commands from client → backend.
///   { "type": "connect" }
///   { "type": "takeoff", "altitude": 10.0 }
///   { "type": "mode", "mode_name": "GUIDED" }
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandIntent {
    Connect,
    Arm,
    Takeoff {
        altitude: f64,
    },
    Land,
    Goto {
        latitude: f64,
        longitude: f64,
        altitude: f64,
    },
    #[serde(rename = "mode")]
    SetMode {
        mode_name: String,
    },
}

impl CommandIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandIntent::Connect => "connect",
            CommandIntent::Arm => "arm",
            CommandIntent::Takeoff { .. } => "takeoff",
            CommandIntent::Land => "land",
            CommandIntent::Goto { .. } => "goto",
            CommandIntent::SetMode { .. } => "mode",
        }
    }
}

/// One vehicle telemetry record as streamed by the backend.
/// Extra fields on the wire (heading, connected, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub armed: bool,
    pub mode: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl TelemetrySnapshot {
    pub fn position(&self) -> Position {
        Position {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

/// Advisory message from the backend: { "type": "status", "message": "..." }
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusNotice {
    #[serde(default)]
    pub message: String,
}
