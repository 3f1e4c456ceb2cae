use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Re-export the wire-level state vocabulary
pub use crate::serial::parser::CoverState;
pub use crate::serial::protocol::BRIGHTNESS_MAX;

/// Name the driver registers under with the host framework.
pub const DEVICE_NAME: &str = "PrometheusAstro Flat Panel Cover";

/// Driver version advertised to the host framework.
pub const DRIVER_VERSION: (u16, u16) = (1, 1);

/// Device connection state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Name and label of a published control element.
#[derive(Debug, Clone, Copy)]
pub struct ControlMeta {
    pub name: &'static str,
    pub label: &'static str,
}

/// Options of the exclusive cover control, in display order.
pub const COVER_SWITCH_OPTIONS: [ControlMeta; 2] = [
    ControlMeta {
        name: "OPEN",
        label: "Open Cover",
    },
    ControlMeta {
        name: "CLOSE",
        label: "Close Cover",
    },
];

/// Read-only status text field.
pub const STATUS_FIELD: ControlMeta = ControlMeta {
    name: "STATUS",
    label: "Device Status",
};

/// Bounds the host publishes for the brightness control.
#[derive(Debug, Clone, Copy)]
pub struct BrightnessBounds {
    pub name: &'static str,
    pub label: &'static str,
    pub min: u16,
    pub max: u16,
    pub step: u16,
}

pub const BRIGHTNESS_CONTROL: BrightnessBounds = BrightnessBounds {
    name: "BRIGHTNESS",
    label: "Brightness Level",
    min: 0,
    max: BRIGHTNESS_MAX,
    step: 1,
};

/// State vector of the two-option exclusive cover switch.
///
/// Inbound, only an option that moved to "on" is actionable; an update
/// with both options off is acknowledged and ignored. Outbound, it
/// renders the reported cover state, with both options off while the
/// cover is moving or its position is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverSwitch {
    pub open: bool,
    pub close: bool,
}

impl From<CoverState> for CoverSwitch {
    fn from(state: CoverState) -> Self {
        Self {
            open: state == CoverState::Open,
            close: state == CoverState::Closed,
        }
    }
}

/// Direction the cover is asked to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverCommand {
    Open,
    Close,
}

/// Published device state, consumed by the framework glue and UIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub connection: ConnectionState,
    pub port_name: Option<String>,
    pub cover: CoverState,
    pub cover_switch: CoverSwitch,
    pub brightness: u16,
    pub status_message: String,
    pub last_update: DateTime<Utc>,
}

impl DeviceSnapshot {
    pub fn disconnected() -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            port_name: None,
            cover: CoverState::Unknown,
            cover_switch: CoverSwitch::from(CoverState::Unknown),
            brightness: 0,
            status_message: CoverState::Unknown.status_message().to_string(),
            last_update: Utc::now(),
        }
    }
}

impl Default for DeviceSnapshot {
    fn default() -> Self {
        Self::disconnected()
    }
}

/// Driver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Port name prefixes considered flat panel candidates, tried in
    /// enumeration order.
    pub port_prefixes: Vec<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            port_prefixes: vec!["/dev/ttyUSB".to_string()],
        }
    }
}
