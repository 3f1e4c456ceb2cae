/// Largest brightness level the panel LED driver accepts.
pub const BRIGHTNESS_MAX: u16 = 4095;

/// Clamp a requested brightness into the range the hardware accepts.
/// Out-of-range requests are adjusted rather than rejected.
pub fn clamp_brightness(requested: i64) -> u16 {
    requested.clamp(0, BRIGHTNESS_MAX as i64) as u16
}

/// Commands understood by the flat panel firmware.
///
/// Each encodes to a single bare ASCII token; the firmware expects no
/// terminator after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Open,
    Close,
    Brightness(u16),
}

impl Command {
    /// Wire form of the command. Brightness is clamped here as well, so
    /// no value outside [0, 4095] ever reaches the port.
    pub fn encode(&self) -> String {
        match self {
            Command::Open => "OPEN".to_string(),
            Command::Close => "CLOSE".to_string(),
            Command::Brightness(level) => {
                format!("BRIGHTNESS {}", (*level).min(BRIGHTNESS_MAX))
            }
        }
    }
}
