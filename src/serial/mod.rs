pub mod parser;
pub mod port;
pub mod protocol;
pub mod transport;

pub use parser::{parse_status_line, CoverState, StatusEvent};
pub use port::locate;
pub use protocol::{clamp_brightness, Command, BRIGHTNESS_MAX};
pub use transport::{SerialTransport, Transport, BAUD_RATE};

#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    #[error("No serial port matching [{0}] could be opened")]
    PortNotFound(String),

    #[error("Short write: {written} of {expected} bytes sent")]
    ShortWrite { written: usize, expected: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialport error: {0}")]
    SerialportError(#[from] serialport::Error),
}

pub type Result<T> = std::result::Result<T, SerialError>;
