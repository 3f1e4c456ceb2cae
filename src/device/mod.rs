pub mod driver;
pub mod models;
pub mod service;

pub use driver::FlatPanelDriver;
pub use models::*;
pub use service::{CoverHandle, CoverService, POLL_INTERVAL};

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Device already connected")]
    AlreadyConnected,

    #[error("Device not connected")]
    NotConnected,

    #[error("Driver task is not running")]
    ChannelClosed,

    #[error("Serial communication error: {0}")]
    SerialError(#[from] crate::serial::SerialError),
}

pub type Result<T> = std::result::Result<T, DeviceError>;
