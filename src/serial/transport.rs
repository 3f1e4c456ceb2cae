use std::io::{Read, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use super::{Result, SerialError};

/// Fixed line speed of the flat panel controller firmware.
pub const BAUD_RATE: u32 = 9600;

/// Upper bound on a single blocking read so a poll cycle never stalls.
const READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Byte-level connection to the panel.
///
/// The driver needs exactly three things from a connection: send a whole
/// command, drain whatever bytes are pending without waiting, and report
/// which port it sits on. Hardware uses [`SerialTransport`]; tests
/// substitute an in-memory fake.
pub trait Transport: Send {
    /// Transmit the full buffer. A short write is an error.
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Read pending bytes into `buf`, returning 0 instead of blocking
    /// when the device has nothing to say.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Device path this transport is attached to.
    fn port_name(&self) -> &str;
}

/// Serial port connection to the flat panel controller.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    port_name: String,
}

impl SerialTransport {
    /// Open `path` with the panel's line settings: 9600 baud, 8 data
    /// bits, no parity, one stop bit, no flow control.
    pub fn open(path: &str) -> Result<Self> {
        let port = serialport::new(path, BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()?;

        Ok(Self {
            port,
            port_name: path.to_string(),
        })
    }
}

impl Transport for SerialTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        let written = self.port.write(data)?;
        if written != data.len() {
            return Err(SerialError::ShortWrite {
                written,
                expected: data.len(),
            });
        }
        self.port.flush()?;
        Ok(())
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.port.bytes_to_read()? == 0 {
            return Ok(0);
        }

        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn port_name(&self) -> &str {
        &self.port_name
    }
}
