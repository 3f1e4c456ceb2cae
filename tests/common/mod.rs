//! Shared test fixtures: an in-memory transport that stands in for the
//! panel so driver behaviour can be scripted without hardware.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use flatcover::serial::{Result, SerialError, Transport};

/// Handles the test body keeps to play the device side of the wire.
#[derive(Clone, Default)]
pub struct FakeWire {
    incoming: Arc<Mutex<VecDeque<u8>>>,
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl FakeWire {
    /// Queue bytes for the driver's next read, as if the panel wrote them.
    pub fn push(&self, data: &str) {
        self.incoming.lock().unwrap().extend(data.bytes());
    }

    /// Bytes queued by the panel that the driver has not read yet.
    pub fn pending(&self) -> usize {
        self.incoming.lock().unwrap().len()
    }

    /// Every command the driver transmitted, one entry per send call.
    pub fn sent_commands(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|bytes| String::from_utf8_lossy(bytes).to_string())
            .collect()
    }
}

/// Failure injection for [`FakeTransport`].
#[derive(Clone, Copy, PartialEq)]
pub enum FakeFault {
    None,
    FailSends,
    FailReads,
}

pub struct FakeTransport {
    wire: FakeWire,
    fault: FakeFault,
}

impl FakeTransport {
    pub fn new(wire: FakeWire) -> Self {
        Self {
            wire,
            fault: FakeFault::None,
        }
    }

    pub fn with_fault(wire: FakeWire, fault: FakeFault) -> Self {
        Self { wire, fault }
    }
}

impl Transport for FakeTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        if self.fault == FakeFault::FailSends {
            return Err(SerialError::ShortWrite {
                written: 0,
                expected: data.len(),
            });
        }
        self.wire.sent.lock().unwrap().push(data.to_vec());
        Ok(())
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.fault == FakeFault::FailReads {
            return Err(SerialError::IoError(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "device unplugged",
            )));
        }
        let mut incoming = self.wire.incoming.lock().unwrap();
        let n = buf.len().min(incoming.len());
        for (slot, byte) in buf.iter_mut().zip(incoming.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn port_name(&self) -> &str {
        "/dev/ttyUSB7"
    }
}

// Sanity checks on the fixture itself. These run in every binary that
// declares `mod common`.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_wire_round_trip() {
        let wire = FakeWire::default();
        let mut transport = FakeTransport::new(wire.clone());
        assert_eq!(transport.port_name(), "/dev/ttyUSB7");

        transport.send(b"OPEN").unwrap();
        assert_eq!(wire.sent_commands(), vec!["OPEN"]);

        wire.push("STATE OPEN\n");
        assert_eq!(wire.pending(), 11);

        let mut buf = [0u8; 4];
        assert_eq!(transport.read_available(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"STAT");
        assert_eq!(wire.pending(), 7);
    }

    #[test]
    fn test_fake_fault_injection() {
        let wire = FakeWire::default();
        let mut transport = FakeTransport::with_fault(wire.clone(), FakeFault::FailSends);
        assert!(transport.send(b"OPEN").is_err());
        assert!(wire.sent_commands().is_empty());

        let mut transport = FakeTransport::with_fault(wire, FakeFault::FailReads);
        let mut buf = [0u8; 8];
        assert!(transport.read_available(&mut buf).is_err());
    }
}
