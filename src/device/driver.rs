use chrono::{DateTime, Utc};

use crate::serial::{
    self, clamp_brightness, parse_status_line, Command, CoverState, StatusEvent, Transport,
};

use super::models::{ConnectionState, CoverCommand, CoverSwitch, DeviceSnapshot, DriverConfig};
use super::{DeviceError, Result};

/// Largest chunk pulled off the port in one poll cycle.
const READ_CHUNK: usize = 256;

/// Carry-over buffer limits. A stream that never terminates a line is
/// trimmed to its tail so memory stays bounded.
const LINE_BUFFER_MAX: usize = 8192;
const LINE_BUFFER_KEEP: usize = 4096;

/// Flat panel driver core: the single owner of the connection and the
/// mirrored device state.
///
/// All methods run on the caller's thread; the polling task in
/// [`super::service`] serializes access in production.
pub struct FlatPanelDriver {
    config: DriverConfig,
    transport: Option<Box<dyn Transport>>,
    cover: CoverState,
    brightness: u16,
    line_buf: String,
    last_update: DateTime<Utc>,
}

impl FlatPanelDriver {
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            transport: None,
            cover: CoverState::Unknown,
            brightness: 0,
            line_buf: String::new(),
            last_update: Utc::now(),
        }
    }

    /// Locate the panel among the configured port candidates and open it.
    pub fn connect(&mut self) -> Result<()> {
        if self.transport.is_some() {
            return Err(DeviceError::AlreadyConnected);
        }

        let transport = serial::locate(&self.config.port_prefixes)?;
        log::info!("Connected to flat panel at {}", transport.port_name());
        self.attach(Box::new(transport));
        Ok(())
    }

    /// Adopt an already-open transport and reset the mirrored state; the
    /// panel's actual position is rediscovered from its status reports.
    pub fn attach(&mut self, transport: Box<dyn Transport>) {
        self.transport = Some(transport);
        self.cover = CoverState::Unknown;
        self.brightness = 0;
        self.line_buf.clear();
        self.last_update = Utc::now();
    }

    /// Release the port. Safe to call at any time; a second call is a no-op.
    pub fn disconnect(&mut self) {
        if let Some(transport) = self.transport.take() {
            log::info!("Disconnected from {}", transport.port_name());
        }
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// One poll cycle: drain pending bytes and apply any status lines.
    ///
    /// Returns true when the mirrored state changed. A cycle while
    /// disconnected does nothing. A failed read drops the connection and
    /// surfaces the error once.
    pub fn tick(&mut self) -> Result<bool> {
        let Some(transport) = self.transport.as_mut() else {
            return Ok(false);
        };

        let mut chunk = [0u8; READ_CHUNK];
        let n = match transport.read_available(&mut chunk) {
            Ok(n) => n,
            Err(e) => {
                log::warn!("Read failed on {}: {}", transport.port_name(), e);
                self.disconnect();
                return Err(e.into());
            }
        };
        if n == 0 {
            return Ok(false);
        }

        self.line_buf
            .push_str(&String::from_utf8_lossy(&chunk[..n]));

        let mut changed = false;
        while let Some(line) = next_line(&mut self.line_buf) {
            match parse_status_line(&line) {
                Some(event) => {
                    self.apply(event);
                    changed = true;
                }
                None => log::debug!("Ignoring line: {}", line),
            }
        }

        if self.line_buf.len() > LINE_BUFFER_MAX {
            let mut excess = self.line_buf.len() - LINE_BUFFER_KEEP;
            while !self.line_buf.is_char_boundary(excess) {
                excess += 1;
            }
            self.line_buf.drain(..excess);
        }

        if changed {
            self.last_update = Utc::now();
        }
        Ok(changed)
    }

    fn apply(&mut self, event: StatusEvent) {
        match event {
            StatusEvent::Cover(state) => self.cover = state,
            StatusEvent::Brightness(level) => self.brightness = level,
        }
    }

    /// Route an update of the exclusive cover switch. Only an option that
    /// moved to "on" acts; both options off is ignored without error.
    /// Returns true when a command went out.
    pub fn handle_cover_switch(&mut self, switch: CoverSwitch) -> Result<bool> {
        if !self.is_connected() {
            return Err(DeviceError::NotConnected);
        }

        if switch.open {
            self.request_cover(CoverCommand::Open)?;
            Ok(true)
        } else if switch.close {
            self.request_cover(CoverCommand::Close)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Command the cover to move. The mirrored position is left alone
    /// until the panel reports the new state itself.
    pub fn request_cover(&mut self, command: CoverCommand) -> Result<()> {
        let command = match command {
            CoverCommand::Open => Command::Open,
            CoverCommand::Close => Command::Close,
        };
        self.send(&command.encode())
    }

    /// Command a brightness level, clamped into the accepted range. On a
    /// successful write the mirrored level reflects the request until the
    /// next hardware report; the clamped value is returned.
    pub fn request_brightness(&mut self, requested: i64) -> Result<u16> {
        let level = clamp_brightness(requested);
        self.send(&Command::Brightness(level).encode())?;
        self.brightness = level;
        self.last_update = Utc::now();
        Ok(level)
    }

    fn send(&mut self, command: &str) -> Result<()> {
        let transport = self.transport.as_mut().ok_or(DeviceError::NotConnected)?;
        log::debug!("Sending command: {}", command);
        transport.send(command.as_bytes())?;
        Ok(())
    }

    /// Copy of the current state for publication.
    pub fn snapshot(&self) -> DeviceSnapshot {
        let connected = self.transport.is_some();
        DeviceSnapshot {
            connection: if connected {
                ConnectionState::Connected
            } else {
                ConnectionState::Disconnected
            },
            port_name: self
                .transport
                .as_ref()
                .map(|t| t.port_name().to_string()),
            cover: self.cover,
            cover_switch: CoverSwitch::from(self.cover),
            brightness: self.brightness,
            status_message: if connected {
                self.cover.status_message().to_string()
            } else {
                CoverState::Unknown.status_message().to_string()
            },
            last_update: self.last_update,
        }
    }
}

impl Default for FlatPanelDriver {
    fn default() -> Self {
        Self::new(DriverConfig::default())
    }
}

/// Pop the next complete line off the carry buffer, skipping blank ones.
/// Runs of '\n' and '\r' collapse into a single terminator.
fn next_line(buf: &mut String) -> Option<String> {
    while let Some(pos) = buf.find(|c| c == '\n' || c == '\r') {
        let line = buf[..pos].to_string();

        let bytes = buf.as_bytes();
        let mut end = pos + 1;
        while end < bytes.len() && (bytes[end] == b'\n' || bytes[end] == b'\r') {
            end += 1;
        }
        buf.drain(..end);

        if !line.trim().is_empty() {
            return Some(line);
        }
    }
    None
}
