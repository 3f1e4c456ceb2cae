use super::transport::SerialTransport;
use super::{Result, SerialError};

/// Find and open the first serial device whose name starts with one of
/// the configured prefixes.
///
/// Candidates are tried in enumeration order. The first one that opens
/// wins; ports after it are never touched, and a port that fails to open
/// leaves no handle behind.
pub fn locate(prefixes: &[String]) -> Result<SerialTransport> {
    let ports = serialport::available_ports()?;

    let candidates = ports
        .into_iter()
        .map(|p| p.port_name)
        .filter(|name| prefixes.iter().any(|prefix| name.starts_with(prefix.as_str())));

    first_opening(candidates, prefixes, |path| {
        log::debug!("Trying port {}", path);
        SerialTransport::open(path)
    })
}

fn first_opening<T, I, F>(candidates: I, prefixes: &[String], mut open: F) -> Result<T>
where
    I: IntoIterator<Item = String>,
    F: FnMut(&str) -> Result<T>,
{
    for candidate in candidates {
        match open(&candidate) {
            Ok(transport) => {
                log::info!("Opened flat panel port {}", candidate);
                return Ok(transport);
            }
            Err(e) => {
                log::debug!("Port {} did not open: {}", candidate, e);
            }
        }
    }

    Err(SerialError::PortNotFound(prefixes.join(", ")))
}
