use serde::{Deserialize, Serialize};

use super::protocol::clamp_brightness;

/// Width of the "BRIGHTNESS " token; the reported value starts here.
const BRIGHTNESS_VALUE_OFFSET: usize = 11;

/// Cover position as reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverState {
    /// No report received yet on this connection.
    Unknown,
    Open,
    Closed,
    Moving,
}

impl CoverState {
    /// Human-readable status text published to the host.
    pub fn status_message(&self) -> &'static str {
        match self {
            CoverState::Unknown => "Disconnected",
            CoverState::Open => "Cover Open",
            CoverState::Closed => "Cover Closed",
            CoverState::Moving => "Cover Moving...",
        }
    }
}

/// One state change decoded from a controller status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    Cover(CoverState),
    Brightness(u16),
}

/// Decode a single status line from the controller.
///
/// Format: "STATE OPEN" | "STATE CLOSED" | "STATE MOVING" | "BRIGHTNESS <n>"
///
/// Tokens are matched by containment, so chatter around them does not
/// break recognition, and in the fixed order above: the first match wins
/// even when a line carries several tokens. Unrecognized lines are noise
/// and yield None.
pub fn parse_status_line(line: &str) -> Option<StatusEvent> {
    if line.contains("STATE OPEN") {
        return Some(StatusEvent::Cover(CoverState::Open));
    }
    if line.contains("STATE CLOSED") {
        return Some(StatusEvent::Cover(CoverState::Closed));
    }
    if line.contains("STATE MOVING") {
        return Some(StatusEvent::Cover(CoverState::Moving));
    }
    if let Some(pos) = line.find("BRIGHTNESS") {
        let value = line
            .get(pos + BRIGHTNESS_VALUE_OFFSET..)
            .map_or(0, parse_leading_int);
        return Some(StatusEvent::Brightness(clamp_brightness(value)));
    }
    None
}

/// Best-effort integer parse: leading whitespace and an optional sign,
/// then digits up to the first non-digit. No digits reads as 0; an
/// over-long digit run saturates instead of wrapping.
fn parse_leading_int(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let mut value: i64 = 0;
    for c in digits.chars() {
        match c.to_digit(10) {
            Some(d) => value = value.saturating_mul(10).saturating_add(d as i64),
            None => break,
        }
    }

    if negative {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cover_states() {
        assert_eq!(
            parse_status_line("STATE OPEN"),
            Some(StatusEvent::Cover(CoverState::Open))
        );
        assert_eq!(
            parse_status_line("STATE CLOSED"),
            Some(StatusEvent::Cover(CoverState::Closed))
        );
        assert_eq!(
            parse_status_line("STATE MOVING"),
            Some(StatusEvent::Cover(CoverState::Moving))
        );
    }

    #[test]
    fn test_parse_tolerates_surrounding_chatter() {
        assert_eq!(
            parse_status_line(">> STATE MOVING <<"),
            Some(StatusEvent::Cover(CoverState::Moving))
        );
    }

    #[test]
    fn test_parse_brightness_report() {
        assert_eq!(
            parse_status_line("BRIGHTNESS 2048"),
            Some(StatusEvent::Brightness(2048))
        );
        assert_eq!(
            parse_status_line("BRIGHTNESS 0"),
            Some(StatusEvent::Brightness(0))
        );
    }

    #[test]
    fn test_parse_precedence_state_before_brightness() {
        // A line carrying both tokens resolves to the state report.
        assert_eq!(
            parse_status_line("STATE OPEN BRIGHTNESS 100"),
            Some(StatusEvent::Cover(CoverState::Open))
        );
    }

    #[test]
    fn test_parse_brightness_truncated_line() {
        // Nothing after the token parses as level 0 instead of failing.
        assert_eq!(
            parse_status_line("BRIGHTNESS"),
            Some(StatusEvent::Brightness(0))
        );
        assert_eq!(
            parse_status_line("BRIGHTNESS "),
            Some(StatusEvent::Brightness(0))
        );
    }

    #[test]
    fn test_parse_brightness_garbage_value() {
        assert_eq!(
            parse_status_line("BRIGHTNESS abc"),
            Some(StatusEvent::Brightness(0))
        );
    }

    #[test]
    fn test_parse_brightness_clamped_into_range() {
        assert_eq!(
            parse_status_line("BRIGHTNESS 99999"),
            Some(StatusEvent::Brightness(4095))
        );
        assert_eq!(
            parse_status_line("BRIGHTNESS -42"),
            Some(StatusEvent::Brightness(0))
        );
    }

    #[test]
    fn test_parse_brightness_huge_digit_run_saturates() {
        assert_eq!(
            parse_status_line("BRIGHTNESS 99999999999999999999999999"),
            Some(StatusEvent::Brightness(4095))
        );
    }

    #[test]
    fn test_parse_ignores_noise() {
        assert_eq!(parse_status_line(""), None);
        assert_eq!(parse_status_line("hello world"), None);
        assert_eq!(parse_status_line("STATE AJAR"), None);
        // Lowercase is not recognized; the firmware always shouts.
        assert_eq!(parse_status_line("state open"), None);
    }

    #[test]
    fn test_parse_leading_int_behaviour() {
        assert_eq!(parse_leading_int("123"), 123);
        assert_eq!(parse_leading_int("  42 trailing"), 42);
        assert_eq!(parse_leading_int("-7"), -7);
        assert_eq!(parse_leading_int("+9"), 9);
        assert_eq!(parse_leading_int(""), 0);
        assert_eq!(parse_leading_int("x1"), 0);
    }
}
