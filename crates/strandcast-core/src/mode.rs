//! Render mode arbitration.
//!
//! The daemon is always in exactly one of two modes. The mode lives in a
//! single atomic cell shared between the control channel (writer), the
//! ingest adapters and the render dispatcher (readers).

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

/// What drives the hardware output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Decoded network payloads drive the strips.
    Show,
    /// The local animation provider drives the strips.
    Loop,
}

impl Mode {
    /// Parse a mode name, ignoring case and surrounding whitespace.
    pub fn parse(text: &str) -> Option<Mode> {
        match text.trim().to_ascii_lowercase().as_str() {
            "show" => Some(Mode::Show),
            "loop" => Some(Mode::Loop),
            _ => None,
        }
    }

    fn from_u8(value: u8) -> Mode {
        if value == 0 {
            Mode::Show
        } else {
            Mode::Loop
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Mode::Show => 0,
            Mode::Loop => 1,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Show => write!(f, "show"),
            Mode::Loop => write!(f, "loop"),
        }
    }
}

/// The process-wide mode cell.
///
/// Readers always observe a fully-formed mode, never a torn intermediate.
/// There is no handshake: a transition takes effect on each thread the next
/// time it loads the cell.
#[derive(Debug)]
pub struct ModeSwitch {
    cell: AtomicU8,
}

impl ModeSwitch {
    /// Create a switch holding `initial`.
    pub fn new(initial: Mode) -> Self {
        Self {
            cell: AtomicU8::new(initial.as_u8()),
        }
    }

    /// The latest committed mode.
    pub fn current(&self) -> Mode {
        Mode::from_u8(self.cell.load(Ordering::Acquire))
    }

    /// Commit `mode` and return what it replaced. Committing the current
    /// mode again is valid and changes nothing.
    pub fn transition(&self, mode: Mode) -> Mode {
        Mode::from_u8(self.cell.swap(mode.as_u8(), Ordering::AcqRel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_case_and_whitespace() {
        assert_eq!(Mode::parse(" SHOW \n"), Some(Mode::Show));
        assert_eq!(Mode::parse("Loop"), Some(Mode::Loop));
        assert_eq!(Mode::parse("show"), Some(Mode::Show));
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        assert_eq!(Mode::parse("blink"), None);
        assert_eq!(Mode::parse(""), None);
        assert_eq!(Mode::parse("show loop"), None);
    }

    #[test]
    fn test_transition_returns_previous_mode() {
        let switch = ModeSwitch::new(Mode::Loop);
        assert_eq!(switch.current(), Mode::Loop);
        assert_eq!(switch.transition(Mode::Show), Mode::Loop);
        assert_eq!(switch.current(), Mode::Show);
    }

    #[test]
    fn test_redundant_transition_is_idempotent() {
        let switch = ModeSwitch::new(Mode::Show);
        assert_eq!(switch.transition(Mode::Show), Mode::Show);
        assert_eq!(switch.current(), Mode::Show);
    }
}
