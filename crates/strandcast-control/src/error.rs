//! Error types for the network boundary.

use thiserror::Error;

/// Errors raised by the control, sACN and timecode layers.
#[derive(Error, Debug)]
pub enum ControlError {
    /// Socket-level I/O failure
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Universe number outside the E1.31 range
    #[error("invalid universe: {0} (must be 1-63999)")]
    InvalidUniverse(u16),

    /// A datagram that is not a well-formed E1.31 data packet
    #[error("malformed packet: {0}")]
    MalformedPacket(String),

    /// More channel data than one universe carries
    #[error("payload too large: {0} bytes (max 512)")]
    PayloadTooLarge(usize),

    /// Text that does not parse as a timecode
    #[error("malformed timecode: {0:?}")]
    MalformedTimecode(String),
}

/// Result type for control operations.
pub type Result<T> = std::result::Result<T, ControlError>;
