//! StrandCast Control - Network Boundary of the Daemon
//!
//! This crate owns everything that talks to the network:
//! - **sACN**: E1.31 data-packet codec, multicast receiver and sender
//! - **Commands**: the UDP text channel driving mode transitions
//! - **Timecode**: the SMPTE `HH:MM:SS:FF` listener
//!
//! Protocol threads never touch LED hardware. They hand decoded payloads to
//! the per-universe mailboxes in `strandcast-core` and flip the shared mode
//! switch; the render dispatcher does the rest.
//!
//! ## Modules
//!
//! - [`sacn`] - E1.31 packet layout, receiver, sender
//! - [`command`] - Text command parsing and the command listener
//! - [`timecode`] - Timecode parsing and its listener
//! - [`error`] - Error types

/// Text command channel
pub mod command;
/// Error types
pub mod error;
/// sACN (E1.31) protocol support
pub mod sacn;
/// SMPTE timecode listener
pub mod timecode;

// Re-exports
pub use command::{apply_command, CommandListener, CommandOutcome};
pub use error::{ControlError, Result};
pub use sacn::{multicast_addr, DataPacket, SacnReceiver, SacnSender, ACN_SDT_MULTICAST_PORT};
pub use timecode::{Timecode, TimecodeListener};
