//! StrandCast Core - Dual-Mode LED Render Engine
//!
//! This crate contains the daemon's domain model and render engine:
//! - **Mode arbitration**: a single atomic switch deciding whether hardware
//!   follows network show data or the local animation loop
//! - **Frame mailboxes**: one-slot, latest-wins handoff from protocol
//!   callbacks to the render thread
//! - **Ingest**: decoding raw channel payloads into pixel frames
//! - **Strips**: the hardware seam, with a reopen-and-retry fault policy
//! - **Animation**: pluggable loop-mode content providers
//! - **Dispatch**: the render tick loop that owns all hardware access
//!
//! ## Modules
//!
//! - [`mode`] - Render mode and its process-wide atomic cell
//! - [`color`] - RGB pixel values
//! - [`frame`] - Decoded pixel frames
//! - [`mailbox`] - The one-slot frame mailbox
//! - [`ingest`] - Payload-to-mailbox adapter
//! - [`strip`] - Strip and backend traits, in-memory implementation
//! - [`universe`] - Universe records and the fixed registry
//! - [`animation`] - Loop-mode animation providers
//! - [`dispatch`] - The render dispatcher

#![warn(missing_docs)]

/// Loop-mode animation providers
pub mod animation;
/// RGB pixel values
pub mod color;
/// The render dispatcher
pub mod dispatch;
/// Decoded pixel frames
pub mod frame;
/// Payload-to-mailbox ingest adapter
pub mod ingest;
/// One-slot frame mailboxes
pub mod mailbox;
/// Render mode arbitration
pub mod mode;
/// The hardware seam
pub mod strip;
/// Universe records and the registry
pub mod universe;

// Re-exports
pub use animation::{provider_for, AnimationProvider, Chaser, Gradient, Wave};
pub use color::Rgb;
pub use dispatch::{Cadence, DispatchStats, Dispatcher};
pub use frame::Frame;
pub use ingest::IngestAdapter;
pub use mailbox::FrameSlot;
pub use mode::{Mode, ModeSwitch};
pub use strip::{MemoryBackend, MemoryStrip, Strip, StripBackend, StripError};
pub use universe::{Universe, UniverseConfig, UniverseId, UniverseSet, MAX_UNIVERSE};
