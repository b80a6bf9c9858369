//! The UDP text command channel.
//!
//! One datagram carries one command: a mode name, case-insensitive, with
//! surrounding whitespace ignored. Anything else is logged and dropped, so
//! a stray packet can never wedge the daemon.

use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info, warn};

use strandcast_core::{FrameSlot, Mode, ModeSwitch};

use crate::error::Result;

/// Outcome of interpreting one control datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A mode command was applied.
    Applied {
        /// Mode before the command.
        previous: Mode,
        /// Mode the command selected.
        mode: Mode,
    },
    /// The payload named no known command; state is untouched.
    Unrecognized,
}

/// Interpret one command payload against the mode switch.
///
/// Entering loop mode also discards every universe's pending frame, so
/// buffered show data cannot replay on the next return to show mode. The
/// discard runs even when the daemon is already looping.
pub fn apply_command(
    payload: &[u8],
    switch: &ModeSwitch,
    inboxes: &[Arc<FrameSlot>],
) -> CommandOutcome {
    let mode = match std::str::from_utf8(payload).ok().and_then(Mode::parse) {
        Some(mode) => mode,
        None => {
            warn!(
                "unrecognized control command: {:?}",
                String::from_utf8_lossy(payload)
            );
            return CommandOutcome::Unrecognized;
        }
    };

    let previous = switch.transition(mode);
    if mode == Mode::Loop {
        for inbox in inboxes {
            inbox.clear();
        }
    }

    if previous != mode {
        info!("control: mode {} -> {}", previous, mode);
    } else {
        debug!("control: mode already {}", mode);
    }
    CommandOutcome::Applied { previous, mode }
}

/// Listens for text commands on a UDP socket and applies them.
pub struct CommandListener {
    socket: UdpSocket,
    switch: Arc<ModeSwitch>,
    inboxes: Vec<Arc<FrameSlot>>,
}

impl CommandListener {
    /// Bind the command socket.
    pub fn bind(
        addr: SocketAddr,
        switch: Arc<ModeSwitch>,
        inboxes: Vec<Arc<FrameSlot>>,
    ) -> Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        info!("control channel listening on {}", addr);
        Ok(Self {
            socket,
            switch,
            inboxes,
        })
    }

    /// The bound local address; useful when binding to port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Spawn the listener thread, consuming the listener.
    pub fn start(self) -> JoinHandle<()> {
        thread::spawn(move || self.run())
    }

    fn run(self) {
        let mut buf = [0u8; 64];
        loop {
            match self.socket.recv_from(&mut buf) {
                Ok((len, from)) => {
                    debug!("control datagram from {}", from);
                    apply_command(&buf[..len], &self.switch, &self.inboxes);
                }
                Err(e) => {
                    error!("control receive failed: {}", e);
                    return;
                }
            }
        }
    }
}
