//! sACN data-packet sender.

use std::collections::HashMap;
use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::error::Result;
use crate::sacn::packet::{self, ACN_SDT_MULTICAST_PORT};

/// Sends E1.31 data packets, keeping one wrapping sequence number per
/// universe.
pub struct SacnSender {
    socket: UdpSocket,
    cid: [u8; 16],
    source_name: String,
    priority: u8,
    sequences: HashMap<u16, u8>,
    last_send: Instant,
    min_interval: Duration,
}

impl SacnSender {
    /// Create a new sender. `source_name` identifies this source on the
    /// wire (truncated to 63 bytes).
    pub fn new(source_name: &str) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.set_multicast_loop_v4(false)?;

        // Generate a UUID for this component
        let cid = *Uuid::new_v4().as_bytes();

        Ok(Self {
            socket,
            cid,
            source_name: source_name.to_string(),
            priority: 100, // Default priority
            sequences: HashMap::new(),
            last_send: Instant::now(),
            min_interval: Duration::ZERO,
        })
    }

    /// Set the priority (0-200, default 100).
    pub fn set_priority(&mut self, priority: u8) {
        self.priority = priority.min(200);
    }

    /// Cap the send rate; packets offered faster than `hz` are dropped.
    pub fn set_max_rate(&mut self, hz: u32) {
        if hz > 0 {
            self.min_interval = Duration::from_millis(1000 / hz as u64);
        }
    }

    /// Send one universe of channel data, unicast to `destination` or to
    /// the universe's multicast group when `None`.
    pub fn send(
        &mut self,
        universe: u16,
        channels: &[u8],
        destination: Option<SocketAddr>,
    ) -> Result<()> {
        // Rate limiting
        let now = Instant::now();
        if now.duration_since(self.last_send) < self.min_interval {
            return Ok(());
        }

        let sequence = self.next_sequence(universe);
        let packet = packet::build_data_packet(
            &self.cid,
            &self.source_name,
            universe,
            sequence,
            self.priority,
            channels,
        )?;
        let target = destination.unwrap_or_else(|| {
            SocketAddr::from((packet::multicast_addr(universe), ACN_SDT_MULTICAST_PORT))
        });

        self.socket.send_to(&packet, target)?;
        self.last_send = now;

        tracing::trace!("sent sACN data packet for universe {} to {}", universe, target);

        Ok(())
    }

    fn next_sequence(&mut self, universe: u16) -> u8 {
        let sequence = self.sequences.entry(universe).or_insert(0);
        let current = *sequence;
        *sequence = sequence.wrapping_add(1);
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_creation() {
        assert!(SacnSender::new("StrandCast").is_ok());
    }

    #[test]
    fn test_sequence_increments_per_universe() {
        let mut sender = SacnSender::new("StrandCast").unwrap();
        assert_eq!(sender.next_sequence(1), 0);
        assert_eq!(sender.next_sequence(1), 1);
        assert_eq!(sender.next_sequence(2), 0);
        assert_eq!(sender.next_sequence(1), 2);
    }

    #[test]
    fn test_sequence_wraps() {
        let mut sender = SacnSender::new("StrandCast").unwrap();
        sender.sequences.insert(1, 255);
        assert_eq!(sender.next_sequence(1), 255);
        assert_eq!(sender.next_sequence(1), 0);
    }

    #[test]
    fn test_priority_is_clamped() {
        let mut sender = SacnSender::new("StrandCast").unwrap();
        sender.set_priority(250);
        assert_eq!(sender.priority, 200);
    }

    #[test]
    fn test_send_rejects_invalid_universe() {
        let mut sender = SacnSender::new("StrandCast").unwrap();
        assert!(sender.send(0, &[0, 0, 0], None).is_err());
    }

    #[test]
    fn test_send_unicast() {
        let mut sender = SacnSender::new("StrandCast").unwrap();
        let target: SocketAddr = "127.0.0.1:5568".parse().unwrap();
        assert!(sender.send(1, &[255, 0, 0], Some(target)).is_ok());
    }
}
