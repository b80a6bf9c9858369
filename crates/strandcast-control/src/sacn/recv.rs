//! sACN data-packet receiver.

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info, trace, warn};

use crate::error::Result;
use crate::sacn::packet::{self, DataPacket};

/// Per-universe payload callback. Receives the DMX channel data of each
/// accepted packet, start code excluded.
pub type PayloadCallback = Box<dyn Fn(&[u8]) + Send>;

/// Receives E1.31 data packets and delivers channel payloads to
/// per-universe callbacks from a single delivery thread.
///
/// Registering a universe joins its multicast group, so consoles can reach
/// the daemon by group or by unicast with the same packets. Delivery drops
/// non-zero start codes and stale sequence numbers; callbacks only ever see
/// displayable dimmer data.
pub struct SacnReceiver {
    socket: UdpSocket,
    router: Router,
}

impl SacnReceiver {
    /// Bind the receive socket.
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        info!("sACN receiver listening on {}", addr);
        Ok(Self {
            socket,
            router: Router::new(),
        })
    }

    /// Register the delivery callback for `universe` and join its multicast
    /// group. Replaces any earlier callback for the same universe. A failed
    /// group join is logged but not fatal; unicast delivery still works.
    pub fn listen_on<F>(&mut self, universe: u16, callback: F) -> Result<()>
    where
        F: Fn(&[u8]) + Send + 'static,
    {
        packet::validate_universe(universe)?;
        if let Err(e) = self
            .socket
            .join_multicast_v4(&packet::multicast_addr(universe), &Ipv4Addr::UNSPECIFIED)
        {
            warn!("multicast join for universe {} failed: {}", universe, e);
        }
        self.router.register(universe, Box::new(callback));
        debug!("listening for sACN universe {}", universe);
        Ok(())
    }

    /// The bound local address; useful when binding to port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Spawn the delivery thread, consuming the receiver.
    pub fn start(self) -> JoinHandle<()> {
        thread::spawn(move || self.run())
    }

    fn run(mut self) {
        let mut buf = [0u8; 1024];
        loop {
            let len = match self.socket.recv_from(&mut buf) {
                Ok((len, _)) => len,
                Err(e) => {
                    error!("sACN receive failed: {}", e);
                    return;
                }
            };
            self.router.route(&buf[..len]);
        }
    }
}

/// Parses datagrams and applies the delivery rules. Separate from the
/// socket so the rules are testable without a network.
struct Router {
    callbacks: HashMap<u16, PayloadCallback>,
    last_sequence: HashMap<u16, u8>,
}

impl Router {
    fn new() -> Self {
        Self {
            callbacks: HashMap::new(),
            last_sequence: HashMap::new(),
        }
    }

    fn register(&mut self, universe: u16, callback: PayloadCallback) {
        self.callbacks.insert(universe, callback);
    }

    fn route(&mut self, datagram: &[u8]) {
        match packet::parse_data_packet(datagram) {
            Ok(packet) => self.deliver(packet),
            Err(e) => trace!("dropping datagram: {}", e),
        }
    }

    fn deliver(&mut self, packet: DataPacket) {
        if packet.start_code != 0x00 {
            trace!(
                "universe {}: ignoring start code {:#04x}",
                packet.universe,
                packet.start_code
            );
            return;
        }
        let callback = match self.callbacks.get(&packet.universe) {
            Some(callback) => callback,
            None => {
                trace!("no listener for universe {}", packet.universe);
                return;
            }
        };
        if let Some(&last) = self.last_sequence.get(&packet.universe) {
            if !packet::sequence_accepts(last, packet.sequence) {
                debug!(
                    "universe {}: discarded stale sequence {} (last {})",
                    packet.universe, packet.sequence, last
                );
                return;
            }
        }
        self.last_sequence.insert(packet.universe, packet.sequence);
        callback(&packet.data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sacn::packet::{build_data_packet, START_CODE_OFFSET};
    use std::sync::{Arc, Mutex};

    fn wire(universe: u16, sequence: u8, first_channel: u8) -> Vec<u8> {
        let mut channels = vec![0u8; 512];
        channels[0] = first_channel;
        build_data_packet(&[1; 16], "test", universe, sequence, 100, &channels).unwrap()
    }

    /// Router plus a log of every payload's first channel value.
    fn routed_universe(universe: u16) -> (Router, Arc<Mutex<Vec<u8>>>) {
        let mut router = Router::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        router.register(
            universe,
            Box::new(move |payload| sink.lock().unwrap().push(payload[0])),
        );
        (router, seen)
    }

    #[test]
    fn test_route_delivers_channel_data() {
        let (mut router, seen) = routed_universe(1);
        router.route(&wire(1, 0, 42));
        assert_eq!(*seen.lock().unwrap(), vec![42]);
    }

    #[test]
    fn test_route_ignores_unregistered_universe() {
        let (mut router, seen) = routed_universe(1);
        router.route(&wire(2, 0, 42));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_route_ignores_alternate_start_codes() {
        let (mut router, seen) = routed_universe(1);
        let mut datagram = wire(1, 0, 42);
        datagram[START_CODE_OFFSET] = 0xcc;
        router.route(&datagram);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_route_ignores_garbage() {
        let (mut router, seen) = routed_universe(1);
        router.route(&[0u8; 20]);
        router.route(b"not a packet at all");
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_route_discards_stale_sequences() {
        let (mut router, seen) = routed_universe(1);
        router.route(&wire(1, 10, 1));
        router.route(&wire(1, 9, 2)); // one step behind: stale
        router.route(&wire(1, 10, 3)); // duplicate: stale
        router.route(&wire(1, 11, 4));
        assert_eq!(*seen.lock().unwrap(), vec![1, 4]);
    }

    #[test]
    fn test_route_accepts_source_restart() {
        let (mut router, seen) = routed_universe(1);
        router.route(&wire(1, 200, 1));
        // 21 steps back reads as a restarted source, not a stale packet.
        router.route(&wire(1, 179, 2));
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_sequences_tracked_per_universe() {
        let mut router = Router::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for universe in [1u16, 2] {
            let sink = Arc::clone(&seen);
            router.register(
                universe,
                Box::new(move |payload| sink.lock().unwrap().push((universe, payload[0]))),
            );
        }
        router.route(&wire(1, 50, 1));
        // Universe 2 has its own sequence history; 10 is fresh there.
        router.route(&wire(2, 10, 2));
        assert_eq!(*seen.lock().unwrap(), vec![(1, 1), (2, 2)]);
    }
}
