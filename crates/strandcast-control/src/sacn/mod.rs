//! sACN (E1.31) protocol support.
//!
//! sACN (Streaming ACN) is a protocol for transmitting DMX512 over IP
//! multicast. The daemon receives show data with [`SacnReceiver`];
//! [`SacnSender`] backs the bundled test-signal source.

pub mod packet;
pub mod recv;
pub mod send;

pub use packet::{
    multicast_addr, parse_data_packet, sequence_accepts, DataPacket, ACN_SDT_MULTICAST_PORT,
};
pub use recv::SacnReceiver;
pub use send::SacnSender;
