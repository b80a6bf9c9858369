//! E1.31 data-packet wire layout: constants, builder and parser.
//!
//! A data packet is three nested layers (root, framing, DMP) totalling 126
//! header bytes, followed by up to 513 property values: one DMX start code
//! plus up to 512 channel values.

use std::net::Ipv4Addr;

use strandcast_core::MAX_UNIVERSE;

use crate::error::{ControlError, Result};

/// Standard sACN/E1.31 UDP port.
pub const ACN_SDT_MULTICAST_PORT: u16 = 5568;

/// ACN packet identifier, bytes 4-15 of every E1.31 packet.
pub const ACN_PACKET_IDENTIFIER: [u8; 12] = [
    0x41, 0x53, 0x43, 0x2d, 0x45, 0x31, 0x2e, 0x31, 0x37, 0x00, 0x00, 0x00,
];

/// Root layer vector for E1.31 data.
pub const VECTOR_ROOT_E131_DATA: u32 = 0x0000_0004;

/// Framing layer vector for a data packet.
pub const VECTOR_E131_DATA_PACKET: u32 = 0x0000_0002;

/// DMP layer vector: set property.
pub const VECTOR_DMP_SET_PROPERTY: u8 = 0x02;

/// DMP address and data type used for DMX properties.
pub const DMP_ADDRESS_DATA_TYPE: u8 = 0xa1;

/// Offset of the priority field.
pub const PRIORITY_OFFSET: usize = 108;
/// Offset of the sequence number.
pub const SEQUENCE_OFFSET: usize = 111;
/// Offset of the 16-bit universe number.
pub const UNIVERSE_OFFSET: usize = 113;
/// Offset of the 16-bit property value count.
pub const COUNT_OFFSET: usize = 123;
/// Offset of the DMX start code (the first property value).
pub const START_CODE_OFFSET: usize = 125;
/// Offset of the DMX channel data.
pub const DATA_OFFSET: usize = 126;

/// Full size of the fixed-length packets this crate builds.
pub const PACKET_SIZE: usize = 638;

/// One decoded E1.31 data packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPacket {
    /// Universe number.
    pub universe: u16,
    /// Packet priority (0-200).
    pub priority: u8,
    /// Per-source wrapping sequence number.
    pub sequence: u8,
    /// DMX start code; 0x00 marks displayable dimmer data.
    pub start_code: u8,
    /// DMX channel data, at most 512 bytes.
    pub data: Vec<u8>,
}

/// Multicast group for a universe: 239.255.hi.lo.
pub fn multicast_addr(universe: u16) -> Ipv4Addr {
    Ipv4Addr::new(
        239,
        255,
        ((universe >> 8) & 0xff) as u8,
        (universe & 0xff) as u8,
    )
}

/// Validate a universe number against the E1.31 range.
pub fn validate_universe(universe: u16) -> Result<()> {
    if universe == 0 || universe > MAX_UNIVERSE {
        return Err(ControlError::InvalidUniverse(universe));
    }
    Ok(())
}

/// Sequence acceptance per E1.31 section 6.7.2: a packet is stale when its
/// sequence number is at most 20 steps behind the last accepted one, in
/// wrapping arithmetic. Anything older counts as a source restart.
pub fn sequence_accepts(last: u8, next: u8) -> bool {
    let diff = next.wrapping_sub(last) as i8;
    diff > 0 || diff <= -20
}

/// Build a full 638-byte data packet.
///
/// `channels` may hold fewer than 512 values; the remainder is zero-padded
/// so the property count always covers a whole universe.
pub fn build_data_packet(
    cid: &[u8; 16],
    source_name: &str,
    universe: u16,
    sequence: u8,
    priority: u8,
    channels: &[u8],
) -> Result<Vec<u8>> {
    validate_universe(universe)?;
    if channels.len() > 512 {
        return Err(ControlError::PayloadTooLarge(channels.len()));
    }

    let mut packet = vec![0u8; PACKET_SIZE];

    // Root Layer
    let mut offset = 0;

    // Preamble Size (16-bit)
    packet[offset..offset + 2].copy_from_slice(&0x0010u16.to_be_bytes());
    offset += 2;

    // Post-amble Size (16-bit)
    packet[offset..offset + 2].copy_from_slice(&0x0000u16.to_be_bytes());
    offset += 2;

    // ACN Packet Identifier (12 bytes)
    packet[offset..offset + 12].copy_from_slice(&ACN_PACKET_IDENTIFIER);
    offset += 12;

    // Flags and Length (16-bit): 0x7000 | (638 - 16)
    let root_length = PACKET_SIZE - 16;
    packet[offset..offset + 2].copy_from_slice(&((0x7000u16 | root_length as u16).to_be_bytes()));
    offset += 2;

    // Vector (32-bit): VECTOR_ROOT_E131_DATA
    packet[offset..offset + 4].copy_from_slice(&VECTOR_ROOT_E131_DATA.to_be_bytes());
    offset += 4;

    // CID (16 bytes)
    packet[offset..offset + 16].copy_from_slice(cid);
    offset += 16;

    // Framing Layer
    // Flags and Length (16-bit): 0x7000 | (638 - 38)
    let framing_length = PACKET_SIZE - 38;
    packet[offset..offset + 2]
        .copy_from_slice(&((0x7000u16 | framing_length as u16).to_be_bytes()));
    offset += 2;

    // Vector (32-bit): VECTOR_E131_DATA_PACKET
    packet[offset..offset + 4].copy_from_slice(&VECTOR_E131_DATA_PACKET.to_be_bytes());
    offset += 4;

    // Source Name (64 bytes, null-terminated)
    let source_bytes = source_name.as_bytes();
    let copy_len = source_bytes.len().min(63);
    packet[offset..offset + copy_len].copy_from_slice(&source_bytes[..copy_len]);
    offset += 64;

    // Priority (1 byte)
    packet[offset] = priority;
    offset += 1;

    // Synchronization Address (16-bit) - 0 for no sync
    packet[offset..offset + 2].copy_from_slice(&0x0000u16.to_be_bytes());
    offset += 2;

    // Sequence Number (1 byte)
    packet[offset] = sequence;
    offset += 1;

    // Options (1 byte) - 0 for none
    packet[offset] = 0;
    offset += 1;

    // Universe (16-bit)
    packet[offset..offset + 2].copy_from_slice(&universe.to_be_bytes());
    offset += 2;

    // DMP Layer
    // Flags and Length (16-bit): 0x7000 | (638 - 115)
    let dmp_length = PACKET_SIZE - 115;
    packet[offset..offset + 2].copy_from_slice(&((0x7000u16 | dmp_length as u16).to_be_bytes()));
    offset += 2;

    // Vector (1 byte): VECTOR_DMP_SET_PROPERTY
    packet[offset] = VECTOR_DMP_SET_PROPERTY;
    offset += 1;

    // Address Type & Data Type (1 byte)
    packet[offset] = DMP_ADDRESS_DATA_TYPE;
    offset += 1;

    // First Property Address (16-bit): 0x0000
    packet[offset..offset + 2].copy_from_slice(&0x0000u16.to_be_bytes());
    offset += 2;

    // Address Increment (16-bit): 0x0001
    packet[offset..offset + 2].copy_from_slice(&0x0001u16.to_be_bytes());
    offset += 2;

    // Property value count (16-bit): 513 (start code + 512 channels)
    packet[offset..offset + 2].copy_from_slice(&513u16.to_be_bytes());
    offset += 2;

    // DMX Start Code (1 byte): 0x00
    packet[offset] = 0x00;
    offset += 1;

    // DMX Data (zero-padded to 512 bytes)
    packet[offset..offset + channels.len()].copy_from_slice(channels);

    Ok(packet)
}

/// Parse a datagram as an E1.31 data packet.
///
/// Accepts any property value count up to a whole universe, so senders that
/// do not pad to 638 bytes still parse. Start codes, universe routing and
/// sequence handling are the caller's concern.
pub fn parse_data_packet(datagram: &[u8]) -> Result<DataPacket> {
    if datagram.len() <= START_CODE_OFFSET {
        return Err(ControlError::MalformedPacket(format!(
            "{} bytes is shorter than a data-packet header",
            datagram.len()
        )));
    }
    if datagram[4..16] != ACN_PACKET_IDENTIFIER {
        return Err(ControlError::MalformedPacket(
            "bad ACN packet identifier".to_string(),
        ));
    }
    let root_vector = u32::from_be_bytes([datagram[18], datagram[19], datagram[20], datagram[21]]);
    if root_vector != VECTOR_ROOT_E131_DATA {
        return Err(ControlError::MalformedPacket(format!(
            "unexpected root vector {:#010x}",
            root_vector
        )));
    }
    let framing_vector =
        u32::from_be_bytes([datagram[40], datagram[41], datagram[42], datagram[43]]);
    if framing_vector != VECTOR_E131_DATA_PACKET {
        return Err(ControlError::MalformedPacket(format!(
            "unexpected framing vector {:#010x}",
            framing_vector
        )));
    }
    if datagram[117] != VECTOR_DMP_SET_PROPERTY {
        return Err(ControlError::MalformedPacket(format!(
            "unexpected DMP vector {:#04x}",
            datagram[117]
        )));
    }
    if datagram[118] != DMP_ADDRESS_DATA_TYPE {
        return Err(ControlError::MalformedPacket(format!(
            "unexpected DMP address type {:#04x}",
            datagram[118]
        )));
    }

    let count =
        u16::from_be_bytes([datagram[COUNT_OFFSET], datagram[COUNT_OFFSET + 1]]) as usize;
    if count == 0 || count > 513 {
        return Err(ControlError::MalformedPacket(format!(
            "property value count {} outside 1-513",
            count
        )));
    }
    let available = datagram.len() - START_CODE_OFFSET;
    if count > available {
        return Err(ControlError::MalformedPacket(format!(
            "property value count {} exceeds the {} bytes present",
            count, available
        )));
    }

    let universe =
        u16::from_be_bytes([datagram[UNIVERSE_OFFSET], datagram[UNIVERSE_OFFSET + 1]]);
    Ok(DataPacket {
        universe,
        priority: datagram[PRIORITY_OFFSET],
        sequence: datagram[SEQUENCE_OFFSET],
        start_code: datagram[START_CODE_OFFSET],
        data: datagram[DATA_OFFSET..START_CODE_OFFSET + count].to_vec(),
    })
}
