//! Decoded pixel frames.

use crate::color::Rgb;

/// One ready-to-display sequence of pixel values for a universe.
///
/// Produced by the ingest adapter from a raw channel payload and consumed
/// at most once by the render dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pixels: Vec<Rgb>,
}

impl Frame {
    /// Decode a raw byte payload, grouping consecutive byte triples into
    /// pixel values in wire order. Trailing bytes that do not form a whole
    /// triple are discarded; returns `None` when no complete triple is
    /// present.
    pub fn decode(payload: &[u8]) -> Option<Frame> {
        if payload.len() < 3 {
            return None;
        }
        let pixels = payload
            .chunks_exact(3)
            .map(|triple| Rgb::new(triple[0], triple[1], triple[2]))
            .collect();
        Some(Frame { pixels })
    }

    /// Build a frame directly from pixel values.
    pub fn from_pixels(pixels: Vec<Rgb>) -> Frame {
        Frame { pixels }
    }

    /// Number of pixels in the frame.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Whether the frame holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// The decoded pixel values.
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rejects_payload_without_a_full_triple() {
        assert_eq!(Frame::decode(&[]), None);
        assert_eq!(Frame::decode(&[255]), None);
        assert_eq!(Frame::decode(&[255, 0]), None);
    }

    #[test]
    fn test_decode_groups_triples_in_order() {
        let frame = Frame::decode(&[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(frame.pixels(), &[Rgb::new(1, 2, 3), Rgb::new(4, 5, 6)]);
    }

    #[test]
    fn test_decode_discards_trailing_partial_triple() {
        let frame = Frame::decode(&[1, 2, 3, 4, 5, 6, 7]).unwrap();
        assert_eq!(frame.len(), 2);
        let frame = Frame::decode(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(frame.len(), 2);
    }

    #[test]
    fn test_decode_single_pixel() {
        let frame = Frame::decode(&[9, 8, 7]).unwrap();
        assert_eq!(frame.pixels(), &[Rgb::new(9, 8, 7)]);
    }
}
