use proptest::prelude::*;

use strandcast_core::{Frame, Rgb};

proptest! {
    // Decoding never panics, and the grouping law holds: every whole triple
    // becomes one pixel, trailing bytes are dropped, and payloads without a
    // full triple decode to nothing.
    #[test]
    fn decode_groups_whole_triples(payload in proptest::collection::vec(any::<u8>(), 0..1600)) {
        match Frame::decode(&payload) {
            Some(frame) => {
                prop_assert!(payload.len() >= 3);
                prop_assert_eq!(frame.len(), payload.len() / 3);
            }
            None => prop_assert!(payload.len() < 3),
        }
    }

    // Payload byte i lands on channel i % 3 of pixel i / 3.
    #[test]
    fn decode_preserves_byte_order(payload in proptest::collection::vec(any::<u8>(), 3..600)) {
        let frame = Frame::decode(&payload).unwrap();
        for (index, pixel) in frame.pixels().iter().enumerate() {
            let offset = index * 3;
            prop_assert_eq!(
                *pixel,
                Rgb::new(payload[offset], payload[offset + 1], payload[offset + 2])
            );
        }
    }
}
