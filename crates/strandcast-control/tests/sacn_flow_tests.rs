use std::net::{SocketAddr, UdpSocket};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use strandcast_control::sacn::packet;
use strandcast_control::{SacnReceiver, SacnSender};

type Deliveries = Arc<Mutex<Vec<Vec<u8>>>>;

fn listening_receiver(universes: &[u16]) -> (SocketAddr, Deliveries) {
    let mut receiver =
        SacnReceiver::bind("127.0.0.1:0".parse().unwrap()).expect("receiver binds");
    let addr = receiver.local_addr().expect("local addr");
    let deliveries: Deliveries = Arc::new(Mutex::new(Vec::new()));
    for &universe in universes {
        let sink = Arc::clone(&deliveries);
        receiver
            .listen_on(universe, move |payload| {
                sink.lock().unwrap().push(payload.to_vec());
            })
            .expect("universe registers");
    }
    receiver.start();
    (addr, deliveries)
}

fn wait_for(deliveries: &Deliveries, count: usize) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while deliveries.lock().unwrap().len() < count && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn test_data_packets_reach_the_registered_callback() {
    let (addr, deliveries) = listening_receiver(&[1]);

    let mut sender = SacnSender::new("flow test").expect("sender opens");
    sender
        .send(1, &[1, 2, 3, 4, 5, 6], Some(addr))
        .expect("packet sent");

    wait_for(&deliveries, 1);
    let frames = deliveries.lock().unwrap();
    assert_eq!(frames.len(), 1);
    // Property data is a whole universe: the channels, zero-padded, with
    // the start code already stripped.
    assert_eq!(frames[0].len(), 512);
    assert_eq!(&frames[0][..6], &[1, 2, 3, 4, 5, 6]);
    assert!(frames[0][6..].iter().all(|&b| b == 0));
}

#[test]
fn test_replayed_sequence_number_is_dropped() {
    let (addr, deliveries) = listening_receiver(&[1]);

    let cid = [7u8; 16];
    let first =
        packet::build_data_packet(&cid, "replay test", 1, 0, 100, &[9, 9, 9]).expect("packet");
    let second =
        packet::build_data_packet(&cid, "replay test", 1, 1, 100, &[7, 7, 7]).expect("packet");

    let socket = UdpSocket::bind("127.0.0.1:0").expect("sender binds");
    socket.send_to(&first, addr).expect("sent");
    socket.send_to(&first, addr).expect("sent");
    socket.send_to(&second, addr).expect("sent");

    wait_for(&deliveries, 2);
    thread::sleep(Duration::from_millis(50));
    let frames = deliveries.lock().unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(&frames[0][..3], &[9, 9, 9]);
    assert_eq!(&frames[1][..3], &[7, 7, 7]);
}

#[test]
fn test_unregistered_universe_is_ignored() {
    let (addr, deliveries) = listening_receiver(&[1]);

    let mut sender = SacnSender::new("flow test").expect("sender opens");
    sender.send(2, &[50, 50, 50], Some(addr)).expect("sent");
    sender.send(1, &[60, 60, 60], Some(addr)).expect("sent");

    wait_for(&deliveries, 1);
    thread::sleep(Duration::from_millis(50));
    let frames = deliveries.lock().unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(&frames[0][..3], &[60, 60, 60]);
}
