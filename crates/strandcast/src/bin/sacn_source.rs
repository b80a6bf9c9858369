//! Test-signal source: sends synthetic sACN show traffic at a daemon.
//!
//! Drives a moving color wipe (or random frames) on one universe, unicast
//! or to the universe's multicast group, so a receiver can be exercised
//! without a lighting console. `--blackout` sends a single all-off frame
//! and exits.

use std::net::SocketAddr;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use rand::RngExt;

use strandcast_control::SacnSender;

#[derive(Debug, Parser)]
#[command(name = "sacn-source", version, about)]
struct Args {
    /// Destination address; the universe's multicast group when omitted.
    #[arg(short, long)]
    dest: Option<SocketAddr>,

    /// Universe to send on.
    #[arg(short, long, default_value_t = 1)]
    universe: u16,

    /// Number of pixels to drive (1-170).
    #[arg(short, long, default_value_t = 170)]
    pixels: usize,

    /// Frames per second.
    #[arg(short, long, default_value_t = 30.0)]
    fps: f64,

    /// Send random frames instead of the color wipe.
    #[arg(long)]
    random: bool,

    /// Send a single all-off frame and exit.
    #[arg(long)]
    blackout: bool,
}

const WIPE_COLORS: [[u8; 3]; 4] = [[255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 255, 255]];

fn random_frame(rng: &mut impl RngExt, pixels: usize) -> Vec<u8> {
    let mut channels = vec![0u8; pixels * 3];
    for channel in channels.iter_mut() {
        *channel = rng.random();
    }
    channels
}

/// One lit pixel sweeping the strip, changing color each full pass.
fn wipe_frame(step: usize, pixels: usize) -> Vec<u8> {
    let mut channels = vec![0u8; pixels * 3];
    let lit = step % pixels;
    let color = WIPE_COLORS[(step / pixels) % WIPE_COLORS.len()];
    channels[lit * 3..lit * 3 + 3].copy_from_slice(&color);
    channels
}

fn main() -> Result<()> {
    let args = Args::parse();
    let pixels = args.pixels.clamp(1, 170);
    let mut sender = SacnSender::new("strandcast-source")?;

    if args.blackout {
        sender.send(args.universe, &vec![0u8; pixels * 3], args.dest)?;
        println!("sent blackout to universe {}", args.universe);
        return Ok(());
    }

    let interval = Duration::from_secs_f64(1.0 / args.fps.max(0.1));
    let mut rng = rand::rng();
    let mut step = 0usize;
    println!(
        "sending {} to universe {} at {:.1} fps (ctrl-c to stop)",
        if args.random { "random frames" } else { "a color wipe" },
        args.universe,
        args.fps
    );

    loop {
        let channels = if args.random {
            random_frame(&mut rng, pixels)
        } else {
            wipe_frame(step, pixels)
        };
        sender.send(args.universe, &channels, args.dest)?;
        step = step.wrapping_add(1);
        thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_frame_fills_every_channel() {
        let mut rng = rand::rng();
        let frame = random_frame(&mut rng, 170);
        assert_eq!(frame.len(), 510);
        // 510 uniform draws coming up all zero would be astronomical.
        assert!(frame.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_wipe_frame_lights_one_pixel_and_cycles_colors() {
        let frame = wipe_frame(0, 4);
        assert_eq!(&frame[0..3], &[255, 0, 0]);
        assert!(frame[3..].iter().all(|&b| b == 0));

        let frame = wipe_frame(3, 4);
        assert_eq!(&frame[9..12], &[255, 0, 0]);

        // Each full pass moves to the next wipe color.
        let frame = wipe_frame(4, 4);
        assert_eq!(&frame[0..3], &[0, 255, 0]);
        let frame = wipe_frame(8, 4);
        assert_eq!(&frame[0..3], &[0, 0, 255]);
    }
}
