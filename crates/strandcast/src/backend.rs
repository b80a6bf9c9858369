//! Strip backends for configured outputs: DDP devices and in-process
//! memory strips.

use std::net::UdpSocket;

use ddp_rs::connection::DDPConnection;
use ddp_rs::protocol::{PixelConfig, ID};
use tracing::info;

use strandcast_core::{MemoryStrip, Rgb, Strip, StripBackend, StripError, UniverseConfig};

/// Default DDP port (WLED listens here).
const DDP_PORT: u16 = 4048;

/// A parsed universe output address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputAddress {
    /// In-process pixel array, no hardware.
    Memory,
    /// A DDP device (WLED and similar) at `host:port`.
    Ddp(String),
}

/// Parse a universe `output` string.
///
/// Accepted forms: `memory`, and `ddp://host[:port]` with the port
/// defaulting to 4048.
pub fn parse_output(output: &str) -> Result<OutputAddress, StripError> {
    let output = output.trim();
    if output.eq_ignore_ascii_case("memory") {
        return Ok(OutputAddress::Memory);
    }
    if let Some(rest) = output.strip_prefix("ddp://") {
        if rest.is_empty() {
            return Err(StripError::Open(format!("no host in output '{}'", output)));
        }
        let target = if rest.contains(':') {
            rest.to_string()
        } else {
            format!("{}:{}", rest, DDP_PORT)
        };
        return Ok(OutputAddress::Ddp(target));
    }
    Err(StripError::Open(format!("unrecognized output '{}'", output)))
}

/// Opens strips from universe output addresses.
#[derive(Debug, Default)]
pub struct AddressBackend;

impl StripBackend for AddressBackend {
    fn open(&self, config: &UniverseConfig) -> Result<Box<dyn Strip>, StripError> {
        match parse_output(&config.output)? {
            OutputAddress::Memory => Ok(Box::new(MemoryStrip::new(config.pixels))),
            OutputAddress::Ddp(target) => Ok(Box::new(DdpStrip::open(
                &target,
                config.pixels,
                config.brightness,
            )?)),
        }
    }
}

/// A DDP-attached strip.
///
/// Pixel values are staged locally; `show` scales them by the configured
/// brightness and pushes one RGB frame over UDP.
pub struct DdpStrip {
    connection: DDPConnection,
    pixels: Vec<Rgb>,
    brightness: u8,
    target: String,
}

impl DdpStrip {
    fn open(target: &str, pixels: usize, brightness: u8) -> Result<Self, StripError> {
        let socket = UdpSocket::bind("0.0.0.0:0").map_err(|e| StripError::Open(e.to_string()))?;
        let connection = DDPConnection::try_new(target, PixelConfig::default(), ID::Default, socket)
            .map_err(|e| StripError::Open(format!("{}: {}", target, e)))?;
        info!("opened DDP output {} ({} pixels)", target, pixels);
        Ok(Self {
            connection,
            pixels: vec![Rgb::OFF; pixels],
            brightness,
            target: target.to_string(),
        })
    }
}

impl Strip for DdpStrip {
    fn len(&self) -> usize {
        self.pixels.len()
    }

    fn set(&mut self, index: usize, color: Rgb) {
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = color;
        }
    }

    fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    fn show(&mut self) -> Result<(), StripError> {
        let mut frame = Vec::with_capacity(self.pixels.len() * 3);
        for pixel in &self.pixels {
            let scaled = pixel.scaled(self.brightness);
            frame.extend_from_slice(&[scaled.r, scaled.g, scaled.b]);
        }
        self.connection
            .write(&frame)
            .map_err(|e| StripError::Flush(format!("{}: {}", self.target, e)))?;
        Ok(())
    }
}
