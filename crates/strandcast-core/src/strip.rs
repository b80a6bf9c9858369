//! The hardware seam: strip handles and the backends that open them.

use thiserror::Error;

use crate::color::Rgb;
use crate::universe::UniverseConfig;

/// Errors surfaced by strip handles and backends.
#[derive(Debug, Error)]
pub enum StripError {
    /// A flush failed in the underlying bus or socket write. Transient;
    /// the owner may reopen the handle and retry.
    #[error("flush failed: {0}")]
    Flush(String),

    /// A handle could not be opened from its configuration.
    #[error("open failed: {0}")]
    Open(String),
}

/// Result type for strip operations.
pub type Result<T> = std::result::Result<T, StripError>;

/// One universe's hardware handle.
///
/// `set` and `fill` only stage pixel values; nothing reaches the device
/// until `show`. A handle is exclusively owned by the render dispatcher,
/// which is what keeps device access single-writer.
pub trait Strip: Send {
    /// Number of physical pixels.
    fn len(&self) -> usize;

    /// Whether the strip has no pixels.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stage one pixel value. Indexes past the pixel count are ignored.
    fn set(&mut self, index: usize, color: Rgb);

    /// Stage one value across every pixel.
    fn fill(&mut self, color: Rgb) {
        for index in 0..self.len() {
            self.set(index, color);
        }
    }

    /// Push the staged values to the device. The only fallible strip
    /// operation.
    fn show(&mut self) -> Result<()>;
}

/// Opens strip handles from universe configuration.
///
/// Kept for the lifetime of the process so the fault-recovery path can
/// reopen a failed handle with its original parameters.
pub trait StripBackend: Send + Sync {
    /// Open a handle for `config`.
    fn open(&self, config: &UniverseConfig) -> Result<Box<dyn Strip>>;
}

/// An in-process strip: a plain pixel array that counts flushes.
///
/// Backs `memory` outputs in development configurations and doubles as the
/// test strip.
#[derive(Debug, Clone)]
pub struct MemoryStrip {
    pixels: Vec<Rgb>,
    shows: u64,
}

impl MemoryStrip {
    /// Create a strip with `len` pixels, all off.
    pub fn new(len: usize) -> Self {
        Self {
            pixels: vec![Rgb::OFF; len],
            shows: 0,
        }
    }

    /// The staged pixel values.
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Number of completed flushes.
    pub fn shows(&self) -> u64 {
        self.shows
    }
}

impl Strip for MemoryStrip {
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

    fn show(&mut self) -> Result<()> {
        self.shows += 1;
        Ok(())
    }
}

/// Backend producing [`MemoryStrip`] handles.
#[derive(Debug, Default)]
pub struct MemoryBackend;

impl StripBackend for MemoryBackend {
    fn open(&self, config: &UniverseConfig) -> Result<Box<dyn Strip>> {
        Ok(Box::new(MemoryStrip::new(config.pixels)))
    }
}
