//! Universe records and the fixed registry the dispatcher owns.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::color::Rgb;
use crate::frame::Frame;
use crate::mailbox::FrameSlot;
use crate::strip::{Result, Strip, StripBackend};

/// Identifier of one LED universe (the E1.31 universe number).
pub type UniverseId = u16;

/// Highest valid universe number on the wire.
pub const MAX_UNIVERSE: UniverseId = 63999;

/// Static per-universe settings, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniverseConfig {
    /// Universe number, 1 to [`MAX_UNIVERSE`].
    pub id: UniverseId,
    /// Output address understood by the strip backend.
    pub output: String,
    /// Physical pixel count.
    pub pixels: usize,
    /// Output brightness, 0-255.
    #[serde(default = "default_brightness")]
    pub brightness: u8,
}

fn default_brightness() -> u8 {
    255
}

/// One addressable LED universe.
///
/// Owns the hardware handle, a shadow of the staged pixel values (so a
/// reopened handle can be redrawn), the ingest mailbox and fault counters.
pub struct Universe {
    config: UniverseConfig,
    strip: Box<dyn Strip>,
    backend: Arc<dyn StripBackend>,
    shadow: Vec<Rgb>,
    inbox: Arc<FrameSlot>,
    recoveries: u64,
    skips: u64,
}

impl Universe {
    /// Wrap an opened strip handle.
    pub fn new(
        config: UniverseConfig,
        strip: Box<dyn Strip>,
        backend: Arc<dyn StripBackend>,
    ) -> Self {
        let shadow = vec![Rgb::OFF; config.pixels];
        Self {
            config,
            strip,
            backend,
            shadow,
            inbox: Arc::new(FrameSlot::new()),
            recoveries: 0,
            skips: 0,
        }
    }

    /// Universe number.
    pub fn id(&self) -> UniverseId {
        self.config.id
    }

    /// Physical pixel count.
    pub fn pixels(&self) -> usize {
        self.config.pixels
    }

    /// The settings this universe was opened with.
    pub fn config(&self) -> &UniverseConfig {
        &self.config
    }

    /// Handle to the ingest mailbox, for wiring protocol callbacks.
    pub fn inbox(&self) -> Arc<FrameSlot> {
        Arc::clone(&self.inbox)
    }

    /// Take the pending ingest frame, if any.
    pub fn take_frame(&self) -> Option<Frame> {
        self.inbox.take()
    }

    /// The currently staged pixel values.
    pub fn staged(&self) -> &[Rgb] {
        &self.shadow
    }

    /// Stage one pixel value. Indexes past the pixel count are ignored.
    pub fn set(&mut self, index: usize, color: Rgb) {
        if index < self.shadow.len() {
            self.shadow[index] = color;
            self.strip.set(index, color);
        }
    }

    /// Stage one value across every pixel.
    pub fn fill(&mut self, color: Rgb) {
        self.shadow.fill(color);
        self.strip.fill(color);
    }

    /// Stage a frame from pixel zero. Entries past the pixel count are
    /// ignored; pixels the frame does not cover keep their prior value.
    pub fn stage(&mut self, frame: &Frame) {
        for (index, color) in frame.pixels().iter().enumerate().take(self.config.pixels) {
            self.shadow[index] = *color;
            self.strip.set(index, *color);
        }
    }

    /// Flush the staged values to the device.
    ///
    /// A transient flush fault reopens the handle from the stored
    /// configuration, redraws the staged values and retries once. A second
    /// failure surfaces as `Err` and the caller skips this universe for the
    /// rest of the tick; later ticks retry as normal.
    pub fn present(&mut self) -> Result<()> {
        let first = match self.strip.show() {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        warn!(
            "universe {}: flush failed ({}), reopening output",
            self.config.id, first
        );
        match self.reopen_and_retry() {
            Ok(()) => {
                self.recoveries += 1;
                debug!("universe {}: flush recovered after reopen", self.config.id);
                Ok(())
            }
            Err(second) => {
                self.skips += 1;
                error!(
                    "universe {}: flush failed again after reopen ({}), skipping refresh",
                    self.config.id, second
                );
                Err(second)
            }
        }
    }

    fn reopen_and_retry(&mut self) -> Result<()> {
        self.strip = self.backend.open(&self.config)?;
        for (index, color) in self.shadow.iter().enumerate() {
            self.strip.set(index, *color);
        }
        self.strip.show()
    }

    /// Flushes recovered by the reopen-and-retry path.
    pub fn recoveries(&self) -> u64 {
        self.recoveries
    }

    /// Refreshes skipped after retry exhaustion.
    pub fn skips(&self) -> u64 {
        self.skips
    }
}

/// The fixed, id-ordered set of universes.
///
/// Built once at startup. The render dispatcher owns the set outright, and
/// with it every hardware handle in the process.
pub struct UniverseSet {
    universes: Vec<Universe>,
}

impl UniverseSet {
    /// Open a strip for every configuration and build the registry, sorted
    /// by universe id. Ids are expected to be unique; configuration loading
    /// validates that before this runs.
    pub fn open(configs: Vec<UniverseConfig>, backend: Arc<dyn StripBackend>) -> Result<Self> {
        let mut universes = Vec::with_capacity(configs.len());
        for config in configs {
            let strip = backend.open(&config)?;
            universes.push(Universe::new(config, strip, Arc::clone(&backend)));
        }
        universes.sort_by_key(|universe| universe.id());
        Ok(Self { universes })
    }

    /// Number of universes.
    pub fn len(&self) -> usize {
        self.universes.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.universes.is_empty()
    }

    /// Iterate universes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Universe> {
        self.universes.iter()
    }

    /// Iterate universes mutably in id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Universe> {
        self.universes.iter_mut()
    }

    /// Look up a universe by id.
    pub fn get(&self, id: UniverseId) -> Option<&Universe> {
        self.universes.iter().find(|universe| universe.id() == id)
    }

    /// Every universe's ingest mailbox, in id order.
    pub fn inboxes(&self) -> Vec<Arc<FrameSlot>> {
        self.universes.iter().map(|universe| universe.inbox()).collect()
    }
}
