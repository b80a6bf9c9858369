//! The render dispatcher: the single owner of hardware write access.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::animation::AnimationProvider;
use crate::color::Rgb;
use crate::mode::{Mode, ModeSwitch};
use crate::universe::UniverseSet;

/// Per-mode tick pacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cadence {
    show_interval: Duration,
    loop_interval: Duration,
}

impl Cadence {
    /// Build a cadence from per-mode tick rates in Hz. Rates that are not
    /// finite and positive fall back to the defaults (100 Hz show, 10 Hz
    /// loop).
    pub fn new(show_hz: f64, loop_hz: f64) -> Self {
        Self {
            show_interval: interval_from_hz(show_hz, 100.0),
            loop_interval: interval_from_hz(loop_hz, 10.0),
        }
    }

    /// Target interval between ticks in `mode`.
    pub fn interval(&self, mode: Mode) -> Duration {
        match mode {
            Mode::Show => self.show_interval,
            Mode::Loop => self.loop_interval,
        }
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self::new(100.0, 10.0)
    }
}

fn interval_from_hz(hz: f64, fallback: f64) -> Duration {
    let hz = if hz.is_finite() && hz > 0.0 { hz } else { fallback };
    Duration::from_secs_f64(1.0 / hz)
}

/// Running totals of dispatcher activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Ticks executed.
    pub ticks: u64,
    /// Show frames presented to hardware.
    pub frames: u64,
    /// All-off clears driven by mode transitions or shutdown.
    pub clears: u64,
    /// Flushes recovered by reopening a handle.
    pub recoveries: u64,
    /// Universe refreshes skipped after retry exhaustion.
    pub skips: u64,
}

const REPORT_INTERVAL: Duration = Duration::from_secs(10);

/// The render dispatcher.
///
/// Owns every universe, and with them every hardware handle. Each tick
/// reads the mode once, drives an all-off clear exactly once per observed
/// transition, then either drains show frames or delegates to the
/// animation provider. Network threads never touch hardware.
pub struct Dispatcher {
    universes: UniverseSet,
    mode: Arc<ModeSwitch>,
    provider: Box<dyn AnimationProvider>,
    cadence: Cadence,
    last_seen: Mode,
    ticks: u64,
    frames: u64,
    clears: u64,
    report_at: Instant,
    reported: DispatchStats,
}

impl Dispatcher {
    /// Build the dispatcher and run the provider's one-time `setup`.
    pub fn new(
        mut universes: UniverseSet,
        mode: Arc<ModeSwitch>,
        mut provider: Box<dyn AnimationProvider>,
        cadence: Cadence,
    ) -> Self {
        provider.setup(&mut universes);
        let last_seen = mode.current();
        info!(
            "render dispatcher ready: {} universes, provider '{}', starting in {} mode",
            universes.len(),
            provider.name(),
            last_seen
        );
        Self {
            universes,
            mode,
            provider,
            cadence,
            last_seen,
            ticks: 0,
            frames: 0,
            clears: 0,
            report_at: Instant::now(),
            reported: DispatchStats::default(),
        }
    }

    /// Execute one dispatch tick.
    pub fn tick(&mut self) {
        self.ticks += 1;
        let mode = self.mode.current();
        if mode != self.last_seen {
            info!("mode changed: {} -> {}", self.last_seen, mode);
            self.clear_all();
            self.last_seen = mode;
        }
        match mode {
            Mode::Show => self.drain_show(),
            Mode::Loop => self.provider.update(&mut self.universes),
        }
    }

    /// Run the tick loop until `running` clears, then blank every universe.
    pub fn run(mut self, running: &AtomicBool) {
        while running.load(Ordering::Relaxed) {
            let started = Instant::now();
            self.tick();
            self.report_maybe();
            let interval = self.cadence.interval(self.last_seen);
            let elapsed = started.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }
        self.shutdown();
    }

    /// Drive every universe dark. The terminal operation on the dispatcher.
    pub fn shutdown(mut self) {
        info!(
            "render dispatcher stopping, blanking {} universes",
            self.universes.len()
        );
        self.clear_all();
    }

    /// Running activity totals.
    pub fn stats(&self) -> DispatchStats {
        let mut stats = DispatchStats {
            ticks: self.ticks,
            frames: self.frames,
            clears: self.clears,
            recoveries: 0,
            skips: 0,
        };
        for universe in self.universes.iter() {
            stats.recoveries += universe.recoveries();
            stats.skips += universe.skips();
        }
        stats
    }

    /// The universes the dispatcher drives.
    pub fn universes(&self) -> &UniverseSet {
        &self.universes
    }

    fn drain_show(&mut self) {
        for universe in self.universes.iter_mut() {
            if let Some(frame) = universe.take_frame() {
                universe.stage(&frame);
                if universe.present().is_ok() {
                    self.frames += 1;
                }
            }
        }
    }

    fn clear_all(&mut self) {
        for universe in self.universes.iter_mut() {
            universe.fill(Rgb::OFF);
            let _ = universe.present();
        }
        self.clears += 1;
    }

    /// Log a one-line activity summary once per reporting interval. The
    /// logged counters cover only the interval; `stats` keeps the totals.
    fn report_maybe(&mut self) {
        let elapsed = self.report_at.elapsed();
        if elapsed < REPORT_INTERVAL {
            return;
        }
        let stats = self.stats();
        let rate = (stats.ticks - self.reported.ticks) as f64 / elapsed.as_secs_f64();
        debug!(
            "{} mode: {:.1} ticks/s, {} frames shown, {} recoveries, {} skips",
            self.last_seen,
            rate,
            stats.frames - self.reported.frames,
            stats.recoveries - self.reported.recoveries,
            stats.skips - self.reported.skips
        );
        self.report_at = Instant::now();
        self.reported = stats;
    }
}
