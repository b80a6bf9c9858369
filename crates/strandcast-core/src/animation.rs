//! Loop-mode animation providers.

use std::collections::HashMap;

use tracing::warn;

use crate::color::Rgb;
use crate::universe::{UniverseId, UniverseSet};

/// Loop-mode content source.
///
/// `setup` runs once before the first tick; `update` runs once per
/// Loop-mode tick and is responsible for staging and flushing every
/// universe it wants to refresh. Providers keep their own per-universe
/// state and must return promptly, since the dispatcher thread is the sole
/// hardware writer.
pub trait AnimationProvider: Send {
    /// Name used in configuration and logs.
    fn name(&self) -> &'static str;

    /// One-time initialization: blank the strips and seed provider state.
    fn setup(&mut self, _universes: &mut UniverseSet) {}

    /// Advance the animation by one tick.
    fn update(&mut self, universes: &mut UniverseSet);
}

/// Drive every universe dark once.
fn blank_all(universes: &mut UniverseSet) {
    for universe in universes.iter_mut() {
        universe.fill(Rgb::OFF);
        let _ = universe.present();
    }
}

/// The built-in default: one lit pixel per universe, advancing one position
/// per tick and wrapping at the pixel count.
pub struct Chaser {
    positions: HashMap<UniverseId, usize>,
    color: Rgb,
}

impl Chaser {
    /// A white chaser starting at pixel zero.
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
            color: Rgb::WHITE,
        }
    }
}

impl Default for Chaser {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationProvider for Chaser {
    fn name(&self) -> &'static str {
        "chaser"
    }

    fn setup(&mut self, universes: &mut UniverseSet) {
        for universe in universes.iter() {
            self.positions.insert(universe.id(), 0);
        }
        blank_all(universes);
    }

    fn update(&mut self, universes: &mut UniverseSet) {
        for universe in universes.iter_mut() {
            if universe.pixels() == 0 {
                continue;
            }
            let position = self.positions.entry(universe.id()).or_insert(0);
            universe.fill(Rgb::OFF);
            universe.set(*position, self.color);
            *position = (*position + 1) % universe.pixels();
            let _ = universe.present();
        }
    }
}

/// A phase-shifted RGB ramp scrolling along the strip.
pub struct Gradient {
    phase: u8,
}

impl Gradient {
    /// Start at phase zero.
    pub fn new() -> Self {
        Self { phase: 0 }
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationProvider for Gradient {
    fn name(&self) -> &'static str {
        "gradient"
    }

    fn setup(&mut self, universes: &mut UniverseSet) {
        blank_all(universes);
    }

    fn update(&mut self, universes: &mut UniverseSet) {
        let phase = self.phase as usize;
        for universe in universes.iter_mut() {
            for index in 0..universe.pixels() {
                let color = Rgb::new(
                    ((index * 5 + phase) % 256) as u8,
                    ((index * 3 + phase * 2) % 256) as u8,
                    ((index * 7 + phase * 3) % 256) as u8,
                );
                universe.set(index, color);
            }
            let _ = universe.present();
        }
        self.phase = self.phase.wrapping_add(1);
    }
}

/// A travelling intensity wave under a slow breathing envelope.
pub struct Wave {
    phase: f32,
}

impl Wave {
    /// Start at phase zero.
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }
}

impl Default for Wave {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationProvider for Wave {
    fn name(&self) -> &'static str {
        "wave"
    }

    fn setup(&mut self, universes: &mut UniverseSet) {
        blank_all(universes);
    }

    fn update(&mut self, universes: &mut UniverseSet) {
        // 200π is a whole period of both the ripple and the envelope;
        // wrapping keeps the f32 from degrading over long runs.
        self.phase = (self.phase + 0.2) % (200.0 * std::f32::consts::PI);
        let envelope = 0.5 - 0.5 * (self.phase * 0.03).cos();
        for universe in universes.iter_mut() {
            for index in 0..universe.pixels() {
                let ripple = 0.5 + 0.5 * (index as f32 * 0.3 - self.phase).sin();
                let level = (ripple * envelope * 255.0) as u8;
                universe.set(index, Rgb::new(level, level, level));
            }
            let _ = universe.present();
        }
    }
}

/// Select a provider by its configured name, case-insensitive. Unknown
/// names are reported and fall back to the chaser.
pub fn provider_for(name: &str) -> Box<dyn AnimationProvider> {
    match name.trim().to_ascii_lowercase().as_str() {
        "chaser" => Box::new(Chaser::new()),
        "gradient" => Box::new(Gradient::new()),
        "wave" => Box::new(Wave::new()),
        unknown => {
            warn!("unknown animation provider '{}', falling back to chaser", unknown);
            Box::new(Chaser::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip::MemoryBackend;
    use crate::universe::UniverseConfig;
    use std::sync::Arc;

    fn set_of(pixels: usize) -> UniverseSet {
        let configs = vec![UniverseConfig {
            id: 1,
            output: "memory".to_string(),
            pixels,
            brightness: 255,
        }];
        UniverseSet::open(configs, Arc::new(MemoryBackend)).unwrap()
    }

    fn lit_index(universes: &UniverseSet) -> Option<usize> {
        universes
            .get(1)
            .unwrap()
            .staged()
            .iter()
            .position(|&p| p != Rgb::OFF)
    }

    #[test]
    fn test_chaser_advances_one_pixel_per_tick_and_wraps() {
        let mut universes = set_of(3);
        let mut chaser = Chaser::new();
        chaser.setup(&mut universes);
        assert_eq!(lit_index(&universes), None);

        chaser.update(&mut universes);
        assert_eq!(lit_index(&universes), Some(0));
        chaser.update(&mut universes);
        assert_eq!(lit_index(&universes), Some(1));
        chaser.update(&mut universes);
        assert_eq!(lit_index(&universes), Some(2));
        chaser.update(&mut universes);
        assert_eq!(lit_index(&universes), Some(0));
    }

    #[test]
    fn test_chaser_lights_exactly_one_pixel() {
        let mut universes = set_of(5);
        let mut chaser = Chaser::new();
        chaser.setup(&mut universes);
        chaser.update(&mut universes);
        let lit = universes
            .get(1)
            .unwrap()
            .staged()
            .iter()
            .filter(|&&p| p != Rgb::OFF)
            .count();
        assert_eq!(lit, 1);
    }

    #[test]
    fn test_chaser_survives_empty_universe() {
        let mut universes = set_of(0);
        let mut chaser = Chaser::new();
        chaser.setup(&mut universes);
        chaser.update(&mut universes);
        chaser.update(&mut universes);
    }

    #[test]
    fn test_gradient_differs_between_ticks() {
        let mut universes = set_of(8);
        let mut gradient = Gradient::new();
        gradient.setup(&mut universes);
        gradient.update(&mut universes);
        let first = universes.get(1).unwrap().staged().to_vec();
        gradient.update(&mut universes);
        let second = universes.get(1).unwrap().staged().to_vec();
        assert_ne!(first, second);
    }

    #[test]
    fn test_wave_phase_stays_bounded() {
        let mut universes = set_of(4);
        let mut wave = Wave::new();
        wave.setup(&mut universes);
        // Enough ticks to cross the wrap point at least once.
        for _ in 0..4000 {
            wave.update(&mut universes);
        }
        assert!(wave.phase >= 0.0);
        assert!(wave.phase < 200.0 * std::f32::consts::PI);
    }

    #[test]
    fn test_provider_for_unknown_name_falls_back_to_chaser() {
        assert_eq!(provider_for("sparkle").name(), "chaser");
        assert_eq!(provider_for(" Gradient ").name(), "gradient");
        assert_eq!(provider_for("WAVE").name(), "wave");
        assert_eq!(provider_for("chaser").name(), "chaser");
    }
}
