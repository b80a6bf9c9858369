//! Daemon configuration: TOML schema, defaults and validation.

use std::collections::HashSet;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

use strandcast_core::{Mode, UniverseConfig, MAX_UNIVERSE};
use strandcast_control::ACN_SDT_MULTICAST_PORT;

use crate::backend;

/// Whole RGB pixels carried by one 512-channel universe.
pub const MAX_PIXELS_PER_UNIVERSE: usize = 512 / 3;

/// Top-level daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Control channel settings.
    #[serde(default)]
    pub control: ControlConfig,
    /// sACN ingest settings.
    #[serde(default)]
    pub sacn: SacnConfig,
    /// Render dispatcher settings.
    #[serde(default)]
    pub render: RenderConfig,
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
    /// Driven universes.
    #[serde(rename = "universe", default)]
    pub universes: Vec<UniverseConfig>,
}

/// Control channel endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    /// UDP endpoint for mode commands.
    #[serde(default = "default_control_bind")]
    pub bind: SocketAddr,
    /// Optional UDP endpoint for SMPTE timecode.
    #[serde(default)]
    pub timecode_bind: Option<SocketAddr>,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            bind: default_control_bind(),
            timecode_bind: None,
        }
    }
}

fn default_control_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5000))
}

/// sACN ingest settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SacnConfig {
    /// UDP endpoint for E1.31 packets.
    #[serde(default = "default_sacn_bind")]
    pub bind: SocketAddr,
}

impl Default for SacnConfig {
    fn default() -> Self {
        Self {
            bind: default_sacn_bind(),
        }
    }
}

fn default_sacn_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], ACN_SDT_MULTICAST_PORT))
}

/// Render dispatcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Show-mode tick rate in Hz.
    #[serde(default = "default_show_hz")]
    pub show_hz: f64,
    /// Loop-mode tick rate in Hz.
    #[serde(default = "default_loop_hz")]
    pub loop_hz: f64,
    /// Animation provider driving loop mode.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Mode the daemon starts in.
    #[serde(default = "default_initial_mode")]
    pub initial_mode: Mode,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            show_hz: default_show_hz(),
            loop_hz: default_loop_hz(),
            provider: default_provider(),
            initial_mode: default_initial_mode(),
        }
    }
}

fn default_show_hz() -> f64 {
    100.0
}

fn default_loop_hz() -> f64 {
    10.0
}

fn default_provider() -> String {
    "chaser".to_string()
}

fn default_initial_mode() -> Mode {
    Mode::Loop
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default level directive; the `RUST_LOG` env var takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log to stderr.
    #[serde(default = "default_log_console")]
    pub console: bool,
    /// Optional log file path.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: default_log_console(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_console() -> bool {
    true
}

impl LogConfig {
    /// Parse the configured level, defaulting to INFO if invalid.
    pub fn parse_level(&self) -> LevelFilter {
        self.level.parse().unwrap_or_else(|_| {
            eprintln!("invalid log level '{}', defaulting to info", self.level);
            LevelFilter::INFO
        })
    }
}

impl Config {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Config> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Config = toml::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the rest of the daemon relies on: at least one
    /// universe, unique in-range ids, sane pixel counts, parseable outputs
    /// and positive tick rates.
    pub fn validate(&self) -> Result<()> {
        if self.universes.is_empty() {
            bail!("configuration defines no universes");
        }
        let mut seen = HashSet::new();
        for universe in &self.universes {
            if universe.id == 0 || universe.id > MAX_UNIVERSE {
                bail!(
                    "universe {} is outside the valid range 1-{}",
                    universe.id,
                    MAX_UNIVERSE
                );
            }
            if !seen.insert(universe.id) {
                bail!("universe {} is defined more than once", universe.id);
            }
            if universe.pixels == 0 {
                bail!("universe {}: pixel count must be at least 1", universe.id);
            }
            if universe.pixels > MAX_PIXELS_PER_UNIVERSE {
                bail!(
                    "universe {}: {} pixels exceed the {} one universe carries",
                    universe.id,
                    universe.pixels,
                    MAX_PIXELS_PER_UNIVERSE
                );
            }
            backend::parse_output(&universe.output).with_context(|| {
                format!("universe {}: invalid output '{}'", universe.id, universe.output)
            })?;
        }
        if !(self.render.show_hz.is_finite() && self.render.show_hz > 0.0) {
            bail!("render.show_hz must be a positive number");
        }
        if !(self.render.loop_hz.is_finite() && self.render.loop_hz > 0.0) {
            bail!("render.loop_hz must be a positive number");
        }
        Ok(())
    }
}
