//! StrandCast - sACN-fed LED universe daemon
//!
//! Binds the network listeners, opens the configured LED outputs and runs
//! the render dispatcher until a shutdown signal arrives.

#![warn(missing_docs)]

mod backend;
mod config;
mod logging_setup;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info};

use strandcast_core::{provider_for, Cadence, Dispatcher, IngestAdapter, ModeSwitch, UniverseSet};
use strandcast_control::{CommandListener, SacnReceiver, TimecodeListener};

use crate::backend::AddressBackend;
use crate::config::Config;

/// sACN-fed LED universe daemon with a local animation fallback.
#[derive(Debug, Parser)]
#[command(name = "strandcast", version, about)]
struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "strandcast.toml")]
    config: PathBuf,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(&args.config)?;

    if args.check {
        println!("configuration OK: {} universes", config.universes.len());
        return Ok(());
    }

    let _log_guard = logging_setup::init(&config.log)?;
    run(config)
}

fn run(config: Config) -> Result<()> {
    let switch = Arc::new(ModeSwitch::new(config.render.initial_mode));

    let universes = UniverseSet::open(config.universes.clone(), Arc::new(AddressBackend))
        .context("opening universe outputs")?;
    info!("opened {} universes", universes.len());

    // Every configured universe gets an ingest adapter feeding its mailbox.
    let mut receiver = SacnReceiver::bind(config.sacn.bind).context("binding sACN socket")?;
    for universe in universes.iter() {
        let adapter = IngestAdapter::new(universe.id(), Arc::clone(&switch), universe.inbox());
        receiver
            .listen_on(universe.id(), move |payload| adapter.submit(payload))
            .with_context(|| format!("subscribing to universe {}", universe.id()))?;
    }
    receiver.start();

    CommandListener::bind(config.control.bind, Arc::clone(&switch), universes.inboxes())
        .context("binding control socket")?
        .start();

    if let Some(addr) = config.control.timecode_bind {
        TimecodeListener::bind(addr, |timecode| debug!("timecode {}", timecode))
            .context("binding timecode socket")?
            .start();
    }

    let provider = provider_for(&config.render.provider);
    let cadence = Cadence::new(config.render.show_hz, config.render.loop_hz);
    let dispatcher = Dispatcher::new(universes, Arc::clone(&switch), provider, cadence);

    let running = Arc::new(AtomicBool::new(true));
    let render_running = Arc::clone(&running);
    let render = thread::Builder::new()
        .name("render".to_string())
        .spawn(move || dispatcher.run(&render_running))
        .context("spawning render thread")?;

    wait_for_shutdown()?;
    info!("shutdown requested");

    // The render thread blanks the strips on its way out; the listener
    // threads die with the process.
    running.store(false, Ordering::Relaxed);
    if render.join().is_err() {
        error!("render thread panicked");
    }
    info!("strandcast stopped");
    Ok(())
}

/// Block until ctrl-c or SIGTERM-equivalent.
fn wait_for_shutdown() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building signal runtime")?;
    runtime
        .block_on(tokio::signal::ctrl_c())
        .context("waiting for shutdown signal")?;
    Ok(())
}
