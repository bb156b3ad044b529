//! Thermoguard — fail-safe thermal relay daemon.
//!
//! Hexagonal architecture with a single-consumer event loop:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                  │
//! │                                                          │
//! │  RelayPin/SimRelay   HttpUplink      LogEventSink        │
//! │  MotionSensor (ISR)  (UplinkPort)    (EventSink)         │
//! │                                                          │
//! │  ───────────── Port Trait Boundary ─────────────────     │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────┐      │
//! │  │        RelayService (pure logic)               │      │
//! │  │  evaluator · actuator · store · journal        │      │
//! │  └────────────────────────────────────────────────┘      │
//! │                                                          │
//! │  stdin reader thread · signal handler · periodic tick    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The bridge process pipes reading blocks into stdin; the PIR interrupt
//! and signal handler feed the same queue the stdin reader does, so every
//! touch of relay state happens on this one thread.

use std::io::BufRead;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;

use thermoguard::adapters::http::HttpUplink;
use thermoguard::adapters::log_sink::LogEventSink;
use thermoguard::app::ports::{RelayPort, UplinkPort};
use thermoguard::app::service::RelayService;
use thermoguard::config::RelayConfig;
use thermoguard::events::{self, ControlEvent, EventProducer, EventQueue};
use thermoguard::reading;
use thermoguard::store::journal::Journal;
use thermoguard::store::latest::LatestStore;
use thermoguard::store::occupancy::OccupancyWindow;

/// BCM pin numbers; fixed board wiring, not configuration.
#[cfg(feature = "rpi")]
const RELAY_GPIO: u8 = 17;
#[cfg(feature = "rpi")]
const PIR_GPIO: u8 = 27;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("thermoguard v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Configuration ──────────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("/etc/thermoguard/config.json"), PathBuf::from);
    let config = RelayConfig::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating data dir {}", config.data_dir.display()))?;

    // ── 2. Durable state ──────────────────────────────────────
    let store = LatestStore::open(config.snapshot_path());
    let occupancy = OccupancyWindow::open(config.occupancy_path());
    let journal = Journal::open(config.log_path(), config.cursor_path())
        .context("opening reading journal")?;
    info!(
        "journal: {} bytes logged, cursor at {}",
        journal.len(),
        journal.cursor()
    );

    // ── 3. Event queue and producers ──────────────────────────
    let (producer, queue) = events::channel();

    {
        let producer = producer.clone();
        ctrlc::set_handler(move || producer.send(ControlEvent::Shutdown))
            .context("installing signal handler")?;
    }

    spawn_stdin_reader(producer.clone());

    // ── 4. Hardware ───────────────────────────────────────────
    // The motion sensor handle must stay alive for the whole loop; dropping
    // it (on any exit path) unregisters the interrupt and releases the pin.
    #[cfg(feature = "rpi")]
    let mut hw = thermoguard::adapters::gpio::RelayPin::open(RELAY_GPIO)?;
    #[cfg(feature = "rpi")]
    let _motion = thermoguard::adapters::gpio::MotionSensor::watch(PIR_GPIO, producer)?;

    #[cfg(not(feature = "rpi"))]
    let mut hw = {
        log::warn!("built without the rpi feature: using simulated relay");
        drop(producer);
        thermoguard::adapters::gpio::SimRelay::new()
    };

    // ── 5. Run ────────────────────────────────────────────────
    let mut uplink = HttpUplink::new(&config);
    let tick = config.reevaluate_interval_secs;
    let mut service = RelayService::new(config, store, occupancy, journal);
    run_loop(&mut service, &mut hw, &mut uplink, &queue, tick);

    info!("shutting down, relay pin released");
    Ok(())
}

/// Consume control events until shutdown. Owns every state mutation.
fn run_loop(
    service: &mut RelayService,
    hw: &mut impl RelayPort,
    uplink: &mut impl UplinkPort,
    queue: &EventQueue,
    tick_secs: u64,
) {
    let mut sink = LogEventSink::new();
    service.start(hw, uplink, &mut sink);

    loop {
        let event = if tick_secs == 0 {
            queue.next_blocking()
        } else {
            queue.next(Duration::from_secs(tick_secs))
        };

        match event {
            ControlEvent::Reading(reading) => {
                service.on_reading(reading, hw, uplink, &mut sink);
            }
            ControlEvent::Motion => service.on_motion(hw, &mut sink),
            ControlEvent::Reevaluate => service.on_tick(hw, uplink, &mut sink),
            ControlEvent::Shutdown => break,
        }
    }
}

/// Assemble stdin lines into reading blocks (terminated by the `battery`
/// line) and feed them to the queue. EOF means the bridge went away, which
/// ends the daemon.
fn spawn_stdin_reader(producer: EventProducer) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut buffer: Vec<String> = Vec::new();

        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            let closes_block = reading::is_block_terminator(&line);
            buffer.push(line);

            if closes_block {
                let record = reading::parse_block(&buffer);
                buffer.clear();
                producer.send(ControlEvent::Reading(record));
            }
        }

        info!("stdin closed, requesting shutdown");
        producer.send(ControlEvent::Shutdown);
    });
}
