//! hydra-bridge operator console entry point.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ Cli::parse()             -- config path and serial overrides
//!  └─ load_from()              -- TOML settings and peer nicknames
//!  └─ open_port()              -- configured path or USB auto-detect
//!  └─ DongleLink               -- serialised request/response access
//!  └─ background tasks
//!       ├─ input pump          -- InputSource events → ForwardInputUseCase
//!       └─ motion tick         -- flushes rate-limited mouse motion
//!  └─ console loop             -- one ConsoleCommand per stdin line
//! ```
//!
//! The binary wires the in-process `MockInputSource` and `MockCursor`: it
//! has no OS keyboard or mouse hooks, so nothing reaches the input pump and
//! `capture` only forwards events delivered by an `InputSource` backend.
//! Typing, peer management and the dongle commands work over the link alone.
//!
//! Console errors are printed and the loop carries on; only `quit`, end of
//! input, or Ctrl-C end the program.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use hydra_bridge::application::coalesce::MouseCoalescer;
use hydra_bridge::application::forward_input::ForwardInputUseCase;
use hydra_bridge::infrastructure::console::{ConsoleCommand, ConsoleSession, Reply};
use hydra_bridge::infrastructure::input_capture::mock::{MockCursor, MockInputSource};
use hydra_bridge::infrastructure::input_capture::InputSource;
use hydra_bridge::infrastructure::serial::port::open_port;
use hydra_bridge::infrastructure::serial::DongleLink;
use hydra_bridge::infrastructure::storage::config::{config_file_path, load_from, AppConfig};

/// Command-line arguments.  Serial options override the config file.
#[derive(Debug, Parser)]
#[command(
    name = "hydra-bridge",
    about = "Forwards keyboard and mouse input to a Hydra dongle and manages its centrals",
    version
)]
struct Cli {
    /// Config file path.  Defaults to the platform config directory.
    #[arg(long, env = "HYDRA_CONFIG")]
    config: Option<PathBuf>,

    /// Serial device of the dongle, e.g. `/dev/ttyACM0` or `COM7`.
    #[arg(long, env = "HYDRA_DEVICE")]
    device: Option<String>,

    /// Serial baud rate.
    #[arg(long)]
    baud: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().or_else(|| config_file_path().ok());

    // Logging needs the configured level, so the config is read first and any
    // problem with it is reported once the subscriber is up.
    let (mut config, config_problem) = match config_path.as_deref().map(load_from) {
        Some(Ok(cfg)) => (cfg, None),
        Some(Err(e)) => (AppConfig::default(), Some(e.to_string())),
        None => (
            AppConfig::default(),
            Some("no platform config directory".to_string()),
        ),
    };
    if let Some(device) = cli.device {
        config.serial.device = Some(device);
    }
    if let Some(baud) = cli.baud {
        config.serial.baud_rate = baud;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.bridge.log_level)),
        )
        .init();

    if let Some(e) = config_problem {
        warn!(error = %e, "config not loaded, using defaults");
    }
    info!("hydra bridge starting");

    // ── Dongle link ──────────────────────────────────────────────────────────
    let stream = open_port(&config.serial).context("could not open the dongle's serial port")?;
    let link = Arc::new(DongleLink::new(stream, config.serial.link_timings()));

    // ── Input forwarding ─────────────────────────────────────────────────────
    let forward = Arc::new(Mutex::new(ForwardInputUseCase::new(
        link.clone(),
        Arc::new(MockCursor::at(0, 0)),
        config.bridge.forward_settings(),
    )));

    let source = Arc::new(MockInputSource::new());
    let mut events = source.start()?;
    let pump_forward = Arc::clone(&forward);
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let Err(e) = pump_forward.lock().await.handle_event(event).await {
                warn!(error = %e, "input event not forwarded");
            }
        }
    });

    let tick_forward = Arc::clone(&forward);
    // `interval` panics on a zero period, which an unlimited rate would give.
    let tick_period = MouseCoalescer::new(config.bridge.mouse_rate_hz)
        .interval()
        .max(Duration::from_millis(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(tick_period);
        loop {
            ticker.tick().await;
            if let Err(e) = tick_forward.lock().await.tick(Instant::now()).await {
                warn!(error = %e, "pending mouse motion not sent");
            }
        }
    });

    // ── Console loop ─────────────────────────────────────────────────────────
    let mut session = ConsoleSession::new(link, Arc::clone(&forward), config, config_path);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("hydra bridge ready; type `help` for commands");

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "could not read console input");
                break;
            }
        };

        let command = match ConsoleCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        match session.execute(command).await {
            Ok(Reply::Text(text)) => print!("{text}"),
            Ok(Reply::Quit) => break,
            Err(e) => println!("error: {e}"),
        }
    }

    // Leave nothing pressed on the central.
    source.stop();
    if let Err(e) = forward.lock().await.leave().await {
        warn!(error = %e, "final flush failed");
    }
    info!("hydra bridge stopped");
    Ok(())
}
