//! `speedcam-console` -- operator console for the speed camera monitor.
//!
//! Reads one command per line from stdin (`help` lists them), drives the
//! shared monitor and prints alert lines as they are recorded. Logs go to
//! stderr so stdout stays the operator view.
//!
//! # Environment variables
//!
//! | Variable                | Required | Default | Description                              |
//! |-------------------------|----------|---------|------------------------------------------|
//! | `SPEED_LIMIT_MPH`       | no       | `30`    | Initial speed limit field                |
//! | `ALERT_THRESHOLD_MPH`   | no       | `5`     | Initial alert threshold field            |
//! | `WARNING_MARGIN_MPH`    | no       | `5`     | Margin above the limit for warnings      |
//! | `CRITICAL_MARGIN_MPH`   | no       | `10`    | Margin above the limit for critical alerts |
//! | `SIMULATION_SPREAD_MPH` | no       | `20`    | Simulated speeds span `[limit, limit + spread)` |
//! | `SIMULATION_SEED`       | no       | --      | Fixed seed for reproducible simulations  |

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use speedcam_console::command::Command;
use speedcam_console::config::ConsoleConfig;
use speedcam_console::session::{format_record, Reply, Session};
use speedcam_core::estimation::{EstimatorSettings, MotionSpeedEstimator};
use speedcam_core::source::{RandomSpeedSource, SpeedSource};
use speedcam_core::{AlertLog, SeverityBands, SpeedMonitor};
use speedcam_events::{AlertRecorder, EventBus, MonitorEvent, MonitorHub, SharedAlertLog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "speedcam_console=info,speedcam_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // --- Configuration ---
    let config = ConsoleConfig::from_env().context("Failed to load console configuration")?;
    let bands = config.severity_bands()?;
    tracing::info!(
        speed_limit = config.speed_limit_mph,
        threshold = config.alert_threshold_mph,
        simulation_spread = config.simulation_spread_mph,
        "Loaded console configuration",
    );

    // --- Event bus + alert log ---
    let bus = Arc::new(EventBus::default());
    let log: SharedAlertLog = Arc::new(Mutex::new(AlertLog::new()));
    let recorder = tokio::spawn(AlertRecorder::run(bus.subscribe(), Arc::clone(&log), bands));
    let tail = tokio::spawn(print_alerts(bus.subscribe(), bands));

    // --- Monitor ---
    let hub = Arc::new(MonitorHub::new(
        SpeedMonitor::with_configuration(config.initial_configuration()),
        Arc::clone(&bus),
    ));
    // The hub holds the only remaining bus handle, so dropping the session
    // closes the channel and lets the background tasks finish.
    drop(bus);

    let source: Box<dyn SpeedSource> = match config.simulation_seed {
        Some(seed) => Box::new(RandomSpeedSource::seeded(config.simulation_spread_mph, seed)),
        None => Box::new(RandomSpeedSource::new(config.simulation_spread_mph)),
    };
    let estimator = MotionSpeedEstimator::new(EstimatorSettings::default())?;

    let mut session = Session::new(
        hub,
        log,
        source,
        estimator,
        config.initial_configuration(),
    );

    println!("Speed Camera Control System -- type `help` for commands");
    if let Reply::Lines(lines) = session.execute(Command::Status).await {
        lines.iter().for_each(|l| println!("{l}"));
    }

    // --- Command loop ---
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = input.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match session.execute(command).await {
            Reply::Lines(lines) => lines.iter().for_each(|l| println!("{l}")),
            Reply::Quit => break,
        }
    }

    drop(session);
    recorder.await?;
    tail.await?;

    tracing::info!("Console closed");
    Ok(())
}

/// Print each alert line as the monitor produces it.
async fn print_alerts(mut receiver: broadcast::Receiver<MonitorEvent>, bands: SeverityBands) {
    loop {
        match receiver.recv().await {
            Ok(event) => println!("{}", format_record(&AlertRecorder::render(&event, &bands))),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "Alert display lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
