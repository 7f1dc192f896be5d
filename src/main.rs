// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardwatch

//! WardWatch - ward telemetry monitor
//!
//! Subscribes to bed vitals over MQTT, scores every report, keeps the live
//! bed registry and raises critical alerts. History goes to SQLite.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wardwatch::alerts;
use wardwatch::core::{Engine, EventBus, Mailbox, Scheduler, SystemClock};
use wardwatch::db::{Database, MemorySink, SinkWriter};
use wardwatch::streaming::MqttListener;
use wardwatch::{Config, VERSION};

/// WardWatch - ward telemetry monitor
#[derive(Parser, Debug)]
#[command(name = "wardwatch")]
#[command(version = VERSION)]
#[command(about = "Early-warning scoring and critical alerting for ward telemetry")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,

    /// MQTT broker address
    #[arg(long)]
    mqtt_broker: Option<String>,

    /// MQTT broker port
    #[arg(long)]
    mqtt_port: Option<u16>,

    /// Topic prefix the beds publish under
    #[arg(long)]
    topic_prefix: Option<String>,

    /// Processing tick interval in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Silence before a bed is shown offline, in milliseconds
    #[arg(long)]
    liveness_ms: Option<u64>,

    /// Silence before a bed is removed, in milliseconds
    #[arg(long)]
    eviction_ms: Option<u64>,

    /// Data output directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Keep history in memory instead of SQLite
    #[arg(long)]
    no_db: bool,

    /// Print every alert board to stdout as a JSON line
    #[arg(long)]
    print_board: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load or create configuration
    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    // Initialize logging
    let log_level = if args.trace {
        "trace"
    } else if args.debug {
        "debug"
    } else {
        config.log_level.as_str()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .init();

    let build = wardwatch::build_info();
    info!("{} v{} ({}/{})", wardwatch::NAME, build.version, build.os, build.target);
    info!("Configuration loaded from {:?}", config_path);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_monitor(config, args.print_board))
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(data_dir) = &args.data_dir {
        config.data_dir = data_dir.clone();
        config.database.path = data_dir.join("wardwatch.db");
    }
    if let Some(broker) = &args.mqtt_broker {
        config.streaming.mqtt_broker = broker.clone();
    }
    if let Some(port) = args.mqtt_port {
        config.streaming.mqtt_port = port;
    }
    if let Some(prefix) = &args.topic_prefix {
        config.streaming.topic_prefix = prefix.clone();
    }
    if let Some(tick) = args.tick_ms {
        config.monitor.tick_interval_ms = tick;
    }
    if let Some(liveness) = args.liveness_ms {
        config.monitor.liveness_timeout_ms = liveness;
    }
    if let Some(eviction) = args.eviction_ms {
        config.monitor.eviction_timeout_ms = eviction;
    }
    if args.no_db {
        config.database.enabled = false;
    }
}

async fn run_monitor(config: Config, print_board: bool) -> Result<()> {
    let (tx, mailbox) = Mailbox::channel();
    let event_bus = Arc::new(EventBus::new(config.monitor.event_capacity));
    let mut engine = Engine::new(config.monitor.clone(), mailbox, Arc::new(SystemClock), event_bus.clone());
    let mut scheduler = Scheduler::new(config.monitor.tick_interval());

    if config.database.enabled {
        let db = Arc::new(Database::open(&config.database)?);
        let writer = SinkWriter::spawn(db.clone(), config.database.queue_capacity)?;
        engine = engine.with_sink(Arc::new(writer));

        let retention_days = config.database.retention_days;
        scheduler.add_task(
            "retention",
            Duration::from_secs(config.database.cleanup_interval_secs),
            move |_| {
                let db = db.clone();
                tokio::task::spawn_blocking(move || {
                    if let Err(e) = db.cleanup(retention_days) {
                        warn!("History cleanup failed: {}", e);
                    }
                });
            },
        );
    } else {
        info!("Database disabled, keeping history in memory");
        engine = engine.with_sink(Arc::new(MemorySink::new(config.database.history_limit)));
    }

    let capacity = config.monitor.ward_capacity;
    scheduler.add_task("status", Duration::from_secs(30), move |engine| {
        let board = alerts::derive(&engine.snapshot(), capacity);
        let stats = engine.stats();
        info!(
            "Ward status: {} beds active, {} critical, {} offline, {} accepted, {} rejected",
            board.occupancy(),
            board.critical_count,
            board.offline_count,
            stats.accepted,
            stats.rejected
        );
    });

    if print_board {
        let mut boards = event_bus.subscribe_boards();
        tokio::spawn(async move {
            loop {
                match boards.recv().await {
                    Ok(board) => {
                        if let Ok(line) = serde_json::to_string(&*board) {
                            let mut stdout = std::io::stdout().lock();
                            let _ = writeln!(stdout, "{}", line);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Board printer fell behind, skipped {} boards", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    let listener = MqttListener::spawn(&config.streaming, tx)?;

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Could not listen for Ctrl+C: {}", e);
            // dropping the sender would stop the loop
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received, cleaning up...");
        let _ = shutdown_tx.send(());
    });

    info!("WardWatch monitoring {}", listener.filter());
    info!("   Press Ctrl+C to shutdown");

    scheduler.run(&mut engine, shutdown_rx).await;

    if let Err(e) = listener.shutdown().await {
        warn!("{}", e);
    }
    drop(engine);

    info!("WardWatch shutdown complete");
    Ok(())
}
