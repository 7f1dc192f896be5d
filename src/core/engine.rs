// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardwatch

//! Processing engine - the single owner of bed state
//!
//! One `tick` drains the mailbox, normalizes and scores each payload, upserts
//! the registry, hands records to the sink, ages out silent beds and derives
//! the alert board. Nothing in a tick is fatal.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use super::{Clock, EventBus, EventType, Mailbox};
use crate::alerts::{self, AlertBoard};
use crate::config::MonitorConfig;
use crate::db::ReadingSink;
use crate::registry::{BedRegistry, RegistrySnapshot};
use crate::vitals;

/// Cumulative counters since the engine started
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub ticks: u64,
    pub received: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub sink_failures: u64,
    pub evicted: u64,
}

/// Outcome of one tick
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub drained: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub admitted: Vec<String>,
    pub went_offline: Vec<String>,
    pub evicted: Vec<String>,
    /// Payloads left in the mailbox for the next tick
    pub backlog: usize,
    pub board: AlertBoard,
}

/// Main ward engine
pub struct Engine {
    config: MonitorConfig,
    mailbox: Mailbox,
    registry: BedRegistry,
    clock: Arc<dyn Clock>,
    event_bus: Arc<EventBus>,
    sink: Option<Arc<dyn ReadingSink>>,
    critical: BTreeSet<String>,
    stats: EngineStats,
}

impl Engine {
    pub fn new(
        config: MonitorConfig,
        mailbox: Mailbox,
        clock: Arc<dyn Clock>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            config,
            mailbox,
            registry: BedRegistry::new(),
            clock,
            event_bus,
            sink: None,
            critical: BTreeSet::new(),
            stats: EngineStats::default(),
        }
    }

    /// Send every scored reading to `sink`
    pub fn with_sink(mut self, sink: Arc<dyn ReadingSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn registry(&self) -> &BedRegistry {
        &self.registry
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        self.registry.snapshot()
    }

    /// Run one processing cycle at the clock's current time
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now();
        let wall = self.clock.wall();
        let mut report = TickReport::default();

        let batch = self.mailbox.drain(self.config.max_drain_per_tick);
        report.drained = batch.len();
        self.stats.received += batch.len() as u64;

        for raw in &batch {
            self.ingest(raw, now, wall, &mut report);
        }

        report.went_offline = self.registry.mark_offline(now, self.config.liveness_timeout());
        for bed_id in &report.went_offline {
            info!("{} went quiet, marked offline", bed_id);
            self.event_bus.publish_bed(EventType::BedOffline, bed_id);
        }

        let evicted = self.registry.sweep(now, self.config.eviction_timeout());
        for state in &evicted {
            if state.is_critical {
                warn!("Critical bed {} evicted after {:?} of silence", state.bed_id, state.age(now));
            } else {
                info!("Evicted {} after {:?} of silence", state.bed_id, state.age(now));
            }
            self.event_bus.publish_bed(EventType::BedEvicted, &state.bed_id);
        }
        self.stats.evicted += evicted.len() as u64;
        report.evicted = evicted.into_iter().map(|s| s.bed_id).collect();

        let board = alerts::derive(&self.registry.snapshot(), self.config.ward_capacity);
        self.publish_transitions(&board);

        report.backlog = self.mailbox.backlog();
        if report.backlog > 0 {
            debug!("{} payloads deferred to the next tick", report.backlog);
        }

        self.stats.ticks += 1;
        trace!(
            "Tick {}: drained {}, accepted {}, rejected {}, {} beds, {} critical",
            self.stats.ticks,
            report.drained,
            report.accepted,
            report.rejected,
            board.active_count(),
            board.critical_count
        );

        self.event_bus.publish_board(board.clone());
        report.board = board;
        report
    }

    fn ingest(&mut self, raw: &str, now: Instant, wall: DateTime<Utc>, report: &mut TickReport) {
        let reading = match vitals::normalize(raw, wall) {
            Ok(reading) => reading,
            Err(e) => {
                report.rejected += 1;
                self.stats.rejected += 1;
                debug!("Dropped payload: {}", e);
                self.event_bus.publish_rejection(&e.to_string());
                return;
            }
        };

        let bed_id = reading.bed_id.clone();
        if self.registry.upsert(&bed_id, reading, now).is_none() {
            info!("Admitted {}", bed_id);
            self.event_bus.publish_bed(EventType::BedAdmitted, &bed_id);
            report.admitted.push(bed_id.clone());
        }
        report.accepted += 1;
        self.stats.accepted += 1;

        if let (Some(sink), Some(state)) = (&self.sink, self.registry.get(&bed_id)) {
            if let Err(e) = sink.record_reading(&bed_id, &state.reading, state.score(), state.band()) {
                self.stats.sink_failures += 1;
                warn!("History sink rejected reading for {}: {}", bed_id, e);
                self.event_bus.publish_sink_failure(&e.to_string());
            }
        }
    }

    /// Raise and clear critical alerts against the previous tick
    fn publish_transitions(&mut self, board: &AlertBoard) {
        let current: BTreeSet<String> = board.critical().iter().map(|s| s.bed_id.clone()).collect();

        for state in board.critical() {
            if !self.critical.contains(&state.bed_id) {
                warn!("CRITICAL {}: {}", state.bed_id, state.assessment.label);
                self.event_bus
                    .publish_critical(&state.bed_id, state.score(), &state.assessment.label);
            }
        }

        // an evicted bed went silent, it did not recover
        for bed_id in self
            .critical
            .difference(&current)
            .filter(|id| self.registry.contains(id))
        {
            info!("{} no longer critical", bed_id);
            self.event_bus.publish_bed(EventType::CriticalCleared, bed_id);
        }

        self.critical = current;
    }
}
