// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardwatch

//! Event bus toward renderers and other observers

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::alerts::AlertBoard;

/// Event types in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventType {
    BedAdmitted,
    BedOffline,
    BedEvicted,
    CriticalRaised,
    CriticalCleared,
    PayloadRejected,
    SinkFailure,
}

/// Bed lifecycle and alerting events
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EventPayload {
    Bed { bed_id: String },
    Critical { bed_id: String, score: u32, label: String },
    Rejected { reason: String },
    Sink { message: String },
}

/// Generic event wrapper
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: u64,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

/// Fan-out of boards and events. Publishing never blocks; slow subscribers lag.
pub struct EventBus {
    board_tx: broadcast::Sender<Arc<AlertBoard>>,
    event_tx: broadcast::Sender<Event>,
    event_counter: AtomicU64,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (board_tx, _) = broadcast::channel(capacity.max(1));
        let (event_tx, _) = broadcast::channel(capacity.max(1));

        Self {
            board_tx,
            event_tx,
            event_counter: AtomicU64::new(0),
        }
    }

    pub fn publish_board(&self, board: AlertBoard) {
        let _ = self.board_tx.send(Arc::new(board));
    }

    pub fn publish_bed(&self, event_type: EventType, bed_id: &str) {
        self.publish_event(
            event_type,
            EventPayload::Bed {
                bed_id: bed_id.to_string(),
            },
        );
    }

    pub fn publish_critical(&self, bed_id: &str, score: u32, label: &str) {
        self.publish_event(
            EventType::CriticalRaised,
            EventPayload::Critical {
                bed_id: bed_id.to_string(),
                score,
                label: label.to_string(),
            },
        );
    }

    pub fn publish_rejection(&self, reason: &str) {
        self.publish_event(
            EventType::PayloadRejected,
            EventPayload::Rejected {
                reason: reason.to_string(),
            },
        );
    }

    pub fn publish_sink_failure(&self, message: &str) {
        self.publish_event(
            EventType::SinkFailure,
            EventPayload::Sink {
                message: message.to_string(),
            },
        );
    }

    fn publish_event(&self, event_type: EventType, payload: EventPayload) {
        let id = self.event_counter.fetch_add(1, Ordering::Relaxed);
        let event = Event {
            id,
            event_type,
            timestamp: Utc::now(),
            payload,
        };
        let _ = self.event_tx.send(event);
    }

    pub fn subscribe_boards(&self) -> broadcast::Receiver<Arc<AlertBoard>> {
        self.board_tx.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Events published so far
    pub fn event_count(&self) -> u64 {
        self.event_counter.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
