// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardwatch

//! WardWatch - ward telemetry monitoring core
//!
//! Ingests periodic vital-sign reports from many beds, scores each against a
//! NEWS-style early-warning rubric, tracks bed liveness and derives a ranked
//! critical-alert list.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          WardWatch                               │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌─────────┐   ┌───────────────────────────────┐  │
//! │  │   MQTT   │ → │ Mailbox │ → │            Engine             │  │
//! │  │ Listener │   │ (queue) │   │ normalize → score → classify  │  │
//! │  └──────────┘   └─────────┘   │ → registry upsert → sweep     │  │
//! │                               │ → alert board                 │  │
//! │                               └───────────────────────────────┘  │
//! │                                   ↓                 ↓            │
//! │                          ┌──────────────┐   ┌──────────────┐     │
//! │                          │  Event Bus   │   │ Sink Writer  │     │
//! │                          │ (renderers)  │   │  (history)   │     │
//! │                          └──────────────┘   └──────────────┘     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Listener tasks only ever post raw payloads. The engine is the sole owner of
//! the bed registry and runs on a fixed cadence driven by the scheduler.

pub mod alerts;
pub mod config;
pub mod core;
pub mod db;
pub mod registry;
pub mod scoring;
pub mod streaming;
pub mod vitals;

// Re-exports for convenience
pub use alerts::AlertBoard;
pub use config::Config;
pub use self::core::{Engine, EventBus, Mailbox, MailboxSender, Scheduler};
pub use db::{Database, ReadingSink, SinkWriter};
pub use registry::{BedRegistry, ScoredState};
pub use scoring::{RiskBand, ScoreBreakdown};
pub use vitals::{BedStatus, Reading};

/// WardWatch version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WardWatch name
pub const NAME: &str = "WardWatch";

/// Build info
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: VERSION.to_string(),
        target: std::env::consts::ARCH.to_string(),
        os: std::env::consts::OS.to_string(),
    }
}

/// Build information
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Version string
    pub version: String,
    /// Target architecture
    pub target: String,
    /// Operating system
    pub os: String,
}
