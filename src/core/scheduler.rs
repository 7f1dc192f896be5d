// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardwatch

//! Fixed-cadence driver for the engine, plus periodic side tasks

use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::Engine;

type TaskFn = Box<dyn FnMut(&Engine) + Send + 'static>;

struct ScheduledTask {
    name: String,
    interval: Duration,
    last_run: Option<Instant>,
    task: TaskFn,
    enabled: bool,
}

pub struct Scheduler {
    tick_interval: Duration,
    tasks: Vec<ScheduledTask>,
}

impl Scheduler {
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            tasks: Vec::new(),
        }
    }

    /// Run `task` after a tick once `interval` has passed since its last run
    pub fn add_task<F>(&mut self, name: &str, interval: Duration, task: F)
    where
        F: FnMut(&Engine) + Send + 'static,
    {
        self.tasks.push(ScheduledTask {
            name: name.to_string(),
            interval,
            last_run: None,
            task: Box::new(task),
            enabled: true,
        });
        debug!("Scheduled task '{}' with interval {:?}", name, interval);
    }

    pub fn remove_task(&mut self, name: &str) {
        self.tasks.retain(|t| t.name != name);
    }

    pub fn enable_task(&mut self, name: &str, enabled: bool) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.name == name) {
            task.enabled = enabled;
        }
    }

    /// Tick `engine` until `shutdown` fires or its sender is dropped
    pub async fn run(&mut self, engine: &mut Engine, mut shutdown: broadcast::Receiver<()>) {
        info!("Processing loop running every {:?}", self.tick_interval);

        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    engine.tick();
                    self.run_due_tasks(engine, Instant::now());
                }
                _ = shutdown.recv() => {
                    info!("Processing loop shutting down...");
                    break;
                }
            }
        }
    }

    fn run_due_tasks(&mut self, engine: &Engine, now: Instant) {
        for task in self.tasks.iter_mut().filter(|t| t.enabled) {
            let due = task
                .last_run
                .map_or(true, |last| now.saturating_duration_since(last) >= task.interval);
            if due {
                (task.task)(engine);
                task.last_run = Some(now);
            }
        }
    }
}
