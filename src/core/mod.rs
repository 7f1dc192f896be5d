//! Core module - mailbox, processing engine and its scheduler

mod clock;
mod engine;
mod event_bus;
mod mailbox;
mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{Engine, EngineStats, TickReport};
pub use event_bus::{Event, EventBus, EventPayload, EventType};
pub use mailbox::{Mailbox, MailboxSender};
pub use scheduler::Scheduler;
