// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardwatch

//! Ingestion mailbox - hand-off from listener threads to the engine
//!
//! Listeners hold a [`MailboxSender`] and only push raw payload strings.
//! The engine owns the single [`Mailbox`] and drains it once per tick.

use crossbeam::channel::{self, Receiver, Sender, TryRecvError};

/// Producer half. Cheap to clone, one per listener.
#[derive(Debug, Clone)]
pub struct MailboxSender {
    tx: Sender<String>,
}

impl MailboxSender {
    /// Enqueue one raw payload. Returns `false` only if the engine is gone.
    pub fn post(&self, payload: impl Into<String>) -> bool {
        self.tx.send(payload.into()).is_ok()
    }
}

/// Consumer half, owned by the engine
#[derive(Debug)]
pub struct Mailbox {
    rx: Receiver<String>,
}

impl Mailbox {
    /// Create an unbounded FIFO mailbox
    pub fn channel() -> (MailboxSender, Mailbox) {
        let (tx, rx) = channel::unbounded();
        (MailboxSender { tx }, Mailbox { rx })
    }

    /// Take up to `max` queued payloads in arrival order without blocking.
    ///
    /// Anything beyond `max` stays queued for the next call.
    pub fn drain(&self, max: usize) -> Vec<String> {
        let mut batch = Vec::with_capacity(max.min(self.rx.len()));
        while batch.len() < max {
            match self.rx.try_recv() {
                Ok(payload) => batch.push(payload),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        batch
    }

    /// Payloads waiting to be drained
    pub fn backlog(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_drain_preserves_order() {
        let (tx, mailbox) = Mailbox::channel();
        for i in 0..5 {
            assert!(tx.post(format!("msg-{}", i)));
        }

        let batch = mailbox.drain(usize::MAX);
        assert_eq!(batch, vec!["msg-0", "msg-1", "msg-2", "msg-3", "msg-4"]);
        assert!(mailbox.is_empty());
        assert!(mailbox.drain(10).is_empty());
    }

    #[test]
    fn test_drain_cap_leaves_backlog() {
        let (tx, mailbox) = Mailbox::channel();
        for i in 0..10 {
            tx.post(i.to_string());
        }

        assert_eq!(mailbox.drain(4), vec!["0", "1", "2", "3"]);
        assert_eq!(mailbox.backlog(), 6);
        assert_eq!(mailbox.drain(100).len(), 6);
    }

    #[test]
    fn test_many_listeners_lose_nothing() {
        let (tx, mailbox) = Mailbox::channel();

        let handles: Vec<_> = (0..4)
            .map(|listener| {
                let tx = tx.clone();
                thread::spawn(move || {
                    for i in 0..250 {
                        tx.post(format!("{}:{}", listener, i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let batch = mailbox.drain(usize::MAX);
        assert_eq!(batch.len(), 1000);

        // per-listener order is preserved
        for listener in 0..4 {
            let prefix = format!("{}:", listener);
            let seq: Vec<usize> = batch
                .iter()
                .filter_map(|m| m.strip_prefix(&prefix))
                .map(|n| n.parse().unwrap())
                .collect();
            assert_eq!(seq, (0..250).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_post_after_consumer_dropped() {
        let (tx, mailbox) = Mailbox::channel();
        drop(mailbox);
        assert!(!tx.post("late"));
    }
}
