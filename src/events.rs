//! Control-event queue.
//!
//! Two event sources act on shared relay state: the stdin ingestion loop
//! and the PIR motion interrupt. Instead of a lock around the state, both
//! produce into one queue and a single consumer (the main loop, which owns
//! the [`RelayService`](crate::app::service::RelayService) outright) drains
//! it. The signal handler and the periodic re-evaluation tick feed the same
//! queue, so every state mutation is serialized by construction.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ stdin reader │────▶│              │     │              │
//! │ PIR callback │────▶│  mpsc queue  │────▶│  main loop   │
//! │ signal hook  │────▶│              │     │  (consumer)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crate::reading::Reading;

/// Everything the main loop reacts to.
#[derive(Debug, Clone)]
pub enum ControlEvent {
    /// A complete reading block arrived on stdin.
    Reading(Reading),
    /// Debounced rising edge on the motion input.
    Motion,
    /// Periodic staleness re-check (also retries stalled deliveries).
    Reevaluate,
    /// Signal or end of input: leave the loop, release hardware.
    Shutdown,
}

/// Cloneable producer handle, safe to use from any thread or callback.
#[derive(Clone)]
pub struct EventProducer {
    tx: Sender<ControlEvent>,
}

impl EventProducer {
    /// Send an event. A send after the consumer is gone is silently
    /// dropped — the loop is already shutting down.
    pub fn send(&self, event: ControlEvent) {
        let _ = self.tx.send(event);
    }
}

/// Single-consumer end, owned by the main loop.
pub struct EventQueue {
    rx: Receiver<ControlEvent>,
}

impl EventQueue {
    /// Wait for the next event, at most `tick`. A timeout surfaces as
    /// [`ControlEvent::Reevaluate`]; a disconnected queue as `Shutdown`.
    pub fn next(&self, tick: Duration) -> ControlEvent {
        match self.rx.recv_timeout(tick) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => ControlEvent::Reevaluate,
            Err(RecvTimeoutError::Disconnected) => ControlEvent::Shutdown,
        }
    }

    /// Wait indefinitely (used when the periodic tick is disabled).
    pub fn next_blocking(&self) -> ControlEvent {
        self.rx.recv().unwrap_or(ControlEvent::Shutdown)
    }
}

/// Create the queue and a first producer handle.
pub fn channel() -> (EventProducer, EventQueue) {
    let (tx, rx) = mpsc::channel();
    (EventProducer { tx }, EventQueue { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_arrive_in_order() {
        let (producer, queue) = channel();
        producer.send(ControlEvent::Motion);
        producer.send(ControlEvent::Shutdown);

        assert!(matches!(
            queue.next(Duration::from_millis(10)),
            ControlEvent::Motion
        ));
        assert!(matches!(
            queue.next(Duration::from_millis(10)),
            ControlEvent::Shutdown
        ));
    }

    #[test]
    fn timeout_becomes_reevaluate_tick() {
        let (_producer, queue) = channel();
        assert!(matches!(
            queue.next(Duration::from_millis(5)),
            ControlEvent::Reevaluate
        ));
    }

    #[test]
    fn dropped_producers_become_shutdown() {
        let (producer, queue) = channel();
        drop(producer);
        assert!(matches!(queue.next_blocking(), ControlEvent::Shutdown));
    }

    #[test]
    fn producers_clone_across_threads() {
        let (producer, queue) = channel();
        let p2 = producer.clone();
        std::thread::spawn(move || p2.send(ControlEvent::Motion))
            .join()
            .unwrap();
        assert!(matches!(
            queue.next(Duration::from_secs(1)),
            ControlEvent::Motion
        ));
    }
}
