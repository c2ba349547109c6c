//! The [ChannelSink] hands the events of a run to a consumer on another thread.
//! The simulation itself stays single threaded; only the consumption of its output is moved elsewhere, e.g. to a thread
//! formatting and writing the event log while the engine keeps ticking.
//!
//! The receiving side observes the end of the run as a disconnected channel once the sink is dropped.

use std::collections::HashSet;

use crossbeam_channel::{bounded, unbounded, Sender};
pub use crossbeam_channel::{Receiver, RecvError, RecvTimeoutError, TryRecvError};

use crate::api::events::{EventKind, EventSink, SimEvent};

/// Represents the length of a queue used for communication.
/// Bounding its length can be useful in resource constraint environments.
#[derive(Debug, Clone, Copy, Default)]
pub enum QueueLength {
    /// There is no bound on the queue.
    #[default]
    Unbounded,
    /// The queue is bounded to keep at most this many elements.
    /// The simulation blocks while the queue is full.
    Bounded(usize),
}

impl QueueLength {
    fn to_queue<T>(self) -> (Sender<T>, Receiver<T>) {
        match self {
            QueueLength::Unbounded => unbounded(),
            QueueLength::Bounded(cap) => bounded(cap),
        }
    }
}

/// An [EventSink] forwarding events into a queue.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<SimEvent>,
    filter: Option<HashSet<EventKind>>,
}

impl ChannelSink {
    /// Creates a new sink together with the receiving end of its queue.
    pub fn new(length: QueueLength) -> (Self, Receiver<SimEvent>) {
        let (sender, receiver) = length.to_queue();
        (ChannelSink { sender, filter: None }, receiver)
    }

    /// Only forward events of the given kinds.
    pub fn only(mut self, kinds: impl IntoIterator<Item = EventKind>) -> Self {
        self.filter = Some(kinds.into_iter().collect());
        self
    }
}

impl EventSink for ChannelSink {
    fn accepts(&self, kind: EventKind) -> bool {
        self.filter.as_ref().map_or(true, |kinds| kinds.contains(&kind))
    }

    fn record(&mut self, event: SimEvent) {
        // A hung up receiver has stopped observing the run.
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn events_arrive_in_order() {
        let (mut sink, receiver) = ChannelSink::new(QueueLength::Bounded(1));
        let consumer = thread::spawn(move || receiver.iter().map(|ev| ev.tick()).collect::<Vec<_>>());
        for tick in 0..5 {
            sink.record(SimEvent::Idle { tick });
        }
        drop(sink);
        assert_eq!(consumer.join().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn filter_restricts_kinds() {
        let (sink, _receiver) = ChannelSink::new(QueueLength::Unbounded);
        let sink = sink.only([EventKind::Missed, EventKind::Completed]);
        assert!(sink.accepts(EventKind::Missed));
        assert!(!sink.accepts(EventKind::Running));
    }

    #[test]
    fn disconnected_receiver_is_tolerated() {
        let (mut sink, receiver) = ChannelSink::new(QueueLength::Unbounded);
        drop(receiver);
        sink.record(SimEvent::Idle { tick: 0 });
    }
}
