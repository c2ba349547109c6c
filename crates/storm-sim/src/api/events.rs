//! Records describing what happened in a single tick and the sinks consuming them.

use std::fmt::{Display, Formatter};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::task::{Criticality, Task, TaskId};
use crate::Tick;

/// Identifies the task an event refers to.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInfo {
    #[allow(missing_docs)]
    pub id: TaskId,
    #[allow(missing_docs)]
    pub name: String,
    #[allow(missing_docs)]
    pub level: Criticality,
}

impl From<&Task> for TaskInfo {
    fn from(task: &Task) -> Self {
        TaskInfo {
            id: task.id(),
            name: task.name().to_string(),
            level: task.level(),
        }
    }
}

impl Display for TaskInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (ID: {})", self.name, self.id)
    }
}

/// A single entry of the chronological event log.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "event", rename_all = "kebab-case"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    /// A new instance was released.
    Generated {
        #[allow(missing_docs)]
        tick: Tick,
        #[allow(missing_docs)]
        task: TaskInfo,
        /// The absolute deadline of the instance
        deadline: Tick,
    },
    /// An instance finished all of its work.
    Completed {
        #[allow(missing_docs)]
        tick: Tick,
        #[allow(missing_docs)]
        task: TaskInfo,
    },
    /// An unfinished instance reached its deadline and was evicted.
    Missed {
        #[allow(missing_docs)]
        tick: Tick,
        #[allow(missing_docs)]
        task: TaskInfo,
        #[allow(missing_docs)]
        deadline: Tick,
    },
    /// An unfinished instance lost the execution unit to another task.
    Preempted {
        #[allow(missing_docs)]
        tick: Tick,
        #[allow(missing_docs)]
        task: TaskInfo,
        #[allow(missing_docs)]
        remaining: Tick,
    },
    /// An instance that already missed its deadline was dropped from the ready queue.
    Discarded {
        #[allow(missing_docs)]
        tick: Tick,
        #[allow(missing_docs)]
        task: TaskInfo,
    },
    /// The execution unit ran an instance for one tick.
    Running {
        #[allow(missing_docs)]
        tick: Tick,
        #[allow(missing_docs)]
        task: TaskInfo,
        /// The remaining work after this tick
        remaining: Tick,
        /// Whether the unit ran a different task in the previous tick
        dispatched: bool,
    },
    /// The execution unit had nothing to do.
    Idle {
        #[allow(missing_docs)]
        tick: Tick,
    },
}

impl SimEvent {
    /// The tick in which the event happened.
    pub fn tick(&self) -> Tick {
        match self {
            SimEvent::Generated { tick, .. }
            | SimEvent::Completed { tick, .. }
            | SimEvent::Missed { tick, .. }
            | SimEvent::Preempted { tick, .. }
            | SimEvent::Discarded { tick, .. }
            | SimEvent::Running { tick, .. }
            | SimEvent::Idle { tick } => *tick,
        }
    }

    #[allow(missing_docs)]
    pub fn kind(&self) -> EventKind {
        match self {
            SimEvent::Generated { .. } => EventKind::Generated,
            SimEvent::Completed { .. } => EventKind::Completed,
            SimEvent::Missed { .. } => EventKind::Missed,
            SimEvent::Preempted { .. } => EventKind::Preempted,
            SimEvent::Discarded { .. } => EventKind::Discarded,
            SimEvent::Running { .. } => EventKind::Running,
            SimEvent::Idle { .. } => EventKind::Idle,
        }
    }

    /// The task the event refers to, `None` for idle ticks.
    pub fn task(&self) -> Option<&TaskInfo> {
        match self {
            SimEvent::Generated { task, .. }
            | SimEvent::Completed { task, .. }
            | SimEvent::Missed { task, .. }
            | SimEvent::Preempted { task, .. }
            | SimEvent::Discarded { task, .. }
            | SimEvent::Running { task, .. } => Some(task),
            SimEvent::Idle { .. } => None,
        }
    }
}

/// The kind of a [SimEvent] without its payload.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    #[allow(missing_docs)]
    Generated,
    #[allow(missing_docs)]
    Completed,
    #[allow(missing_docs)]
    Missed,
    #[allow(missing_docs)]
    Preempted,
    #[allow(missing_docs)]
    Discarded,
    #[allow(missing_docs)]
    Running,
    #[allow(missing_docs)]
    Idle,
}

impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Generated => write!(f, "Generated"),
            EventKind::Completed => write!(f, "Completed"),
            EventKind::Missed => write!(f, "Missed"),
            EventKind::Preempted => write!(f, "Preempted"),
            EventKind::Discarded => write!(f, "Discarded"),
            EventKind::Running => write!(f, "Running"),
            EventKind::Idle => write!(f, "Idle"),
        }
    }
}

/**
Consumes the events of a simulation run.

The engine asks [accepts](EventSink::accepts) before building an event, so a sink that is not interested in a kind of
event never pays for its construction.
 */
pub trait EventSink {
    /// Whether events of the given kind should be recorded at all.
    fn accepts(&self, _kind: EventKind) -> bool {
        true
    }

    /// Records a single event. Events arrive in chronological order.
    fn record(&mut self, event: SimEvent);
}

/// This sink discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSink {}

impl EventSink for NoSink {
    fn accepts(&self, _kind: EventKind) -> bool {
        false
    }

    fn record(&mut self, _event: SimEvent) {}
}

impl EventSink for Vec<SimEvent> {
    fn record(&mut self, event: SimEvent) {
        self.push(event)
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn accepts(&self, kind: EventKind) -> bool {
        (**self).accepts(kind)
    }

    fn record(&mut self, event: SimEvent) {
        (**self).record(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> TaskInfo {
        TaskInfo {
            id: TaskId::FIRST,
            name: "BrakeControl".into(),
            level: Criticality::Critical,
        }
    }

    #[test]
    fn accessors() {
        let ev = SimEvent::Missed {
            tick: 20,
            task: info(),
            deadline: 20,
        };
        assert_eq!(ev.tick(), 20);
        assert_eq!(ev.kind(), EventKind::Missed);
        assert_eq!(ev.task().map(|t| t.to_string()), Some("BrakeControl (ID: 1)".to_string()));
        assert_eq!(SimEvent::Idle { tick: 3 }.task(), None);
    }

    fn feed<S: EventSink>(mut sink: S) -> bool {
        let accepted = sink.accepts(EventKind::Running);
        sink.record(SimEvent::Idle { tick: 0 });
        accepted
    }

    #[test]
    fn sinks() {
        let mut log: Vec<SimEvent> = Vec::new();
        assert!(feed(&mut log));
        assert_eq!(log, vec![SimEvent::Idle { tick: 0 }]);
        assert!(!feed(NoSink {}));
    }
}
