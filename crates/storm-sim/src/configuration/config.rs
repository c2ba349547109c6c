//! This module contains all configuration related structures.

use crate::api::events::EventSink;
use crate::engine::Simulator;
use crate::metrics::Report;
use crate::schedule::PolicyKind;
use crate::task::TaskTemplate;
use crate::Tick;

/// The number of ticks simulated if nothing else is configured.
pub const DEFAULT_DURATION: Tick = 200;

/**
`Config` combines a set of periodic task templates with the scheduling policy and the length of the simulation.

The `Config` can either be turned into a [Simulator] to step through the simulation manually or simply executed.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// The blueprints from which task instances are released, in release order
    pub templates: Vec<TaskTemplate>,
    /// The policy ordering the ready tasks
    pub policy: PolicyKind,
    /// The number of ticks to simulate
    pub duration: Tick,
}

impl Config {
    /// Creates a new config.
    pub fn new(templates: Vec<TaskTemplate>, policy: PolicyKind, duration: Tick) -> Self {
        Config {
            templates,
            policy,
            duration,
        }
    }

    /// Turns the configuration into a [Simulator].
    pub fn simulator(self) -> Simulator {
        Simulator::new(self)
    }

    /// Runs the complete simulation, reporting every event to `sink`.
    pub fn run<S: EventSink>(self, sink: S) -> Report {
        Simulator::new(self).run(sink)
    }
}
