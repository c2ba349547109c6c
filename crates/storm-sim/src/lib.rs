//! # The Storm Scheduling Simulator
//! A discrete, tick-driven simulator comparing real-time scheduling policies under overload.
//! Periodic tasks of different criticality compete for a single execution unit while the simulator records per level
//! how many instances were released, completed and how many missed their deadline.
//!
//! Two policies are available:
//! * [DeadlineOrdered]: classic earliest deadline first.
//! * [CriticalityOrdered]: the most severe criticality always wins, deadlines only order tasks within a level.
//!
//! ## Usage
//! The main entrypoint is the [ConfigBuilder]. It collects the task templates, the policy and the number of ticks.
//! From there you can either run the simulation directly or create a [Simulator] and step through it tick by tick.
//! Everything that happens during a run is reported as a [SimEvent](api::events::SimEvent) to an
//! [EventSink](api::events::EventSink); the final counters are returned as a [Report].

#![forbid(unused_must_use)] // disallow discarding errors
#![warn(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]
pub mod api;
mod configuration;
mod engine;
mod metrics;
mod schedule;
mod task;
mod unit;

// Public exports
pub use crate::api::events::{EventKind, EventSink, NoSink, SimEvent, TaskInfo};
#[cfg(feature = "queued-api")]
pub use crate::api::queued::{ChannelSink, QueueLength};
pub use crate::configuration::config;
pub use crate::configuration::config::{Config, DEFAULT_DURATION};
pub use crate::configuration::config_builder::{
    ConfigBuilder, ConfigState, ConfigureTasks, PolicyConfigured, TasksConfigured,
};
pub use crate::engine::{Simulator, TaskArena};
pub use crate::metrics::{LevelCounters, Metrics, Report};
pub use crate::schedule::{CriticalityOrdered, DeadlineOrdered, ParsePolicyError, PolicyKind, SchedulingPolicy};
pub use crate::task::{Criticality, ParseCriticalityError, Task, TaskId, TaskTemplate, TemplateError};
pub use crate::unit::ExecutionUnit;

/// The internal time representation: one discrete scheduling tick.
pub type Tick = u64;
