//! The observable side of a simulation run.
//!
//! The engine never prints anything. Instead it reports what happens in each tick as a stream of
//! [SimEvent](events::SimEvent)s to an [EventSink](events::EventSink) supplied by the caller.
//! Out of the box the following sinks are provided:
//! * [NoSink](events::NoSink): Discards everything, useful if only the final [Report](crate::Report) is of interest.
//! * `Vec<SimEvent>`: Collects the complete event log in memory.
//! * [ChannelSink](queued::ChannelSink): Forwards the events through a queue to a consumer running on another thread.

pub mod events;

#[cfg(feature = "queued-api")]
pub mod queued;
