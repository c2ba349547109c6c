//! This module contains all configuration related structures.

use std::fmt::{Display, Formatter};
use std::thread;
use std::time::Instant;

use clap::ValueEnum;
use storm_sim::{ChannelSink, EventKind, PolicyKind, QueueLength, Report, SimEvent, TaskTemplate, Tick};

use crate::output::{EventPrinter, OutputChannel, PrintError};

/**
`Config` combines the task set with the policies it is simulated under and describes where and how the results are
written.
 */
#[derive(Debug, Clone)]
pub(crate) struct Config {
    /// The periodic tasks competing for the execution unit
    pub(crate) templates: Vec<TaskTemplate>,
    /// Every policy is simulated in a separate run, in this order
    pub(crate) policies: Vec<PolicyKind>,
    /// The number of ticks of each run
    pub(crate) duration: Tick,
    /// The verbosity to use
    pub(crate) verbosity: Verbosity,
    /// How the output is represented
    pub(crate) format: OutputFormat,
    /// Where the output should go
    pub(crate) output_channel: OutputChannel,
}

/// The different verbosities supported by the simulator.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum, Default)]
pub(crate) enum Verbosity {
    /// Suppresses any kind of output.
    Silent,
    /// Prints only the final report of each run.
    Report,
    /// Prints releases, completions, deadline misses, dispatches and idle ticks.
    #[default]
    Events,
    /// Additionally prints every running tick, preemptions and discarded tasks.
    Debug,
}

impl Display for Verbosity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Verbosity::Silent => write!(f, "Silent"),
            Verbosity::Report => write!(f, "Report"),
            Verbosity::Events => write!(f, "Events"),
            Verbosity::Debug => write!(f, "Debug"),
        }
    }
}

impl Verbosity {
    /// The least verbosity at which the event is printed.
    pub(crate) fn required_for(event: &SimEvent) -> Verbosity {
        match event {
            SimEvent::Running { dispatched: false, .. } | SimEvent::Preempted { .. } | SimEvent::Discarded { .. } => {
                Verbosity::Debug
            },
            _ => Verbosity::Events,
        }
    }

    /// The kinds of events the engine has to deliver at this verbosity.
    pub(crate) fn event_kinds(self) -> Vec<EventKind> {
        match self {
            Verbosity::Silent | Verbosity::Report => vec![],
            Verbosity::Events => {
                vec![
                    EventKind::Generated,
                    EventKind::Completed,
                    EventKind::Missed,
                    EventKind::Running,
                    EventKind::Idle,
                ]
            },
            Verbosity::Debug => {
                vec![
                    EventKind::Generated,
                    EventKind::Completed,
                    EventKind::Missed,
                    EventKind::Preempted,
                    EventKind::Discarded,
                    EventKind::Running,
                    EventKind::Idle,
                ]
            },
        }
    }
}

/// The representations in which the output can be written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub(crate) enum OutputFormat {
    /// Print the output in a line based logging format.
    #[default]
    Logger,
    /// Print each event and report as a JSON object.
    Json,
    /// Print each event as a row in CSV format; reports go to StdErr.
    Csv,
}

impl Config {
    /// Simulates the task set once per policy and returns the reports in the same order.
    pub(crate) fn run(self) -> Result<Vec<Report>, PrintError> {
        let Config {
            templates,
            policies,
            duration,
            verbosity,
            format,
            output_channel,
        } = self;

        let mut printer = EventPrinter::open(format, verbosity, &output_channel)?;
        let mut reports = Vec::with_capacity(policies.len());
        for policy in policies {
            printer.start(policy, duration)?;

            let (sink, queue) = ChannelSink::new(QueueLength::Unbounded);
            let sink = sink.only(verbosity.event_kinds());
            let output_handler = thread::spawn(move || printer.consume(queue).map(|_| printer));

            let start = Instant::now();
            let report = storm_sim::Config::new(templates.clone(), policy, duration).run(sink);
            let elapsed = start.elapsed();

            // Wait for the output queue to empty up.
            printer = output_handler.join().map_err(|_| "output thread panicked")??;
            printer.report(&report, elapsed)?;
            reports.push(report);
        }
        if reports.len() > 1 {
            printer.comparison(&reports)?;
        }
        printer.finish()?;
        Ok(reports)
    }
}
