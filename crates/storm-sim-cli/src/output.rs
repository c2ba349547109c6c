//! Printing the events and reports of the simulation runs.

use std::error::Error;
use std::fs::File;
use std::io::{stderr, stdout, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;
use storm_sim::api::queued::Receiver;
use storm_sim::{Criticality, EventKind, Metrics, PolicyKind, Report, SimEvent, TaskInfo, Tick};
use termcolor::{Ansi, Color, ColorSpec, NoColor, WriteColor};

use crate::config::{OutputFormat, Verbosity};

pub(crate) type PrintError = Box<dyn Error + Send + Sync>;

/// The possible targets at which the output of the simulator can be directed.
#[derive(Debug, Clone, Default)]
pub(crate) enum OutputChannel {
    /// Write the output to Std-Out
    #[default]
    StdOut,
    /// Write the output to Std-Err
    StdErr,
    /// Write the output to a File
    File(PathBuf),
}

impl OutputChannel {
    /// Opens the channel for writing, colored if it is attached to a terminal.
    fn open(&self) -> std::io::Result<(Box<dyn Write + Send>, bool)> {
        match self {
            OutputChannel::StdOut => Ok((Box::new(stdout()), atty::is(atty::Stream::Stdout))),
            OutputChannel::StdErr => Ok((Box::new(stderr()), atty::is(atty::Stream::Stderr))),
            OutputChannel::File(f) => {
                let file = File::create(f.as_path())?;
                Ok((Box::new(BufWriter::new(file)), false))
            },
        }
    }
}

fn color_writer<W: Write + Send + 'static>(writer: W, colored: bool) -> Box<dyn WriteColor + Send> {
    if colored {
        Box::new(Ansi::new(writer))
    } else {
        Box::new(NoColor::new(writer))
    }
}

/// Writes the output of the simulation runs in the configured format.
pub(crate) enum EventPrinter {
    Log(LogPrinter<Box<dyn WriteColor + Send>>),
    Json(JsonPrinter<Box<dyn Write + Send>>),
    Csv(CsvPrinter<Box<dyn Write + Send>>),
}

impl EventPrinter {
    pub(crate) fn open(
        format: OutputFormat,
        verbosity: Verbosity,
        channel: &OutputChannel,
    ) -> std::io::Result<EventPrinter> {
        let (writer, colored) = channel.open()?;
        let printer = match format {
            OutputFormat::Logger => EventPrinter::Log(LogPrinter::new(verbosity, color_writer(writer, colored))),
            OutputFormat::Json => EventPrinter::Json(JsonPrinter::new(verbosity, writer)),
            OutputFormat::Csv => {
                let reports = color_writer(stderr(), atty::is(atty::Stream::Stderr));
                EventPrinter::Csv(CsvPrinter::new(verbosity, writer, reports))
            },
        };
        Ok(printer)
    }

    /// Announces the beginning of a run.
    pub(crate) fn start(&mut self, policy: PolicyKind, duration: Tick) -> Result<(), PrintError> {
        match self {
            EventPrinter::Log(p) => p.start(policy, duration)?,
            EventPrinter::Json(_) | EventPrinter::Csv(_) => {},
        }
        Ok(())
    }

    /// Prints events until the queue is disconnected.
    pub(crate) fn consume(&mut self, queue: Receiver<SimEvent>) -> Result<(), PrintError> {
        for event in queue.iter() {
            match self {
                EventPrinter::Log(p) => p.event(&event)?,
                EventPrinter::Json(p) => p.event(&event)?,
                EventPrinter::Csv(p) => p.event(&event)?,
            }
        }
        Ok(())
    }

    pub(crate) fn report(&mut self, report: &Report, elapsed: Duration) -> Result<(), PrintError> {
        match self {
            EventPrinter::Log(p) => p.report(report, elapsed)?,
            EventPrinter::Json(p) => p.report(report, elapsed)?,
            EventPrinter::Csv(p) => p.report(report, elapsed)?,
        }
        Ok(())
    }

    pub(crate) fn comparison(&mut self, reports: &[Report]) -> Result<(), PrintError> {
        match self {
            EventPrinter::Log(p) => write_comparison(&mut p.writer, p.verbosity, reports)?,
            EventPrinter::Csv(p) => write_comparison(&mut p.reports, p.verbosity, reports)?,
            EventPrinter::Json(_) => {},
        }
        Ok(())
    }

    pub(crate) fn finish(&mut self) -> Result<(), PrintError> {
        match self {
            EventPrinter::Log(p) => p.writer.flush()?,
            EventPrinter::Json(p) => p.writer.flush()?,
            EventPrinter::Csv(p) => p.writer.flush()?,
        }
        Ok(())
    }
}

fn kind_color(kind: EventKind) -> Color {
    match kind {
        EventKind::Generated => Color::Cyan,
        EventKind::Completed => Color::Green,
        EventKind::Missed => Color::Red,
        EventKind::Preempted => Color::Yellow,
        EventKind::Discarded => Color::Magenta,
        EventKind::Running => Color::Blue,
        EventKind::Idle => Color::Ansi256(8), //Dark Grey
    }
}

/// Prints events in a line-based logging format.
#[derive(Debug)]
pub(crate) struct LogPrinter<W: WriteColor> {
    verbosity: Verbosity,
    writer: W,
}

impl<W: WriteColor> LogPrinter<W> {
    pub(crate) fn new(verbosity: Verbosity, writer: W) -> Self {
        LogPrinter { verbosity, writer }
    }

    fn start(&mut self, policy: PolicyKind, duration: Tick) -> std::io::Result<()> {
        if self.verbosity < Verbosity::Report {
            return Ok(());
        }
        writeln!(self.writer, "{}", "=".repeat(49))?;
        writeln!(self.writer, "  RUNNING SIMULATION WITH: {}", policy.display_name())?;
        writeln!(self.writer, "{}", "=".repeat(49))?;
        if self.verbosity >= Verbosity::Events {
            writeln!(self.writer, "Starting simulation for {} ticks.", duration)?;
        }
        Ok(())
    }

    pub(crate) fn event(&mut self, event: &SimEvent) -> std::io::Result<()> {
        if Verbosity::required_for(event) > self.verbosity {
            return Ok(());
        }
        write!(self.writer, "[T={:>3}]", event.tick())?;
        self.writer.set_color(ColorSpec::new().set_fg(Some(kind_color(event.kind()))))?;
        write!(self.writer, "[{}]", event.kind())?;
        self.writer.reset()?;
        match event {
            SimEvent::Generated { task, deadline, .. } | SimEvent::Missed { task, deadline, .. } => {
                writeln!(self.writer, " {} deadline={}", task, deadline)
            },
            SimEvent::Completed { task, .. } | SimEvent::Discarded { task, .. } => writeln!(self.writer, " {}", task),
            SimEvent::Preempted { task, remaining, .. } => writeln!(self.writer, " {} remaining={}", task, remaining),
            SimEvent::Running { task, remaining, .. } => writeln!(self.writer, " {} remaining={}", task, remaining),
            SimEvent::Idle { .. } => writeln!(self.writer),
        }
    }

    pub(crate) fn report(&mut self, report: &Report, elapsed: Duration) -> std::io::Result<()> {
        if self.verbosity < Verbosity::Report {
            return Ok(());
        }
        write_report(&mut self.writer, report, elapsed)
    }
}

fn write_report<W: WriteColor>(out: &mut W, report: &Report, elapsed: Duration) -> std::io::Result<()> {
    let Report {
        policy,
        duration,
        metrics,
    } = report;
    writeln!(out)?;
    writeln!(out, "--- FINAL REPORT: {} ---", policy.display_name())?;
    writeln!(out, "Total Ticks: {}", duration)?;
    writeln!(out, "CPU Utilization: {:.2}%", report.utilization_percent())?;
    writeln!(
        out,
        "Context Switches: {} ({} preemptions)",
        metrics.context_switches, metrics.preemptions
    )?;
    writeln!(out, "Simulated in {}", humantime::format_duration(elapsed))?;
    writeln!(out)?;
    writeln!(out, "--- DEADLINE ANALYSIS ---")?;
    for (level, counters) in metrics.levels() {
        writeln!(out, "LEVEL {} ({}):", level.level(), level)?;
        writeln!(out, "  - Generated: {}", counters.generated)?;
        writeln!(out, "  - Completed: {}", counters.completed)?;
        write!(out, "  - ")?;
        if counters.missed > 0 {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        }
        write!(out, "MISSED: {}", counters.missed)?;
        out.reset()?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_comparison<W: WriteColor>(out: &mut W, verbosity: Verbosity, reports: &[Report]) -> std::io::Result<()> {
    if verbosity < Verbosity::Report {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "--- COMPARISON ---")?;
    for level in Criticality::ALL {
        let missed = reports
            .iter()
            .map(|r| format!("{} {}", r.policy, r.metrics.level(level).missed))
            .collect::<Vec<String>>()
            .join(", ");
        writeln!(out, "{} missed: {}", level, missed)?;
    }
    Ok(())
}

/// The JSON representation of a final report.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    event: &'static str,
    policy: PolicyKind,
    duration: Tick,
    utilization: Decimal,
    elapsed: String,
    #[serde(flatten)]
    metrics: &'a Metrics,
}

/// Prints every event and report as a JSON object on its own line.
#[derive(Debug)]
pub(crate) struct JsonPrinter<W: Write> {
    verbosity: Verbosity,
    writer: W,
}

impl<W: Write> JsonPrinter<W> {
    pub(crate) fn new(verbosity: Verbosity, writer: W) -> Self {
        JsonPrinter { verbosity, writer }
    }

    pub(crate) fn event(&mut self, event: &SimEvent) -> Result<(), PrintError> {
        if Verbosity::required_for(event) <= self.verbosity {
            jsonl::write(&mut self.writer, event)?;
        }
        Ok(())
    }

    pub(crate) fn report(&mut self, report: &Report, elapsed: Duration) -> Result<(), PrintError> {
        if self.verbosity < Verbosity::Report {
            return Ok(());
        }
        let json = JsonReport {
            event: "report",
            policy: report.policy,
            duration: report.duration,
            utilization: report.utilization(),
            elapsed: humantime::format_duration(elapsed).to_string(),
            metrics: &report.metrics,
        };
        jsonl::write(&mut self.writer, &json)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// A single row of the CSV output.
#[derive(Debug, Serialize)]
struct EventRow<'a> {
    tick: Tick,
    event: EventKind,
    id: Option<usize>,
    name: Option<&'a str>,
    level: Option<Criticality>,
    deadline: Option<Tick>,
    remaining: Option<Tick>,
}

impl<'a> From<&'a SimEvent> for EventRow<'a> {
    fn from(event: &'a SimEvent) -> Self {
        let task: Option<&TaskInfo> = event.task();
        let (deadline, remaining) = match event {
            SimEvent::Generated { deadline, .. } | SimEvent::Missed { deadline, .. } => (Some(*deadline), None),
            SimEvent::Preempted { remaining, .. } | SimEvent::Running { remaining, .. } => (None, Some(*remaining)),
            _ => (None, None),
        };
        EventRow {
            tick: event.tick(),
            event: event.kind(),
            id: task.map(|t| t.id.get()),
            name: task.map(|t| t.name.as_str()),
            level: task.map(|t| t.level),
            deadline,
            remaining,
        }
    }
}

/// Prints every event as a CSV row; the reports are written to a separate writer.
pub(crate) struct CsvPrinter<W: Write> {
    verbosity: Verbosity,
    writer: csv::Writer<W>,
    reports: Box<dyn WriteColor + Send>,
}

impl<W: Write> CsvPrinter<W> {
    pub(crate) fn new(verbosity: Verbosity, writer: W, reports: Box<dyn WriteColor + Send>) -> Self {
        CsvPrinter {
            verbosity,
            writer: csv::Writer::from_writer(writer),
            reports,
        }
    }

    pub(crate) fn event(&mut self, event: &SimEvent) -> Result<(), PrintError> {
        if Verbosity::required_for(event) <= self.verbosity {
            self.writer.serialize(EventRow::from(event))?;
        }
        Ok(())
    }

    pub(crate) fn report(&mut self, report: &Report, elapsed: Duration) -> Result<(), PrintError> {
        self.writer.flush()?;
        if self.verbosity >= Verbosity::Report {
            write_report(&mut self.reports, report, elapsed)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use storm_sim::TaskId;

    use super::*;

    fn brake() -> TaskInfo {
        TaskInfo {
            id: TaskId::FIRST,
            name: "BrakeControl".into(),
            level: Criticality::Critical,
        }
    }

    fn missed() -> SimEvent {
        SimEvent::Missed {
            tick: 20,
            task: brake(),
            deadline: 20,
        }
    }

    fn discarded() -> SimEvent {
        SimEvent::Discarded { tick: 21, task: brake() }
    }

    #[test]
    fn log_lines() {
        let mut buf = Vec::new();
        let mut printer = LogPrinter::new(Verbosity::Events, NoColor::new(&mut buf));
        printer.event(&missed()).unwrap();
        printer.event(&discarded()).unwrap();
        printer.event(&SimEvent::Idle { tick: 3 }).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(out, "[T= 20][Missed] BrakeControl (ID: 1) deadline=20\n[T=  3][Idle]\n");
    }

    #[test]
    fn debug_log_includes_discards() {
        let mut buf = Vec::new();
        let mut printer = LogPrinter::new(Verbosity::Debug, NoColor::new(&mut buf));
        printer.event(&discarded()).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "[T= 21][Discarded] BrakeControl (ID: 1)\n");
    }

    #[test]
    fn json_lines() {
        let mut buf = Vec::new();
        let mut printer = JsonPrinter::new(Verbosity::Events, &mut buf);
        printer.event(&missed()).unwrap();
        printer.event(&discarded()).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(out.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(value["event"], "missed");
        assert_eq!(value["deadline"], 20);
    }

    #[test]
    fn csv_rows() {
        let mut buf = Vec::new();
        {
            let mut printer = CsvPrinter::new(Verbosity::Debug, &mut buf, Box::new(NoColor::new(std::io::sink())));
            printer.event(&missed()).unwrap();
            printer.event(&SimEvent::Idle { tick: 21 }).unwrap();
            printer.writer.flush().unwrap();
        }
        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "tick,event,id,name,level,deadline,remaining");
        assert_eq!(lines[1], "20,Missed,1,BrakeControl,critical,20,");
        assert_eq!(lines[2], "21,Idle,,,,,");
    }

    #[test]
    fn report_lists_every_level() {
        let mut metrics = Metrics::default();
        metrics.busy_ticks = 150;
        metrics[Criticality::Critical].generated = 10;
        metrics[Criticality::Critical].missed = 2;
        let report = Report {
            policy: PolicyKind::DeadlineOrdered,
            duration: 200,
            metrics,
        };
        let mut buf = Vec::new();
        write_report(&mut NoColor::new(&mut buf), &report, Duration::from_millis(3)).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("--- FINAL REPORT: Classic EDF Scheduler ---"));
        assert!(out.contains("CPU Utilization: 75.00%"));
        assert!(out.contains("LEVEL 1 (Critical):\n  - Generated: 10\n  - Completed: 0\n  - MISSED: 2\n"));
        assert!(out.contains("LEVEL 3 (NonCritical):"));
        assert!(out.contains("Simulated in 3ms"));
    }
}
