//! Loading task sets from CSV files and the built-in storm scenario.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use storm_sim::{Criticality, ParseCriticalityError, TaskTemplate, TemplateError};

/// A single row of a task file.
#[derive(Debug, Clone, Deserialize)]
struct TemplateRecord {
    name: String,
    level: String,
    execution_time: u64,
    /// Relative to the release, empty for an implicit deadline
    deadline: Option<u64>,
    period: u64,
}

/// Describes what went wrong while reading a task file.
#[derive(Debug)]
pub(crate) enum TaskFileError {
    /// The file could not be opened
    Io(std::io::Error),
    /// The content is no valid CSV or a column could not be parsed
    Csv(csv::Error),
    /// The level column does not name a criticality
    Level { line: u64, source: ParseCriticalityError },
    /// The row describes an invalid template
    Template { line: u64, source: TemplateError },
}

impl Display for TaskFileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskFileError::Io(e) => write!(f, "Could not open task file: {}", e),
            TaskFileError::Csv(e) => write!(f, "Malformed task file: {}", e),
            TaskFileError::Level { line, source } => write!(f, "Invalid task in line {}: {}", line, source),
            TaskFileError::Template { line, source } => write!(f, "Invalid task in line {}: {}", line, source),
        }
    }
}

impl Error for TaskFileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TaskFileError::Io(e) => Some(e),
            TaskFileError::Csv(e) => Some(e),
            TaskFileError::Level { source, .. } => Some(source),
            TaskFileError::Template { source, .. } => Some(source),
        }
    }
}

impl From<csv::Error> for TaskFileError {
    fn from(e: csv::Error) -> Self {
        TaskFileError::Csv(e)
    }
}

/// Reads the task templates from the file at `path`.
pub(crate) fn load_templates(path: &Path) -> Result<Vec<TaskTemplate>, TaskFileError> {
    let file = File::open(path).map_err(TaskFileError::Io)?;
    read_templates(file)
}

/// Reads task templates from CSV with the header `name,level,execution_time,deadline,period`.
pub(crate) fn read_templates<R: Read>(reader: R) -> Result<Vec<TaskTemplate>, TaskFileError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut templates = Vec::new();
    for result in reader.deserialize::<TemplateRecord>() {
        let record = result?;
        // the header occupies the first line
        let line = templates.len() as u64 + 2;
        let level: Criticality = record
            .level
            .parse()
            .map_err(|source| TaskFileError::Level { line, source })?;
        let deadline = record.deadline.unwrap_or(record.period);
        let template = TaskTemplate::new(record.name, level, record.execution_time, deadline, record.period)
            .map_err(|source| TaskFileError::Template { line, source })?;
        templates.push(template);
    }
    Ok(templates)
}

/// The overload scenario: a safety critical brake controller competing with navigation and infotainment.
pub(crate) fn storm_task_set() -> Vec<TaskTemplate> {
    [
        ("BrakeControl", Criticality::Critical, 5, 20),
        ("GPS_Update", Criticality::Important, 25, 50),
        ("PlayMusic", Criticality::NonCritical, 10, 40),
        ("WeatherApp", Criticality::NonCritical, 8, 45),
    ]
    .into_iter()
    .filter_map(|(name, level, exec, period)| TaskTemplate::implicit(name, level, exec, period).ok())
    .collect()
}
