//! The task model: criticality levels, periodic task templates and the task instances spawned from them.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::Serialize;

use crate::Tick;

/// The severity classification of a task.
///
/// The derived ordering places [Criticality::Critical] first, so sorting ascending yields the most severe level first.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Criticality {
    /// Level 1: mission critical
    Critical,
    /// Level 2: important
    Important,
    /// Level 3: non-critical
    NonCritical,
}

impl Criticality {
    /// All levels from most to least severe.
    pub const ALL: [Criticality; 3] = [Criticality::Critical, Criticality::Important, Criticality::NonCritical];

    /// The position of the level in [Criticality::ALL].
    pub fn index(self) -> usize {
        match self {
            Criticality::Critical => 0,
            Criticality::Important => 1,
            Criticality::NonCritical => 2,
        }
    }

    /// The numeric level, starting with 1 for the most severe one.
    pub fn level(self) -> u8 {
        self.index() as u8 + 1
    }
}

impl Display for Criticality {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Criticality::Critical => write!(f, "Critical"),
            Criticality::Important => write!(f, "Important"),
            Criticality::NonCritical => write!(f, "NonCritical"),
        }
    }
}

/// Raised if a string does not name a [Criticality].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCriticalityError(String);

impl Display for ParseCriticalityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown criticality `{}`; expected one of {} or the level 1 to 3",
            self.0,
            Criticality::ALL.iter().map(|c| c.to_string().to_ascii_lowercase()).join(", ")
        )
    }
}

impl Error for ParseCriticalityError {}

impl FromStr for Criticality {
    type Err = ParseCriticalityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "");
        match normalized.as_str() {
            "critical" | "missioncritical" | "1" | "level1" => Ok(Criticality::Critical),
            "important" | "2" | "level2" => Ok(Criticality::Important),
            "noncritical" | "3" | "level3" => Ok(Criticality::NonCritical),
            _ => Err(ParseCriticalityError(s.to_string())),
        }
    }
}

/// Identifies a task instance. Ids are handed out in generation order, starting with 1.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub(crate) usize);

impl TaskId {
    /// The first id handed out by a simulation.
    pub const FIRST: TaskId = TaskId(1);

    /// The raw id value.
    pub fn get(self) -> usize {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 - 1
    }

    pub(crate) fn from_index(idx: usize) -> Self {
        TaskId(idx + 1)
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Describes why a [TaskTemplate] could not be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The template has no name.
    EmptyName,
    /// The template would be released on every multiple of zero.
    ZeroPeriod(String),
}

impl Display for TemplateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::EmptyName => write!(f, "task template requires a non-empty name"),
            TemplateError::ZeroPeriod(name) => write!(f, "task template `{}` has a period of zero", name),
        }
    }
}

impl Error for TemplateError {}

/// An immutable blueprint for a periodic task.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTemplate {
    name: String,
    level: Criticality,
    execution_time: Tick,
    relative_deadline: Tick,
    period: Tick,
}

impl TaskTemplate {
    /// Creates a new template. The period must be positive.
    pub fn new(
        name: impl Into<String>,
        level: Criticality,
        execution_time: Tick,
        relative_deadline: Tick,
        period: Tick,
    ) -> Result<Self, TemplateError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TemplateError::EmptyName);
        }
        if period == 0 {
            return Err(TemplateError::ZeroPeriod(name));
        }
        Ok(TaskTemplate {
            name,
            level,
            execution_time,
            relative_deadline,
            period,
        })
    }

    /// Creates a template with an implicit deadline, i.e. each instance is due when the next one is released.
    pub fn implicit(
        name: impl Into<String>,
        level: Criticality,
        execution_time: Tick,
        period: Tick,
    ) -> Result<Self, TemplateError> {
        Self::new(name, level, execution_time, period, period)
    }

    #[allow(missing_docs)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[allow(missing_docs)]
    pub fn level(&self) -> Criticality {
        self.level
    }

    #[allow(missing_docs)]
    pub fn execution_time(&self) -> Tick {
        self.execution_time
    }

    #[allow(missing_docs)]
    pub fn relative_deadline(&self) -> Tick {
        self.relative_deadline
    }

    #[allow(missing_docs)]
    pub fn period(&self) -> Tick {
        self.period
    }

    /// Whether an instance is released at the given tick.
    pub fn is_due(&self, now: Tick) -> bool {
        now % self.period == 0
    }

    /// Creates the instance released at `now`.
    pub(crate) fn instantiate(&self, id: TaskId, now: Tick) -> Task {
        Task {
            id,
            name: self.name.clone(),
            level: self.level,
            execution_time: self.execution_time,
            remaining_time: self.execution_time,
            deadline: now.saturating_add(self.relative_deadline),
            period: self.period,
            has_missed_deadline: false,
        }
    }
}

/// A single released instance of a periodic task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    name: String,
    level: Criticality,
    execution_time: Tick,
    remaining_time: Tick,
    deadline: Tick,
    period: Tick,
    has_missed_deadline: bool,
}

impl Task {
    #[allow(missing_docs)]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[allow(missing_docs)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[allow(missing_docs)]
    pub fn level(&self) -> Criticality {
        self.level
    }

    /// The original cost of the instance.
    pub fn execution_time(&self) -> Tick {
        self.execution_time
    }

    /// The work left until the instance is finished.
    pub fn remaining_time(&self) -> Tick {
        self.remaining_time
    }

    /// The absolute deadline.
    pub fn deadline(&self) -> Tick {
        self.deadline
    }

    #[allow(missing_docs)]
    pub fn period(&self) -> Tick {
        self.period
    }

    #[allow(missing_docs)]
    pub fn has_missed_deadline(&self) -> bool {
        self.has_missed_deadline
    }

    /// Returns true once no work is left.
    pub fn is_finished(&self) -> bool {
        self.remaining_time == 0
    }

    /// Whether the instance is unfinished although its deadline has been reached.
    pub(crate) fn is_overdue(&self, now: Tick) -> bool {
        self.deadline <= now && !self.is_finished()
    }

    /// Flags the instance as missed. Returns false if it was already flagged.
    pub(crate) fn mark_missed(&mut self) -> bool {
        !std::mem::replace(&mut self.has_missed_deadline, true)
    }

    /// Consumes one unit of work.
    pub(crate) fn execute_unit(&mut self) {
        self.remaining_time = self.remaining_time.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criticality_orders_most_severe_first() {
        let mut levels = vec![Criticality::NonCritical, Criticality::Critical, Criticality::Important];
        levels.sort();
        assert_eq!(levels, Criticality::ALL.to_vec());
        assert_eq!(Criticality::Critical.level(), 1);
        assert_eq!(Criticality::NonCritical.level(), 3);
    }

    #[test]
    fn parse_criticality() {
        assert_eq!("critical".parse::<Criticality>(), Ok(Criticality::Critical));
        assert_eq!("Non-Critical".parse::<Criticality>(), Ok(Criticality::NonCritical));
        assert_eq!("non_critical".parse::<Criticality>(), Ok(Criticality::NonCritical));
        assert_eq!(" 2 ".parse::<Criticality>(), Ok(Criticality::Important));
        assert!("urgent".parse::<Criticality>().is_err());
    }

    #[test]
    fn template_rejects_zero_period() {
        assert_eq!(
            TaskTemplate::implicit("Idle", Criticality::Important, 3, 0),
            Err(TemplateError::ZeroPeriod("Idle".into()))
        );
        assert_eq!(
            TaskTemplate::new("  ", Criticality::Important, 3, 5, 5),
            Err(TemplateError::EmptyName)
        );
    }

    #[test]
    fn instantiate_sets_absolute_deadline() {
        let tmpl = TaskTemplate::new("GPS_Update", Criticality::Important, 25, 40, 50).unwrap();
        assert!(tmpl.is_due(0));
        assert!(!tmpl.is_due(49));
        assert!(tmpl.is_due(100));

        let task = tmpl.instantiate(TaskId(7), 100);
        assert_eq!(task.id(), TaskId(7));
        assert_eq!(task.deadline(), 140);
        assert_eq!(task.period(), 50);
        assert_eq!(task.remaining_time(), 25);
        assert!(!task.has_missed_deadline());
    }

    #[test]
    fn execution_saturates_at_zero() {
        let tmpl = TaskTemplate::implicit("PlayMusic", Criticality::NonCritical, 1, 40).unwrap();
        let mut task = tmpl.instantiate(TaskId::FIRST, 0);
        task.execute_unit();
        assert!(task.is_finished());
        task.execute_unit();
        assert_eq!(task.remaining_time(), 0);
    }

    #[test]
    fn missed_flag_is_write_once() {
        let tmpl = TaskTemplate::implicit("WeatherApp", Criticality::NonCritical, 8, 45).unwrap();
        let mut task = tmpl.instantiate(TaskId::FIRST, 0);
        assert!(!task.is_overdue(44));
        assert!(task.is_overdue(45));
        assert!(task.mark_missed());
        assert!(!task.mark_missed());
        assert!(task.has_missed_deadline());
    }
}
