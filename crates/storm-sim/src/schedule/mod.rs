//! Ordering policies over the ready tasks.
//!
//! A policy only orders what it is given: it has no notion of the current time and never looks at whether a task has
//! missed its deadline. Reconciling the ready queue with the set of alive tasks is left to the engine.

pub(crate) mod criticality_ordered;
pub(crate) mod deadline_ordered;

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::Serialize;

pub use self::criticality_ordered::CriticalityOrdered;
pub use self::deadline_ordered::DeadlineOrdered;
use crate::task::{Task, TaskId};

/// The capabilities of a scheduling policy.
pub trait SchedulingPolicy: Debug {
    /// The variant implemented by this policy.
    fn kind(&self) -> PolicyKind;

    /// Adds a task to the ready queue. Never fails.
    fn submit(&mut self, task: &Task);

    /// Removes and returns the ready task with the highest priority.
    fn next(&mut self) -> Option<TaskId>;

    /// Whether any task is waiting in the ready queue.
    fn has_pending(&self) -> bool;

    /// The number of tasks waiting in the ready queue.
    fn pending(&self) -> usize;
}

/// Selects one of the available scheduling policies.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolicyKind {
    /// Earliest deadline first
    #[default]
    DeadlineOrdered,
    /// Most severe criticality first, earliest deadline within a level
    CriticalityOrdered,
}

impl PolicyKind {
    /// All available policies.
    pub const ALL: [PolicyKind; 2] = [PolicyKind::DeadlineOrdered, PolicyKind::CriticalityOrdered];

    /// Creates an empty instance of the policy.
    pub fn build(self) -> Box<dyn SchedulingPolicy> {
        match self {
            PolicyKind::DeadlineOrdered => Box::new(DeadlineOrdered::new()),
            PolicyKind::CriticalityOrdered => Box::new(CriticalityOrdered::new()),
        }
    }

    /// A human readable name of the policy.
    pub fn display_name(self) -> &'static str {
        match self {
            PolicyKind::DeadlineOrdered => "Classic EDF Scheduler",
            PolicyKind::CriticalityOrdered => "Mixed-Criticality Scheduler",
        }
    }
}

impl Display for PolicyKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyKind::DeadlineOrdered => write!(f, "edf"),
            PolicyKind::CriticalityOrdered => write!(f, "mixed-criticality"),
        }
    }
}

/// Raised if a string does not name a [PolicyKind].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePolicyError(String);

impl Display for ParsePolicyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown scheduling policy `{}`; expected `edf` or `mc`", self.0)
    }
}

impl Error for ParsePolicyError {}

impl FromStr for PolicyKind {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "edf" | "deadline" | "deadline-ordered" => Ok(PolicyKind::DeadlineOrdered),
            "mc" | "criticality" | "criticality-ordered" | "mixed-criticality" => Ok(PolicyKind::CriticalityOrdered),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_matches_kind() {
        for kind in PolicyKind::ALL {
            let policy = kind.build();
            assert_eq!(policy.kind(), kind);
            assert!(!policy.has_pending());
            assert_eq!(policy.pending(), 0);
        }
    }

    #[test]
    fn parse_policy() {
        assert_eq!("EDF".parse::<PolicyKind>(), Ok(PolicyKind::DeadlineOrdered));
        assert_eq!("mc".parse::<PolicyKind>(), Ok(PolicyKind::CriticalityOrdered));
        assert_eq!(
            PolicyKind::CriticalityOrdered.to_string().parse::<PolicyKind>(),
            Ok(PolicyKind::CriticalityOrdered)
        );
        assert!("round-robin".parse::<PolicyKind>().is_err());
    }
}
