//! A single processor slot advancing the task it holds by one unit of work per tick.

use crate::engine::TaskArena;
use crate::task::TaskId;

/// Models the processing unit. It only holds the id of its occupant; the task itself lives in the [TaskArena].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionUnit {
    current: Option<TaskId>,
}

impl ExecutionUnit {
    /// Creates an idle unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the occupant. The new task is neither reset nor inspected; `None` idles the unit.
    pub fn assign(&mut self, task: Option<TaskId>) {
        self.current = task;
    }

    /// Consumes one unit of work of the occupant, if it has any work left.
    pub fn tick(&self, tasks: &mut TaskArena) {
        if let Some(id) = self.current {
            let task = &mut tasks[id];
            if !task.is_finished() {
                task.execute_unit();
            }
        }
    }

    /// The current occupant.
    pub fn current(&self) -> Option<TaskId> {
        self.current
    }

    #[allow(missing_docs)]
    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Criticality, TaskTemplate};

    fn arena_with(execution_time: u64) -> (TaskArena, TaskId) {
        let tmpl = TaskTemplate::implicit("BrakeControl", Criticality::Critical, execution_time, 20).unwrap();
        let mut arena = TaskArena::default();
        let id = arena.spawn(&tmpl, 0);
        (arena, id)
    }

    #[test]
    fn idle_unit_does_nothing() {
        let (mut arena, id) = arena_with(2);
        let unit = ExecutionUnit::new();
        assert!(unit.is_idle());
        unit.tick(&mut arena);
        assert_eq!(arena[id].remaining_time(), 2);
    }

    #[test]
    fn tick_consumes_exactly_one_unit() {
        let (mut arena, id) = arena_with(2);
        let mut unit = ExecutionUnit::new();
        unit.assign(Some(id));
        assert_eq!(unit.current(), Some(id));
        unit.tick(&mut arena);
        assert_eq!(arena[id].remaining_time(), 1);
        unit.tick(&mut arena);
        assert_eq!(arena[id].remaining_time(), 0);
        // finished occupants are tolerated
        unit.tick(&mut arena);
        assert_eq!(arena[id].remaining_time(), 0);
        assert!(!unit.is_idle());
    }

    #[test]
    fn assign_none_idles() {
        let (_, id) = arena_with(2);
        let mut unit = ExecutionUnit::new();
        unit.assign(Some(id));
        unit.assign(None);
        assert!(unit.is_idle());
        assert_eq!(unit.current(), None);
    }
}
