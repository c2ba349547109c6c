use std::ops::{Index, IndexMut};

use bit_set::BitSet;
use itertools::Itertools;

use crate::task::{Task, TaskId, TaskTemplate};
use crate::Tick;

/// Append-only storage of every task instance released during a simulation.
///
/// The registry, the ready queue of the policy and the execution unit only hold [TaskId]s into the arena.
#[derive(Debug, Clone, Default)]
pub struct TaskArena {
    tasks: Vec<Task>,
}

impl TaskArena {
    /// Releases a new instance of `template` at `now` and returns its id.
    pub(crate) fn spawn(&mut self, template: &TaskTemplate, now: Tick) -> TaskId {
        let id = TaskId::from_index(self.tasks.len());
        self.tasks.push(template.instantiate(id, now));
        id
    }

    /// Returns the task with the given id, if it was released by this simulation.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id.index())
    }

    /// The number of released instances.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Iterates over all released instances in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }
}

impl Index<TaskId> for TaskArena {
    type Output = Task;

    fn index(&self, id: TaskId) -> &Self::Output {
        &self.tasks[id.index()]
    }
}

impl IndexMut<TaskId> for TaskArena {
    fn index_mut(&mut self, id: TaskId) -> &mut Self::Output {
        &mut self.tasks[id.index()]
    }
}

/// The set of tasks alive in the system, i.e. neither completed nor flagged as missed.
#[derive(Debug, Clone, Default)]
pub(crate) struct Registry {
    alive: BitSet,
}

impl Registry {
    pub(crate) fn insert(&mut self, id: TaskId) {
        self.alive.insert(id.index());
    }

    /// Returns whether the task was alive.
    pub(crate) fn remove(&mut self, id: TaskId) -> bool {
        self.alive.remove(id.index())
    }

    pub(crate) fn contains(&self, id: TaskId) -> bool {
        self.alive.contains(id.index())
    }

    pub(crate) fn len(&self) -> usize {
        self.alive.len()
    }

    /// Removes and returns all alive tasks matching `pred`, in id order.
    pub(crate) fn evict_where(&mut self, mut pred: impl FnMut(TaskId) -> bool) -> Vec<TaskId> {
        let evicted = self.alive.iter().map(TaskId::from_index).filter(|id| pred(*id)).collect_vec();
        for id in &evicted {
            self.alive.remove(id.index());
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Criticality;

    #[test]
    fn arena_hands_out_sequential_ids() {
        let tmpl = TaskTemplate::implicit("PlayMusic", Criticality::NonCritical, 10, 40).unwrap();
        let mut arena = TaskArena::default();
        let first = arena.spawn(&tmpl, 0);
        let second = arena.spawn(&tmpl, 40);
        assert_eq!(first, TaskId::FIRST);
        assert_eq!(second.get(), 2);
        assert_eq!(arena[second].deadline(), 80);
        assert_eq!(arena.len(), 2);
        assert!(arena.get(TaskId(3)).is_none());
    }

    #[test]
    fn registry_evicts_in_id_order() {
        let mut registry = Registry::default();
        for idx in [4, 0, 2, 1] {
            registry.insert(TaskId::from_index(idx));
        }
        let evicted = registry.evict_where(|id| id.get() % 2 == 1);
        assert_eq!(evicted, vec![TaskId(1), TaskId(3), TaskId(5)]);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(TaskId(2)));
        assert!(!registry.contains(TaskId(3)));
        assert!(registry.remove(TaskId(2)));
        assert!(!registry.remove(TaskId(2)));
    }
}
