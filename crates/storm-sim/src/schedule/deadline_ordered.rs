use std::cmp::Reverse;

use priority_queue::PriorityQueue;

use super::{PolicyKind, SchedulingPolicy};
use crate::task::{Task, TaskId};
use crate::Tick;

/// Earliest deadline first. Equal deadlines are served in release order.
#[derive(Debug, Clone, Default)]
pub struct DeadlineOrdered {
    queue: PriorityQueue<TaskId, Reverse<(Tick, TaskId)>>,
}

impl DeadlineOrdered {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        DeadlineOrdered {
            queue: PriorityQueue::new(),
        }
    }
}

impl SchedulingPolicy for DeadlineOrdered {
    fn kind(&self) -> PolicyKind {
        PolicyKind::DeadlineOrdered
    }

    fn submit(&mut self, task: &Task) {
        self.queue.push(task.id(), Reverse((task.deadline(), task.id())));
    }

    fn next(&mut self) -> Option<TaskId> {
        self.queue.pop().map(|(id, _)| id)
    }

    fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TaskArena;
    use crate::task::{Criticality, TaskTemplate};

    #[test]
    fn earliest_deadline_first() {
        let brake = TaskTemplate::implicit("BrakeControl", Criticality::Critical, 5, 20).unwrap();
        let music = TaskTemplate::implicit("PlayMusic", Criticality::NonCritical, 10, 40).unwrap();
        let gps = TaskTemplate::implicit("GPS_Update", Criticality::Important, 25, 50).unwrap();
        let mut arena = TaskArena::default();
        let late_brake = arena.spawn(&brake, 40);
        let music = arena.spawn(&music, 0);
        let gps = arena.spawn(&gps, 0);

        let mut policy = DeadlineOrdered::new();
        for id in [late_brake, gps, music] {
            policy.submit(&arena[id]);
        }
        assert_eq!(policy.pending(), 3);
        assert_eq!(policy.next(), Some(music));
        assert_eq!(policy.next(), Some(gps));
        assert_eq!(policy.next(), Some(late_brake));
        assert_eq!(policy.next(), None);
        assert!(!policy.has_pending());
    }

    #[test]
    fn ties_are_served_in_release_order() {
        let weather = TaskTemplate::new("WeatherApp", Criticality::NonCritical, 8, 45, 45).unwrap();
        let brake = TaskTemplate::new("BrakeControl", Criticality::Critical, 5, 45, 20).unwrap();
        let mut arena = TaskArena::default();
        let first = arena.spawn(&weather, 0);
        let second = arena.spawn(&brake, 0);

        let mut policy = DeadlineOrdered::new();
        policy.submit(&arena[second]);
        policy.submit(&arena[first]);
        assert_eq!(policy.next(), Some(first));
        assert_eq!(policy.next(), Some(second));
    }

    #[test]
    fn resubmission_does_not_duplicate() {
        let music = TaskTemplate::implicit("PlayMusic", Criticality::NonCritical, 10, 40).unwrap();
        let mut arena = TaskArena::default();
        let id = arena.spawn(&music, 0);

        let mut policy = DeadlineOrdered::new();
        policy.submit(&arena[id]);
        policy.submit(&arena[id]);
        assert_eq!(policy.pending(), 1);
    }
}
