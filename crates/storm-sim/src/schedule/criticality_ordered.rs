use std::cmp::Reverse;

use priority_queue::PriorityQueue;

use super::{PolicyKind, SchedulingPolicy};
use crate::task::{Criticality, Task, TaskId};
use crate::Tick;

/// Mixed-criticality ordering: the most severe level always goes first, deadlines only order tasks within a level.
#[derive(Debug, Clone, Default)]
pub struct CriticalityOrdered {
    queue: PriorityQueue<TaskId, Reverse<(Criticality, Tick, TaskId)>>,
}

impl CriticalityOrdered {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        CriticalityOrdered {
            queue: PriorityQueue::new(),
        }
    }
}

impl SchedulingPolicy for CriticalityOrdered {
    fn kind(&self) -> PolicyKind {
        PolicyKind::CriticalityOrdered
    }

    fn submit(&mut self, task: &Task) {
        let key = (task.level(), task.deadline(), task.id());
        self.queue.push(task.id(), Reverse(key));
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
    use crate::task::TaskTemplate;

    #[test]
    fn severity_dominates_deadline() {
        let music = TaskTemplate::implicit("PlayMusic", Criticality::NonCritical, 10, 40).unwrap();
        let gps = TaskTemplate::implicit("GPS_Update", Criticality::Important, 25, 50).unwrap();
        let brake = TaskTemplate::implicit("BrakeControl", Criticality::Critical, 5, 20).unwrap();
        let mut arena = TaskArena::default();
        let music = arena.spawn(&music, 0);
        let gps = arena.spawn(&gps, 0);
        let brake = arena.spawn(&brake, 100);

        let mut policy = CriticalityOrdered::new();
        for id in [music, gps, brake] {
            policy.submit(&arena[id]);
        }
        assert_eq!(policy.next(), Some(brake));
        assert_eq!(policy.next(), Some(gps));
        assert_eq!(policy.next(), Some(music));
        assert_eq!(policy.next(), None);
    }

    #[test]
    fn deadline_orders_within_level() {
        let music = TaskTemplate::implicit("PlayMusic", Criticality::NonCritical, 10, 40).unwrap();
        let weather = TaskTemplate::implicit("WeatherApp", Criticality::NonCritical, 8, 45).unwrap();
        let mut arena = TaskArena::default();
        let weather = arena.spawn(&weather, 0);
        let music = arena.spawn(&music, 0);

        let mut policy = CriticalityOrdered::new();
        policy.submit(&arena[weather]);
        policy.submit(&arena[music]);
        assert!(policy.has_pending());
        assert_eq!(policy.next(), Some(music));
        assert_eq!(policy.next(), Some(weather));
        assert!(!policy.has_pending());
    }
}
