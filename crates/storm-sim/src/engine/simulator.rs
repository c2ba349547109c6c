use crate::api::events::{EventKind, EventSink, SimEvent};
use crate::config::Config;
use crate::engine::{Registry, TaskArena};
use crate::metrics::{Metrics, Report};
use crate::schedule::SchedulingPolicy;
use crate::task::{TaskId, TaskTemplate};
use crate::unit::ExecutionUnit;
use crate::Tick;

/// Drives a single execution unit through a fixed number of ticks.
///
/// Each tick runs the following phases in this order:
/// 1. Release an instance of every template whose period divides the current tick.
/// 2. Evict every alive instance that reached its deadline unfinished and flag it as missed.
/// 3. Retire the previous occupant of the unit if it finished, otherwise hand it back to the policy.
/// 4. Ask the policy for the next task, dropping instances that were flagged as missed in the meantime.
/// 5. Run the selected task for one unit of work.
///
/// The registry of alive tasks and the ready queue of the policy are not kept in sync: an instance evicted in phase 2
/// stays in the ready queue until phase 4 pops and discards it.
#[derive(Debug)]
pub struct Simulator {
    templates: Vec<TaskTemplate>,
    policy: Box<dyn SchedulingPolicy>,
    unit: ExecutionUnit,
    tasks: TaskArena,
    registry: Registry,
    now: Tick,
    duration: Tick,
    metrics: Metrics,
}

impl Simulator {
    /// Creates a simulator in tick zero with an idle unit.
    pub fn new(config: Config) -> Self {
        let Config {
            templates,
            policy,
            duration,
        } = config;
        Simulator {
            templates,
            policy: policy.build(),
            unit: ExecutionUnit::new(),
            tasks: TaskArena::default(),
            registry: Registry::default(),
            now: 0,
            duration,
            metrics: Metrics::default(),
        }
    }

    /// The tick simulated by the next call to [step](Simulator::step).
    pub fn now(&self) -> Tick {
        self.now
    }

    /// The configured number of ticks.
    pub fn duration(&self) -> Tick {
        self.duration
    }

    /// Returns true once the configured number of ticks has been simulated.
    pub fn is_finished(&self) -> bool {
        self.now >= self.duration
    }

    /// The counters collected so far.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Every instance released so far.
    pub fn tasks(&self) -> &TaskArena {
        &self.tasks
    }

    #[allow(missing_docs)]
    pub fn unit(&self) -> &ExecutionUnit {
        &self.unit
    }

    #[allow(missing_docs)]
    pub fn policy(&self) -> &dyn SchedulingPolicy {
        self.policy.as_ref()
    }

    /// The number of instances that are neither completed nor missed.
    pub fn alive(&self) -> usize {
        self.registry.len()
    }

    /// Whether the instance is neither completed nor missed.
    pub fn is_alive(&self, id: TaskId) -> bool {
        self.registry.contains(id)
    }

    /// Summarizes the ticks simulated so far.
    pub fn report(&self) -> Report {
        Report {
            policy: self.policy.kind(),
            duration: self.now,
            metrics: self.metrics.clone(),
        }
    }

    /// Simulates all remaining ticks.
    pub fn run<S: EventSink>(&mut self, mut sink: S) -> Report {
        while !self.is_finished() {
            self.step(&mut sink);
        }
        self.report()
    }

    /// Simulates a single tick, regardless of the configured duration.
    pub fn step<S: EventSink>(&mut self, sink: &mut S) {
        self.generate(sink);
        self.monitor_deadlines(sink);
        let previous = self.retire_previous(sink);
        let next = self.select_next(sink);
        self.execute(previous, next, sink);
        self.now += 1;
    }

    fn generate<S: EventSink>(&mut self, sink: &mut S) {
        let now = self.now;
        for template in self.templates.iter().filter(|t| t.is_due(now)) {
            let id = self.tasks.spawn(template, now);
            let task = &self.tasks[id];
            self.metrics[task.level()].generated += 1;
            emit(sink, EventKind::Generated, || SimEvent::Generated {
                tick: now,
                task: task.into(),
                deadline: task.deadline(),
            });

            // Nothing to execute
            if task.is_finished() {
                self.metrics[task.level()].completed += 1;
                emit(sink, EventKind::Completed, || SimEvent::Completed {
                    tick: now,
                    task: task.into(),
                });
                continue;
            }

            self.registry.insert(id);
            self.policy.submit(task);
        }
    }

    fn monitor_deadlines<S: EventSink>(&mut self, sink: &mut S) {
        let now = self.now;
        let tasks = &self.tasks;
        let overdue = self.registry.evict_where(|id| tasks[id].is_overdue(now));
        for id in overdue {
            let task = &mut self.tasks[id];
            let flagged = task.mark_missed();
            debug_assert!(flagged, "alive task {} was already flagged as missed", id);
            self.metrics[task.level()].missed += 1;
            emit(sink, EventKind::Missed, || SimEvent::Missed {
                tick: now,
                task: (&*task).into(),
                deadline: task.deadline(),
            });
        }
    }

    /// Returns the task that occupied the unit during the previous tick.
    fn retire_previous<S: EventSink>(&mut self, sink: &mut S) -> Option<TaskId> {
        let id = self.unit.current()?;
        let task = &self.tasks[id];
        if task.is_finished() {
            let was_alive = self.registry.remove(id);
            debug_assert!(was_alive, "finished task {} left the registry early", id);
            self.metrics[task.level()].completed += 1;
            emit(sink, EventKind::Completed, || SimEvent::Completed {
                tick: self.now,
                task: task.into(),
            });
        } else {
            self.policy.submit(task);
        }
        Some(id)
    }

    fn select_next<S: EventSink>(&mut self, sink: &mut S) -> Option<TaskId> {
        loop {
            match self.policy.next() {
                Some(id) if self.tasks[id].has_missed_deadline() => {
                    emit(sink, EventKind::Discarded, || SimEvent::Discarded {
                        tick: self.now,
                        task: (&self.tasks[id]).into(),
                    });
                },
                next => return next,
            }
        }
    }

    fn execute<S: EventSink>(&mut self, previous: Option<TaskId>, next: Option<TaskId>, sink: &mut S) {
        let now = self.now;
        self.unit.assign(next);
        self.unit.tick(&mut self.tasks);

        let Some(id) = next else {
            emit(sink, EventKind::Idle, || SimEvent::Idle { tick: now });
            return;
        };
        debug_assert!(
            !self.tasks[id].has_missed_deadline(),
            "task {} executed after missing its deadline",
            id
        );
        self.metrics.busy_ticks += 1;

        let dispatched = previous != Some(id);
        if let Some(prev) = previous.filter(|_| dispatched) {
            self.metrics.context_switches += 1;
            let prev = &self.tasks[prev];
            if !prev.is_finished() && !prev.has_missed_deadline() {
                self.metrics.preemptions += 1;
                emit(sink, EventKind::Preempted, || SimEvent::Preempted {
                    tick: now,
                    task: prev.into(),
                    remaining: prev.remaining_time(),
                });
            }
        }

        let task = &self.tasks[id];
        emit(sink, EventKind::Running, || SimEvent::Running {
            tick: now,
            task: task.into(),
            remaining: task.remaining_time(),
            dispatched,
        });
    }
}

/// Builds and records the event only if the sink is interested in it.
fn emit<S: EventSink, F: FnOnce() -> SimEvent>(sink: &mut S, kind: EventKind, event: F) {
    if sink.accepts(kind) {
        sink.record(event())
    }
}
