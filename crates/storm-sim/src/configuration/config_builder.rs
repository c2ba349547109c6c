use crate::config::{Config, DEFAULT_DURATION};
use crate::engine::Simulator;
use crate::schedule::PolicyKind;
use crate::task::TaskTemplate;
use crate::Tick;

/* Type state of the config builder */
/// Represents a state of the [ConfigBuilder]
/// Used to ensure that only complete configurations can be created
pub trait ConfigState {}

/// The config state in which the task set has yet to be configured
#[derive(Debug, Clone, Default, Copy)]
pub struct ConfigureTasks {}
impl ConfigState for ConfigureTasks {}

/// The config state in which the task set is configured
#[derive(Debug, Clone)]
pub struct TasksConfigured {
    templates: Vec<TaskTemplate>,
}
impl ConfigState for TasksConfigured {}

/// The config state in which task set and policy are configured
#[derive(Debug, Clone)]
pub struct PolicyConfigured {
    templates: Vec<TaskTemplate>,
    policy: PolicyKind,
}
impl ConfigState for PolicyConfigured {}

/// The main entry point of the library.
/// Use the various methods to construct a configuration for a simulation run.
///
/// An example construction:
/// ````
/// use storm_sim::{ConfigBuilder, Criticality, NoSink, PolicyKind, TaskTemplate};
///
/// let report = ConfigBuilder::new()
///     .template(TaskTemplate::implicit("BrakeControl", Criticality::Critical, 5, 20).unwrap())
///     .template(TaskTemplate::implicit("PlayMusic", Criticality::NonCritical, 10, 40).unwrap())
///     .policy(PolicyKind::CriticalityOrdered)
///     .duration(100)
///     .build()
///     .run(NoSink {});
/// assert_eq!(report.metrics.level(Criticality::Critical).missed, 0);
/// ````
#[derive(Debug, Clone)]
pub struct ConfigBuilder<S: ConfigState> {
    /// The number of ticks to simulate
    duration: Tick,
    /// The current state of the config
    state: S,
}

impl ConfigBuilder<ConfigureTasks> {
    /// Creates a new configuration simulating [DEFAULT_DURATION] ticks.
    pub fn new() -> Self {
        ConfigBuilder {
            duration: DEFAULT_DURATION,
            state: ConfigureTasks {},
        }
    }

    /// Use the given task templates. Instances are released in the order of the templates.
    pub fn templates(self, templates: impl IntoIterator<Item = TaskTemplate>) -> ConfigBuilder<TasksConfigured> {
        let ConfigBuilder { duration, state: _ } = self;
        ConfigBuilder {
            duration,
            state: TasksConfigured {
                templates: templates.into_iter().collect(),
            },
        }
    }

    /// Start the task set with a single template.
    pub fn template(self, template: TaskTemplate) -> ConfigBuilder<TasksConfigured> {
        self.templates([template])
    }
}

impl Default for ConfigBuilder<ConfigureTasks> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ConfigState> ConfigBuilder<S> {
    /// Sets the number of simulated ticks.
    pub fn duration(mut self, duration: Tick) -> Self {
        self.duration = duration;
        self
    }
}

impl ConfigBuilder<TasksConfigured> {
    /// Appends another template to the task set.
    pub fn template(mut self, template: TaskTemplate) -> Self {
        self.state.templates.push(template);
        self
    }

    /// Sets the policy ordering the ready tasks.
    pub fn policy(self, policy: PolicyKind) -> ConfigBuilder<PolicyConfigured> {
        let ConfigBuilder {
            duration,
            state: TasksConfigured { templates },
        } = self;
        ConfigBuilder {
            duration,
            state: PolicyConfigured { templates, policy },
        }
    }
}

impl ConfigBuilder<PolicyConfigured> {
    /// Finalizes the configuration.
    pub fn build(self) -> Config {
        let ConfigBuilder {
            duration,
            state: PolicyConfigured { templates, policy },
        } = self;
        Config::new(templates, policy, duration)
    }

    /// Finalizes the configuration and turns it into a [Simulator].
    pub fn simulator(self) -> Simulator {
        self.build().simulator()
    }
}
