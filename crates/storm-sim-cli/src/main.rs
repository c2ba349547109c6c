use std::error::Error;
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, ValueEnum};
use clap_complete::generate;
use clap_complete::shells::*;
#[cfg(feature = "public")]
use human_panic::setup_panic;
use storm_sim::{PolicyKind, TaskTemplate, Tick, DEFAULT_DURATION};

use crate::config::{Config, OutputFormat, Verbosity};
use crate::output::OutputChannel;

mod config;
mod output;
mod tasks;

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about,
    long_about = "Simulates periodic tasks of mixed criticality competing for a single execution unit and compares how \
                  scheduling policies cope with overload."
)]
#[command(propagate_version = true)]
enum Cli {
    /// Simulate the task set under a single scheduling policy
    Run {
        #[command(flatten)]
        tasks: CliTaskSet,

        /// The scheduling policy: edf or mc
        #[arg(short, long, default_value = "edf")]
        policy: PolicyKind,

        #[command(flatten)]
        output: CliOutputChannel,

        /// Sets the output verbosity
        #[arg(short, long, value_enum, default_value_t)]
        verbosity: Verbosity,

        /// Set the formatting of the simulator output
        #[arg(long, value_enum, default_value_t)]
        output_format: OutputFormat,
    },

    /// Simulate the task set under every scheduling policy and compare the outcomes
    Compare {
        #[command(flatten)]
        tasks: CliTaskSet,

        #[command(flatten)]
        output: CliOutputChannel,

        /// Sets the output verbosity
        #[arg(short, long, value_enum, default_value_t)]
        verbosity: Verbosity,

        /// Set the formatting of the simulator output
        #[arg(long, value_enum, default_value_t)]
        output_format: OutputFormat,
    },

    /// Generate a SHELL completion script and print it to stdout
    Completions {
        #[arg(value_enum, value_name = "SHELL")]
        shell: Shell,
    },
}

#[derive(ValueEnum, Copy, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}
impl Shell {
    fn generate(&self) {
        let mut app = Cli::command();
        let mut fd = std::io::stdout();
        match self {
            Shell::Bash => generate(Bash, &mut app, "storm-sim", &mut fd),
            Shell::Zsh => generate(Zsh, &mut app, "storm-sim", &mut fd),
            Shell::Fish => generate(Fish, &mut app, "storm-sim", &mut fd),
            Shell::PowerShell => generate(PowerShell, &mut app, "storm-sim", &mut fd),
            Shell::Elvish => generate(Elvish, &mut app, "storm-sim", &mut fd),
        }
    }
}

#[derive(Clone, Debug, Args)]
#[command(next_help_heading = "Task Set")]
struct CliTaskSet {
    /// Read the task set from a CSV file with the columns name, level, execution_time, deadline and period.
    /// Without it the built-in storm scenario is simulated.
    #[arg(short, long)]
    tasks: Option<PathBuf>,
    /// The number of ticks to simulate
    #[arg(short, long, default_value_t = DEFAULT_DURATION)]
    duration: Tick,
}

impl CliTaskSet {
    fn templates(&self) -> Result<Vec<TaskTemplate>, tasks::TaskFileError> {
        match &self.tasks {
            Some(path) => tasks::load_templates(path),
            None => Ok(tasks::storm_task_set()),
        }
    }
}

#[derive(Clone, Debug, Args)]
#[command(next_help_heading = "Output Channel")]
struct CliOutputChannel {
    /// Print output to StdOut (default)
    #[arg(long, group = "output")]
    stdout: bool,
    /// Print output to StdErr
    #[arg(long, group = "output")]
    stderr: bool,
    /// Print output to file
    #[arg(long, group = "output")]
    output_file: Option<PathBuf>,
}

impl From<CliOutputChannel> for OutputChannel {
    fn from(output: CliOutputChannel) -> Self {
        if output.stdout {
            OutputChannel::StdOut
        } else if output.stderr {
            OutputChannel::StdErr
        } else if let Some(file) = output.output_file {
            OutputChannel::File(file)
        } else {
            OutputChannel::StdOut
        }
    }
}

fn simulate(
    tasks: CliTaskSet,
    policies: Vec<PolicyKind>,
    output: CliOutputChannel,
    verbosity: Verbosity,
    format: OutputFormat,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Config {
        templates: tasks.templates()?,
        policies,
        duration: tasks.duration,
        verbosity,
        format,
        output_channel: output.into(),
    };
    config.run()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    #[cfg(feature = "public")]
    {
        setup_panic!(Metadata {
            name: env!("CARGO_PKG_NAME").into(),
            version: env!("CARGO_PKG_VERSION").into(),
            authors: env!("CARGO_PKG_AUTHORS").into(),
            homepage: env!("CARGO_PKG_HOMEPAGE").into(),
        });
    }

    let cli = Cli::parse();

    let result = match cli {
        Cli::Run {
            tasks,
            policy,
            output,
            verbosity,
            output_format,
        } => simulate(tasks, vec![policy], output, verbosity, output_format),
        Cli::Compare {
            tasks,
            output,
            verbosity,
            output_format,
        } => simulate(tasks, PolicyKind::ALL.to_vec(), output, verbosity, output_format),
        Cli::Completions { shell } => {
            shell.generate();
            Ok(())
        },
    };
    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
    Ok(())
}
