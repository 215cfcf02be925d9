//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// cockpit-e2e: set up and inspect cockpit end-to-end test scenarios
#[derive(Parser, Debug)]
#[command(name = "cockpit-e2e")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the named setup scenarios
    List,

    /// Show the calls a scenario would issue, without sending anything
    Plan(PlanArgs),

    /// Execute a scenario against a running engine
    Setup(SetupArgs),
}

/// Arguments for the plan command
#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Scenario name, e.g. `suspension::setup1`
    pub scenario: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: PlanFormat,

    /// Fixture directory (defaults to the bundled resources)
    #[arg(long)]
    pub resources: Option<PathBuf>,
}

/// Arguments for the setup command
#[derive(Parser, Debug)]
pub struct SetupArgs {
    /// Scenario name, e.g. `suspension::setup1`
    pub scenario: String,

    /// YAML environment configuration
    #[arg(short, long, env = "COCKPIT_E2E_CONFIG")]
    pub config: Option<PathBuf>,

    /// Engine REST root (overrides the configuration)
    #[arg(long, env = "COCKPIT_E2E_REST_URL")]
    pub rest_url: Option<String>,

    /// Fixture directory (overrides the configuration)
    #[arg(long)]
    pub resources: Option<PathBuf>,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Output format of the plan command
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlanFormat {
    /// One line per call
    #[default]
    Text,
    /// The scenario as JSON
    Json,
    /// The scenario as YAML
    Yaml,
}

/// Color argument
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
