//! cockpit-e2e CLI: prepare engine state for cockpit end-to-end tests
//!
//! ## Usage
//!
//! ```bash
//! cockpit-e2e list                                  # Named scenarios
//! cockpit-e2e plan suspension::setup1               # Calls, without sending
//! cockpit-e2e setup suspension::setup1 \
//!     --rest-url http://localhost:8080/engine-rest  # Execute against an engine
//! ```

use clap::Parser;
use cockpit_e2e_cli::{
    handlers, logging, Cli, CliConfig, CliResult, ColorChoice, Commands, Reporter, SetupArgs,
    Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    let use_color = config.color.should_color();
    logging::init(config.verbosity, use_color);
    tracing::debug!(?config, "cli configured");

    match cli.command {
        Commands::List => {
            print!("{}", handlers::render_catalog());
            Ok(())
        }
        Commands::Plan(args) => handlers::plan(&args),
        Commands::Setup(args) => run_setup(&config, use_color, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.into();
    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

fn run_setup(config: &CliConfig, use_color: bool, args: &SetupArgs) -> CliResult<()> {
    let reporter = Reporter::new(use_color, config.verbosity.is_quiet());
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(handlers::setup(args, &reporter))?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
