//! Command handlers

use crate::commands::{PlanArgs, PlanFormat, SetupArgs};
use crate::error::{CliError, CliResult};
use crate::output::Reporter;
use cockpit_e2e::scenario::rest::{plan_request, RestBackend, RestBody, RestRequest};
use cockpit_e2e::{suites, Call, E2eConfig, ResourceDir, Scenario, ScenarioReport, ScenarioRunner};
use std::fmt::Write as _;
use std::path::Path;

/// Look up and build a named scenario
pub fn resolve_scenario(name: &str, resources: &ResourceDir) -> CliResult<Scenario> {
    match suites::build(name, resources) {
        Some(scenario) => Ok(scenario?),
        None => Err(CliError::UnknownScenario {
            name: name.to_string(),
        }),
    }
}

/// One line per catalog entry
#[must_use]
pub fn render_catalog() -> String {
    let width = suites::catalog()
        .iter()
        .map(|entry| entry.name.len())
        .max()
        .unwrap_or(0);
    suites::catalog().iter().fold(String::new(), |mut out, entry| {
        let _ = writeln!(out, "{:<width$}  {}", entry.name, entry.description);
        out
    })
}

fn describe_request(request: &RestRequest) -> String {
    let detail = match &request.body {
        RestBody::Json(body) => body.to_string(),
        RestBody::Deployment(deployment) => {
            let files: Vec<String> = deployment
                .files
                .iter()
                .map(|f| format!("{} ({} bytes)", f.name, f.content.len()))
                .collect();
            format!("{} [{}]", deployment.deployment_name, files.join(", "))
        }
    };
    format!("{} {} {detail}", request.method, request.path_string())
}

fn describe_call(call: &Call<'_>) -> CliResult<String> {
    let request = plan_request(call.resource, call.action, call.payload)?;
    Ok(format!(
        "{}.{}  {}",
        call.resource,
        call.action,
        describe_request(&request)
    ))
}

/// Render a scenario without executing it
pub fn render_plan(scenario: &Scenario, format: PlanFormat) -> CliResult<String> {
    match format {
        PlanFormat::Text => {
            let mut out = String::new();
            for (n, call) in scenario.calls().enumerate() {
                let _ = writeln!(out, "{:>3}. {}", n + 1, describe_call(&call)?);
            }
            Ok(out)
        }
        PlanFormat::Json => Ok(serde_json::to_string_pretty(scenario)? + "\n"),
        PlanFormat::Yaml => Ok(serde_yaml_ng::to_string(scenario)?),
    }
}

/// `plan`: print what a scenario would send
pub fn plan(args: &PlanArgs) -> CliResult<()> {
    let resources = args
        .resources
        .as_ref()
        .map_or_else(ResourceDir::default, |dir| ResourceDir::new(dir));
    let scenario = resolve_scenario(&args.scenario, &resources)?;
    print!("{}", render_plan(&scenario, args.format)?);
    Ok(())
}

/// Environment configuration with command-line overrides applied
pub fn load_config(
    path: Option<&Path>,
    rest_url: Option<&str>,
    resources: Option<&Path>,
) -> CliResult<E2eConfig> {
    let mut config = match path {
        Some(path) => E2eConfig::load(path)?,
        None => E2eConfig::default(),
    };
    if let Some(url) = rest_url {
        config = config.with_rest_url(url);
    }
    if let Some(dir) = resources {
        config = config.with_resources_dir(dir);
    }
    if config.rest_url.trim().is_empty() {
        return Err(CliError::config("REST url must not be empty"));
    }
    Ok(config)
}

/// `setup`: execute a scenario against the configured engine
pub async fn setup(args: &SetupArgs, reporter: &Reporter) -> CliResult<ScenarioReport> {
    let config = load_config(
        args.config.as_deref(),
        args.rest_url.as_deref(),
        args.resources.as_deref(),
    )?;
    let scenario = resolve_scenario(&args.scenario, &config.resources())?;

    reporter.header(&format!("{} -> {}", args.scenario, config.rest_url));
    let backend = RestBackend::with_timeout(config.rest_url.clone(), config.request_timeout());
    let mut runner = ScenarioRunner::new(backend);

    let report = runner.run(&scenario).await?;
    for call in &report.calls {
        let timing = reporter.dim(&format!("({}ms)", call.duration_ms));
        reporter.success(&format!(
            "{}.{} #{} {timing}",
            call.resource, call.action, call.payload_index
        ));
    }
    reporter.info(&format!(
        "{} calls, {}ms in engine, {}ms total (run {})",
        report.calls.len(),
        report.total_duration_ms(),
        report.wall_time_ms(),
        report.run_id
    ));
    Ok(report)
}
