// crates/shard-scaler-cli/src/main.rs
// ============================================================================
// Module: Shard Scaler CLI Entry Point
// Description: Command dispatcher for scaling runs and consumer tooling.
// Purpose: Run the control loop, inspect the directory, route paths, mount.
// Dependencies: clap, serde, serde_json, shard-scaler-{aws,config,core,files}
// ============================================================================

//! ## Overview
//! `shard-scaler run` performs one invocation of the scaling loop and prints
//! its outcome as JSON; the exit code is a failure exactly when the outcome
//! status is. `mount` prepares a consumer host, `directory show` prints the
//! published directory, and `route` explains where a logical path lives.
//! Every command is synchronous; AWS adapters drive their own runtime.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use shard_scaler_aws::AwsContext;
use shard_scaler_aws::AwsSettings;
use shard_scaler_config::DEFAULT_FILE_COUNT_THRESHOLD;
use shard_scaler_config::EventSinkKind;
use shard_scaler_config::EventsConfig;
use shard_scaler_config::ScalerConfig;
use shard_scaler_core::DEFAULT_MOUNT_BASE;
use shard_scaler_core::DEFAULT_MOUNT_PREFIX;
use shard_scaler_core::DirectoryFileCounter;
use shard_scaler_core::EventLog;
use shard_scaler_core::FileEventSink;
use shard_scaler_core::NoopEventSink;
use shard_scaler_core::OutcomeStatus;
use shard_scaler_core::PlacementDecision;
use shard_scaler_core::ReadStatus;
use shard_scaler_core::RunId;
use shard_scaler_core::ScalingController;
use shard_scaler_core::ScalingEventSink;
use shard_scaler_core::ScalingOutcome;
use shard_scaler_core::ScalingStep;
use shard_scaler_core::ShardDirectory;
use shard_scaler_core::ShardProvisioner;
use shard_scaler_core::ShardRegistry;
use shard_scaler_core::ShardRoots;
use shard_scaler_core::StderrEventSink;
use shard_scaler_core::ThreadSleeper;
use shard_scaler_core::UtilizationMonitor;
use shard_scaler_core::encode_directory;
use shard_scaler_files::CommandMountRunner;
use shard_scaler_files::MountReport;
use shard_scaler_files::initialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "shard-scaler", disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the scaling loop once and print the outcome.
    Run(ConfigArgs),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Published directory utilities.
    Directory {
        /// Selected directory subcommand.
        #[command(subcommand)]
        command: DirectoryCommand,
    },
    /// Print the placement decision for a logical path.
    Route(RouteCommand),
    /// Mount every published shard on this host.
    Mount(ConfigArgs),
}

/// Config file selection shared by commands.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Optional config file path (defaults to shard-scaler.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a config file and environment for a scaling run.
    Validate(ConfigArgs),
}

/// Directory subcommands.
#[derive(Subcommand, Debug)]
enum DirectoryCommand {
    /// Print the published directory record.
    Show(ConfigArgs),
}

/// Arguments for the `route` command.
#[derive(Args, Debug)]
struct RouteCommand {
    /// Logical path to place.
    #[arg(value_name = "PATH")]
    path: String,
    /// Number of shards in the directory.
    #[arg(long, value_name = "N")]
    shards: usize,
    /// Parent directory of the shard mount points.
    #[arg(long, value_name = "DIR", default_value = DEFAULT_MOUNT_BASE)]
    mount_root: String,
    /// Mount point name prefix.
    #[arg(long, value_name = "PREFIX", default_value = DEFAULT_MOUNT_PREFIX)]
    prefix: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => command_run(&args),
        Commands::Config {
            command: ConfigCommand::Validate(args),
        } => command_config_validate(&args),
        Commands::Directory {
            command: DirectoryCommand::Show(args),
        } => command_directory_show(&args),
        Commands::Route(command) => command_route(&command),
        Commands::Mount(args) => command_mount(&args),
    }
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Outcome JSON with its status code.
#[derive(Serialize)]
struct OutcomeReport<'a> {
    /// Run outcome.
    #[serde(flatten)]
    outcome: &'a ScalingOutcome,
    /// HTTP-style status code of the outcome.
    status_code: u16,
}

/// Executes one scaling run.
fn command_run(args: &ConfigArgs) -> CliResult<ExitCode> {
    let outcome = match ScalerConfig::load(args.config.as_deref()) {
        Ok(config) => match run_scaler(&config) {
            Ok(outcome) => outcome,
            Err(message) => configuration_outcome(
                &config_log(),
                config.scaling.file_count_threshold,
                &message,
            ),
        },
        Err(err) => {
            configuration_outcome(&config_log(), DEFAULT_FILE_COUNT_THRESHOLD, &err.to_string())
        }
    };
    write_stdout_line(&render_outcome(&outcome)?)
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(outcome_exit_code(&outcome))
}

/// Wires AWS adapters into a controller and runs it once.
fn run_scaler(config: &ScalerConfig) -> Result<ScalingOutcome, String> {
    let log = build_event_log(&config.events)?;
    let policy = config.poll_policy().map_err(|err| err.to_string())?;
    let context = AwsContext::connect(&aws_settings(config)).map_err(|err| err.to_string())?;
    let controller = ScalingController::new(
        UtilizationMonitor::new(DirectoryFileCounter, config.scaling.file_count_threshold),
        ShardRegistry::new(
            context.config_store(),
            config.directory.parameter_name.trim(),
            log.clone(),
        ),
        ShardProvisioner::new(
            context.control_plane(),
            ThreadSleeper,
            config.provision_scope(),
            policy,
        ),
        context.notifier(),
        config.targets(),
        log,
    );
    Ok(controller.run())
}

/// Builds the outcome of a run rejected before measuring.
fn configuration_outcome(log: &EventLog, threshold: u64, message: &str) -> ScalingOutcome {
    let run_id = new_run_id();
    log.for_run(run_id.clone()).error(ScalingStep::ReadConfig, message);
    ScalingOutcome::pending(run_id, threshold)
        .finish(OutcomeStatus::ConfigurationError, Some(message.to_string()))
}

/// Generates a run id from the wall clock.
fn new_run_id() -> RunId {
    let timestamp_ms = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    RunId::new(format!("run-{timestamp_ms}"))
}

/// Renders an outcome as pretty JSON.
fn render_outcome(outcome: &ScalingOutcome) -> CliResult<String> {
    let report = OutcomeReport {
        outcome,
        status_code: outcome.status_code(),
    };
    serde_json::to_string_pretty(&report)
        .map_err(|err| CliError::new(format!("failed to render outcome: {err}")))
}

/// Maps an outcome to the process exit code.
fn outcome_exit_code(outcome: &ScalingOutcome) -> ExitCode {
    if outcome.status.is_failure() { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// SECTION: Config Command
// ============================================================================

/// Executes the config validation command.
fn command_config_validate(args: &ConfigArgs) -> CliResult<ExitCode> {
    let _config = ScalerConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    write_stdout_line("config ok").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Directory Command
// ============================================================================

/// Prints the published directory.
fn command_directory_show(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_consumer_config(args)?;
    let log = build_event_log(&config.events).map_err(CliError::new)?;
    let context = AwsContext::connect(&aws_settings(&config))
        .map_err(|err| CliError::new(err.to_string()))?;
    let registry =
        ShardRegistry::new(context.config_store(), config.directory.parameter_name.trim(), log);
    let read = registry.read_status();
    write_stdout_line(&render_directory(&read.directory)?)
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    match read.status {
        ReadStatus::Found | ReadStatus::Absent | ReadStatus::Malformed(_) => Ok(ExitCode::SUCCESS),
        ReadStatus::Unreachable(reason) => {
            Err(CliError::new(format!("directory store unreachable: {reason}")))
        }
    }
}

/// Renders a directory in its published wire format.
fn render_directory(directory: &ShardDirectory) -> CliResult<String> {
    encode_directory(directory)
        .map_err(|err| CliError::new(format!("failed to render directory: {err}")))
}

// ============================================================================
// SECTION: Route Command
// ============================================================================

/// Prints the placement decision for a path.
fn command_route(command: &RouteCommand) -> CliResult<ExitCode> {
    let roots = ShardRoots::new(&command.mount_root, command.prefix.clone());
    let decision =
        roots.place(&command.path, command.shards).map_err(|err| CliError::new(err.to_string()))?;
    write_stdout_line(&render_route(&decision, command.shards)?)
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Renders a placement decision as pretty JSON.
fn render_route(decision: &PlacementDecision, shard_count: usize) -> CliResult<String> {
    let value = json!({
        "path": decision.path,
        "shard_count": shard_count,
        "shard_index": decision.shard_index,
        "physical_path": decision.physical_path.display().to_string(),
    });
    render_value(&value)
}

// ============================================================================
// SECTION: Mount Command
// ============================================================================

/// Mounts the published shards on this host.
fn command_mount(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_consumer_config(args)?;
    let log = build_event_log(&config.events).map_err(CliError::new)?;
    let context = AwsContext::connect(&aws_settings(&config))
        .map_err(|err| CliError::new(err.to_string()))?;
    let registry = ShardRegistry::new(
        context.config_store(),
        config.directory.parameter_name.trim(),
        log.clone(),
    );
    let runner = CommandMountRunner::new(config.mount_timeout())
        .map_err(|err| CliError::new(err.to_string()))?;
    let report = initialize(&registry, &config.shard_roots(), &runner, &log);
    write_stdout_line(&render_value(&mount_summary(&report))?)
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    if report.mounted.is_empty() && !report.directory.is_empty() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Summarizes a mount report as JSON.
fn mount_summary(report: &MountReport) -> Value {
    let mounted: Vec<Value> = report
        .mounted
        .iter()
        .map(|shard| {
            json!({
                "index": shard.index,
                "shard_id": shard.shard_id.as_str(),
                "mount_point": shard.mount_point.display().to_string(),
            })
        })
        .collect();
    let failed: Vec<Value> = report
        .failed
        .iter()
        .map(|failure| {
            json!({
                "index": failure.index,
                "shard_id": failure.shard_id.as_str(),
                "reason": failure.reason,
            })
        })
        .collect();
    json!({
        "directory_size": report.directory.len(),
        "mounted": mounted,
        "failed": failed,
    })
}

// ============================================================================
// SECTION: Shared Helpers
// ============================================================================

/// Loads and validates consumer-side configuration.
fn load_consumer_config(args: &ConfigArgs) -> CliResult<ScalerConfig> {
    ScalerConfig::load_consumer(args.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

/// Returns AWS connection settings from the config.
fn aws_settings(config: &ScalerConfig) -> AwsSettings {
    AwsSettings {
        region: config.aws.region.clone(),
        endpoint_url: config.aws.endpoint_url.clone(),
    }
}

/// Builds the event log selected by the config.
fn build_event_log(events: &EventsConfig) -> Result<EventLog, String> {
    let sink: Arc<dyn ScalingEventSink> = match (events.sink, events.path.as_deref()) {
        (EventSinkKind::Stderr, _) => Arc::new(StderrEventSink),
        (EventSinkKind::None, _) => Arc::new(NoopEventSink),
        (EventSinkKind::File, Some(path)) => {
            let sink = FileEventSink::new(Path::new(path.trim()))
                .map_err(|err| format!("failed to open event log {path}: {err}"))?;
            Arc::new(sink)
        }
        (EventSinkKind::File, None) => {
            return Err("events.path is required for the file sink".to_string());
        }
    };
    Ok(EventLog::new(sink))
}

/// Event log used before a config is available.
fn config_log() -> EventLog {
    EventLog::new(Arc::new(StderrEventSink))
}

/// Renders a JSON value with pretty formatting.
fn render_value(value: &Value) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("failed to render output: {err}")))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
