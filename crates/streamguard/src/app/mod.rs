#![expect(clippy::print_stdout, reason = "CLI output is emitted here")]
#![expect(clippy::print_stderr, reason = "CLI output is emitted here")]

//! CLI application layer and composition root wiring.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info, warn};

pub mod commands;
pub mod container;
pub mod error;

use crate::adapters::http::{self, ApiConfig};
use crate::app::commands::{Cli, Commands, OutputFormat, SourcesCommand};
use crate::app::container::Container;
use crate::app::error::{CliError, exit_codes};
use crate::common::telemetry;
use crate::domain::{AddSourceInput, StartOutcome, StopOutcome, WorkerStatus};
use crate::infra::SupervisorConfig;
use crate::usecases::ports::AppendOutcome;
use crate::usecases::{AddSourceUseCase, ListTasksUseCase};

const PROGRAM_NAME: &str = "streamguard";

pub struct Application;

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

impl Application {
    pub fn new() -> Self {
        Self
    }

    pub fn run(&self) -> Result<i32> {
        let cli = Cli::parse();
        let _telemetry = telemetry::init_tracing(if cli.verbose { "debug" } else { "info" });
        let command = cli.effective_command();
        debug!(command = ?command, format = ?cli.format, "CLI command parsed");

        let container = Container::new(SupervisorConfig::from_env());
        match self.execute(&container, command, cli.format) {
            Ok(code) => Ok(code),
            Err(err) => Ok(report_error(&err, cli.format)),
        }
    }

    fn execute(
        &self,
        container: &Container,
        command: Commands,
        format: OutputFormat,
    ) -> Result<i32> {
        match command {
            Commands::Serve { listen } => self.serve(container, listen),
            Commands::Status => Ok(print_status(container.supervisor().status(), format)),
            Commands::Start => self.start(container, format),
            Commands::Stop => Ok(print_stop(container.supervisor().stop(), format)),
            Commands::Sources(SourcesCommand::List) => {
                let tasks = container.list_tasks().execute();
                match format {
                    OutputFormat::Json => print_json(&tasks),
                    OutputFormat::Text => {
                        for task in &tasks {
                            println!("{}\t{}\t{}\t{}", task.id, task.platform, task.name, task.url);
                        }
                    }
                }
                Ok(exit_codes::SUCCESS)
            }
            Commands::Sources(SourcesCommand::Add { url, name }) => {
                self.add_source(container, AddSourceInput { url, name }, format)
            }
        }
    }

    fn serve(&self, container: &Container, listen: Option<String>) -> Result<i32> {
        let report = container.supervisor().reconcile();
        if report.is_clean() {
            info!("No leftover workers found");
        } else {
            info!(
                stale_pid = ?report.stale_registry_pid,
                killed = ?report.killed,
                failed = ?report.failed,
                "Reconciled leftovers from a previous run"
            );
        }

        let mut api_config = ApiConfig::from_env();
        if let Some(listen) = listen {
            api_config = api_config.with_listen(listen);
        }

        let shutdown = Arc::new(AtomicBool::new(false));
        #[cfg(unix)]
        let _signals = crate::infra::signal_handler::SignalHandler::setup(Arc::clone(&shutdown))
            .context("failed to install signal handler")?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to build async runtime")?;
        let state = Arc::new(container.api_state());
        runtime.block_on(async {
            #[cfg(not(unix))]
            {
                let shutdown = Arc::clone(&shutdown);
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        info!("Received Ctrl-C, shutting down API server");
                        shutdown.store(true, Ordering::SeqCst);
                    }
                });
            }
            http::serve(state, &api_config, Arc::clone(&shutdown)).await
        })?;

        if shutdown.load(Ordering::SeqCst) {
            info!("Supervisor exiting; the recorder keeps running until the next start reconciles it");
        }
        Ok(exit_codes::SUCCESS)
    }

    fn start(&self, container: &Container, format: OutputFormat) -> Result<i32> {
        let outcome = container
            .supervisor()
            .start()
            .map_err(|err| CliError::new(exit_codes::GENERAL_ERROR, err.to_string()))?;
        let (message, pid) = match outcome {
            StartOutcome::Started { pid } => ("Recorder started", pid),
            StartOutcome::AlreadyRunning { pid } => ("Recorder is already running", pid),
        };
        match format {
            OutputFormat::Json => print_json(&MessageOutput {
                message,
                pid: Some(pid),
            }),
            OutputFormat::Text => println!("{message} (pid {pid})"),
        }
        Ok(exit_codes::SUCCESS)
    }

    fn add_source(
        &self,
        container: &Container,
        input: AddSourceInput,
        format: OutputFormat,
    ) -> Result<i32> {
        let outcome = container.add_source().execute(input).map_err(|err| {
            let code = if err.is_invalid_input() {
                exit_codes::USAGE
            } else {
                exit_codes::IOERR
            };
            CliError::new(code, err.to_string())
        })?;
        let message = match outcome {
            AppendOutcome::Appended => "URL added to config.",
            AppendOutcome::Duplicate => "URL already present in config.",
        };
        match format {
            OutputFormat::Json => print_json(&MessageOutput { message, pid: None }),
            OutputFormat::Text => println!("{message}"),
        }
        Ok(exit_codes::SUCCESS)
    }
}

#[derive(Serialize)]
struct MessageOutput {
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pid: Option<u32>,
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => warn!(error = %err, "Failed to serialize output"),
    }
}

fn print_status(status: WorkerStatus, format: OutputFormat) -> i32 {
    match format {
        OutputFormat::Json => print_json(&status),
        OutputFormat::Text => match status.pid {
            Some(pid) => println!("Recorder running (pid {pid}, {})", status.state.label()),
            None => println!("Recorder is not running"),
        },
    }
    if status.running {
        exit_codes::SUCCESS
    } else {
        exit_codes::NOT_RUNNING
    }
}

fn print_stop(outcome: StopOutcome, format: OutputFormat) -> i32 {
    let message = match outcome {
        StopOutcome::NotRunning => "Recorder is not running",
        StopOutcome::Stopped { forced: true, .. } => "Recorder killed",
        StopOutcome::Stopped { forced: false, .. } => "Recorder stopped",
    };
    match format {
        OutputFormat::Json => print_json(&MessageOutput { message, pid: None }),
        OutputFormat::Text => println!("{message}"),
    }
    exit_codes::SUCCESS
}

fn report_error(error: &anyhow::Error, format: OutputFormat) -> i32 {
    let (code, message) = match error.chain().find_map(|e| e.downcast_ref::<CliError>()) {
        Some(cli_error) => (cli_error.exit_code, cli_error.message.clone()),
        None => (exit_codes::GENERAL_ERROR, format!("{error:#}")),
    };
    match format {
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ErrorOutput<'a> {
                success: bool,
                error: &'a str,
            }
            let output = ErrorOutput {
                success: false,
                error: &message,
            };
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&output).unwrap_or_default()
            );
        }
        OutputFormat::Text => eprintln!("{PROGRAM_NAME}: Error: {message}"),
    }
    code
}
