//! Binary entry point for the stemma spanning-tree tool.
//!
//! Installs logging first so everything after it can emit structured
//! diagnostics, then parses arguments, runs the pipeline, and prints the
//! run summary to stdout. Failures are logged with their stable error code
//! where the originating module defines one, and map to a nonzero exit.

use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, field};

use stemma_cli::cli::{self, Cli, CliError};
use stemma_cli::logging;

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        // tracing is not up yet, so this one diagnostic goes out raw.
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.downcast_ref::<CliError>().and_then(CliError::code);
            error!(
                error = %err,
                code = code.map(field::display),
                "spanning-tree run failed"
            );
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let summary = cli::run_cli(Cli::parse()).context("failed to build the spanning tree")?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    cli::render_summary(&summary, &mut out).context("failed to render summary")?;
    out.flush().context("failed to flush output")?;
    Ok(())
}
