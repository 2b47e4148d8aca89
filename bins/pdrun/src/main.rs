use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use engine::Report;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    pdrun(args)
}

/// Arguments to [`pdrun`].
#[derive(Parser)]
#[command(
    version,
    about,
    long_about = "Run a routing, synthesis or buffering job and print its report as JSON"
)]
pub struct Args {
    /// The job file, in TOML or JSON.
    job: PathBuf,
    /// The path where the JSON report should be saved.
    ///
    /// If unspecified, the report will be written to stdout.
    #[arg(short, long)]
    out: Option<PathBuf>,
}

/// Load, check and run a job, then write its report.
pub fn pdrun(args: Args) -> anyhow::Result<()> {
    let job = engine::config::load_job(&args.job)
        .with_context(|| format!("Failed to load job {:?}.", args.job))?;
    info!(kind = job.kind(), "loaded job");

    if let Some(issues) = job.validate() {
        if !issues.is_empty() {
            info!(
                errors = issues.num_errors(),
                warnings = issues.num_warnings(),
                "checked design"
            );
        }
    }

    let report = match engine::run(&job) {
        Ok(report) => report,
        Err(engine::Error::Buffering(failure)) => {
            write_report(&Report::Buffering(failure.result.clone()), args.out.as_ref())?;
            return Err(failure.error).context("Buffer insertion failed.");
        }
        Err(err) => return Err(err).with_context(|| format!("Failed to run {} job.", job.kind())),
    };
    write_report(&report, args.out.as_ref())?;

    if !report.success() {
        warn!("job finished without full success");
    }
    Ok(())
}

fn write_report(report: &Report, out: Option<&PathBuf>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report.")?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {parent:?}."))?;
            }
            fs::write(path, json + "\n")
                .with_context(|| format!("Failed to write report to {path:?}."))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}").context("Failed to write report to stdout.")?;
        }
    }
    Ok(())
}
