mod dispatcher;
mod error;
mod record;
mod search;
mod sink;
mod state;

use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use record::{Severity, SeverityFilter};
use sink::FileSink;
use state::SearchLock;

/// Searches for SHA-256 digests ending in "0000"
///
/// Every worker hashes 65535 random 4-byte inputs and logs each digest. Matches are logged at
/// `trace` and mirrored to stderr, everything else at `info` with the worker id.
#[derive(Debug, StructOpt)]
#[structopt(setting = structopt::clap::AppSettings::AllowNegativeNumbers)]
struct Cli {
    /// Number of worker threads; anything that isn't a positive integer means one per CPU
    threads: Option<String>,
    /// File the records are appended to
    #[structopt(long, default_value = "Log.log", parse(from_os_str))]
    log_file: PathBuf,
    /// Only write matches to the log file
    #[structopt(long)]
    matches_only: bool,
    /// Don't mirror matches to stderr
    #[structopt(short, long)]
    quiet: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Cli::from_args();
    init_tracing();

    let workers = dispatcher::resolve_worker_count(args.threads.as_deref());
    let seed = dispatcher::time_seed();

    let file_filter = match args.matches_only {
        true => SeverityFilter::only(Severity::Trace),
        false => SeverityFilter::all(),
    };
    let console = if args.quiet { None } else { Some(SeverityFilter::only(Severity::Trace)) };
    let sink = FileSink::open(&args.log_file)
        .with_context(|| format!("open log file {}", args.log_file.display()))?
        .with_file_filter(file_filter)
        .with_console_filter(console);
    let lock = SearchLock::new(StdRng::seed_from_u64(seed), sink);

    info!(workers, seed, log_file = %args.log_file.display(), "starting search");
    let summary = dispatcher::dispatch(workers, &lock).context("search failed")?;
    info!(
        workers = summary.workers,
        records = summary.records,
        matches = summary.matches,
        elapsed_secs = summary.elapsed.as_secs_f32(),
        "search complete"
    );

    Ok(())
}
