use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rand::RngCore;
use tracing::{info, warn};

use crate::error::Result;
use crate::search::{self, WorkerReport};
use crate::sink::RecordSink;
use crate::state::SearchLock;

/// Totals over every worker of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub workers: usize,
    pub records: u64,
    pub matches: u64,
    pub elapsed: Duration,
}

/// Worker count from the optional command-line value.
///
/// Anything that isn't a positive integer falls back to the number of logical CPUs, which is
/// never less than one.
pub fn resolve_worker_count(arg: Option<&str>) -> usize {
    match arg.map(|s| s.trim().parse::<usize>()) {
        Some(Ok(n)) if n > 0 => n,
        Some(_) => {
            warn!(arg = ?arg, "ignoring invalid worker count, using available parallelism");
            hardware_parallelism()
        }
        None => hardware_parallelism(),
    }
}

fn hardware_parallelism() -> usize {
    num_cpus::get().max(1)
}

/// Seed for the process-wide random source, derived from the wall clock.
///
/// The high half of the nanosecond count is folded into the low half.
pub fn time_seed() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(since_epoch) => fold_nanos(since_epoch.as_nanos()),
        Err(err) => {
            warn!(behind = ?err.duration(), "system clock is before the unix epoch");
            fold_nanos(err.duration().as_nanos())
        }
    }
}

fn fold_nanos(nanos: u128) -> u64 {
    (nanos as u64) ^ ((nanos >> 64) as u64)
}

/// Runs `workers` search workers in parallel, one per pool thread, and waits for all of them.
///
/// Failing to start the threads is fatal; there is nothing useful to do with zero workers.
pub fn dispatch<R, S>(workers: usize, lock: &SearchLock<R, S>) -> Result<DispatchSummary>
where
    R: RngCore + Send,
    S: RecordSink,
{
    let start = Instant::now();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("search-{}", i))
        .build()?;

    // broadcast runs the closure exactly once on every pool thread and returns once all are done
    let results = pool.broadcast(|ctx| {
        let report = search::run_worker(ctx.index(), lock);
        if let Ok(report) = &report {
            info!(worker = report.worker, matches = report.matches, "worker finished");
        }
        report
    });
    let reports = results.into_iter().collect::<Result<Vec<WorkerReport>>>()?;

    Ok(DispatchSummary {
        workers: reports.len(),
        records: reports.iter().map(|r| u64::from(r.iterations)).sum(),
        matches: reports.iter().map(|r| u64::from(r.matches)).sum(),
        elapsed: start.elapsed(),
    })
}
