use std::fmt;

/// Severity class of a log record.
///
/// Matches are logged at `Trace`, every other iteration at `Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Trace,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Trace => f.write_str("trace"),
            Severity::Info => f.write_str("info"),
        }
    }
}

/// One line of search output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub severity: Severity,
    pub worker: Option<usize>,
    pub digest: String,
}

impl LogRecord {
    pub fn matched(digest: String) -> Self {
        LogRecord { severity: Severity::Trace, worker: None, digest }
    }

    pub fn missed(worker: usize, digest: String) -> Self {
        LogRecord { severity: Severity::Info, worker: Some(worker), digest }
    }
}

impl fmt::Display for LogRecord {
    /// Message body only; timestamps and severity tags belong to the sink.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.worker {
            Some(worker) => write!(f, "Thread : {} Hash : {}", worker, self.digest),
            None => write!(f, "Hash : {}", self.digest),
        }
    }
}

/// Set of severities a destination persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityFilter {
    trace: bool,
    info: bool,
}

impl SeverityFilter {
    pub fn all() -> Self {
        SeverityFilter { trace: true, info: true }
    }

    pub fn only(severity: Severity) -> Self {
        match severity {
            Severity::Trace => SeverityFilter { trace: true, info: false },
            Severity::Info => SeverityFilter { trace: false, info: true },
        }
    }

    pub fn accepts(&self, severity: Severity) -> bool {
        match severity {
            Severity::Trace => self.trace,
            Severity::Info => self.info,
        }
    }
}
