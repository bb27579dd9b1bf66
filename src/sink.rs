use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::Path;

use chrono::{Local, NaiveDateTime};

use crate::record::{LogRecord, Severity, SeverityFilter};

/// Destination for log records.
///
/// Callers serialize access (see `state::SearchLock`); an implementation only has to write each
/// record as one complete line.
pub trait RecordSink: Send {
    fn append(&mut self, record: &LogRecord) -> io::Result<()>;
}

/// Append-mode log file with an optional stderr mirror.
pub struct FileSink {
    file: LineWriter<File>,
    file_filter: SeverityFilter,
    console_filter: Option<SeverityFilter>,
}

impl FileSink {
    /// Opens (or creates) `path` for appending. Both severities go to the file, only matches are
    /// mirrored to stderr.
    pub fn open(path: &Path) -> io::Result<FileSink> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(FileSink {
            file: LineWriter::new(file),
            file_filter: SeverityFilter::all(),
            console_filter: Some(SeverityFilter::only(Severity::Trace)),
        })
    }

    pub fn with_file_filter(mut self, filter: SeverityFilter) -> Self {
        self.file_filter = filter;
        self
    }

    /// `None` turns the stderr mirror off.
    pub fn with_console_filter(mut self, filter: Option<SeverityFilter>) -> Self {
        self.console_filter = filter;
        self
    }
}

impl RecordSink for FileSink {
    fn append(&mut self, record: &LogRecord) -> io::Result<()> {
        let now = Local::now().naive_local();

        if self.file_filter.accepts(record.severity) {
            // Single write call per line so the record can't tear.
            self.file.write_all(file_line(&now, record).as_bytes())?;
            self.file.flush()?;
        }

        if let Some(filter) = self.console_filter {
            if filter.accepts(record.severity) {
                let mut stderr = io::stderr().lock();
                stderr.write_all(console_line(&now, record).as_bytes())?;
                stderr.flush()?;
            }
        }

        Ok(())
    }
}

/// `[2024-01-31 12:00:00]: <info> Thread : 0 Hash : ...`
pub fn file_line(at: &NaiveDateTime, record: &LogRecord) -> String {
    format!("[{}]: <{}> {}\n", at.format("%Y-%m-%d %H:%M:%S"), record.severity, record)
}

/// `[2024/01/31  12:00:00] <trace> Hash : ...`
pub fn console_line(at: &NaiveDateTime, record: &LogRecord) -> String {
    format!("[{}] <{}> {}\n", at.format("%Y/%m/%d  %H:%M:%S"), record.severity, record)
}

/// In-memory sink, keeps every record it is given.
#[cfg(test)]
impl RecordSink for Vec<LogRecord> {
    fn append(&mut self, record: &LogRecord) -> io::Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Checks one line of the log file: timestamp, severity tag, body and a 64 char hex digest.
#[cfg(test)]
pub fn is_well_formed(line: &str) -> bool {
    if line.len() <= 22 || !line.is_char_boundary(22) {
        return false;
    }
    let (stamp, rest) = line.split_at(22);
    let stamp_ok = stamp.starts_with('[')
        && stamp.ends_with("]:")
        && stamp[1..20].chars().enumerate().all(|(i, c)| match i {
            4 | 7 => c == '-',
            10 => c == ' ',
            13 | 16 => c == ':',
            _ => c.is_ascii_digit(),
        });
    let digest = rest.rsplit(' ').next().unwrap_or("");
    stamp_ok
        && (rest.starts_with(" <info> Thread : ") || rest.starts_with(" <trace> Hash : "))
        && digest.len() == 64
        && digest.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
}
