use std::sync::{Mutex, MutexGuard};

use rand::RngCore;

use crate::error::{Result, SearchError};
use crate::record::LogRecord;
use crate::search::{Candidate, CANDIDATE_LEN};
use crate::sink::RecordSink;

/// Everything the workers share: the random source and the log sink.
pub struct SharedState<R, S> {
    pub rng: R,
    pub sink: S,
}

/// The single lock guarding `SharedState`. Workers borrow it for their whole lifetime.
pub struct SearchLock<R, S> {
    inner: Mutex<SharedState<R, S>>,
}

impl<R: RngCore, S: RecordSink> SearchLock<R, S> {
    pub fn new(rng: R, sink: S) -> Self {
        SearchLock { inner: Mutex::new(SharedState { rng, sink }) }
    }

    fn lock(&self) -> Result<MutexGuard<'_, SharedState<R, S>>> {
        self.inner.lock().map_err(|_| SearchError::Poisoned)
    }

    /// Draws `CANDIDATE_LEN` uniform bytes from the shared random source.
    pub fn draw_candidate(&self) -> Result<Candidate> {
        let mut candidate = [0u8; CANDIDATE_LEN];
        self.lock()?.rng.fill_bytes(&mut candidate);
        Ok(candidate)
    }

    /// Writes one record while holding the lock.
    pub fn append(&self, record: &LogRecord) -> Result<()> {
        self.lock()?.sink.append(record)?;
        Ok(())
    }

    #[cfg(test)]
    pub fn into_inner(self) -> Result<SharedState<R, S>> {
        self.inner.into_inner().map_err(|_| SearchError::Poisoned)
    }
}
