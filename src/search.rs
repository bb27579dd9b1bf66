use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::Result;
use crate::record::LogRecord;
use crate::sink::RecordSink;
use crate::state::SearchLock;

/// Number of candidates every worker hashes. There is no early exit on a match.
pub const ITERATIONS: u32 = 65535;

/// Hex suffix a digest must end with to count as a match.
pub const MATCH_PATTERN: &str = "0000";

pub const CANDIDATE_LEN: usize = 4;

pub type Candidate = [u8; CANDIDATE_LEN];

/// What a worker did, for the dispatcher's summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker: usize,
    pub iterations: u32,
    pub matches: u32,
}

/// SHA-256 of the candidate as 64 lowercase hex characters.
pub fn hash_candidate(candidate: &Candidate) -> String {
    hex::encode(Sha256::digest(candidate))
}

pub fn is_match(digest: &str) -> bool {
    digest.ends_with(MATCH_PATTERN)
}

/// Runs one search worker to completion.
///
/// Every iteration draws a candidate under the lock, hashes and checks it outside the lock, then
/// appends exactly one record under the lock: a `trace` record holding just the digest on a
/// match, an `info` record with the worker id otherwise.
pub fn run_worker<R, S>(worker: usize, lock: &SearchLock<R, S>) -> Result<WorkerReport>
where
    R: RngCore,
    S: RecordSink,
{
    let mut matches = 0;
    let mut appended = 0;

    for _ in 0..ITERATIONS {
        let candidate = lock.draw_candidate()?;
        let digest = hash_candidate(&candidate);

        let record = if is_match(&digest) {
            matches += 1;
            debug!(worker, %digest, "match");
            LogRecord::matched(digest)
        } else {
            LogRecord::missed(worker, digest)
        };
        lock.append(&record)?;
        appended += 1;
    }

    Ok(WorkerReport { worker, iterations: appended, matches })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::record::Severity;
    use rand::rngs::mock::StepRng;

    const ZEROS_DIGEST: &str = "df3f619804a92fdb4057192dc43dd748ea778adc52bc498ce80524c014b81119";
    // sha256(00 00 48 e0)
    const MATCHING_INPUT: Candidate = [0x00, 0x00, 0x48, 0xe0];
    const MATCHING_DIGEST: &str =
        "08583af5a6c2eed08ac566fd0e02cece8672ecd3491668ca0929b91992460000";

    /// Fails every write after the first `limit`.
    struct FailingSink {
        limit: usize,
        written: usize,
    }

    impl RecordSink for FailingSink {
        fn append(&mut self, _record: &LogRecord) -> std::io::Result<()> {
            if self.written == self.limit {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
            }
            self.written += 1;
            Ok(())
        }
    }

    /// Replays the same byte sequence forever.
    struct ReplayRng {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl RngCore for ReplayRng {
        fn next_u32(&mut self) -> u32 {
            let mut buf = [0u8; 4];
            self.fill_bytes(&mut buf);
            u32::from_le_bytes(buf)
        }

        fn next_u64(&mut self) -> u64 {
            let mut buf = [0u8; 8];
            self.fill_bytes(&mut buf);
            u64::from_le_bytes(buf)
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for byte in dest {
                *byte = self.bytes[self.pos];
                self.pos = (self.pos + 1) % self.bytes.len();
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    #[test]
    fn digest_is_deterministic_lowercase_hex() {
        let candidate = [0xde, 0xad, 0xbe, 0xef];
        let digest = hash_candidate(&candidate);
        assert_eq!(digest, hash_candidate(&candidate));
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[test]
    fn known_digests() {
        assert_eq!(hash_candidate(&[0, 0, 0, 0]), ZEROS_DIGEST);
        assert_eq!(hash_candidate(&MATCHING_INPUT), MATCHING_DIGEST);
    }

    #[test]
    fn match_is_exact_suffix() {
        assert!(is_match("a1b20000"));
        assert!(!is_match("a1b20001"));
        assert!(!is_match("0000a1b2"));
        assert!(is_match(MATCHING_DIGEST));
        assert!(!is_match(ZEROS_DIGEST));
    }

    #[test]
    fn worker_logs_every_iteration() {
        let lock = SearchLock::new(StepRng::new(0, 0), Vec::<LogRecord>::new());
        let report = run_worker(7, &lock).unwrap();
        assert_eq!(report, WorkerReport { worker: 7, iterations: ITERATIONS, matches: 0 });

        let records = lock.into_inner().unwrap().sink;
        assert_eq!(records.len(), ITERATIONS as usize);
        assert!(records.iter().all(|r| *r == LogRecord::missed(7, ZEROS_DIGEST.to_string())));
    }

    #[test]
    fn sink_failure_stops_the_worker() {
        let lock = SearchLock::new(StepRng::new(0, 0), FailingSink { limit: 10, written: 0 });
        assert!(matches!(run_worker(0, &lock), Err(SearchError::Sink(_))));
        assert_eq!(lock.into_inner().unwrap().sink.written, 10);
    }

    #[test]
    fn worker_keeps_going_after_a_match() {
        let rng = ReplayRng { bytes: MATCHING_INPUT.to_vec(), pos: 0 };
        let lock = SearchLock::new(rng, Vec::<LogRecord>::new());
        let report = run_worker(0, &lock).unwrap();
        assert_eq!(report.matches, ITERATIONS);

        let records = lock.into_inner().unwrap().sink;
        assert_eq!(records.len(), ITERATIONS as usize);
        assert!(records.iter().all(|r| r.severity == Severity::Trace && r.worker.is_none()));
        assert_eq!(records[0].digest, MATCHING_DIGEST);
    }
}
