use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("log sink error: {0}")]
    Sink(#[from] std::io::Error),
    #[error("could not start worker threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("search lock poisoned by a panicked worker")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, SearchError>;
