use std::io;

/// A temperature token that does not match `-?D.D` or `-?DD.D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("bad measurement at bytes {start}..{end}")]
pub struct ParseError {
    pub start: usize,
    pub end: usize,
}

/// Every failure is fatal for the run; nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed line at bytes {start}..{end}")]
    MalformedLine { start: usize, end: usize },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("key table full ({capacity} slots), raise the capacity and rerun")]
    TableFull { capacity: usize },

    #[error("keys {existing:?} and {incoming:?} both hash to slot {slot}")]
    KeyCollision {
        slot: usize,
        existing: String,
        incoming: String,
    },

    #[error("no line terminator within {window} bytes of offset {offset}")]
    PartitionBoundaryNotFound { offset: usize, window: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Stopped early because another worker failed first.
    #[error("worker {worker} stopped after another worker failed")]
    Cancelled { worker: usize },

    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
