use thiserror::Error;

/// Failures surfaced by the reconciliation service.
///
/// A ledger or payments path that does not exist is not an error — the
/// loaders return an empty dataset for it. These variants cover genuine I/O
/// failure on a file that was expected to be readable.
#[derive(Error, Debug)]
pub enum ReconError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ReconError>;
