//! Error types for the eigenvalue solver.
//!
//! Every fallible operation returns [`Error`] through the crate [`Result`]
//! alias. None of these are recoverable: the driver hands them straight back
//! to the caller and the run ends.

use std::path::PathBuf;

/// Errors that can occur while setting up or running a k-eigenvalue calculation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing an output or source file failed.
    #[error("i/o error on {path}: {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A particle bank could not grow to the requested number of sites.
    #[error("unable to grow particle bank to {requested} sites")]
    BankGrowth {
        /// Number of sites that was needed.
        requested: usize,
    },

    /// A persisted source bank holds a different number of particles than the run uses.
    #[error("source bank holds {found} particles, expected {expected}")]
    SourceSizeMismatch {
        /// Configured particle count.
        expected: usize,
        /// Number of records in the snapshot.
        found: usize,
    },

    /// A generation produced no fission sites, so there is nothing to resample from.
    #[error("fission bank is empty: the source population died out")]
    EmptyFissionBank,

    /// A statistic was requested from too few samples.
    #[error("statistic needs at least {required} samples, got {found}")]
    InsufficientSamples {
        /// Minimum sample count.
        required: usize,
        /// Samples available.
        found: usize,
    },

    /// A particle lies outside the mesh covering the geometry.
    #[error("particle at {position:?} lies outside the mesh")]
    OutsideMesh {
        /// Offending position.
        position: [f64; 3],
    },

    /// Settings failed validation.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A settings file could not be parsed.
    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),

    /// A binary source snapshot could not be encoded or decoded.
    #[error("failed to encode or decode source bank: {0}")]
    Encoding(#[from] bincode::Error),
}

impl Error {
    /// Wrap an i/o error together with the file it came from.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
