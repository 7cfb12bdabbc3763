use core::fmt;

/// Result alias for `folio`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the clustering and recommendation primitives.
///
/// Per-item conditions (a malformed embedding, one failed candidate k, one
/// failed record write) are absorbed at the call site with a log entry and
/// never surface through this type. Only whole-batch conditions do.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input was empty, or no record carried a usable embedding.
    EmptyInput,

    /// Vector dimension disagreed with the rest of the batch.
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// Invalid number of clusters requested.
    InvalidClusterCount {
        /// Requested count.
        requested: usize,
        /// Number of items.
        n_items: usize,
    },

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// A record write through the persistence sink failed.
    Persistence(String),

    /// Generic error with message.
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInput => write!(f, "empty input provided"),
            Error::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
            Error::InvalidClusterCount { requested, n_items } => {
                write!(f, "cannot create {requested} clusters from {n_items} items")
            }
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
            Error::Persistence(msg) => write!(f, "persistence failure: {msg}"),
            Error::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}
