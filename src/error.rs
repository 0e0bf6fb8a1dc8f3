//! Error types for the per-thread key/value store.
//!
//! Engine errors are carried through untouched so the diagnostic text SQLite
//! produced is what the caller (or the failing query) sees.

use std::fmt;

use thiserror::Error;

use crate::types::ThreadId;

/// The setup step that failed during [`ThreadLocalKv::init`](crate::ThreadLocalKv::init).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupStep {
    /// Dropping the previous table instance or creating the new one.
    CreateTable,
    /// Registering one of the scalar functions.
    RegisterFunction {
        /// SQL name of the function
        name: String,
        /// Number of arguments it was registered with
        n_arg: i32,
    },
}

impl fmt::Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupStep::CreateTable => f.write_str("create per-thread kv table"),
            SetupStep::RegisterFunction { name, n_arg } => {
                write!(f, "create {}/{} function", name, n_arg)
            }
        }
    }
}

/// All store errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Table creation or function registration failed.
    ///
    /// The connection cannot be used with this store's functions.
    #[error("could not {step}: {source}")]
    Setup {
        /// Which step failed
        step: SetupStep,
        /// Engine error
        #[source]
        source: rusqlite::Error,
    },

    /// A generated read or write statement failed.
    ///
    /// Displays exactly as the engine error does.
    #[error(transparent)]
    Statement(#[from] rusqlite::Error),

    /// Dropping the table or removing the functions failed.
    ///
    /// Only ever logged; teardown never propagates errors.
    #[error("could not drop per-thread kv table: {0}")]
    Teardown(#[source] rusqlite::Error),

    /// Key rejected before reaching the engine.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Function argument of an unusable type.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Table or function name that is not a plain SQL identifier.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The internal setter failed for a predefined key.
    #[error("could not set predefined key \"{key}\" on thread {thread_id}: {source}")]
    Seed {
        /// Worker thread that was seeding
        thread_id: ThreadId,
        /// Key being written
        key: String,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error came from `init`.
    pub fn is_setup(&self) -> bool {
        matches!(self, Error::Setup { .. })
    }

    /// Check if the input was rejected before the engine ran anything.
    pub fn is_invalid_input(&self) -> bool {
        match self {
            Error::InvalidKey(_) | Error::InvalidArgument(_) => true,
            Error::Seed { source, .. } => source.is_invalid_input(),
            _ => false,
        }
    }

    /// The engine error underneath, if any.
    pub fn engine_error(&self) -> Option<&rusqlite::Error> {
        match self {
            Error::Setup { source, .. } => Some(source),
            Error::Statement(e) | Error::Teardown(e) => Some(e),
            Error::Seed { source, .. } => source.engine_error(),
            _ => None,
        }
    }
}

// Errors leaving a scalar function. Engine failures keep their result code
// and message; everything else becomes a user function error whose Display
// text is reported to the evaluating query.
impl From<Error> for rusqlite::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Statement(inner) => inner,
            other => rusqlite::Error::UserFunctionError(Box::new(other)),
        }
    }
}
