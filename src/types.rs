//! Public data types of the store.

/// Identifier of the worker thread that owns a connection.
///
/// Used only as log and error context.
pub type ThreadId = usize;

/// One row of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Unique key
    pub key: String,
    /// Stored value; `None` only for rows written around the store with a NULL value
    pub value: Option<String>,
}

impl Entry {
    /// Create an entry with a text value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }
}
