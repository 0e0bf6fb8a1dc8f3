//! Store configuration.
//!
//! The defaults give the table and function names hosts and queries already
//! rely on: `temp.PER_THREAD_KV`, `ptkv_set(key, value)` and `ptkv_get(key)`.
//! `KvConfig` deserializes with every field optional, so a host can embed
//! it in its own configuration file.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sql::validate_identifier;
use crate::store::ThreadLocalKv;

/// Default name of the store table (in the `temp` schema).
pub const DEFAULT_TABLE: &str = "PER_THREAD_KV";

/// Default SQL name of the setter function.
pub const DEFAULT_SETTER: &str = "ptkv_set";

/// Default SQL name of the getter function.
pub const DEFAULT_GETTER: &str = "ptkv_get";

/// Names used by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KvConfig {
    /// Table name, created in the `temp` schema
    pub table: String,
    /// SQL name of the two-argument setter
    pub setter: String,
    /// SQL name of the one-argument getter
    pub getter: String,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            setter: DEFAULT_SETTER.to_string(),
            getter: DEFAULT_GETTER.to_string(),
        }
    }
}

impl KvConfig {
    /// Check every name is a plain SQL identifier.
    ///
    /// The table name ends up in statement text, so this runs before any
    /// statement is built.
    pub fn validate(&self) -> Result<()> {
        validate_identifier("table name", &self.table)?;
        validate_identifier("setter name", &self.setter)?;
        validate_identifier("getter name", &self.getter)?;
        Ok(())
    }
}

/// Builder for a [`ThreadLocalKv`].
///
/// # Example
///
/// ```ignore
/// let conn = Connection::open_in_memory()?;
/// let kv = ThreadLocalKv::builder()
///     .table("SCRATCH")
///     .setter("scratch_set")
///     .getter("scratch_get")
///     .init(&conn)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct KvBuilder {
    config: KvConfig,
}

impl KvBuilder {
    /// Create a builder with default names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn config(mut self, config: KvConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the table name.
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.config.table = name.into();
        self
    }

    /// Set the setter function name.
    pub fn setter(mut self, name: impl Into<String>) -> Self {
        self.config.setter = name.into();
        self
    }

    /// Set the getter function name.
    pub fn getter(mut self, name: impl Into<String>) -> Self {
        self.config.getter = name.into();
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<KvConfig> {
        self.config.validate()?;
        Ok(self.config)
    }

    /// Create the store on `conn`.
    pub fn init(self, conn: &Connection) -> Result<ThreadLocalKv<'_>> {
        ThreadLocalKv::with_config(conn, self.config)
    }
}
