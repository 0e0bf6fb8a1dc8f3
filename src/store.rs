//! Per-thread key/value store.
//!
//! A `ThreadLocalKv` owns one table in the `temp` schema of a borrowed
//! connection, plus the setter and getter functions registered on it. The
//! `temp` schema is private to the connection, so each worker thread that
//! opens its own connection gets its own store.
//!
//! # Example
//!
//! ```ignore
//! use ptkv::prelude::*;
//!
//! let conn = Connection::open_in_memory()?;
//! let kv = ThreadLocalKv::init(&conn)?;
//!
//! // Seed from the host
//! kv.set_internal(0, "mode", "fast")?;
//!
//! // Read and write from queries
//! conn.execute_batch("SELECT ptkv_set('mode', 'slow');")?;
//! let mode: String = conn.query_row("SELECT ptkv_get('mode')", [], |r| r.get(0))?;
//!
//! kv.teardown();
//! ```

use std::sync::Arc;

use once_cell::sync::Lazy;
use rusqlite::{params, Connection, OptionalExtension, Statement};
use tracing::{debug, error, trace, warn};

use crate::config::{KvBuilder, KvConfig};
use crate::error::{Error, Result, SetupStep};
use crate::functions;
use crate::sql::Queries;
use crate::types::{Entry, ThreadId};

static DEFAULT_QUERIES: Lazy<Arc<Queries>> =
    Lazy::new(|| Arc::new(Queries::new(crate::config::DEFAULT_TABLE)));

/// Scratch key/value store bound to one connection.
///
/// Create one per connection. Creating a second store with the same table
/// name on a connection replaces the first store's table, and dropping
/// either store then removes the table both of them use.
///
/// Dropping the value tears the store down. Hosts that keep no store value
/// use the free [`init`] and [`teardown`] instead.
///
/// The store is neither `Send` nor `Sync`: it borrows a connection, which
/// cannot be shared between threads.
#[must_use = "dropping the store drops its table and functions"]
pub struct ThreadLocalKv<'conn> {
    conn: &'conn Connection,
    config: KvConfig,
    queries: Arc<Queries>,
    live: bool,
}

impl<'conn> ThreadLocalKv<'conn> {
    /// Create the store on `conn` with default names.
    ///
    /// Drops any table left from an earlier store on the same connection,
    /// creates an empty one, and registers `ptkv_set/2` and `ptkv_get/1`.
    pub fn init(conn: &'conn Connection) -> Result<Self> {
        Self::with_config(conn, KvConfig::default())
    }

    /// Create the store on `conn` with the given names.
    pub fn with_config(conn: &'conn Connection, config: KvConfig) -> Result<Self> {
        let queries = create(conn, &config)?;
        Ok(Self {
            conn,
            config,
            queries,
            live: true,
        })
    }

    /// Create a builder for a store with custom names.
    pub fn builder() -> KvBuilder {
        KvBuilder::new()
    }

    /// The names this store uses.
    pub fn config(&self) -> &KvConfig {
        &self.config
    }

    /// The connection this store lives on.
    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// Empty keys are rejected.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(&self.queries.replace)?;
        replace_entry(&mut stmt, key, value)
    }

    /// Write a predefined key from host code.
    ///
    /// Same replacement as [`set`](Self::set). Failures are logged with the
    /// thread and key and returned as [`Error::Seed`].
    pub fn set_internal(&self, thread_id: ThreadId, key: &str, value: &str) -> Result<()> {
        seed_one(self.conn, &self.queries, thread_id, key, value)
    }

    /// Write several predefined keys, stopping at the first failure.
    ///
    /// Returns the number of keys written.
    pub fn seed<I, K, V>(&self, thread_id: ThreadId, pairs: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut written = 0;
        for (key, value) in pairs {
            self.set_internal(thread_id, key.as_ref(), value.as_ref())?;
            written += 1;
        }
        debug!(thread_id, written, "seeded per-thread kv store");
        Ok(written)
    }

    /// Read the value under `key`.
    ///
    /// Returns an empty string when the key has no entry, exactly as the
    /// getter function does.
    pub fn get(&self, key: &str) -> Result<String> {
        Ok(self.lookup(key)?.unwrap_or_default())
    }

    /// Read the value under `key`, or `None` if there is no entry.
    pub fn lookup(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare_cached(&self.queries.select)?;
        select_value(&mut stmt, key)
    }

    /// Number of entries.
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(&self.queries.count, [], |row| row.get(0))?;
        let len = usize::try_from(count)
            .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, count))?;
        Ok(len)
    }

    /// Check if the store has no entries.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// All entries, ordered by key.
    pub fn entries(&self) -> Result<Vec<Entry>> {
        let mut stmt = self.conn.prepare(&self.queries.entries)?;
        let rows = stmt.query_map([], |row| {
            Ok(Entry {
                key: row.get(0)?,
                value: row.get(1)?,
            })
        })?;
        let entries = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Drop the table and remove the functions.
    ///
    /// Best-effort: failures are logged, never returned.
    pub fn teardown(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.live {
            return;
        }
        self.live = false;
        cleanup(self.conn, &self.config, &self.queries);
    }
}

impl Drop for ThreadLocalKv<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ThreadLocalKv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadLocalKv")
            .field("table", &self.queries.qualified)
            .field("setter", &self.config.setter)
            .field("getter", &self.config.getter)
            .field("live", &self.live)
            .finish()
    }
}

// =============================================================================
// Host-process surface with default names
// =============================================================================

/// Create the default store on `conn`.
///
/// Nothing is torn down until [`teardown`] is called for the connection or
/// the connection closes.
pub fn init(conn: &Connection) -> Result<()> {
    create(conn, &KvConfig::default())?;
    Ok(())
}

/// Write a predefined key into the default store of `conn`.
pub fn set_internal(thread_id: ThreadId, conn: &Connection, key: &str, value: &str) -> Result<()> {
    seed_one(conn, &DEFAULT_QUERIES, thread_id, key, value)
}

/// Drop the default store table of `conn` and remove its functions.
///
/// Best-effort, like [`ThreadLocalKv::teardown`].
pub fn teardown(conn: &Connection) {
    cleanup(conn, &KvConfig::default(), &DEFAULT_QUERIES);
}

// =============================================================================
// Statement helpers shared with the SQL functions
// =============================================================================

pub(crate) fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidKey("key must not be empty".to_string()));
    }
    Ok(())
}

/// Run a prepared replace statement for one entry.
pub(crate) fn replace_entry(stmt: &mut Statement<'_>, key: &str, value: &str) -> Result<()> {
    check_key(key)?;
    stmt.execute(params![key, value])?;
    trace!(key, "per-thread kv entry written");
    Ok(())
}

/// Run a prepared select statement and read the single value column.
pub(crate) fn select_value(stmt: &mut Statement<'_>, key: &str) -> Result<Option<String>> {
    let value = stmt
        .query_row([key], |row| row.get::<_, Option<String>>(0))
        .optional()?;
    Ok(value.flatten())
}

fn create(conn: &Connection, config: &KvConfig) -> Result<Arc<Queries>> {
    config.validate()?;
    let queries = if config.table == crate::config::DEFAULT_TABLE {
        Arc::clone(&DEFAULT_QUERIES)
    } else {
        Arc::new(Queries::new(&config.table))
    };

    conn.execute_batch(&queries.create).map_err(|source| Error::Setup {
        step: SetupStep::CreateTable,
        source,
    })?;
    functions::register(conn, config, &queries)?;

    debug!(
        table = %queries.qualified,
        setter = %config.setter,
        getter = %config.getter,
        "per-thread kv store initialized"
    );
    Ok(queries)
}

fn seed_one(
    conn: &Connection,
    queries: &Queries,
    thread_id: ThreadId,
    key: &str,
    value: &str,
) -> Result<()> {
    let result = conn
        .prepare_cached(&queries.replace)
        .map_err(Error::from)
        .and_then(|mut stmt| replace_entry(&mut stmt, key, value));

    result.map_err(|e| {
        error!(thread_id, key, error = %e, "could not set predefined key");
        Error::Seed {
            thread_id,
            key: key.to_string(),
            source: Box::new(e),
        }
    })
}

fn cleanup(conn: &Connection, config: &KvConfig, queries: &Queries) {
    // The temp schema goes away with the connection, so nothing here is fatal.
    if let Err(e) = conn.execute_batch(&queries.drop) {
        let e = Error::Teardown(e);
        warn!(table = %queries.qualified, error = %e, "per-thread kv teardown failed");
    }
    if let Err(e) = functions::unregister(conn, config) {
        warn!(
            setter = %config.setter,
            getter = %config.getter,
            error = %e,
            "could not remove per-thread kv functions"
        );
    }
    conn.flush_prepared_statement_cache();
    debug!(table = %queries.qualified, "per-thread kv store torn down");
}
