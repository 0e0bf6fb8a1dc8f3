//! # ptkv
//!
//! Per-thread key/value scratch store on top of SQLite.
//!
//! Each worker thread owns a connection; [`ThreadLocalKv`] puts one table in
//! that connection's `temp` schema and registers two scalar functions, so
//! queries can stash and fetch named values mid-evaluation:
//!
//! ```sql
//! SELECT ptkv_set('mode', 'fast');
//! SELECT ptkv_get('mode');          -- 'fast'
//! SELECT ptkv_get('missing');       -- ''
//! ```
//!
//! Host code seeds predefined keys directly with
//! [`ThreadLocalKv::set_internal`], skipping the function call.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ptkv::prelude::*;
//!
//! let conn = Connection::open_in_memory()?;
//! let kv = ThreadLocalKv::init(&conn)?;
//! kv.set_internal(0, "root", "/data")?;
//!
//! let root: String = conn.query_row("SELECT ptkv_get('root')", [], |r| r.get(0))?;
//! kv.teardown();
//! ```
//!
//! ## Semantics
//!
//! - Keys are unique; a write replaces the previous entry in one statement.
//! - Keys and values are bound as parameters, never spliced into SQL text,
//!   so quote characters are stored as-is.
//! - Empty keys are rejected on write.
//! - Reading a missing key yields an empty string. Use
//!   [`ThreadLocalKv::lookup`] to tell a missing key from an empty value.

#![warn(missing_docs)]

mod config;
mod error;
mod functions;
mod sql;
mod store;
mod types;

pub mod prelude;

pub use config::{KvBuilder, KvConfig, DEFAULT_GETTER, DEFAULT_SETTER, DEFAULT_TABLE};
pub use error::{Error, Result, SetupStep};
pub use store::{init, set_internal, teardown, ThreadLocalKv};
pub use types::{Entry, ThreadId};
