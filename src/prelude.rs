//! Convenient imports.
//!
//! ```ignore
//! use ptkv::prelude::*;
//!
//! let conn = Connection::open_in_memory()?;
//! let kv = ThreadLocalKv::init(&conn)?;
//! ```

// Store
pub use crate::store::ThreadLocalKv;
pub use crate::config::{KvBuilder, KvConfig};

// Error handling
pub use crate::error::{Error, Result};

// Core types
pub use crate::types::{Entry, ThreadId};

// Re-export the engine connection for convenience
pub use rusqlite::Connection;
