//! SQL text used by the store.
//!
//! Only the table name is spliced into statement text, and only after it has
//! been validated as a plain identifier. Keys and values are always bound.

use crate::error::{Error, Result};

/// Schema holding the store table. Tables there are private to a connection.
pub(crate) const SCHEMA: &str = "temp";

/// Statements for one table, built once per store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Queries {
    pub(crate) qualified: String,
    pub(crate) create: String,
    pub(crate) drop: String,
    pub(crate) replace: String,
    pub(crate) select: String,
    pub(crate) count: String,
    pub(crate) entries: String,
}

impl Queries {
    /// Build statement text for `table`, which must already be validated.
    pub(crate) fn new(table: &str) -> Self {
        let qualified = format!("{}.{}", SCHEMA, table);
        Self {
            create: format!(
                "DROP TABLE IF EXISTS {q}; CREATE TABLE {q}(key TEXT PRIMARY KEY, value TEXT);",
                q = qualified
            ),
            drop: format!("DROP TABLE IF EXISTS {};", qualified),
            // REPLACE deletes the row holding the key, then inserts, as one statement.
            replace: format!(
                "INSERT OR REPLACE INTO {}(key, value) VALUES (?1, ?2)",
                qualified
            ),
            select: format!("SELECT value FROM {} WHERE key = ?1", qualified),
            count: format!("SELECT count(*) FROM {}", qualified),
            entries: format!("SELECT key, value FROM {} ORDER BY key", qualified),
            qualified,
        }
    }
}

/// Check that `name` can be spliced into SQL as an unquoted identifier.
pub(crate) fn validate_identifier(what: &str, name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{} {:?} is not a plain SQL identifier",
            what, name
        )))
    }
}
