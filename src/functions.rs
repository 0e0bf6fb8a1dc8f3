//! SQL scalar functions over the store table.
//!
//! The setter and getter run inside SQLite's evaluation of a query. They
//! reach back into the connection evaluating them and run their own
//! statements there, so each function only captures the statement text of
//! its store.

use std::borrow::Cow;
use std::sync::Arc;

use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::{Null, ValueRef};
use rusqlite::Connection;

use crate::config::KvConfig;
use crate::error::{Error, Result, SetupStep};
use crate::sql::Queries;
use crate::store::{replace_entry, select_value};

pub(crate) const SETTER_ARGS: i32 = 2;
pub(crate) const GETTER_ARGS: i32 = 1;

/// Register the setter and getter named in `config` on `conn`.
pub(crate) fn register(conn: &Connection, config: &KvConfig, queries: &Arc<Queries>) -> Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8;

    let setter_queries = Arc::clone(queries);
    conn.create_scalar_function(&config.setter, SETTER_ARGS, flags, move |ctx| {
        // SAFETY: the reference is dropped before this call returns and is
        // never used to close the connection.
        let conn = unsafe { ctx.get_connection()? };
        let key = text_arg(ctx, &conn, 0, "key")?;
        let value = text_arg(ctx, &conn, 1, "value")?;
        let mut stmt = conn.prepare(&setter_queries.replace)?;
        replace_entry(&mut stmt, &key, &value)?;
        Ok(Null)
    })
    .map_err(|source| Error::Setup {
        step: SetupStep::RegisterFunction {
            name: config.setter.clone(),
            n_arg: SETTER_ARGS,
        },
        source,
    })?;

    let getter_queries = Arc::clone(queries);
    conn.create_scalar_function(&config.getter, GETTER_ARGS, flags, move |ctx| {
        // SAFETY: as above.
        let conn = unsafe { ctx.get_connection()? };
        let key = text_arg(ctx, &conn, 0, "key")?;
        let mut stmt = conn.prepare(&getter_queries.select)?;
        Ok(select_value(&mut stmt, &key)?.unwrap_or_default())
    })
    .map_err(|source| Error::Setup {
        step: SetupStep::RegisterFunction {
            name: config.getter.clone(),
            n_arg: GETTER_ARGS,
        },
        source,
    })?;

    Ok(())
}

/// Remove both functions from `conn`.
pub(crate) fn unregister(conn: &Connection, config: &KvConfig) -> rusqlite::Result<()> {
    conn.remove_function(&config.setter, SETTER_ARGS)?;
    conn.remove_function(&config.getter, GETTER_ARGS)
}

/// Read argument `idx` as text.
///
/// Numbers are converted by the engine so they read back exactly as
/// `CAST(x AS TEXT)` would render them.
fn text_arg<'a>(
    ctx: &'a Context<'_>,
    conn: &Connection,
    idx: usize,
    name: &str,
) -> Result<Cow<'a, str>> {
    match ctx.get_raw(idx) {
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => std::str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .map_err(|_| Error::InvalidArgument(format!("{} is not valid UTF-8", name))),
        number @ (ValueRef::Integer(_) | ValueRef::Real(_)) => {
            let text: String =
                conn.query_row(
                    "SELECT CAST(?1 AS TEXT)",
                    [rusqlite::types::ToSqlOutput::Borrowed(number)],
                    |row| row.get(0),
                )?;
            Ok(Cow::Owned(text))
        }
        ValueRef::Null => Err(Error::InvalidArgument(format!("{} must not be NULL", name))),
    }
}
