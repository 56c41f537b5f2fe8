//! Shared execution path for the CRUD functions.
//!
//! Statements arrive here with `?` placeholders; they are numbered, logged,
//! run and decoded in one place so every operation reports errors and SQL
//! the same way.

use crate::client::GenericClient;
use crate::error::CrudResult;
use crate::options::SqlArg;
use crate::placeholder::to_numbered;
use crate::record::{self, Record};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

pub(crate) fn params(args: &[SqlArg]) -> Vec<&(dyn ToSql + Sync)> {
    args.iter()
        .map(|arg| arg.as_ref() as &(dyn ToSql + Sync))
        .collect()
}

#[inline]
pub(crate) fn log_sql(operation: &'static str, sql: &str, arg_count: usize) {
    #[cfg(feature = "tracing")]
    tracing::debug!(
        target: "pgcrud.sql",
        operation,
        sql,
        args = arg_count,
        "executing statement"
    );
    #[cfg(not(feature = "tracing"))]
    let _ = (operation, sql, arg_count);
}

/// Warn about an UPDATE/DELETE that touches every row of `table`.
#[inline]
pub(crate) fn warn_unguarded(operation: &'static str, table: &str) {
    #[cfg(feature = "tracing")]
    tracing::warn!(
        target: "pgcrud.sql",
        operation,
        table,
        "statement has no WHERE clause and affects every row"
    );
    #[cfg(not(feature = "tracing"))]
    let _ = (operation, table);
}

/// Run `sql` and return the raw rows.
pub(crate) async fn query_rows(
    client: &impl GenericClient,
    operation: &'static str,
    sql: &str,
    args: &[SqlArg],
) -> CrudResult<Vec<Row>> {
    let sql = to_numbered(sql);
    log_sql(operation, &sql, args.len());
    client
        .query(&sql, &params(args))
        .await
        .map_err(|e| e.with_context(operation))
}

/// Run `sql` and decode every row into `T`.
pub(crate) async fn fetch_all<T: Record>(
    client: &impl GenericClient,
    operation: &'static str,
    sql: &str,
    args: &[SqlArg],
) -> CrudResult<Vec<T>> {
    let rows = query_rows(client, operation, sql, args).await?;
    rows.iter().map(T::from_row).collect()
}

/// Run a `SELECT COUNT(*)` and return the count.
pub(crate) async fn fetch_count(
    client: &impl GenericClient,
    sql: &str,
    args: &[SqlArg],
) -> CrudResult<i64> {
    let rows = query_rows(client, "count records", sql, args).await?;
    match rows.first() {
        Some(row) => record::decode(row, 0, "count"),
        None => Ok(0),
    }
}
