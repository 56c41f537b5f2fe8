//! Generic CRUD operations.
//!
//! Each function is parameterized by a table name and a record type. The
//! record type's column descriptor (see [`Record`] / [`Payload`]) drives both
//! the outbound values and the decoding of result rows, so no per-type
//! repository code is needed:
//!
//! ```ignore
//! use pgcrud::{find_all, QueryOptions, Record};
//!
//! #[derive(Debug, Record)]
//! struct User {
//!     id: i64,
//!     email: String,
//! }
//!
//! let opts = QueryOptions::new()
//!     .where_raw("email LIKE ?", pgcrud::args!["%@example.com"])
//!     .order_by("id")
//!     .limit(20);
//! let users: Vec<User> = find_all(&client, "users", &opts).await?;
//! ```
//!
//! Table names are pasted into the SQL verbatim; they are trusted input.

use crate::builder::{
    build_count_query, build_delete_query, build_insert_data, build_insert_query,
    build_select_query, build_set_clause, build_update_query, build_where_clause,
};
use crate::client::GenericClient;
use crate::error::{CrudError, CrudResult};
use crate::exec::{self, warn_unguarded};
use crate::options::{CountResult, QueryOptions, arg};
use crate::record::{Payload, Record};
use crate::timeout::TimeoutClient;
use crate::transaction::{self, TransactionStarter};
use tokio_postgres::types::ToSql;

/// Every row of `table` matching `options`, in ORDER BY order.
pub async fn find_all<T: Record>(
    client: &impl GenericClient,
    table: &str,
    options: &QueryOptions,
) -> CrudResult<Vec<T>> {
    let (where_clause, args) = build_where_clause(options);
    let sql = build_select_query(table, options, &where_clause);
    exec::fetch_all(client, "query records", &sql, args).await
}

/// The first row matching `options`.
///
/// The query runs with `LIMIT 1` on a copy of `options`; the caller's value
/// is left untouched. Zero matches is [`CrudError::NotFound`].
pub async fn find_one<T: Record>(
    client: &impl GenericClient,
    table: &str,
    options: &QueryOptions,
) -> CrudResult<T> {
    let mut options = options.clone();
    options.limit = 1;
    find_all(client, table, &options)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| CrudError::not_found(format!("no matching row in {table}")))
}

/// A page of rows plus the total number of rows matching the predicate.
///
/// Runs `COUNT(*)` first and the SELECT second, as two independent round
/// trips. The count ignores LIMIT and OFFSET.
pub async fn find_all_and_count<T: Record>(
    client: &impl GenericClient,
    table: &str,
    options: &QueryOptions,
) -> CrudResult<CountResult<T>> {
    let (where_clause, args) = build_where_clause(options);

    let count_sql = build_count_query(table, &where_clause);
    let count = exec::fetch_count(client, &count_sql, args).await?;

    let select_sql = build_select_query(table, options, &where_clause);
    let data = exec::fetch_all(client, "query records", &select_sql, args).await?;

    Ok(CountResult { data, count })
}

/// The row whose `id` equals `pk`.
pub async fn find_by_pk<T, K>(client: &impl GenericClient, table: &str, pk: K) -> CrudResult<T>
where
    T: Record,
    K: ToSql + Send + Sync + 'static,
{
    let options = QueryOptions::new().where_raw("id = ?", vec![arg(pk)]);
    find_one(client, table, &options).await
}

/// Insert one row and return its generated `id`.
///
/// `id` and `createdAt` are left to the database. Fails with
/// [`CrudError::MissingIdentity`] when the statement returns no row.
pub async fn insert_one<P: Payload>(
    client: &impl GenericClient,
    table: &str,
    payload: &P,
) -> CrudResult<i64> {
    let data = build_insert_data(payload)?;
    let sql = build_insert_query(table, &data, Some("id"));
    let rows = exec::query_rows(client, "insert record", &sql, &data.values).await?;
    let row = rows.first().ok_or(CrudError::MissingIdentity)?;

    // SERIAL keys come back as int4, BIGSERIAL as int8.
    match row.try_get::<_, i64>(0) {
        Ok(id) => Ok(id),
        Err(_) => row
            .try_get::<_, i32>(0)
            .map(i64::from)
            .map_err(|e| CrudError::decode("id", e.to_string())),
    }
}

/// Insert every payload inside one transaction and return the inserted rows.
///
/// Either every row is inserted or none is: the first failure drops the
/// transaction, which rolls it back. Given an open transaction the work runs
/// in a savepoint. An empty slice returns immediately without touching the
/// database. Through a [`TimeoutClient`] every statement, commit included,
/// runs under the client's deadline and an expiry rolls the whole batch back.
pub async fn bulk_insert<T, P>(
    client: &mut impl TransactionStarter,
    table: &str,
    payloads: &[P],
) -> CrudResult<Vec<T>>
where
    T: Record,
    P: Payload,
{
    if payloads.is_empty() {
        return Ok(Vec::new());
    }

    let deadline = client.statement_timeout();
    let tx = client.begin().await?;
    let mut inserted = Vec::with_capacity(payloads.len());
    for payload in payloads {
        let data = build_insert_data(payload)?;
        let sql = build_insert_query(table, &data, Some("*"));
        let rows = match deadline {
            Some(timeout) => {
                let bounded = TimeoutClient::new(&tx, timeout);
                exec::fetch_all::<T>(&bounded, "insert record", &sql, &data.values).await?
            }
            None => exec::fetch_all::<T>(&tx, "insert record", &sql, &data.values).await?,
        };
        inserted.extend(rows);
    }
    transaction::commit(tx, deadline).await?;

    Ok(inserted)
}

/// Update every row matching `options` and return the updated rows.
///
/// Absent payload fields (`None`, empty strings) are left out of the SET
/// clause; every other writable field is written, zero values included. A
/// payload with nothing to write is rejected with [`CrudError::Validation`].
/// Without a predicate the statement updates every row; that is allowed but
/// logged as a warning.
pub async fn update_data<T, P>(
    client: &impl GenericClient,
    table: &str,
    payload: &P,
    options: &QueryOptions,
) -> CrudResult<Vec<T>>
where
    T: Record,
    P: Payload,
{
    let (set_clause, mut args) = build_set_clause(payload)?;
    if set_clause.is_empty() {
        return Err(CrudError::validation(format!(
            "update of {table} has no columns to set"
        )));
    }

    let (where_clause, where_args) = build_where_clause(options);
    if where_clause.is_empty() {
        warn_unguarded("update records", table);
    }
    args.extend(where_args.iter().cloned());

    let sql = build_update_query(table, &set_clause, &where_clause);
    exec::fetch_all(client, "update records", &sql, &args).await
}

/// Delete every row matching `options` and return the deleted rows.
///
/// Without a predicate the statement empties the table; that is allowed but
/// logged as a warning.
pub async fn delete_data<T: Record>(
    client: &impl GenericClient,
    table: &str,
    options: &QueryOptions,
) -> CrudResult<Vec<T>> {
    let (where_clause, args) = build_where_clause(options);
    if where_clause.is_empty() {
        warn_unguarded("delete records", table);
    }
    let sql = build_delete_query(table, &where_clause);
    exec::fetch_all(client, "delete records", &sql, args).await
}
