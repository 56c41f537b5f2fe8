//! SQL text assembly.
//!
//! Every function here is pure: it turns options or a payload into SQL text
//! with `?` placeholders plus the arguments to bind, and never touches the
//! database. Table names and every raw fragment are pasted verbatim.
//!
//! Clause order is fixed: base statement, joins in insertion order, WHERE,
//! ORDER BY, LIMIT, OFFSET.

use crate::error::CrudResult;
use crate::options::{JoinQueryOptions, QueryOptions, SqlArg};
use crate::record::{ColumnMap, Payload};
use std::fmt::Write;

/// Columns, placeholders and values for an INSERT, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct InsertData {
    pub columns: Vec<&'static str>,
    pub placeholders: Vec<&'static str>,
    pub values: Vec<SqlArg>,
}

impl InsertData {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// `" WHERE <where_sql>"` and its arguments, or `""` and no arguments.
pub fn build_where_clause(options: &QueryOptions) -> (String, &[SqlArg]) {
    if options.where_sql.is_empty() {
        return (String::new(), &[]);
    }
    (format!(" WHERE {}", options.where_sql), &options.where_args)
}

/// `SELECT * FROM <table><where>[ ORDER BY ..][ LIMIT n][ OFFSET n]`.
pub fn build_select_query(table: &str, options: &QueryOptions, where_clause: &str) -> String {
    let mut sql = format!("SELECT * FROM {table}{where_clause}");
    push_paging(&mut sql, options);
    sql
}

/// `SELECT COUNT(*) FROM <table><where>`.
pub fn build_count_query(table: &str, where_clause: &str) -> String {
    format!("SELECT COUNT(*) FROM {table}{where_clause}")
}

/// Collect every writable column of `payload`.
///
/// Unlike [`build_set_clause`], absent values are kept: an INSERT writes
/// `NULL` / `''` rather than dropping the column.
pub fn build_insert_data<P: Payload>(payload: &P) -> CrudResult<InsertData> {
    let map = ColumnMap::of::<P>();
    let paired = map.pair_values(payload.values())?;

    let mut data = InsertData {
        columns: Vec::with_capacity(paired.len()),
        placeholders: Vec::with_capacity(paired.len()),
        values: Vec::with_capacity(paired.len()),
    };
    for (column, field) in paired {
        data.columns.push(column);
        data.placeholders.push("?");
        data.values.push(field.value);
    }
    Ok(data)
}

/// `INSERT INTO <table> (a, b) VALUES (?, ?)[ RETURNING <returning>]`.
///
/// With no columns the statement becomes `INSERT INTO <table> DEFAULT VALUES`.
pub fn build_insert_query(table: &str, data: &InsertData, returning: Option<&str>) -> String {
    let mut sql = if data.is_empty() {
        format!("INSERT INTO {table} DEFAULT VALUES")
    } else {
        format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            data.columns.join(", "),
            data.placeholders.join(", ")
        )
    };
    if let Some(returning) = returning {
        let _ = write!(sql, " RETURNING {returning}");
    }
    sql
}

/// `a = ?, b = ?` over the writable fields of `payload` that are not absent.
///
/// Returns an empty string when nothing would be written; the caller decides
/// whether that is an error.
pub fn build_set_clause<P: Payload>(payload: &P) -> CrudResult<(String, Vec<SqlArg>)> {
    let map = ColumnMap::of::<P>();
    let mut parts = Vec::new();
    let mut values = Vec::new();

    for (column, field) in map.pair_values(payload.values())? {
        if field.absent {
            continue;
        }
        parts.push(format!("{column} = ?"));
        values.push(field.value);
    }
    Ok((parts.join(", "), values))
}

/// `UPDATE <table> SET <set><where> RETURNING *`.
pub fn build_update_query(table: &str, set_clause: &str, where_clause: &str) -> String {
    format!("UPDATE {table} SET {set_clause}{where_clause} RETURNING *")
}

/// `DELETE FROM <table><where> RETURNING *`.
pub fn build_delete_query(table: &str, where_clause: &str) -> String {
    format!("DELETE FROM {table}{where_clause} RETURNING *")
}

/// SELECT over `table` and every join in `options`, in insertion order.
pub fn build_join_query(table: &str, options: &JoinQueryOptions) -> String {
    let select = if options.select.is_empty() {
        "*"
    } else {
        options.select.as_str()
    };
    let mut sql = format!("SELECT {select} FROM {table}");
    push_joins(&mut sql, options);
    push_where(&mut sql, &options.query);
    push_paging(&mut sql, &options.query);
    sql
}

/// `SELECT COUNT(*)` over the same joins and predicate as [`build_join_query`].
pub fn build_count_query_with_joins(table: &str, options: &JoinQueryOptions) -> String {
    let mut sql = format!("SELECT COUNT(*) FROM {table}");
    push_joins(&mut sql, options);
    push_where(&mut sql, &options.query);
    sql
}

fn push_joins(sql: &mut String, options: &JoinQueryOptions) {
    for join in &options.joins {
        let _ = write!(sql, " {} {} ON {}", join.kind, join.table, join.condition);
    }
}

fn push_where(sql: &mut String, options: &QueryOptions) {
    if !options.where_sql.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&options.where_sql);
    }
}

fn push_paging(sql: &mut String, options: &QueryOptions) {
    if !options.order_by.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&options.order_by);
    }
    if options.limit > 0 {
        let _ = write!(sql, " LIMIT {}", options.limit);
    }
    if options.offset > 0 {
        let _ = write!(sql, " OFFSET {}", options.offset);
    }
}
