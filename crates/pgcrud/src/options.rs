//! Declarative query options.
//!
//! [`QueryOptions`] describes WHERE / ORDER BY / LIMIT / OFFSET for a single
//! table; [`JoinQueryOptions`] adds JOIN clauses and a custom projection.
//! Neither type does any I/O or validation: the builder reads them and the
//! CRUD functions execute what the builder renders.
//!
//! # Trust boundary
//!
//! `where_sql`, `order_by`, `select` and every join condition are **raw SQL**
//! pasted verbatim into the statement. Only the values in `where_args` are
//! parameterized. Never build those fragments from user input; use
//! [`QueryOptions::filter`] with a [`WhereExpr`] when columns or operators
//! come from a request.

use crate::condition::WhereExpr;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// One bound argument.
pub type SqlArg = Arc<dyn ToSql + Send + Sync>;

/// Wrap a value as a [`SqlArg`].
pub fn arg<T>(value: T) -> SqlArg
where
    T: ToSql + Send + Sync + 'static,
{
    Arc::new(value)
}

/// Build a `Vec<SqlArg>` from heterogeneous values.
///
/// ```ignore
/// let opts = QueryOptions::new().where_raw("email = ? AND age > ?", pgcrud::args!["a@b.c", 18_i32]);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::SqlArg>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::arg($value)),+]
    };
}

/// WHERE / ORDER BY / LIMIT / OFFSET for a single-table statement.
///
/// `limit` and `offset` use zero for "unset". The number of `?` markers in
/// `where_sql` must equal `where_args.len()`; nothing checks this for you.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    #[serde(rename = "where", default, skip_serializing_if = "String::is_empty")]
    pub where_sql: String,
    #[serde(skip)]
    pub where_args: Vec<SqlArg>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub order_by: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub limit: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub offset: u64,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a raw WHERE fragment and its positional arguments.
    ///
    /// The fragment is trusted verbatim; see the module docs.
    pub fn where_raw(mut self, sql: impl Into<String>, args: Vec<SqlArg>) -> Self {
        self.where_sql = sql.into();
        self.where_args = args;
        self
    }

    /// Set the WHERE predicate from a structured expression.
    ///
    /// Column names in the expression are validated identifiers and every
    /// value is bound, so this is safe for request-derived filters.
    pub fn filter(mut self, expr: impl Into<WhereExpr>) -> Self {
        let expr = expr.into();
        if expr.is_trivially_true() {
            self.where_sql.clear();
            self.where_args.clear();
        } else {
            let (sql, args) = expr.render();
            self.where_sql = sql;
            self.where_args = args;
        }
        self
    }

    /// Raw ORDER BY fragment, e.g. `"created_at DESC, id"`.
    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = order_by.into();
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// 1-based page helper: `paginate(3, 20)` → `LIMIT 20 OFFSET 40`.
    pub fn paginate(self, page: u64, per_page: u64) -> Self {
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        self.limit(per_page).offset(offset)
    }

    /// Whether a predicate is set.
    pub fn has_where(&self) -> bool {
        !self.where_sql.is_empty()
    }
}

impl fmt::Debug for QueryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("where_sql", &self.where_sql)
            .field("where_args", &self.where_args.len())
            .field("order_by", &self.order_by)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish()
    }
}

/// Kind of JOIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    FullOuter,
}

impl JoinType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::FullOuter => "FULL OUTER JOIN",
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A single JOIN: `<kind> <table> ON <condition>`.
///
/// `table` and `condition` are raw SQL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinClause {
    pub kind: JoinType,
    pub table: String,
    pub condition: String,
}

impl JoinClause {
    pub fn new(kind: JoinType, table: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            kind,
            table: table.into(),
            condition: condition.into(),
        }
    }

    pub fn inner(table: impl Into<String>, condition: impl Into<String>) -> Self {
        Self::new(JoinType::Inner, table, condition)
    }

    pub fn left(table: impl Into<String>, condition: impl Into<String>) -> Self {
        Self::new(JoinType::Left, table, condition)
    }

    pub fn right(table: impl Into<String>, condition: impl Into<String>) -> Self {
        Self::new(JoinType::Right, table, condition)
    }

    pub fn full(table: impl Into<String>, condition: impl Into<String>) -> Self {
        Self::new(JoinType::FullOuter, table, condition)
    }
}

/// Options for SELECTs that join other tables.
///
/// Joins render in the order they were added, right after the base table.
#[derive(Debug, Clone, Default)]
pub struct JoinQueryOptions {
    pub joins: Vec<JoinClause>,
    /// Custom projection; empty means `*`.
    pub select: String,
    pub query: QueryOptions,
}

impl JoinQueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(mut self, join: JoinClause) -> Self {
        self.joins.push(join);
        self
    }

    pub fn select(mut self, select: impl Into<String>) -> Self {
        self.select = select.into();
        self
    }

    pub fn query(mut self, query: QueryOptions) -> Self {
        self.query = query;
        self
    }
}

impl From<QueryOptions> for JoinQueryOptions {
    fn from(query: QueryOptions) -> Self {
        Self {
            query,
            ..Self::default()
        }
    }
}

/// A page of rows plus the total number of rows matching the predicate.
///
/// `count` comes from a separate `COUNT(*)` round trip and ignores
/// LIMIT/OFFSET, so it is usually larger than `data.len()`. The two queries
/// are not wrapped in a transaction: under concurrent writes they may
/// disagree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountResult<T> {
    pub data: Vec<T>,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;

    #[test]
    fn where_raw_keeps_fragment_and_args() {
        let opts = QueryOptions::new().where_raw("email = ? AND age > ?", args!["a@b.c", 18_i32]);
        assert_eq!(opts.where_sql, "email = ? AND age > ?");
        assert_eq!(opts.where_args.len(), 2);
        assert!(opts.has_where());
    }

    #[test]
    fn filter_renders_structured_predicate() {
        let opts = QueryOptions::new().filter(Condition::eq("status", "active").unwrap());
        assert_eq!(opts.where_sql, "status = ?");
        assert_eq!(opts.where_args.len(), 1);
    }

    #[test]
    fn filter_with_empty_and_clears_predicate() {
        let opts = QueryOptions::new()
            .where_raw("id = ?", args![1_i64])
            .filter(WhereExpr::and(Vec::new()));
        assert!(!opts.has_where());
        assert!(opts.where_args.is_empty());
    }

    #[test]
    fn paginate_is_one_based() {
        let opts = QueryOptions::new().paginate(3, 20);
        assert_eq!((opts.limit, opts.offset), (20, 40));
        let first = QueryOptions::new().paginate(0, 10);
        assert_eq!((first.limit, first.offset), (10, 0));
    }

    #[test]
    fn options_serialize_with_camel_case_and_skip_unset() {
        let opts = QueryOptions::new()
            .where_raw("id = ?", args![1_i64])
            .order_by("id DESC")
            .limit(5);
        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "where": "id = ?", "orderBy": "id DESC", "limit": 5 })
        );
    }

    #[test]
    fn join_type_renders_sql_keywords() {
        assert_eq!(JoinType::Inner.to_string(), "INNER JOIN");
        assert_eq!(JoinType::FullOuter.as_sql(), "FULL OUTER JOIN");
        assert_eq!(JoinClause::left("roles r", "r.id = u.role_id").kind, JoinType::Left);
    }

    #[test]
    fn count_result_serializes_data_and_count() {
        let page = CountResult {
            data: vec![1, 2],
            count: 10,
        };
        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            serde_json::json!({ "data": [1, 2], "count": 10 })
        );
    }
}
