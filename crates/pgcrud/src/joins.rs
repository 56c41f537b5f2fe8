//! Reads across joined tables.
//!
//! The `*_with_joins` functions mirror [`find_all`](crate::find_all) and
//! friends for [`JoinQueryOptions`]. The result type decodes positionally, so
//! its fields must follow the projection: either `SELECT *` over every joined
//! table in join order, or the custom `select` list.
//!
//! [`JoinBuilder`] is the fluent way to assemble the same options:
//!
//! ```ignore
//! let orders: Vec<OrderLine> = JoinBuilder::new("orders o")
//!     .select("o.id, u.email, o.total")
//!     .inner_join("users u", "u.id = o.user_id")
//!     .where_raw("o.total > ?", pgcrud::args![100_i64])
//!     .order_by("o.total DESC")
//!     .limit(10)
//!     .fetch_all(&client)
//!     .await?;
//! ```

use crate::builder::{build_count_query_with_joins, build_join_query};
use crate::client::GenericClient;
use crate::condition::WhereExpr;
use crate::error::{CrudError, CrudResult};
use crate::exec;
use crate::options::{CountResult, JoinClause, JoinQueryOptions, QueryOptions, SqlArg};
use crate::record::Record;

/// Every row of the join, in ORDER BY order.
pub async fn find_all_with_joins<T: Record>(
    client: &impl GenericClient,
    table: &str,
    options: &JoinQueryOptions,
) -> CrudResult<Vec<T>> {
    let sql = build_join_query(table, options);
    exec::fetch_all(
        client,
        "query records with joins",
        &sql,
        &options.query.where_args,
    )
    .await
}

/// The first row of the join; [`CrudError::NotFound`] when there is none.
///
/// Runs with `LIMIT 1` on a copy of `options`.
pub async fn find_one_with_joins<T: Record>(
    client: &impl GenericClient,
    table: &str,
    options: &JoinQueryOptions,
) -> CrudResult<T> {
    let mut options = options.clone();
    options.query.limit = 1;
    find_all_with_joins(client, table, &options)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| CrudError::not_found(format!("no matching row in {table} with joins")))
}

/// A page of joined rows plus the total count over the same joins and
/// predicate. Two independent round trips.
pub async fn find_all_and_count_with_joins<T: Record>(
    client: &impl GenericClient,
    table: &str,
    options: &JoinQueryOptions,
) -> CrudResult<CountResult<T>> {
    let args = &options.query.where_args;

    let count_sql = build_count_query_with_joins(table, options);
    let count = exec::fetch_count(client, &count_sql, args).await?;

    let select_sql = build_join_query(table, options);
    let data = exec::fetch_all(client, "query records", &select_sql, args).await?;

    Ok(CountResult { data, count })
}

/// Fluent builder over [`JoinQueryOptions`] for one base table.
#[derive(Debug, Clone)]
pub struct JoinBuilder {
    table: String,
    options: JoinQueryOptions,
}

impl JoinBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            options: JoinQueryOptions::new(),
        }
    }

    pub fn inner_join(self, table: impl Into<String>, condition: impl Into<String>) -> Self {
        self.join(JoinClause::inner(table, condition))
    }

    pub fn left_join(self, table: impl Into<String>, condition: impl Into<String>) -> Self {
        self.join(JoinClause::left(table, condition))
    }

    pub fn right_join(self, table: impl Into<String>, condition: impl Into<String>) -> Self {
        self.join(JoinClause::right(table, condition))
    }

    pub fn full_join(self, table: impl Into<String>, condition: impl Into<String>) -> Self {
        self.join(JoinClause::full(table, condition))
    }

    /// Append an already-built join.
    pub fn join(mut self, join: JoinClause) -> Self {
        self.options.joins.push(join);
        self
    }

    /// Custom projection; replaces `*`.
    pub fn select(mut self, fields: impl Into<String>) -> Self {
        self.options.select = fields.into();
        self
    }

    /// Raw WHERE fragment with `?` placeholders. Replaces any previous
    /// predicate.
    pub fn where_raw(mut self, sql: impl Into<String>, args: Vec<SqlArg>) -> Self {
        self.options.query = std::mem::take(&mut self.options.query).where_raw(sql, args);
        self
    }

    /// Structured predicate. Replaces any previous predicate.
    pub fn filter(mut self, expr: impl Into<WhereExpr>) -> Self {
        self.options.query = std::mem::take(&mut self.options.query).filter(expr);
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.options.query.order_by = order_by.into();
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.options.query.limit = limit;
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.options.query.offset = offset;
        self
    }

    /// Take the assembled options.
    pub fn build(self) -> JoinQueryOptions {
        self.options
    }

    /// The SELECT this builder would run, with `?` placeholders.
    pub fn to_sql(&self) -> String {
        build_join_query(&self.table, &self.options)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn options(&self) -> &JoinQueryOptions {
        &self.options
    }

    /// Shorthand for the predicate/ordering/paging part of the options.
    pub fn query(&self) -> &QueryOptions {
        &self.options.query
    }

    pub async fn fetch_all<T: Record>(&self, client: &impl GenericClient) -> CrudResult<Vec<T>> {
        find_all_with_joins(client, &self.table, &self.options).await
    }

    pub async fn fetch_one<T: Record>(&self, client: &impl GenericClient) -> CrudResult<T> {
        find_one_with_joins(client, &self.table, &self.options).await
    }

    pub async fn fetch_with_count<T: Record>(
        &self,
        client: &impl GenericClient,
    ) -> CrudResult<CountResult<T>> {
        find_all_and_count_with_joins(client, &self.table, &self.options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::condition::Condition;
    use crate::options::JoinType;

    #[test]
    fn renders_joins_then_where_order_limit_offset() {
        let builder = JoinBuilder::new("orders o")
            .select("o.id, u.email, p.name")
            .inner_join("users u", "u.id = o.user_id")
            .left_join("products p", "p.id = o.product_id")
            .where_raw("o.status = ?", args!["paid"])
            .order_by("o.created_at DESC")
            .limit(20)
            .offset(40);

        assert_eq!(
            builder.to_sql(),
            "SELECT o.id, u.email, p.name FROM orders o \
             INNER JOIN users u ON u.id = o.user_id \
             LEFT JOIN products p ON p.id = o.product_id \
             WHERE o.status = ? ORDER BY o.created_at DESC LIMIT 20 OFFSET 40"
        );
        assert_eq!(builder.table(), "orders o");
        assert_eq!(builder.query().where_args.len(), 1);
    }

    #[test]
    fn setter_order_does_not_change_clause_order() {
        let a = JoinBuilder::new("a")
            .limit(1)
            .order_by("a.id")
            .right_join("b", "b.a_id = a.id")
            .full_join("c", "c.b_id = b.id");
        assert_eq!(
            a.to_sql(),
            "SELECT * FROM a RIGHT JOIN b ON b.a_id = a.id \
             FULL OUTER JOIN c ON c.b_id = b.id ORDER BY a.id LIMIT 1"
        );
    }

    #[test]
    fn filter_replaces_raw_predicate() {
        let builder = JoinBuilder::new("users u")
            .where_raw("1 = ?", args![1_i32])
            .filter(Condition::gt("u.age", 30_i32).unwrap())
            .limit(5);
        assert_eq!(builder.to_sql(), "SELECT * FROM users u WHERE u.age > ? LIMIT 5");
        assert_eq!(builder.query().limit, 5);
    }

    #[test]
    fn build_hands_back_options_in_join_order() {
        let opts = JoinBuilder::new("t")
            .inner_join("x", "x.t_id = t.id")
            .left_join("y", "y.t_id = t.id")
            .build();
        let kinds: Vec<JoinType> = opts.joins.iter().map(|j| j.kind).collect();
        assert_eq!(kinds, vec![JoinType::Inner, JoinType::Left]);
        assert_eq!(opts.select, "");
    }
}
