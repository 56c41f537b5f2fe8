//! Structured WHERE predicates.
//!
//! [`Condition`] is a single `(column, operator, bound value)` leaf over a
//! validated [`Ident`]; [`WhereExpr`] combines leaves into AND / OR / NOT
//! trees. Rendering produces a `?`-placeholder fragment plus its arguments,
//! ready to drop into [`QueryOptions::filter`](crate::QueryOptions::filter).
//!
//! # Example
//! ```ignore
//! use pgcrud::{Condition, WhereExpr};
//!
//! let expr = WhereExpr::and(vec![
//!     Condition::eq("status", "active")?.into(),
//!     WhereExpr::or(vec![
//!         Condition::gte("price", 10.0_f64)?.into(),
//!         Condition::is_null("discontinued_at")?.into(),
//!     ]),
//! ]);
//! let (sql, args) = expr.render();
//! assert_eq!(sql, "status = ? AND (price >= ? OR discontinued_at IS NULL)");
//! ```

use crate::error::CrudResult;
use crate::ident::{Ident, IntoIdent};
use crate::options::SqlArg;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// Query operator for building conditions.
#[derive(Debug, Clone)]
pub enum Op<T> {
    /// Equal: column = value
    Eq(T),
    /// Not equal: column != value
    Ne(T),
    /// Greater than: column > value
    Gt(T),
    /// Greater than or equal: column >= value
    Gte(T),
    /// Less than: column < value
    Lt(T),
    /// Less than or equal: column <= value
    Lte(T),
    Like(T),
    /// Case-insensitive LIKE (PostgreSQL ILIKE)
    Ilike(T),
    NotLike(T),
    NotIlike(T),
    IsNull,
    IsNotNull,
    In(Vec<T>),
    NotIn(Vec<T>),
    Between(T, T),
    NotBetween(T, T),
}

#[derive(Debug, Clone)]
enum Operand {
    None,
    Single(SqlArg),
    Pair(SqlArg, SqlArg),
    List(Vec<SqlArg>),
}

/// A single `(column, operator, value)` predicate.
#[derive(Debug, Clone)]
pub struct Condition {
    column: Ident,
    operator: &'static str,
    operand: Operand,
}

fn boxed<T: ToSql + Send + Sync + 'static>(value: T) -> SqlArg {
    Arc::new(value)
}

impl Condition {
    /// Create a condition from a column identifier and operator.
    ///
    /// Fails only when `column` is not a valid identifier.
    pub fn new<I, T>(column: I, op: Op<T>) -> CrudResult<Self>
    where
        I: IntoIdent,
        T: ToSql + Send + Sync + 'static,
    {
        let column = column.into_ident()?;
        let (operator, operand) = match op {
            Op::Eq(v) => ("=", Operand::Single(boxed(v))),
            Op::Ne(v) => ("!=", Operand::Single(boxed(v))),
            Op::Gt(v) => (">", Operand::Single(boxed(v))),
            Op::Gte(v) => (">=", Operand::Single(boxed(v))),
            Op::Lt(v) => ("<", Operand::Single(boxed(v))),
            Op::Lte(v) => ("<=", Operand::Single(boxed(v))),
            Op::Like(v) => ("LIKE", Operand::Single(boxed(v))),
            Op::Ilike(v) => ("ILIKE", Operand::Single(boxed(v))),
            Op::NotLike(v) => ("NOT LIKE", Operand::Single(boxed(v))),
            Op::NotIlike(v) => ("NOT ILIKE", Operand::Single(boxed(v))),
            Op::IsNull => ("IS NULL", Operand::None),
            Op::IsNotNull => ("IS NOT NULL", Operand::None),
            Op::In(vals) => ("IN", Operand::List(vals.into_iter().map(boxed).collect())),
            Op::NotIn(vals) => (
                "NOT IN",
                Operand::List(vals.into_iter().map(boxed).collect()),
            ),
            Op::Between(a, b) => ("BETWEEN", Operand::Pair(boxed(a), boxed(b))),
            Op::NotBetween(a, b) => ("NOT BETWEEN", Operand::Pair(boxed(a), boxed(b))),
        };
        Ok(Self {
            column,
            operator,
            operand,
        })
    }

    pub fn eq<I: IntoIdent, T: ToSql + Send + Sync + 'static>(column: I, value: T) -> CrudResult<Self> {
        Self::new(column, Op::Eq(value))
    }

    pub fn ne<I: IntoIdent, T: ToSql + Send + Sync + 'static>(column: I, value: T) -> CrudResult<Self> {
        Self::new(column, Op::Ne(value))
    }

    pub fn gt<I: IntoIdent, T: ToSql + Send + Sync + 'static>(column: I, value: T) -> CrudResult<Self> {
        Self::new(column, Op::Gt(value))
    }

    pub fn gte<I: IntoIdent, T: ToSql + Send + Sync + 'static>(column: I, value: T) -> CrudResult<Self> {
        Self::new(column, Op::Gte(value))
    }

    pub fn lt<I: IntoIdent, T: ToSql + Send + Sync + 'static>(column: I, value: T) -> CrudResult<Self> {
        Self::new(column, Op::Lt(value))
    }

    pub fn lte<I: IntoIdent, T: ToSql + Send + Sync + 'static>(column: I, value: T) -> CrudResult<Self> {
        Self::new(column, Op::Lte(value))
    }

    pub fn like<I: IntoIdent, T: ToSql + Send + Sync + 'static>(column: I, pattern: T) -> CrudResult<Self> {
        Self::new(column, Op::Like(pattern))
    }

    pub fn ilike<I: IntoIdent, T: ToSql + Send + Sync + 'static>(column: I, pattern: T) -> CrudResult<Self> {
        Self::new(column, Op::Ilike(pattern))
    }

    pub fn is_null<I: IntoIdent>(column: I) -> CrudResult<Self> {
        Self::new(column, Op::<i32>::IsNull)
    }

    pub fn is_not_null<I: IntoIdent>(column: I) -> CrudResult<Self> {
        Self::new(column, Op::<i32>::IsNotNull)
    }

    pub fn in_list<I: IntoIdent, T: ToSql + Send + Sync + 'static>(column: I, values: Vec<T>) -> CrudResult<Self> {
        Self::new(column, Op::In(values))
    }

    pub fn not_in<I: IntoIdent, T: ToSql + Send + Sync + 'static>(column: I, values: Vec<T>) -> CrudResult<Self> {
        Self::new(column, Op::NotIn(values))
    }

    pub fn between<I: IntoIdent, T: ToSql + Send + Sync + 'static>(column: I, from: T, to: T) -> CrudResult<Self> {
        Self::new(column, Op::Between(from, to))
    }

    fn render_into(&self, sql: &mut String, args: &mut Vec<SqlArg>) {
        let column = self.column.to_sql();
        match &self.operand {
            Operand::None => {
                sql.push_str(&column);
                sql.push(' ');
                sql.push_str(self.operator);
            }
            Operand::Single(v) => {
                sql.push_str(&format!("{column} {} ?", self.operator));
                args.push(v.clone());
            }
            Operand::Pair(a, b) => {
                sql.push_str(&format!("{column} {} ? AND ?", self.operator));
                args.push(a.clone());
                args.push(b.clone());
            }
            // Empty IN list: always false; empty NOT IN: always true.
            Operand::List(vals) if vals.is_empty() => {
                sql.push_str(if self.operator == "IN" { "1=0" } else { "1=1" });
            }
            Operand::List(vals) => {
                let marks = vec!["?"; vals.len()].join(", ");
                sql.push_str(&format!("{column} {} ({marks})", self.operator));
                args.extend(vals.iter().cloned());
            }
        }
    }
}

/// A boolean tree of conditions.
#[derive(Debug, Clone)]
pub enum WhereExpr {
    Cond(Condition),
    And(Vec<WhereExpr>),
    Or(Vec<WhereExpr>),
    Not(Box<WhereExpr>),
    /// Raw SQL with its own `?` arguments.
    ///
    /// Trusted verbatim: never build it from user input.
    Raw(String, Vec<SqlArg>),
}

impl From<Condition> for WhereExpr {
    fn from(cond: Condition) -> Self {
        WhereExpr::Cond(cond)
    }
}

impl WhereExpr {
    pub fn and(children: Vec<WhereExpr>) -> Self {
        WhereExpr::And(children)
    }

    pub fn or(children: Vec<WhereExpr>) -> Self {
        WhereExpr::Or(children)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: impl Into<WhereExpr>) -> Self {
        WhereExpr::Not(Box::new(inner.into()))
    }

    /// Raw escape hatch; see [`WhereExpr::Raw`].
    pub fn raw(sql: impl Into<String>, args: Vec<SqlArg>) -> Self {
        WhereExpr::Raw(sql.into(), args)
    }

    /// Whether the expression filters nothing: an empty AND, or an OR with
    /// such a branch.
    pub fn is_trivially_true(&self) -> bool {
        match self {
            WhereExpr::And(children) => children.iter().all(WhereExpr::is_trivially_true),
            WhereExpr::Or(children) => children.iter().any(WhereExpr::is_trivially_true),
            _ => false,
        }
    }

    /// Render to a `?`-placeholder fragment and its arguments, in order.
    pub fn render(&self) -> (String, Vec<SqlArg>) {
        let mut sql = String::new();
        let mut args = Vec::new();
        self.render_into(&mut sql, &mut args);
        (sql, args)
    }

    fn render_into(&self, sql: &mut String, args: &mut Vec<SqlArg>) {
        match self {
            WhereExpr::Cond(cond) => cond.render_into(sql, args),
            WhereExpr::And(children) => Self::render_group(children, " AND ", "1=1", sql, args),
            WhereExpr::Or(_) if self.is_trivially_true() => sql.push_str("1=1"),
            WhereExpr::Or(children) => Self::render_group(children, " OR ", "1=0", sql, args),
            WhereExpr::Not(inner) => {
                sql.push_str("NOT (");
                inner.render_into(sql, args);
                sql.push(')');
            }
            WhereExpr::Raw(raw, raw_args) => {
                sql.push('(');
                sql.push_str(raw);
                sql.push(')');
                args.extend(raw_args.iter().cloned());
            }
        }
    }

    fn render_group(
        children: &[WhereExpr],
        separator: &str,
        empty: &str,
        sql: &mut String,
        args: &mut Vec<SqlArg>,
    ) {
        let children: Vec<&WhereExpr> = children
            .iter()
            .filter(|c| !c.is_trivially_true())
            .collect();
        if children.is_empty() {
            sql.push_str(empty);
            return;
        }
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                sql.push_str(separator);
            }
            let nested = matches!(child, WhereExpr::And(_) | WhereExpr::Or(_)) && children.len() > 1;
            if nested {
                sql.push('(');
            }
            child.render_into(sql, args);
            if nested {
                sql.push(')');
            }
        }
    }
}
