//! # pgcrud
//!
//! Generic CRUD helpers for PostgreSQL record types.
//!
//! A record type declares its columns once, with `#[derive(Record)]`, and
//! every operation is then one generic call parameterized by a table name:
//!
//! - **Declarative options**: [`QueryOptions`] carries WHERE / ORDER BY /
//!   LIMIT / OFFSET; [`JoinQueryOptions`] and [`JoinBuilder`] add joins
//! - **Positional mapping**: result rows decode field by field in
//!   declaration order (see [`record`])
//! - **`?` placeholders**: statements are written with `?` and numbered
//!   `$1..$n` right before execution
//! - **Transaction-friendly**: every read and write accepts any
//!   [`GenericClient`]; [`bulk_insert`] runs all-or-nothing
//!
//! ```ignore
//! use pgcrud::prelude::*;
//!
//! #[derive(Debug, Record)]
//! struct Product {
//!     id: i64,
//!     name: String,
//!     price: f64,
//!     #[crud(column = "createdAt")]
//!     created_at: chrono::NaiveDateTime,
//! }
//!
//! #[derive(Payload)]
//! struct NewProduct {
//!     name: String,
//!     price: f64,
//! }
//!
//! let pool = create_pool(&database_url)?;
//! let client = pool.get().await?;
//!
//! let id = insert_one(&client, "products", &NewProduct { name: "Lamp".into(), price: 12.5 }).await?;
//! let lamp: Product = find_by_pk(&client, "products", id).await?;
//!
//! let page = find_all_and_count::<Product>(
//!     &client,
//!     "products",
//!     &QueryOptions::new()
//!         .filter(Condition::gte("price", 10.0_f64)?)
//!         .order_by("price DESC")
//!         .paginate(1, 20),
//! )
//! .await?;
//! ```
//!
//! ## Trust boundary
//!
//! Table names, raw WHERE fragments, ORDER BY, SELECT lists and join
//! conditions are pasted into the SQL verbatim. Only bound arguments are
//! parameterized. Build request-driven predicates with [`Condition`] and
//! [`WhereExpr`] instead.

extern crate self as pgcrud;

pub mod builder;
pub mod client;
pub mod condition;
pub mod crud;
pub mod error;
mod exec;
pub mod ident;
pub mod joins;
pub mod options;
pub mod placeholder;
pub mod prelude;
pub mod record;
pub mod timeout;
pub mod transaction;

pub use builder::InsertData;
pub use client::GenericClient;
pub use condition::{Condition, Op, WhereExpr};
pub use crud::{
    bulk_insert, delete_data, find_all, find_all_and_count, find_by_pk, find_one, insert_one,
    update_data,
};
pub use error::{CrudError, CrudResult};
pub use ident::{Ident, IntoIdent};
pub use joins::{
    JoinBuilder, find_all_and_count_with_joins, find_all_with_joins, find_one_with_joins,
};
pub use options::{
    CountResult, JoinClause, JoinQueryOptions, JoinType, QueryOptions, SqlArg, arg,
};
pub use record::{ColumnDef, ColumnMap, FieldValue, Payload, Record};
pub use timeout::TimeoutClient;
pub use transaction::TransactionStarter;

pub use tokio_postgres;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};

#[cfg(feature = "derive")]
pub use pgcrud_derive::{Payload, Record};

#[doc(hidden)]
pub mod __private {
    pub use tokio_postgres::Row;
}
