//! Convenient imports for typical `pgcrud` usage.
//!
//! ```ignore
//! use pgcrud::prelude::*;
//! ```

pub use crate::{
    Condition, CountResult, CrudError, CrudResult, GenericClient, JoinBuilder, JoinQueryOptions,
    Op, Payload, QueryOptions, Record, TransactionStarter, WhereExpr, args,
};
pub use crate::{
    bulk_insert, delete_data, find_all, find_all_and_count, find_all_and_count_with_joins,
    find_all_with_joins, find_by_pk, find_one, find_one_with_joins, insert_one, update_data,
};

#[cfg(feature = "pool")]
pub use crate::{create_pool, create_pool_with_config};
