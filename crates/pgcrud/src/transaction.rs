//! Starting transactions from any connection handle.
//!
//! [`bulk_insert`](crate::bulk_insert) needs an all-or-nothing unit of work
//! but should not care whether it was handed a plain client, a pooled
//! client or a transaction that is already open. [`TransactionStarter`]
//! papers over the three: a client begins a transaction, a transaction opens
//! a savepoint. Either way the returned [`Transaction`] rolls back on drop
//! unless it is committed.

use crate::error::{CrudError, CrudResult};
use std::future::Future;
use std::time::Duration;
use tokio_postgres::Transaction;

/// A handle that can begin a (nested) transaction.
pub trait TransactionStarter: Send {
    fn begin(&mut self) -> impl Future<Output = CrudResult<Transaction<'_>>> + Send;

    /// Deadline for each statement run inside the transaction.
    fn statement_timeout(&self) -> Option<Duration> {
        None
    }
}

impl TransactionStarter for tokio_postgres::Client {
    async fn begin(&mut self) -> CrudResult<Transaction<'_>> {
        self.transaction()
            .await
            .map_err(|e| CrudError::transaction("begin transaction", e))
    }
}

impl TransactionStarter for Transaction<'_> {
    async fn begin(&mut self) -> CrudResult<Transaction<'_>> {
        self.transaction()
            .await
            .map_err(|e| CrudError::transaction("create savepoint", e))
    }
}

#[cfg(feature = "pool")]
impl TransactionStarter for deadpool_postgres::Client {
    async fn begin(&mut self) -> CrudResult<Transaction<'_>> {
        let client: &mut tokio_postgres::Client = self;
        client.begin().await
    }
}

impl<S: TransactionStarter> TransactionStarter for &mut S {
    async fn begin(&mut self) -> CrudResult<Transaction<'_>> {
        (**self).begin().await
    }

    fn statement_timeout(&self) -> Option<Duration> {
        (**self).statement_timeout()
    }
}

/// Commit `tx`, mapping failure to [`CrudError::Transaction`].
///
/// With a deadline an expired commit is [`CrudError::Timeout`]; the dropped
/// future leaves the outcome to the server.
pub(crate) async fn commit(tx: Transaction<'_>, deadline: Option<Duration>) -> CrudResult<()> {
    let commit = async {
        tx.commit()
            .await
            .map_err(|e| CrudError::transaction("commit transaction", e))
    };
    match deadline {
        Some(timeout) => tokio::time::timeout(timeout, commit)
            .await
            .map_err(|_| CrudError::Timeout(timeout))?,
        None => commit.await,
    }
}
