//! Per-call deadlines for any [`GenericClient`].

use crate::client::GenericClient;
use crate::error::{CrudError, CrudResult};
use crate::transaction::TransactionStarter;
use std::future::Future;
use std::time::Duration;
use tokio_postgres::types::ToSql;
use tokio_postgres::{CancelToken, Row, Transaction};

/// Wraps a client and bounds every call with a deadline.
///
/// When the deadline fires the pending call is dropped, a best-effort
/// server-side cancel is sent through the wrapped client's cancel token, and
/// the call returns [`CrudError::Timeout`]. Every CRUD function accepts the
/// wrapper in place of the plain client. Wrapping a client that can start
/// transactions makes [`bulk_insert`](crate::bulk_insert) bound the begin,
/// each insert and the commit with the same deadline.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use pgcrud::{find_all, QueryOptions, TimeoutClient};
///
/// let client = TimeoutClient::new(&pool_client, Duration::from_secs(2));
/// let users: Vec<User> = find_all(&client, "users", &QueryOptions::new()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct TimeoutClient<C> {
    client: C,
    timeout: Duration,
}

impl<C: GenericClient> TimeoutClient<C> {
    pub fn new(client: C, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// The configured deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn inner(&self) -> &C {
        &self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }

    async fn with_deadline<T, F>(&self, future: F) -> CrudResult<T>
    where
        F: Future<Output = CrudResult<T>>,
    {
        match tokio::time::timeout(self.timeout, future).await {
            Ok(result) => result,
            Err(_) => Err(expired(self.timeout, self.client.cancel_token())),
        }
    }
}

/// Send a best-effort cancel for the in-flight statement and build the error.
fn expired(timeout: Duration, cancel_token: Option<CancelToken>) -> CrudError {
    if let Some(cancel_token) = cancel_token {
        tokio::spawn(async move {
            let _ = cancel_token.cancel_query(tokio_postgres::NoTls).await;
        });
    }
    #[cfg(feature = "tracing")]
    tracing::warn!(
        target: "pgcrud.sql",
        timeout = ?timeout,
        "query exceeded its deadline"
    );
    CrudError::Timeout(timeout)
}

impl<C: GenericClient> GenericClient for TimeoutClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CrudResult<Vec<Row>> {
        self.with_deadline(self.client.query(sql, params)).await
    }

    async fn query_one(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CrudResult<Row> {
        self.with_deadline(self.client.query_one(sql, params)).await
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> CrudResult<Option<Row>> {
        self.with_deadline(self.client.query_opt(sql, params)).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CrudResult<u64> {
        self.with_deadline(self.client.execute(sql, params)).await
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        self.client.cancel_token()
    }
}

impl<C: TransactionStarter + GenericClient> TransactionStarter for TimeoutClient<C> {
    async fn begin(&mut self) -> CrudResult<Transaction<'_>> {
        let timeout = self.timeout;
        let cancel_token = self.client.cancel_token();
        match tokio::time::timeout(timeout, self.client.begin()).await {
            Ok(result) => result,
            Err(_) => Err(expired(timeout, cancel_token)),
        }
    }

    fn statement_timeout(&self) -> Option<Duration> {
        Some(self.timeout)
    }
}
