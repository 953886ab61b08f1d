//! `PostgreSQL` implementation of the [`DataStore`] port using Diesel.

use super::sql::{self, SqlStatement};
use crate::store::{
    domain::{Alteration, Predicate, Record},
    ports::{DataStore, StoreError, StoreResult},
};
use async_trait::async_trait;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_types::{Jsonb, Text};
use serde_json::Value;
use tracing::debug;

/// `PostgreSQL` connection pool type used by the store adapter.
pub type StorePgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed store.
///
/// Collections map to tables and records to rows encoded as JSON objects.
/// Statements run on a pooled connection inside
/// [`tokio::task::spawn_blocking`].
///
/// # Example
///
/// ```ignore
/// use diesel::r2d2::{ConnectionManager, Pool};
/// use diesel::PgConnection;
/// use stepladder::store::adapters::PostgresDataStore;
///
/// let manager = ConnectionManager::<PgConnection>::new("postgres://...");
/// let pool = Pool::builder().build(manager)?;
/// let store = PostgresDataStore::new(pool);
/// ```
#[derive(Debug, Clone)]
pub struct PostgresDataStore {
    pool: StorePgPool,
}

#[derive(QueryableByName)]
struct RecordRow {
    #[diesel(sql_type = Jsonb)]
    record: Value,
}

impl PostgresDataStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: StorePgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &StorePgPool {
        &self.pool
    }

    async fn run_blocking<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(StoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(StoreError::persistence)?
    }

    async fn execute(&self, statement: SqlStatement) -> StoreResult<u64> {
        self.run_blocking(move |connection| execute_statement(connection, statement))
            .await
    }
}

fn bound_query(statement: SqlStatement) -> BoxedSqlQuery<'static, Pg, SqlQuery> {
    let SqlStatement { sql, binds } = statement;
    binds
        .into_iter()
        .fold(diesel::sql_query(sql).into_boxed::<Pg>(), |query, value| {
            query.bind::<Text, _>(value)
        })
}

fn execute_statement(
    connection: &mut PgConnection,
    statement: SqlStatement,
) -> StoreResult<u64> {
    debug!(sql = %statement.sql, binds = statement.binds.len(), "executing statement");
    let affected = bound_query(statement)
        .execute(connection)
        .map_err(StoreError::persistence)?;
    u64::try_from(affected).map_err(StoreError::persistence)
}

fn row_to_record(row: RecordRow) -> StoreResult<Record> {
    match row.record {
        Value::Object(record) => Ok(record),
        other => Err(StoreError::InvalidRecord(format!(
            "expected a JSON object row, found {other}"
        ))),
    }
}

#[async_trait]
impl DataStore for PostgresDataStore {
    async fn alter(&self, alteration: &Alteration) -> StoreResult<()> {
        let statement = SqlStatement {
            sql: sql::alteration_sql(alteration),
            binds: Vec::new(),
        };
        self.execute(statement).await?;
        Ok(())
    }

    async fn select(&self, collection: &str, filter: &Predicate) -> StoreResult<Vec<Record>> {
        let statement = sql::select_sql(collection, filter);
        self.run_blocking(move |connection| {
            debug!(sql = %statement.sql, "selecting records");
            let rows = bound_query(statement)
                .load::<RecordRow>(connection)
                .map_err(StoreError::persistence)?;
            rows.into_iter().map(row_to_record).collect()
        })
        .await
    }

    async fn update(
        &self,
        collection: &str,
        filter: &Predicate,
        changes: &Record,
    ) -> StoreResult<u64> {
        if changes.is_empty() {
            return Ok(0);
        }
        self.execute(sql::update_sql(collection, filter, changes))
            .await
    }

    async fn insert(&self, collection: &str, record: &Record) -> StoreResult<()> {
        if record.is_empty() {
            return Err(StoreError::InvalidRecord(format!(
                "refusing to insert an empty record into {collection}"
            )));
        }
        self.execute(sql::insert_sql(collection, record)).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, filter: &Predicate) -> StoreResult<u64> {
        self.execute(sql::delete_sql(collection, filter)).await
    }

    async fn execute_raw(&self, statement: &str) -> StoreResult<u64> {
        self.execute(SqlStatement {
            sql: statement.to_owned(),
            binds: Vec::new(),
        })
        .await
    }
}
