use sqlx::{self, postgres::{PgArguments, PgRow}, FromRow, PgPool, Row};
use std::time::Instant;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::filter::{Filter, FilterValue};

/// Executes a `Filter` against a pool and maps rows into `T`.
pub struct QueryBuilder<T> {
    filter: Filter,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_all(self, pool: &PgPool) -> Result<Vec<T>, DatabaseError> {
        let sql_result = self.filter.to_sql()?;
        let started = Instant::now();
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(pool).await?;
        DatabaseManager::observe_query(self.filter.table_name(), started);
        Ok(rows)
    }

    pub async fn select_optional(self, pool: &PgPool) -> Result<Option<T>, DatabaseError> {
        let sql_result = self.filter.to_sql()?;
        let started = Instant::now();
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let row = q.fetch_optional(pool).await?;
        DatabaseManager::observe_query(self.filter.table_name(), started);
        Ok(row)
    }

    pub async fn count(self, pool: &PgPool) -> Result<i64, DatabaseError> {
        let sql_result = self.filter.to_count_sql()?;
        let started = Instant::now();
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(pool).await?;
        DatabaseManager::observe_query(self.filter.table_name(), started);
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q FilterValue,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        FilterValue::Text(s) => q.bind(s.as_str()),
        FilterValue::Uuid(u) => q.bind(*u),
        FilterValue::Int(i) => q.bind(*i),
        FilterValue::Bool(b) => q.bind(*b),
        FilterValue::Timestamp(t) => q.bind(*t),
        // Lists are expanded into one placeholder per element by FilterWhere
        FilterValue::List(_) => q,
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q FilterValue,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        FilterValue::Text(s) => q.bind(s.as_str()),
        FilterValue::Uuid(u) => q.bind(*u),
        FilterValue::Int(i) => q.bind(*i),
        FilterValue::Bool(b) => q.bind(*b),
        FilterValue::Timestamp(t) => q.bind(*t),
        FilterValue::List(_) => q,
    }
}
