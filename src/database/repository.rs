use sqlx::{self, postgres::PgRow, FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::query_builder::QueryBuilder;
use crate::filter::{Filter, FilterValue};

/// Table-bound read access for any `FromRow` model.
pub struct Repository<T> {
    table_name: &'static str,
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table_name: &'static str, pool: PgPool) -> Self {
        Self {
            table_name,
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Start a filter on this repository's table.
    pub fn filter(&self) -> Result<Filter, DatabaseError> {
        Ok(Filter::new(self.table_name)?)
    }

    pub async fn select_any(&self, filter: Filter) -> Result<Vec<T>, DatabaseError> {
        QueryBuilder::<T>::new(filter).select_all(&self.pool).await
    }

    pub async fn select_one(&self, filter: Filter) -> Result<Option<T>, DatabaseError> {
        QueryBuilder::<T>::new(filter.limit(1, None)?).select_optional(&self.pool).await
    }

    pub async fn count(&self, filter: Filter) -> Result<i64, DatabaseError> {
        QueryBuilder::<T>::new(filter).count(&self.pool).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        self.select_one(self.filter()?.eq("id", id)?).await
    }

    pub async fn select_ids(&self, ids: &[Uuid]) -> Result<Vec<T>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let values = ids.iter().copied().map(FilterValue::Uuid).collect();
        self.select_any(self.filter()?.is_in("id", values)?).await
    }
}
