//! Generic CRUD over a table whose columns are discovered per request.

use crate::config::ResolvedEntity;
use crate::error::AppError;
use crate::schema::{find_key_column, resolve_created_key, TableSchema};
use crate::service::{Catalog, FieldResolver};
use crate::sql::{insert, select_all, select_by_key, Record, SqlValue};
use serde_json::{Map, Value};

/// Where a create response came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreatedFrom {
    /// Re-read from the table by its primary key.
    Refetched,
    /// The inserted columns and values, when no row could be re-read.
    Echoed,
}

#[derive(Clone, Debug)]
pub struct Created {
    pub record: Record,
    pub source: CreatedFrom,
}

pub struct CrudService;

impl CrudService {
    /// All rows in scan order, optionally filtered by exact column values.
    pub async fn list<C: Catalog + ?Sized>(
        catalog: &mut C,
        entity: &ResolvedEntity,
        filters: &[(String, SqlValue)],
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Record>, AppError> {
        let schema = Self::schema(catalog, entity).await?;
        let q = select_all(&schema, filters, limit, offset);
        catalog.fetch_all(&q).await
    }

    /// Fetch one row by primary key. `Ok(None)` means absent.
    pub async fn read<C: Catalog + ?Sized>(
        catalog: &mut C,
        entity: &ResolvedEntity,
        id: SqlValue,
    ) -> Result<Option<Record>, AppError> {
        let schema = Self::schema(catalog, entity).await?;
        let key = find_key_column(&schema, &entity.key_candidates).ok_or_else(|| AppError::NoKeyColumn {
            table: entity.table_name.clone(),
        })?;
        let q = select_by_key(&schema, &key.name, id);
        catalog.fetch_optional(&q).await
    }

    /// Insert one row and return it as the table now holds it. When the key
    /// cannot be resolved or the refetch finds nothing, the inserted values are
    /// echoed instead; that is never an error.
    pub async fn create<C: Catalog + ?Sized>(
        catalog: &mut C,
        entity: &ResolvedEntity,
        input: &Map<String, Value>,
    ) -> Result<Created, AppError> {
        let schema = Self::schema(catalog, entity).await?;
        let resolved = FieldResolver::resolve(&schema, &entity.fields, input)?;

        let q = insert(&schema, &resolved);
        let outcome = catalog.insert(&q).await?;
        if outcome.rows_affected == 0 {
            return Err(AppError::ZeroRowsAffected {
                table: entity.table_name.clone(),
            });
        }

        let key = outcome
            .generated
            .as_ref()
            .and_then(|g| resolve_created_key(&schema, &entity.key_candidates, g));
        let refetched = match key {
            Some((column, value)) => catalog.fetch_optional(&select_by_key(&schema, &column, value)).await?,
            None => None,
        };

        Ok(match refetched {
            Some(record) => Created {
                record,
                source: CreatedFrom::Refetched,
            },
            None => {
                tracing::warn!(table = %entity.table_name, "created row not refetched, echoing inserted values");
                Created {
                    record: resolved.to_record(),
                    source: CreatedFrom::Echoed,
                }
            }
        })
    }

    /// Live columns of the entity's table. Nothing proceeds on an empty schema.
    async fn schema<C: Catalog + ?Sized>(catalog: &mut C, entity: &ResolvedEntity) -> Result<TableSchema, AppError> {
        catalog.discover_columns(&entity.table_name).await?.require_columns()
    }
}
