//! # Catalog Repository
//!
//! Database operations for the service catalog.
//!
//! Catalog items are templates: quotes copy name and price into their own
//! line items, so editing or deleting a service never changes a stored quote.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{from_millis, to_millis};
use quotebook_core::validation::validate_catalog_item;
use quotebook_core::{CatalogItem, CatalogItemPatch};

#[derive(Debug, sqlx::FromRow)]
struct CatalogRow {
    id: String,
    name: String,
    description: Option<String>,
    unit_price: f64,
    unit: Option<String>,
    active: bool,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<CatalogRow> for CatalogItem {
    type Error = DbError;

    fn try_from(row: CatalogRow) -> DbResult<Self> {
        Ok(CatalogItem {
            id: row.id,
            name: row.name,
            description: row.description,
            unit_price: row.unit_price,
            unit: row.unit,
            active: row.active,
            created_at: from_millis(row.created_at)?,
            updated_at: from_millis(row.updated_at)?,
        })
    }
}

const SELECT_CATALOG: &str = r#"
    SELECT id, name, description, unit_price, unit, active, created_at, updated_at
    FROM catalog_items
"#;

/// Repository for catalog database operations.
///
/// ## Usage
/// ```rust,ignore
/// let services = db.catalog().list(false).await?;   // active only
/// let item = db.catalog().get_by_id(&id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CatalogItem>> {
        let row: Option<CatalogRow> = sqlx::query_as(&format!("{SELECT_CATALOG} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CatalogItem::try_from).transpose()
    }

    /// Lists catalog items by name. Inactive items are skipped unless asked for.
    pub async fn list(&self, include_inactive: bool) -> DbResult<Vec<CatalogItem>> {
        let mut conn = self.pool.acquire().await?;
        let items = list_in(&mut conn).await?;

        Ok(items
            .into_iter()
            .filter(|item| include_inactive || item.active)
            .collect())
    }

    /// Inserts or replaces a catalog item.
    pub async fn put(&self, item: &CatalogItem) -> DbResult<()> {
        validate_catalog_item(item)?;
        let mut conn = self.pool.acquire().await?;
        put_in(&mut conn, item).await
    }

    pub async fn update(
        &self,
        id: &str,
        patch: CatalogItemPatch,
        now: DateTime<Utc>,
    ) -> DbResult<CatalogItem> {
        let mut item = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Catalog item", id))?;

        patch.apply(&mut item, now);
        self.put(&item).await?;
        Ok(item)
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting catalog item");

        let result = sqlx::query("DELETE FROM catalog_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Catalog item", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM catalog_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

pub(crate) async fn list_in(conn: &mut SqliteConnection) -> DbResult<Vec<CatalogItem>> {
    let rows: Vec<CatalogRow> =
        sqlx::query_as(&format!("{SELECT_CATALOG} ORDER BY name COLLATE NOCASE, id"))
            .fetch_all(&mut *conn)
            .await?;

    rows.into_iter().map(CatalogItem::try_from).collect()
}

pub(crate) async fn put_in(conn: &mut SqliteConnection, item: &CatalogItem) -> DbResult<()> {
    debug!(id = %item.id, name = %item.name, unit_price = item.unit_price, "Saving catalog item");

    sqlx::query(
        r#"
        INSERT INTO catalog_items (
            id, name, description, unit_price, unit, active, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            description = excluded.description,
            unit_price = excluded.unit_price,
            unit = excluded.unit,
            active = excluded.active,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&item.id)
    .bind(item.name.trim())
    .bind(&item.description)
    .bind(item.unit_price)
    .bind(&item.unit)
    .bind(item.active)
    .bind(to_millis(item.created_at))
    .bind(to_millis(item.updated_at))
    .execute(&mut *conn)
    .await?;

    Ok(())
}
