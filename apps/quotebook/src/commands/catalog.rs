//! # Catalog Commands
//!
//! Services the business offers. Quotes copy name and price from here, so
//! edits only affect quotes written afterwards.

use chrono::Utc;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::DbState;
use quotebook_core::{CatalogItem, CatalogItemPatch};

/// Input for `catalog add`.
#[derive(Debug, Clone, Default)]
pub struct NewCatalogItem {
    pub name: String,
    pub unit_price: f64,
    pub unit: Option<String>,
    pub description: Option<String>,
}

pub async fn add_catalog_item(db: &DbState, input: NewCatalogItem) -> ApiResult<CatalogItem> {
    let mut item = CatalogItem::new(input.name.trim(), input.unit_price);
    item.unit = input.unit;
    item.description = input.description;

    db.inner().catalog().put(&item).await?;

    info!(id = %item.id, name = %item.name, unit_price = item.unit_price, "Catalog item added");
    Ok(item)
}

pub async fn list_catalog(db: &DbState, include_inactive: bool) -> ApiResult<Vec<CatalogItem>> {
    Ok(db.inner().catalog().list(include_inactive).await?)
}

pub async fn update_catalog_item(
    db: &DbState,
    id: &str,
    patch: CatalogItemPatch,
) -> ApiResult<CatalogItem> {
    if patch.is_empty() {
        return Err(ApiError::validation("Nothing to update"));
    }

    Ok(db.inner().catalog().update(id, patch, Utc::now()).await?)
}

pub async fn delete_catalog_item(db: &DbState, id: &str) -> ApiResult<()> {
    db.inner().catalog().delete(id).await?;
    info!(id = %id, "Catalog item deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::state;
    use crate::error::ErrorCode;

    fn mowing() -> NewCatalogItem {
        NewCatalogItem {
            name: "Lawn mowing".into(),
            unit_price: 45.0,
            unit: Some("visit".into()),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let (db, _) = state().await;
        let item = add_catalog_item(&db, mowing()).await.unwrap();

        let listed = list_catalog(&db, false).await.unwrap();
        assert_eq!(listed, vec![item]);
    }

    #[tokio::test]
    async fn test_negative_price_rejected() {
        let (db, _) = state().await;
        let err = add_catalog_item(
            &db,
            NewCatalogItem {
                unit_price: -1.0,
                ..mowing()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_deactivate_hides_from_default_list() {
        let (db, _) = state().await;
        let item = add_catalog_item(&db, mowing()).await.unwrap();

        let updated = update_catalog_item(&db, &item.id, CatalogItemPatch::default().active(false))
            .await
            .unwrap();
        assert!(!updated.active);

        assert!(list_catalog(&db, false).await.unwrap().is_empty());
        assert_eq!(list_catalog(&db, true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let (db, _) = state().await;
        let err = delete_catalog_item(&db, "nope").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
