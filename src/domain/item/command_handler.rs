use crate::error::AppError;
use crate::persistence::{Database, ItemRepository};

use super::commands::ItemCommand;
use super::value_objects::Item;

// ============================================================================
// Item Command Handler
// ============================================================================

#[derive(Clone)]
pub struct ItemCommandHandler {
    db: Database,
    items: ItemRepository,
}

impl ItemCommandHandler {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            items: ItemRepository,
        }
    }

    pub async fn handle(&self, command: ItemCommand) -> Result<i64, AppError> {
        let mut uow = self.db.begin_write().await?;

        let item_id = match command {
            ItemCommand::Save { details, kind } => {
                details.validate()?;
                let id = self.items.save(&mut uow, &details, &kind).await?;
                tracing::info!(item_id = id, name = %details.name, dtype = kind.discriminator(), "✅ Item saved");
                id
            }
            ItemCommand::Update { item_id, details } => {
                details.validate()?;
                if !self.items.update(&mut uow, item_id, &details).await? {
                    return Err(AppError::not_found("item", item_id));
                }
                tracing::info!(item_id = item_id, "Item updated");
                item_id
            }
        };

        uow.commit().await?;
        Ok(item_id)
    }

    pub async fn find_items(&self) -> Result<Vec<Item>, AppError> {
        let mut uow = self.db.begin().await?;
        let items = self.items.find_all(&mut uow).await?;
        uow.commit().await?;
        Ok(items)
    }

    pub async fn find_one(&self, item_id: i64) -> Result<Item, AppError> {
        let mut uow = self.db.begin().await?;
        let item = self
            .items
            .find_one(&mut uow, item_id)
            .await?
            .ok_or_else(|| AppError::not_found("item", item_id))?;
        uow.commit().await?;
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::{ItemDetails, ItemError, ItemKind};

    fn album() -> ItemKind {
        ItemKind::Album { artist: "IU".to_string(), etc: "ost".to_string() }
    }

    #[tokio::test]
    async fn test_save_update_find() {
        let handler = ItemCommandHandler::new(Database::in_memory().await);

        let id = handler
            .handle(ItemCommand::Save { details: ItemDetails::new("Palette", 15000, 3), kind: album() })
            .await
            .unwrap();
        handler
            .handle(ItemCommand::Update { item_id: id, details: ItemDetails::new("Palette LP", 30000, 1) })
            .await
            .unwrap();

        let item = handler.find_one(id).await.unwrap();
        assert_eq!(item.name, "Palette LP");
        assert_eq!(item.price, 30000);
        assert_eq!(item.kind, album());
        assert_eq!(handler.find_items().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_details_rejected() {
        let handler = ItemCommandHandler::new(Database::in_memory().await);

        let err = handler
            .handle(ItemCommand::Save { details: ItemDetails::new("x", -10, 1), kind: album() })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Item(ItemError::InvalidPrice(-10))));
        assert!(handler.find_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_item() {
        let handler = ItemCommandHandler::new(Database::in_memory().await);

        assert!(matches!(handler.find_one(42).await, Err(AppError::NotFound { entity: "item", id: 42 })));
        let err = handler
            .handle(ItemCommand::Update { item_id: 42, details: ItemDetails::new("x", 1, 1) })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }
}
