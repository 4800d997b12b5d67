use crate::domain::item::{Item, ItemDetails, ItemKind};
use super::query_log::QueryKind;
use super::rows::ItemRow;
use super::UnitOfWork;

const ITEM_COLUMNS: &str = "item_id, dtype, name AS item_name, price AS item_price, stock_quantity, \
                            author, isbn, artist, etc, director, actor";

#[derive(Debug, Clone, Copy, Default)]
pub struct ItemRepository;

impl ItemRepository {
    pub async fn save(&self, uow: &mut UnitOfWork, details: &ItemDetails, kind: &ItemKind) -> Result<i64, sqlx::Error> {
        let (author, isbn, artist, etc, director, actor) = match kind {
            ItemKind::Book { author, isbn } => (Some(author), Some(isbn), None, None, None, None),
            ItemKind::Album { artist, etc } => (None, None, Some(artist), Some(etc), None, None),
            ItemKind::Movie { director, actor } => (None, None, None, None, Some(director), Some(actor)),
        };

        uow.record(QueryKind::Write);
        let result = sqlx::query(
            "INSERT INTO item (dtype, name, price, stock_quantity, author, isbn, artist, etc, director, actor) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(kind.discriminator())
        .bind(&details.name)
        .bind(details.price)
        .bind(details.stock_quantity)
        .bind(author)
        .bind(isbn)
        .bind(artist)
        .bind(etc)
        .bind(director)
        .bind(actor)
        .execute(uow.conn())
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update(&self, uow: &mut UnitOfWork, item_id: i64, details: &ItemDetails) -> Result<bool, sqlx::Error> {
        uow.record(QueryKind::Write);
        let result = sqlx::query("UPDATE item SET name = ?, price = ?, stock_quantity = ? WHERE item_id = ?")
            .bind(&details.name)
            .bind(details.price)
            .bind(details.stock_quantity)
            .bind(item_id)
            .execute(uow.conn())
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn find_one(&self, uow: &mut UnitOfWork, item_id: i64) -> Result<Option<Item>, sqlx::Error> {
        uow.record(QueryKind::Lookup);
        let row = sqlx::query_as::<_, ItemRow>(&format!("SELECT {ITEM_COLUMNS} FROM item WHERE item_id = ?"))
            .bind(item_id)
            .fetch_optional(uow.conn())
            .await?;

        row.map(Item::try_from).transpose()
    }

    pub async fn find_all(&self, uow: &mut UnitOfWork) -> Result<Vec<Item>, sqlx::Error> {
        uow.record(QueryKind::Lookup);
        let rows = sqlx::query_as::<_, ItemRow>(&format!("SELECT {ITEM_COLUMNS} FROM item ORDER BY item_id"))
            .fetch_all(uow.conn())
            .await?;

        rows.into_iter().map(Item::try_from).collect()
    }

    /// Guarded decrement: only succeeds while enough stock remains, so two
    /// concurrent orders can never drive stock below zero. Returns the unit
    /// price at the moment of the decrement, or `None` when the item is
    /// missing or short.
    pub async fn remove_stock(&self, uow: &mut UnitOfWork, item_id: i64, count: i32) -> Result<Option<i32>, sqlx::Error> {
        uow.record(QueryKind::Write);
        let price = sqlx::query_scalar::<_, i32>(
            "UPDATE item SET stock_quantity = stock_quantity - ?1 \
             WHERE item_id = ?2 AND stock_quantity >= ?1 \
             RETURNING price",
        )
        .bind(count)
        .bind(item_id)
        .fetch_optional(uow.conn())
        .await?;

        Ok(price)
    }

    pub async fn add_stock(&self, uow: &mut UnitOfWork, item_id: i64, count: i32) -> Result<bool, sqlx::Error> {
        uow.record(QueryKind::Write);
        let result = sqlx::query("UPDATE item SET stock_quantity = stock_quantity + ? WHERE item_id = ?")
            .bind(count)
            .bind(item_id)
            .execute(uow.conn())
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
