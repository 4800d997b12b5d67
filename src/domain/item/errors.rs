// ============================================================================
// Item / Inventory Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    #[error("Not enough stock for item {item_id}: requested {requested}, available {available}")]
    NotEnoughStock {
        item_id: i64,
        requested: i32,
        available: i32,
    },

    #[error("Item name cannot be empty")]
    EmptyName,

    #[error("Invalid item price: {0}")]
    InvalidPrice(i32),

    #[error("Invalid stock quantity: {0}")]
    InvalidStockQuantity(i32),
}
