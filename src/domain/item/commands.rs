use super::value_objects::{ItemDetails, ItemKind};

// ============================================================================
// Item Commands
// ============================================================================

#[derive(Debug, Clone)]
pub enum ItemCommand {
    Save {
        details: ItemDetails,
        kind: ItemKind,
    },
    /// Overwrites name, price and stock; the subtype stays as stored
    Update {
        item_id: i64,
        details: ItemDetails,
    },
}
