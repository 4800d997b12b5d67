use serde::{Deserialize, Serialize};

use super::errors::ItemError;

// ============================================================================
// Item Value Objects
// ============================================================================

/// Item subtype, persisted single-table with a `dtype` discriminator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dtype")]
pub enum ItemKind {
    #[serde(rename = "B")]
    Book { author: String, isbn: String },
    #[serde(rename = "A")]
    Album { artist: String, etc: String },
    #[serde(rename = "M")]
    Movie { director: String, actor: String },
}

impl ItemKind {
    pub fn discriminator(&self) -> &'static str {
        match self {
            ItemKind::Book { .. } => "B",
            ItemKind::Album { .. } => "A",
            ItemKind::Movie { .. } => "M",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub price: i32,
    pub stock_quantity: i32,
    #[serde(flatten)]
    pub kind: ItemKind,
}

/// Fields shared by item creation and item update
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDetails {
    pub name: String,
    pub price: i32,
    pub stock_quantity: i32,
}

impl ItemDetails {
    pub fn new(name: impl Into<String>, price: i32, stock_quantity: i32) -> Self {
        Self {
            name: name.into(),
            price,
            stock_quantity,
        }
    }

    pub fn validate(&self) -> Result<(), ItemError> {
        if self.name.trim().is_empty() {
            return Err(ItemError::EmptyName);
        }
        if self.price < 0 {
            return Err(ItemError::InvalidPrice(self.price));
        }
        if self.stock_quantity < 0 {
            return Err(ItemError::InvalidStockQuantity(self.stock_quantity));
        }
        Ok(())
    }
}
