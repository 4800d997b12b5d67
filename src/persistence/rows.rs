use chrono::NaiveDateTime;
use sqlx::FromRow;

use crate::domain::item::{Item, ItemKind};
use crate::domain::member::{Address, Member};
use crate::domain::order::{Delivery, DeliveryStatus, Order, OrderItem, OrderStatus};
use super::association::Assoc;

// ============================================================================
// Row Types - flat result shapes, converted into entities
// ============================================================================

#[derive(Debug, FromRow)]
pub struct MemberRow {
    pub member_id: i64,
    pub name: String,
    #[sqlx(flatten)]
    pub address: Address,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Member {
            id: row.member_id,
            name: row.name,
            address: row.address,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct DeliveryRow {
    pub delivery_id: i64,
    #[sqlx(flatten)]
    pub address: Address,
    pub status: DeliveryStatus,
}

impl From<DeliveryRow> for Delivery {
    fn from(row: DeliveryRow) -> Self {
        Delivery {
            id: row.delivery_id,
            address: row.address,
            status: row.status,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct ItemRow {
    pub item_id: i64,
    pub dtype: String,
    pub item_name: String,
    pub item_price: i32,
    pub stock_quantity: i32,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub artist: Option<String>,
    pub etc: Option<String>,
    pub director: Option<String>,
    pub actor: Option<String>,
}

impl TryFrom<ItemRow> for Item {
    type Error = sqlx::Error;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let kind = match row.dtype.as_str() {
            "B" => ItemKind::Book {
                author: row.author.unwrap_or_default(),
                isbn: row.isbn.unwrap_or_default(),
            },
            "A" => ItemKind::Album {
                artist: row.artist.unwrap_or_default(),
                etc: row.etc.unwrap_or_default(),
            },
            "M" => ItemKind::Movie {
                director: row.director.unwrap_or_default(),
                actor: row.actor.unwrap_or_default(),
            },
            other => {
                return Err(sqlx::Error::Decode(
                    format!("unknown item dtype `{}` for item {}", other, row.item_id).into(),
                ))
            }
        };

        Ok(Item {
            id: row.item_id,
            name: row.item_name,
            price: row.item_price,
            stock_quantity: row.stock_quantity,
            kind,
        })
    }
}

/// Order columns only, every association unloaded
#[derive(Debug, FromRow)]
pub struct OrderRow {
    pub order_id: i64,
    pub member_id: i64,
    pub delivery_id: i64,
    pub order_date: NaiveDateTime,
    pub status: OrderStatus,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.order_id,
            member_id: row.member_id,
            delivery_id: row.delivery_id,
            order_date: row.order_date,
            status: row.status,
            member: Assoc::Unloaded,
            delivery: Assoc::Unloaded,
            order_items: Assoc::Unloaded,
        }
    }
}

/// Order joined with its member and delivery
#[derive(Debug, FromRow)]
pub struct OrderToOneRow {
    #[sqlx(flatten)]
    pub order: OrderRow,
    pub member_name: String,
    pub member_city: String,
    pub member_street: String,
    pub member_zipcode: String,
    pub delivery_city: String,
    pub delivery_street: String,
    pub delivery_zipcode: String,
    pub delivery_status: DeliveryStatus,
}

impl From<OrderToOneRow> for Order {
    fn from(row: OrderToOneRow) -> Self {
        let member = Member {
            id: row.order.member_id,
            name: row.member_name,
            address: Address::new(row.member_city, row.member_street, row.member_zipcode),
        };
        let delivery = Delivery {
            id: row.order.delivery_id,
            address: Address::new(row.delivery_city, row.delivery_street, row.delivery_zipcode),
            status: row.delivery_status,
        };

        let mut order = Order::from(row.order);
        order.member = Assoc::Loaded(member);
        order.delivery = Assoc::Loaded(delivery);
        order
    }
}

/// Order item joined with its item
#[derive(Debug, FromRow)]
pub struct OrderItemRow {
    pub order_item_id: i64,
    pub order_id: i64,
    pub order_price: i32,
    pub count: i32,
    #[sqlx(flatten)]
    pub item: ItemRow,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = sqlx::Error;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let item = Item::try_from(row.item)?;
        Ok(OrderItem {
            id: row.order_item_id,
            order_id: row.order_id,
            item_id: item.id,
            order_price: row.order_price,
            count: row.count,
            item: Assoc::Loaded(item),
        })
    }
}

/// One row of the full-graph fetch-join. The collection side is nullable
/// because the join to order items is an outer join.
#[derive(Debug, FromRow)]
pub struct OrderGraphRow {
    #[sqlx(flatten)]
    pub root: OrderToOneRow,
    pub order_item_id: Option<i64>,
    pub order_price: Option<i32>,
    pub count: Option<i32>,
    pub item_id: Option<i64>,
    pub dtype: Option<String>,
    pub item_name: Option<String>,
    pub item_price: Option<i32>,
    pub stock_quantity: Option<i32>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub artist: Option<String>,
    pub etc: Option<String>,
    pub director: Option<String>,
    pub actor: Option<String>,
}

impl OrderGraphRow {
    /// Split into the parent entity and the (optional) child on this row
    pub fn into_parts(self) -> Result<(Order, Option<OrderItem>), sqlx::Error> {
        let order_id = self.root.order.order_id;

        let child = match (
            self.order_item_id,
            self.order_price,
            self.count,
            self.item_id,
            self.dtype,
            self.item_name,
            self.item_price,
            self.stock_quantity,
        ) {
            (
                Some(order_item_id),
                Some(order_price),
                Some(count),
                Some(item_id),
                Some(dtype),
                Some(item_name),
                Some(item_price),
                Some(stock_quantity),
            ) => Some(OrderItem::try_from(OrderItemRow {
                order_item_id,
                order_id,
                order_price,
                count,
                item: ItemRow {
                    item_id,
                    dtype,
                    item_name,
                    item_price,
                    stock_quantity,
                    author: self.author,
                    isbn: self.isbn,
                    artist: self.artist,
                    etc: self.etc,
                    director: self.director,
                    actor: self.actor,
                },
            })?),
            _ => None,
        };

        Ok((Order::from(self.root), child))
    }
}
