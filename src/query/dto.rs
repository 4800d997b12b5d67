use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use crate::domain::member::Address;
use crate::domain::order::{Order, OrderItem, OrderStatus};
use crate::persistence::NotLoaded;

// ============================================================================
// Response DTOs
// ============================================================================
//
// Flat, detached response shapes. The projection strategy reads them straight
// from SQL; the entity strategies build them from already-loaded graphs. The
// conversions only read associations and never reach the database.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub order_id: i64,
    /// Member name
    pub name: String,
    pub order_date: NaiveDateTime,
    pub order_status: OrderStatus,
    /// Delivery address
    #[sqlx(flatten)]
    pub address: Address,
    #[sqlx(skip)]
    pub order_items: Vec<OrderItemDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    pub item_name: String,
    /// Unit price at purchase time
    pub order_price: i32,
    pub count: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SimpleOrderDto {
    pub order_id: i64,
    pub name: String,
    pub order_date: NaiveDateTime,
    pub order_status: OrderStatus,
    #[sqlx(flatten)]
    pub address: Address,
}

/// Projected item row tagged with its parent, before grouping
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct OrderItemQueryRow {
    pub order_id: i64,
    #[sqlx(flatten)]
    pub item: OrderItemDto,
}

impl TryFrom<&OrderItem> for OrderItemDto {
    type Error = NotLoaded;

    fn try_from(order_item: &OrderItem) -> Result<Self, Self::Error> {
        Ok(Self {
            item_name: order_item.item.get("item")?.name.clone(),
            order_price: order_item.order_price,
            count: order_item.count,
        })
    }
}

impl TryFrom<&Order> for OrderDto {
    type Error = NotLoaded;

    fn try_from(order: &Order) -> Result<Self, Self::Error> {
        let order_items = order
            .order_items
            .get("orderItems")?
            .iter()
            .map(OrderItemDto::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            order_id: order.id,
            name: order.member.get("member")?.name.clone(),
            order_date: order.order_date,
            order_status: order.status,
            address: order.delivery.get("delivery")?.address.clone(),
            order_items,
        })
    }
}

impl TryFrom<&Order> for SimpleOrderDto {
    type Error = NotLoaded;

    fn try_from(order: &Order) -> Result<Self, Self::Error> {
        Ok(Self {
            order_id: order.id,
            name: order.member.get("member")?.name.clone(),
            order_date: order.order_date,
            order_status: order.status,
            address: order.delivery.get("delivery")?.address.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::{Item, ItemKind};
    use crate::domain::member::Member;
    use crate::domain::order::aggregate::tests::sample_order;
    use crate::domain::order::DeliveryStatus;
    use crate::persistence::Assoc;

    fn loaded_order() -> Order {
        let mut order = sample_order(OrderStatus::Ordered, DeliveryStatus::Ready);
        order.member = Assoc::Loaded(Member {
            id: 10,
            name: "userA".to_string(),
            address: Address::new("Seoul", "1", "1111"),
        });
        for line in order.order_items.get_mut("orderItems").unwrap() {
            line.item = Assoc::Loaded(Item {
                id: line.item_id,
                name: format!("BOOK{}", line.item_id),
                price: line.order_price,
                stock_quantity: 100,
                kind: ItemKind::Book { author: String::new(), isbn: String::new() },
            });
        }
        order
    }

    #[test]
    fn test_order_dto_from_loaded_graph() {
        let dto = OrderDto::try_from(&loaded_order()).unwrap();

        assert_eq!(dto.order_id, 1);
        assert_eq!(dto.name, "userA");
        assert_eq!(dto.address.city, "Seoul");
        assert_eq!(
            dto.order_items,
            vec![
                OrderItemDto { item_name: "BOOK5".to_string(), order_price: 10000, count: 2 },
                OrderItemDto { item_name: "BOOK6".to_string(), order_price: 500, count: 3 },
            ]
        );
    }

    #[test]
    fn test_mapping_names_the_missing_association() {
        let mut order = loaded_order();
        order.member = Assoc::Unloaded;
        assert_eq!(OrderDto::try_from(&order), Err(NotLoaded("member")));
        assert_eq!(SimpleOrderDto::try_from(&order), Err(NotLoaded("member")));

        let mut order = loaded_order();
        order.order_items.get_mut("orderItems").unwrap()[1].item = Assoc::Unloaded;
        assert_eq!(OrderDto::try_from(&order), Err(NotLoaded("item")));

        // simple orders never touch the collection
        order.order_items = Assoc::Unloaded;
        assert!(SimpleOrderDto::try_from(&order).is_ok());
    }

    #[test]
    fn test_wire_names() {
        let dto = OrderDto::try_from(&loaded_order()).unwrap();
        let json = serde_json::to_value(&dto).unwrap();

        assert_eq!(json["orderId"], 1);
        assert_eq!(json["orderStatus"], "ORDERED");
        assert_eq!(json["address"]["zipcode"], "1111");
        assert_eq!(json["orderItems"][0]["itemName"], "BOOK5");
        assert_eq!(json["orderItems"][0]["orderPrice"], 10000);
    }
}
