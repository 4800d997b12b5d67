use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::item::Item;
use crate::domain::member::Member;
use crate::persistence::{Assoc, NotLoaded};
use super::errors::OrderError;
use super::value_objects::{Delivery, DeliveryStatus, OrderLine, OrderStatus};

// ============================================================================
// Order Aggregate - entity graph rooted at an order
// ============================================================================
//
// Foreign keys are always present; the associated entities are only present
// when the repository call that produced the order materialized them.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub member_id: i64,
    pub delivery_id: i64,
    pub order_date: NaiveDateTime,
    pub status: OrderStatus,

    #[serde(skip_serializing_if = "Assoc::is_unloaded")]
    pub member: Assoc<Member>,
    #[serde(skip_serializing_if = "Assoc::is_unloaded")]
    pub delivery: Assoc<Delivery>,
    #[serde(skip_serializing_if = "Assoc::is_unloaded")]
    pub order_items: Assoc<Vec<OrderItem>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub item_id: i64,
    /// Unit price captured when the order was placed
    pub order_price: i32,
    pub count: i32,

    #[serde(skip_serializing_if = "Assoc::is_unloaded")]
    pub item: Assoc<Item>,
}

impl OrderItem {
    pub fn total_price(&self) -> i64 {
        i64::from(self.order_price) * i64::from(self.count)
    }
}

impl Order {
    /// Validate requested lines before any stock is touched
    pub fn validate_lines(lines: &[OrderLine]) -> Result<(), OrderError> {
        if lines.is_empty() {
            return Err(OrderError::EmptyLines);
        }

        for line in lines {
            if line.count <= 0 {
                return Err(OrderError::InvalidCount(line.count));
            }
        }

        Ok(())
    }

    pub fn total_price(&self) -> Result<i64, NotLoaded> {
        Ok(self
            .order_items
            .get("orderItems")?
            .iter()
            .map(OrderItem::total_price)
            .sum())
    }

    /// Transition to `Cancelled`. Needs the delivery loaded to check whether
    /// the parcel already arrived.
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if self.delivery.get("delivery")?.status == DeliveryStatus::Comp {
            return Err(OrderError::AlreadyDelivered);
        }
        if self.status == OrderStatus::Cancelled {
            return Err(OrderError::AlreadyCancelled);
        }

        self.status = OrderStatus::Cancelled;
        Ok(())
    }
}
