use serde::{Deserialize, Serialize};

use crate::domain::member::Address;

// ============================================================================
// Order Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Ordered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Ordered => "ORDERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

/// `Comp` is terminal: the parcel reached the customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Ready,
    Comp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delivery {
    pub id: i64,
    pub address: Address,
    pub status: DeliveryStatus,
}

/// One requested line of an order placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub item_id: i64,
    pub count: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_names() {
        assert_eq!(serde_json::to_string(&OrderStatus::Ordered).unwrap(), "\"ORDERED\"");
        assert_eq!(serde_json::to_string(&OrderStatus::Cancelled).unwrap(), "\"CANCELLED\"");
        assert_eq!(OrderStatus::Cancelled.as_str(), "CANCELLED");

        let parsed: OrderStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);
    }

    #[test]
    fn test_delivery_status_wire_names() {
        assert_eq!(serde_json::to_string(&DeliveryStatus::Ready).unwrap(), "\"READY\"");
        assert_eq!(serde_json::to_string(&DeliveryStatus::Comp).unwrap(), "\"COMP\"");
    }

    #[test]
    fn test_order_line_deserialization() {
        let line: OrderLine = serde_json::from_str(r#"{"itemId": 3, "count": 2}"#).unwrap();
        assert_eq!(line, OrderLine { item_id: 3, count: 2 });
    }
}
