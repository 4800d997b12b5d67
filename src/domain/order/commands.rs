use super::value_objects::OrderLine;

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone)]
pub enum OrderCommand {
    PlaceOrder {
        member_id: i64,
        lines: Vec<OrderLine>,
    },
    CancelOrder {
        order_id: i64,
    },
}

impl OrderCommand {
    pub fn name(&self) -> &'static str {
        match self {
            OrderCommand::PlaceOrder { .. } => "PlaceOrder",
            OrderCommand::CancelOrder { .. } => "CancelOrder",
        }
    }
}
