// ============================================================================
// Order Domain - placement, cancellation and the order entity graph
// ============================================================================
//
// - Value objects (OrderStatus, DeliveryStatus, Delivery, OrderLine)
// - Commands (PlaceOrder, CancelOrder)
// - Errors (OrderError enum)
// - Aggregate (Order / OrderItem with association state)
// - Command Handler (OrderCommandHandler)
//
// ============================================================================

pub mod value_objects;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod command_handler;

// Re-export for convenience
pub use value_objects::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::{Order, OrderItem};
pub use command_handler::*;
