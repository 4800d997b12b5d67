use crate::persistence::NotLoaded;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order is already cancelled")]
    AlreadyCancelled,

    #[error("Order has already been delivered and cannot be cancelled")]
    AlreadyDelivered,

    #[error("Order must contain at least one item")]
    EmptyLines,

    #[error("Invalid order count: {0}")]
    InvalidCount(i32),

    #[error(transparent)]
    Association(#[from] NotLoaded),
}
