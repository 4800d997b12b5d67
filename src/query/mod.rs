// ============================================================================
// Query Layer - order listings under interchangeable fetch strategies
// ============================================================================
//
// - Strategy: which version is asked for and how it pages
// - Batch fetch / dedup: collection loading and fan-out collapse
// - DTOs: response shapes, mapped from loaded graphs or projected from SQL
// - OrderQueryService: runs a listing and reports what it cost
//
// ============================================================================

mod batch;
mod dedup;
mod dto;
mod service;
mod strategy;

pub use batch::BatchFetcher;
pub use dedup::{collapse_order_graph, distinct_by_key, group_by_parent};
pub use dto::{OrderDto, OrderItemDto, OrderItemQueryRow, SimpleOrderDto};
pub use service::{Listing, OrderQueryService, OrderView, SimpleOrderView};
pub use strategy::{ListRequest, Strategy};
