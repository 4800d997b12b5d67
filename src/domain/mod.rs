// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// One subdirectory per aggregate, each with:
// - Value objects
// - Commands
// - Errors
// - Aggregate rules (orders only)
// - Command handler
//
// Handlers own the transaction boundary; repositories live in `persistence`.
//
// ============================================================================

pub mod item;
pub mod member;
pub mod order;
