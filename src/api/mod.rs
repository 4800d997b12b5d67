// ============================================================================
// HTTP API
// ============================================================================
//
// GET  /api/{version}/orders             order listings, v1 v2 v3 v3.1 v4
// GET  /api/{version}/simple-orders      to-one listings, v1 v2 v3 v4
// POST /api/orders                       place an order
// POST /api/orders/{order_id}/cancel     cancel an order
//
// Listings report the number of statements they issued in the
// `x-query-count` response header.
//
// ============================================================================

mod commands;
mod orders;
mod simple_orders;

use actix_web::web;

use crate::error::AppError;

pub use commands::{CancelOrderResponse, PlaceOrderRequest, PlaceOrderResponse};
pub use orders::ListParams;

pub const QUERY_COUNT_HEADER: &str = "x-query-count";

/// Register every API route. Expects `OrderQueryService` and
/// `OrderCommandHandler` as `web::Data` on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            .route("/orders", web::post().to(commands::place_order))
            .route("/orders/{order_id}/cancel", web::post().to(commands::cancel_order))
            .route("/{version}/orders", web::get().to(orders::list_orders))
            .route("/{version}/simple-orders", web::get().to(simple_orders::list_simple_orders)),
    );
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::num::NonZeroUsize;
    use std::sync::Arc;

    use actix_web::web;

    use crate::domain::order::OrderCommandHandler;
    use crate::metrics::Metrics;
    use crate::persistence::Database;
    use crate::query::{BatchFetcher, OrderQueryService};
    use crate::seed;

    /// Seeded in-memory database with both services
    pub(crate) async fn app_data() -> (web::Data<OrderQueryService>, web::Data<OrderCommandHandler>, Database) {
        let db = Database::in_memory().await;
        let metrics = Arc::new(Metrics::new().unwrap());
        seed::seed_demo_data(&db, metrics.clone()).await.unwrap();

        let batch = BatchFetcher::new(NonZeroUsize::new(100).unwrap());
        let queries = OrderQueryService::new(db.clone(), batch, metrics.clone());
        let commands = OrderCommandHandler::new(db.clone(), metrics);
        (web::Data::new(queries), web::Data::new(commands), db)
    }
}
