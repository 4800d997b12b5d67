use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::domain::order::Order;
use crate::error::AppError;
use crate::metrics::Metrics;
use crate::persistence::{Database, OrderFetchPlan, OrderRepository, Page, QueryLog, UnitOfWork};
use super::batch::BatchFetcher;
use super::dedup::{collapse_order_graph, group_by_parent};
use super::dto::{OrderDto, OrderItemDto, SimpleOrderDto};
use super::strategy::{ListRequest, Strategy};

// ============================================================================
// Order Query Service
// ============================================================================
//
// Runs one listing inside one unit of work and reports the statements it
// issued. Every strategy returns the same orders in order id order with
// their items in order item id order; only the cost differs.
//
// ============================================================================

/// Rows of one listing and the statements it cost
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub rows: Vec<T>,
    pub queries: QueryLog,
}

/// `v1` answers with entities, every other version with DTOs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OrderView {
    Entity(Order),
    Dto(OrderDto),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SimpleOrderView {
    Entity(Order),
    Dto(SimpleOrderDto),
}

#[derive(Clone)]
pub struct OrderQueryService {
    db: Database,
    orders: OrderRepository,
    batch: BatchFetcher,
    metrics: Arc<Metrics>,
}

impl OrderQueryService {
    pub fn new(db: Database, batch: BatchFetcher, metrics: Arc<Metrics>) -> Self {
        Self {
            db,
            orders: OrderRepository,
            batch,
            metrics,
        }
    }

    pub async fn list_orders(&self, strategy: Strategy, request: ListRequest) -> Result<Listing<OrderView>, AppError> {
        let page = strategy.resolve_page(request.offset, request.limit)?;
        if !request.search.is_empty() && !strategy.supports_search() {
            return Err(AppError::BadRequest(format!("{} does not support search filters", strategy)));
        }

        let span = tracing::info_span!(
            "list_orders",
            request_id = %Uuid::new_v4(),
            strategy = strategy.as_str()
        );

        async move {
            let started = Instant::now();
            let mut uow = self.db.begin().await?;

            let rows = match strategy {
                Strategy::EntityForced => self
                    .entity_graphs(&mut uow, &request)
                    .await?
                    .into_iter()
                    .map(OrderView::Entity)
                    .collect(),
                Strategy::EntityToDto => to_dtos(&self.entity_graphs(&mut uow, &request).await?)?,
                Strategy::FetchJoin => {
                    let plan = OrderFetchPlan::to_ones().with_order_items();
                    let rows = self.orders.find_graph_rows(&mut uow, plan).await?;
                    let fetched = rows.len();
                    let orders = collapse_order_graph(rows);
                    tracing::debug!(rows = fetched, orders = orders.len(), "Collapsed fetch-join rows");
                    to_dtos(&orders)?
                }
                Strategy::BatchFetch => {
                    let page = page.unwrap_or(Page { offset: 0, limit: Page::DEFAULT_LIMIT });
                    let plan = OrderFetchPlan::to_ones().paginate(page);
                    let mut orders = self.orders.find_with_to_ones(&mut uow, &plan).await?;
                    self.batch.resolve_order_items(&self.orders, &mut uow, &mut orders).await?;
                    to_dtos(&orders)?
                }
                Strategy::Projection => self
                    .projected_orders(&mut uow, page)
                    .await?
                    .into_iter()
                    .map(OrderView::Dto)
                    .collect(),
            };

            let queries = uow.commit().await?;
            self.finish(strategy, &queries, started, rows.len());
            Ok::<_, AppError>(Listing { rows, queries })
        }
        .instrument(span)
        .await
    }

    /// Simple orders carry no collection, so there is no `v3.1` variant.
    pub async fn list_simple_orders(&self, strategy: Strategy) -> Result<Listing<SimpleOrderView>, AppError> {
        if strategy == Strategy::BatchFetch {
            return Err(AppError::UnknownStrategy(strategy.to_string()));
        }

        let span = tracing::info_span!(
            "list_simple_orders",
            request_id = %Uuid::new_v4(),
            strategy = strategy.as_str()
        );

        async move {
            let started = Instant::now();
            let mut uow = self.db.begin().await?;

            let rows = match strategy {
                Strategy::EntityForced => self
                    .entity_to_ones(&mut uow)
                    .await?
                    .into_iter()
                    .map(SimpleOrderView::Entity)
                    .collect(),
                Strategy::EntityToDto => to_simple_dtos(&self.entity_to_ones(&mut uow).await?)?,
                Strategy::FetchJoin => {
                    let orders = self.orders.find_with_to_ones(&mut uow, &OrderFetchPlan::to_ones()).await?;
                    to_simple_dtos(&orders)?
                }
                Strategy::Projection => self
                    .orders
                    .find_simple_order_dtos(&mut uow)
                    .await?
                    .into_iter()
                    .map(SimpleOrderView::Dto)
                    .collect(),
                Strategy::BatchFetch => return Err(AppError::UnknownStrategy(strategy.to_string())),
            };

            let queries = uow.commit().await?;
            self.finish(strategy, &queries, started, rows.len());
            Ok::<_, AppError>(Listing { rows, queries })
        }
        .instrument(span)
        .await
    }

    // ------------------------------------------------------------------------
    // Strategy bodies
    // ------------------------------------------------------------------------

    /// Root query, then member, delivery and items one order at a time
    async fn entity_graphs(&self, uow: &mut UnitOfWork, request: &ListRequest) -> Result<Vec<Order>, AppError> {
        let mut orders = self.orders.find_all(uow, &request.search).await?;
        for order in orders.iter_mut() {
            self.orders.load_member(uow, order).await?;
            self.orders.load_delivery(uow, order).await?;
            self.orders.load_order_items(uow, order).await?;
        }
        Ok(orders)
    }

    async fn entity_to_ones(&self, uow: &mut UnitOfWork) -> Result<Vec<Order>, AppError> {
        let mut orders = self.orders.find_all(uow, &Default::default()).await?;
        for order in orders.iter_mut() {
            self.orders.load_member(uow, order).await?;
            self.orders.load_delivery(uow, order).await?;
        }
        Ok(orders)
    }

    async fn projected_orders(&self, uow: &mut UnitOfWork, page: Option<Page>) -> Result<Vec<OrderDto>, AppError> {
        let mut orders = self.orders.find_order_dtos(uow, page).await?;

        let ids: Vec<i64> = orders.iter().map(|order| order.order_id).collect();
        let rows = self.orders.find_order_item_dtos(uow, &ids).await?;
        let mut groups = group_by_parent(rows, |row| row.order_id);

        for order in orders.iter_mut() {
            order.order_items = groups
                .remove(&order.order_id)
                .unwrap_or_default()
                .into_iter()
                .map(|row| row.item)
                .collect::<Vec<OrderItemDto>>();
        }
        Ok(orders)
    }

    fn finish(&self, strategy: Strategy, queries: &QueryLog, started: Instant, rows: usize) {
        let elapsed = started.elapsed();
        self.metrics.record_listing(strategy.as_str(), queries, elapsed.as_secs_f64());

        tracing::debug!(
            rows = rows,
            queries = queries.total(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Listing served"
        );
    }
}

fn to_dtos(orders: &[Order]) -> Result<Vec<OrderView>, AppError> {
    orders
        .iter()
        .map(|order| Ok(OrderView::Dto(OrderDto::try_from(order)?)))
        .collect()
}

fn to_simple_dtos(orders: &[Order]) -> Result<Vec<SimpleOrderView>, AppError> {
    orders
        .iter()
        .map(|order| Ok(SimpleOrderView::Dto(SimpleOrderDto::try_from(order)?)))
        .collect()
}
