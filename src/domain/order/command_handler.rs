use std::sync::Arc;

use crate::domain::item::ItemError;
use crate::error::AppError;
use crate::metrics::Metrics;
use crate::persistence::{Database, ItemRepository, MemberRepository, OrderRepository, UnitOfWork};

use super::aggregate::Order;
use super::commands::OrderCommand;
use super::errors::OrderError;
use super::value_objects::{DeliveryStatus, OrderLine};

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Command → Aggregate rules → Stock updates → Commit
//
// Stock is taken with a guarded decrement, so the check and the write are a
// single statement. A placement either takes stock for every line or rolls
// back all of it.
//
// ============================================================================

#[derive(Clone)]
pub struct OrderCommandHandler {
    db: Database,
    orders: OrderRepository,
    members: MemberRepository,
    items: ItemRepository,
    metrics: Arc<Metrics>,
}

impl OrderCommandHandler {
    pub fn new(db: Database, metrics: Arc<Metrics>) -> Self {
        Self {
            db,
            orders: OrderRepository,
            members: MemberRepository,
            items: ItemRepository,
            metrics,
        }
    }

    /// Handle a command and return the id of the affected order
    pub async fn handle(&self, command: OrderCommand) -> Result<i64, AppError> {
        tracing::debug!(command = command.name(), "Handling order command");

        match command {
            OrderCommand::PlaceOrder { member_id, lines } => self.place(member_id, &lines).await,
            OrderCommand::CancelOrder { order_id } => self.cancel(order_id).await,
        }
    }

    /// Order with member, delivery and items loaded
    pub async fn find_order(&self, order_id: i64) -> Result<Order, AppError> {
        let mut uow = self.db.begin().await?;
        let mut order = self.load(&mut uow, order_id).await?;
        self.orders.load_member(&mut uow, &mut order).await?;
        uow.commit().await?;
        Ok(order)
    }

    async fn place(&self, member_id: i64, lines: &[OrderLine]) -> Result<i64, AppError> {
        Order::validate_lines(lines)?;

        let mut uow = self.db.begin_write().await?;
        let member = self
            .members
            .find_one(&mut uow, member_id)
            .await?
            .ok_or_else(|| AppError::not_found("member", member_id))?;

        let delivery_id = self
            .orders
            .save_delivery(&mut uow, &member.address, DeliveryStatus::Ready)
            .await?;
        let order_date = chrono::Local::now().naive_local();
        let order_id = self.orders.save(&mut uow, member_id, delivery_id, order_date).await?;

        for line in lines {
            let Some(unit_price) = self.items.remove_stock(&mut uow, line.item_id, line.count).await? else {
                return Err(self.stock_rejection(&mut uow, line).await);
            };
            self.orders
                .save_order_item(&mut uow, order_id, line.item_id, unit_price, line.count)
                .await?;
        }

        uow.commit().await?;
        self.metrics.record_order_placed();

        tracing::info!(
            order_id = order_id,
            member_id = member_id,
            lines = lines.len(),
            "✅ Order placed"
        );
        Ok(order_id)
    }

    /// Explain why a guarded decrement matched nothing
    async fn stock_rejection(&self, uow: &mut UnitOfWork, line: &OrderLine) -> AppError {
        let item = match self.items.find_one(uow, line.item_id).await {
            Ok(Some(item)) => item,
            Ok(None) => return AppError::not_found("item", line.item_id),
            Err(e) => return e.into(),
        };

        self.metrics.record_stock_rejection();
        tracing::warn!(
            item_id = line.item_id,
            requested = line.count,
            available = item.stock_quantity,
            "⚠️ Not enough stock"
        );

        ItemError::NotEnoughStock {
            item_id: line.item_id,
            requested: line.count,
            available: item.stock_quantity,
        }
        .into()
    }

    async fn cancel(&self, order_id: i64) -> Result<i64, AppError> {
        let mut uow = self.db.begin_write().await?;
        let mut order = self.load(&mut uow, order_id).await?;

        order.cancel()?;
        if !self.orders.mark_cancelled(&mut uow, order_id).await? {
            return Err(OrderError::AlreadyCancelled.into());
        }

        for line in order.order_items.get("orderItems")? {
            self.restore_stock(&mut uow, line.item_id, line.count).await?;
        }

        uow.commit().await?;
        self.metrics.record_order_cancelled();

        tracing::info!(order_id = order_id, "✅ Order cancelled, stock restored");
        Ok(order_id)
    }

    async fn restore_stock(&self, uow: &mut UnitOfWork, item_id: i64, count: i32) -> Result<(), AppError> {
        if !self.items.add_stock(uow, item_id, count).await? {
            return Err(AppError::not_found("item", item_id));
        }
        Ok(())
    }

    /// Order with delivery and items, the state cancellation decides on
    async fn load(&self, uow: &mut UnitOfWork, order_id: i64) -> Result<Order, AppError> {
        let mut order = self
            .orders
            .find_one(uow, order_id)
            .await?
            .ok_or_else(|| AppError::not_found("order", order_id))?;

        self.orders.load_delivery(uow, &mut order).await?;
        self.orders.load_order_items(uow, &mut order).await?;
        Ok(order)
    }
}
